//! 判定結果の表示モジュール

use crate::catalog::Catalog;
use chrono::Datelike;
use guitar_id_common::{
    narrow_by_production, AggregateResult, ConfidenceSource, ConfidenceTier, MatchResult,
    NeckBlockResult,
};
use std::fmt::Write;

/// 照合結果の表示件数
pub const MATCH_DISPLAY_LIMIT: usize = 5;

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// 製造からの経過年数（未来の年は None）
pub fn instrument_age(year: i32, current_year: i32) -> Option<i32> {
    (year <= current_year).then(|| current_year - year)
}

/// 曖昧なネックブロックをモデルの生産期間で絞り込めるか
///
/// 一致モデルがちょうど1つで、その生産期間に候補が1つだけ入る場合のみ。
pub fn production_hint(result: &AggregateResult) -> Option<i32> {
    let possible = result.neck_block.as_ref()?.possible_years()?;
    match result.matched_models.as_slice() {
        [model] => narrow_by_production(possible, model.production_start, model.production_end),
        _ => None,
    }
}

fn confidence_bar(percent: u8) -> String {
    let filled = (percent as usize + 5) / 10;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(10 - filled.min(10)))
}

fn tier_label(tier: ConfidenceTier) -> &'static str {
    match tier {
        ConfidenceTier::High => "高",
        ConfidenceTier::Medium => "中",
        ConfidenceTier::Low => "低",
    }
}

fn source_label(source: ConfidenceSource) -> &'static str {
    match source {
        ConfidenceSource::SerialDate => "シリアル（年月）",
        ConfidenceSource::NeckBlock => "ネックブロック",
        ConfidenceSource::PatternRange => "プレフィックスパターン",
        ConfidenceSource::SerialFallback => "シリアル形式",
        ConfidenceSource::PatternEscalation => "パターン一致数",
        ConfidenceSource::ExactMatch => "承認済みギターと完全一致",
    }
}

/// 製造年判定結果をテキストに整形
pub fn format_lookup(result: &AggregateResult, current_year: i32) -> String {
    let parse = &result.parse;
    let mut out = String::new();

    let _ = writeln!(out, "形式: {}", parse.format);
    if let Some(prefix) = &parse.prefix {
        let _ = writeln!(out, "プレフィックス: {}", prefix);
    }
    match (parse.estimated_year, parse.estimated_month) {
        (Some(y), Some(m)) => {
            let _ = writeln!(out, "製造年月: {}年{}月", y, m);
        }
        (Some(y), None) => {
            let _ = writeln!(out, "製造年: {}年", y);
        }
        _ => {
            let _ = writeln!(out, "製造年: 不明（推定範囲: {}）", parse.year_range_display);
        }
    }
    if let Some(age) = parse.estimated_year.and_then(|y| instrument_age(y, current_year)) {
        let _ = writeln!(out, "経過年数: 約{}年", age);
    }
    let _ = writeln!(out, "製造国: {}", parse.country_guess);
    let _ = writeln!(
        out,
        "信頼度: {} {}% {}",
        tier_label(parse.confidence_tier),
        parse.confidence_percent,
        confidence_bar(parse.confidence_percent)
    );
    if !result.sources.is_empty() {
        let labels: Vec<&str> = result.sources.iter().map(|s| source_label(*s)).collect();
        let _ = writeln!(out, "根拠: {}", labels.join(" / "));
    }

    if let Some(neck) = &result.neck_block {
        if let Some([heisei, modern]) = neck.possible_years() {
            let _ = writeln!(out, "⚠ ネックブロック: {}年 または {}年（判別不能）", heisei, modern);
            if let Some(year) = production_hint(result) {
                let _ = writeln!(out, "  → 一致モデルの生産期間からは {}年 が該当", year);
            }
        }
    } else if parse.needs_emperor_code {
        let _ = writeln!(out, "⚠ ネックブロックの刻印を確認すると年を特定できる可能性があります");
    }

    if !result.matched_models.is_empty() {
        let _ = writeln!(out, "\n一致モデル ({}件):", result.matched_models.len());
        for model in &result.matched_models {
            let series = model.series.as_deref().unwrap_or("-");
            let country = model.country_of_origin.as_deref().unwrap_or("-");
            let _ = writeln!(out, "  - {} [{}] {}", model.name, series, country);
        }
    }

    if !result.similar_guitars.is_empty() {
        let _ = writeln!(out, "\n類似の承認済みギター ({}件):", result.similar_guitars.len());
        for guitar in &result.similar_guitars {
            let year = guitar
                .estimated_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "?".to_string());
            let name = guitar.model_name.as_deref().unwrap_or("-");
            let _ = writeln!(out, "  - {} ({}年) {}", guitar.serial_number, year, name);
        }
    }

    if !parse.notes.is_empty() {
        let _ = writeln!(out, "\n備考: {}", parse.notes);
    }

    out
}

/// ネックブロック解読結果をテキストに整形
pub fn format_neck_block(result: &NeckBlockResult) -> String {
    match result {
        NeckBlockResult::Decoded { year, era, notes } => {
            format!("✔ {}年 ({:?})\n備考: {}\n", year, era, notes)
        }
        NeckBlockResult::Ambiguous {
            possible_years: [heisei, modern],
            notes,
        } => format!(
            "⚠ {}年（平成）または {}年（判別不能）\n備考: {}\n",
            heisei, modern, notes
        ),
        NeckBlockResult::Undecoded { notes } => format!("✗ 解読できません\n備考: {}\n", notes),
    }
}

/// 特徴照合結果をテキストに整形
pub fn format_matches(results: &[MatchResult], catalog: &Catalog, limit: usize) -> String {
    if results.is_empty() {
        return "候補モデルなし\n".to_string();
    }

    let mut out = String::new();
    for (rank, r) in results.iter().take(limit).enumerate() {
        let name = catalog
            .model(r.model_id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| format!("model #{}", r.model_id));
        let marker = if r.required_missing == 0 { "✔" } else { " " };
        let _ = writeln!(
            out,
            "{} {}. {}: {}% (必須 {}/{}, 一致 {}/{})",
            marker,
            rank + 1,
            name,
            r.match_percentage,
            r.matched_required,
            r.total_required,
            r.matched_features,
            r.total_features
        );
    }
    if results.len() > limit {
        let _ = writeln!(out, "  ...他 {}件", results.len() - limit);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use guitar_id_common::{lookup, ModelRecord, PatternRecord};

    #[test]
    fn test_instrument_age() {
        assert_eq!(instrument_age(1977, 2026), Some(49));
        assert_eq!(instrument_age(2026, 2026), Some(0));
        assert_eq!(instrument_age(2080, 2026), None);
    }

    #[test]
    fn test_confidence_bar() {
        assert_eq!(confidence_bar(95), "[##########]");
        assert_eq!(confidence_bar(30), "[###-------]");
        assert_eq!(confidence_bar(0), "[----------]");
    }

    #[test]
    fn test_format_lookup_dated() {
        let result = lookup("E25115614", None, &[], &[]).unwrap();
        let text = format_lookup(&result, 2026);
        assert!(text.contains("2025年11月"));
        assert!(text.contains("経過年数: 約1年"));
        assert!(text.contains("China"));
    }

    #[test]
    fn test_production_hint_single_model() {
        let pattern = PatternRecord {
            id: 1,
            prefix: "A".to_string(),
            model: Some(ModelRecord {
                id: 5,
                name: "Vintage 1990s".to_string(),
                production_start: Some(1990),
                production_end: Some(1999),
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = lookup("A12345", Some("7"), &[pattern], &[]).unwrap();
        assert_eq!(production_hint(&result), Some(1996));
        // 判定結果そのものは曖昧なまま
        assert_eq!(result.parse.estimated_year, None);

        let text = format_lookup(&result, 2026);
        assert!(text.contains("1996年 または 2007年"));
    }

    #[test]
    fn test_format_neck_block_ambiguous() {
        let text = format_neck_block(&guitar_id_common::resolve_neck_block("7"));
        assert!(text.contains("1996"));
        assert!(text.contains("2007"));
    }

    #[test]
    fn test_format_matches_empty() {
        assert_eq!(format_matches(&[], &Catalog::default(), 5), "候補モデルなし\n");
    }
}

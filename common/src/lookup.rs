//! 製造年判定（信頼度集約）モジュール
//!
//! シリアル分類・ネックブロック解読・外部カタログを組み合わせて
//! 1つの判定結果と信頼度にまとめる。
//!
//! ## 年・範囲の優先順位（上位が下位に上書きされることはない）
//! 1. シリアルから年と月が判明
//! 2. ネックブロックで年が確定（信頼度 高/95%、日本製）
//! 3. プレフィックスパターンの年範囲（シリアルに年がない場合のみ）
//! 4. シリアル分類の範囲・備考
//!
//! その後、一致パターン数による信頼度引き上げ、承認済みギターとの
//! 完全一致による 高/95% への引き上げを行う。

use crate::error::Result;
use crate::neck_block::resolve_neck_block;
use crate::serial::{classify, normalize_serial};
use crate::types::{
    AggregateResult, ApprovedGuitarRecord, ConfidenceSource, ConfidenceTier, ModelRecord,
    PatternRecord,
};
use std::collections::HashSet;
use tracing::debug;

/// ネックブロック確定時・完全一致時の信頼度
pub const DEFINITIVE_PERCENT: u8 = 95;
/// 一致パターン2件以上
pub const MULTI_PATTERN_PERCENT: u8 = 85;
/// 一致パターン1件
pub const SINGLE_PATTERN_PERCENT: u8 = 65;

/// シリアル（と任意のネックブロック刻印）から製造年を判定する
///
/// # Arguments
/// * `serial` - 入力シリアル（未正規化で可）
/// * `neck_block` - ネックブロック刻印（任意）
/// * `patterns` - プレフィックスパターン（空でも可）
/// * `approved_guitars` - 承認済みギター（空でも可）
///
/// # Returns
/// * `Err(Error::MissingSerial)` - シリアルが空の場合
pub fn lookup(
    serial: &str,
    neck_block: Option<&str>,
    patterns: &[PatternRecord],
    approved_guitars: &[ApprovedGuitarRecord],
) -> Result<AggregateResult> {
    let serial = normalize_serial(serial)?;
    let classified = classify(&serial);
    let neck = neck_block
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(resolve_neck_block);

    // Yairiの連番はプレフィックス情報を持たない
    let (matching, similar): (Vec<&PatternRecord>, Vec<ApprovedGuitarRecord>) =
        if classified.is_yairi {
            (Vec::new(), Vec::new())
        } else {
            let key = classified
                .prefix
                .clone()
                .unwrap_or_else(|| serial.chars().take(2).collect());
            let matching = patterns
                .iter()
                .filter(|p| p.prefix.trim().eq_ignore_ascii_case(&key))
                .collect();
            let similar = approved_guitars
                .iter()
                .filter(|g| g.serial_number.trim().to_uppercase().starts_with(&key))
                .cloned()
                .collect();
            (matching, similar)
        };

    let mut result = classified.clone();
    let mut sources = Vec::new();
    let neck_year = neck.as_ref().and_then(|n| n.year());

    if classified.has_specific_date() {
        sources.push(ConfidenceSource::SerialDate);
    } else if let Some(year) = neck_year {
        result.estimated_year = Some(year);
        result.estimated_month = None;
        result.year_range_display = year.to_string();
        result.confidence_tier = ConfidenceTier::High;
        result.confidence_percent = DEFINITIVE_PERCENT;
        result.country_guess = "Japan".to_string();
        sources.push(ConfidenceSource::NeckBlock);
    } else if let Some(range) = classified
        .estimated_year
        .is_none()
        .then(|| pattern_year_range(&matching))
        .flatten()
    {
        result.year_range_display = range;
        sources.push(ConfidenceSource::PatternRange);
    } else {
        sources.push(ConfidenceSource::SerialFallback);
    }

    if let Some(neck) = &neck {
        append_note(&mut result.notes, &format!("Neck block: {}", neck.notes()));
    }

    // 年月が判明している強い判定は下げない
    if !classified.has_specific_date() {
        let escalated = match matching.len() {
            0 => None,
            1 => Some((ConfidenceTier::Medium, SINGLE_PATTERN_PERCENT)),
            _ => Some((ConfidenceTier::High, MULTI_PATTERN_PERCENT)),
        };
        if let Some((tier, percent)) = escalated {
            if percent > result.confidence_percent {
                result.confidence_tier = tier;
                result.confidence_percent = percent;
                sources.push(ConfidenceSource::PatternEscalation);
            }
        }
    }

    let exact_match = !classified.is_yairi
        && approved_guitars
            .iter()
            .any(|g| g.serial_number.trim().to_uppercase() == serial);
    if exact_match {
        result.confidence_tier = ConfidenceTier::High;
        result.confidence_percent = DEFINITIVE_PERCENT;
        sources.push(ConfidenceSource::ExactMatch);
    }

    // ネックブロックで確定した場合は日本製を維持
    if neck_year.is_none() || classified.has_specific_date() {
        if let Some(country) = matching
            .iter()
            .filter_map(|p| p.manufacture_country.as_deref())
            .map(str::trim)
            .find(|c| !c.is_empty())
        {
            result.country_guess = country.to_string();
        }
    }

    for note in pattern_notes(&matching) {
        append_note(&mut result.notes, &format!("Pattern: {}", note));
    }

    debug!(
        serial = %serial,
        patterns = matching.len(),
        similar = similar.len(),
        exact_match,
        confidence = result.confidence_percent,
        "製造年判定完了"
    );

    Ok(AggregateResult {
        parse: result,
        neck_block: neck,
        matched_models: matched_models(&matching),
        similar_guitars: similar,
        pattern_count: matching.len(),
        exact_match,
        sources,
    })
}

/// 一致パターンの年範囲を表示用文字列にまとめる
fn pattern_year_range(patterns: &[&PatternRecord]) -> Option<String> {
    let start = patterns.iter().filter_map(|p| p.year_start).min();
    let end = patterns.iter().filter_map(|p| p.year_end).max();

    match (start, end) {
        (Some(s), Some(e)) if s == e => Some(s.to_string()),
        (Some(s), Some(e)) => Some(format!("{}-{}", s, e)),
        (Some(s), None) => Some(format!("From {}", s)),
        (None, Some(e)) => Some(format!("Until {}", e)),
        (None, None) => None,
    }
}

/// パターンに紐づくモデル（ID重複除去、出現順）
fn matched_models(patterns: &[&PatternRecord]) -> Vec<ModelRecord> {
    let mut seen = HashSet::new();
    patterns
        .iter()
        .filter_map(|p| p.model.as_ref())
        .filter(|m| seen.insert(m.id))
        .cloned()
        .collect()
}

fn pattern_notes<'a>(patterns: &[&'a PatternRecord]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    patterns
        .iter()
        .copied()
        .filter_map(|p| p.confidence_notes.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty() && seen.insert(*n))
        .collect()
}

fn append_note(notes: &mut String, extra: &str) {
    if !notes.is_empty() {
        notes.push(' ');
    }
    notes.push_str(extra);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::SerialFormat;

    fn pattern(id: i64, prefix: &str, start: Option<i32>, end: Option<i32>) -> PatternRecord {
        PatternRecord {
            id,
            prefix: prefix.to_string(),
            year_start: start,
            year_end: end,
            ..Default::default()
        }
    }

    fn model(id: i64, name: &str) -> ModelRecord {
        ModelRecord {
            id,
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn approved(id: i64, serial: &str) -> ApprovedGuitarRecord {
        ApprovedGuitarRecord {
            id,
            serial_number: serial.to_string(),
            estimated_year: Some(2010),
            model_name: Some("D-28".to_string()),
        }
    }

    #[test]
    fn test_lookup_missing_serial() {
        let result = lookup("  ", None, &[], &[]);
        assert!(matches!(result, Err(Error::MissingSerial)));
    }

    #[test]
    fn test_lookup_empty_catalogs() {
        let result = lookup("E25115614", None, &[], &[]).unwrap();
        assert_eq!(result.parse.estimated_year, Some(2025));
        assert_eq!(result.parse.confidence_tier, ConfidenceTier::High);
        assert_eq!(result.pattern_count, 0);
        assert!(result.matched_models.is_empty());
        assert_eq!(result.sources, vec![ConfidenceSource::SerialDate]);
    }

    #[test]
    fn test_lookup_specific_date_not_overridden_by_neck_block() {
        let result = lookup("E25115614", Some("52"), &[], &[]).unwrap();
        assert_eq!(result.parse.estimated_year, Some(2025));
        assert_eq!(result.parse.country_guess, "China");
        assert_eq!(result.neck_block.as_ref().and_then(|n| n.year()), Some(1977));
    }

    #[test]
    fn test_lookup_neck_block_decodes_legacy() {
        let result = lookup("A12345", Some("52"), &[], &[]).unwrap();
        assert_eq!(result.parse.estimated_year, Some(1977));
        assert_eq!(result.parse.year_range_display, "1977");
        assert_eq!(result.parse.confidence_tier, ConfidenceTier::High);
        assert_eq!(result.parse.confidence_percent, DEFINITIVE_PERCENT);
        assert_eq!(result.parse.country_guess, "Japan");
        assert!(result.sources.contains(&ConfidenceSource::NeckBlock));
    }

    #[test]
    fn test_lookup_neck_block_overrides_year_without_month() {
        let mut p = pattern(1, "F", Some(2002), Some(2008));
        p.manufacture_country = Some("Korea".to_string());
        let result = lookup("F212345", Some("52"), &[p], &[]).unwrap();

        assert_eq!(result.parse.estimated_year, Some(1977));
        assert_eq!(result.parse.estimated_month, None);
        assert_eq!(result.parse.year_range_display, "1977");
        assert_eq!(result.parse.country_guess, "Japan");
        assert_eq!(result.parse.confidence_tier, ConfidenceTier::High);
        assert_eq!(result.parse.confidence_percent, DEFINITIVE_PERCENT);
        assert_eq!(result.sources, vec![ConfidenceSource::NeckBlock]);
    }

    #[test]
    fn test_lookup_neck_block_overrides_nine_digit_invalid_month() {
        let serial_only = lookup("191312345", None, &[], &[]).unwrap();
        assert_eq!(serial_only.parse.estimated_year, Some(2019));
        assert_eq!(serial_only.parse.estimated_month, None);

        let result = lookup("191312345", Some("52"), &[], &[]).unwrap();
        assert_eq!(result.parse.estimated_year, Some(1977));
        assert_eq!(result.parse.year_range_display, "1977");
        assert_eq!(result.parse.country_guess, "Japan");
        assert_eq!(result.parse.confidence_tier, ConfidenceTier::High);
        assert_eq!(result.parse.confidence_percent, DEFINITIVE_PERCENT);
    }

    #[test]
    fn test_lookup_ambiguous_neck_block_is_surfaced() {
        let result = lookup("A12345", Some("7"), &[], &[]).unwrap();
        assert_eq!(result.parse.estimated_year, None);
        assert_eq!(
            result.neck_block.as_ref().and_then(|n| n.possible_years()),
            Some([1996, 2007])
        );
        assert!(result.parse.notes.contains("ambiguous"));
        assert_eq!(result.parse.confidence_tier, ConfidenceTier::Low);
    }

    #[test]
    fn test_lookup_pattern_range_applied_without_year() {
        let patterns = vec![
            pattern(1, "A", Some(1975), Some(1980)),
            pattern(2, "A", Some(1978), Some(1984)),
            pattern(3, "E", Some(2010), Some(2020)),
        ];
        let result = lookup("A12345", None, &patterns, &[]).unwrap();
        assert_eq!(result.parse.year_range_display, "1975-1984");
        assert_eq!(result.pattern_count, 2);
        assert_eq!(result.parse.confidence_tier, ConfidenceTier::High);
        assert_eq!(result.parse.confidence_percent, MULTI_PATTERN_PERCENT);
        assert!(result.sources.contains(&ConfidenceSource::PatternRange));
        assert!(result.sources.contains(&ConfidenceSource::PatternEscalation));
    }

    #[test]
    fn test_lookup_pattern_range_not_applied_with_serial_year() {
        let patterns = vec![pattern(1, "S", Some(1990), Some(2010))];
        let result = lookup("S9512345", None, &patterns, &[]).unwrap();
        assert_eq!(result.parse.estimated_year, Some(1995));
        assert_eq!(result.parse.year_range_display, "1995");
        assert_eq!(result.parse.confidence_tier, ConfidenceTier::Medium);
        assert_eq!(result.parse.confidence_percent, SINGLE_PATTERN_PERCENT);
    }

    #[test]
    fn test_lookup_strong_parse_not_escalated() {
        let patterns = vec![pattern(1, "E", Some(2010), Some(2020))];
        let result = lookup("E25115614", None, &patterns, &[]).unwrap();
        assert_eq!(result.parse.confidence_percent, 90);
        assert!(!result.sources.contains(&ConfidenceSource::PatternEscalation));
    }

    #[test]
    fn test_lookup_numeric_uses_first_two_chars() {
        let patterns = vec![pattern(1, "19", None, None)];
        let result = lookup("190512345", None, &patterns, &[]).unwrap();
        assert_eq!(result.pattern_count, 1);
    }

    #[test]
    fn test_lookup_yairi_skips_catalogs() {
        let patterns = vec![pattern(1, "51", Some(1990), Some(1995))];
        let guitars = vec![approved(1, "5152")];
        let result = lookup("5152", None, &patterns, &guitars).unwrap();
        assert!(result.parse.is_yairi);
        assert_eq!(result.parse.format, SerialFormat::Yairi);
        assert_eq!(result.pattern_count, 0);
        assert!(result.similar_guitars.is_empty());
        assert!(!result.exact_match);
        assert_eq!(result.parse.confidence_tier, ConfidenceTier::Low);
    }

    #[test]
    fn test_lookup_exact_match_boost() {
        let guitars = vec![approved(1, "f212345"), approved(2, "F299999"), approved(3, "E1")];
        let result = lookup("F212345", None, &[], &guitars).unwrap();
        assert!(result.exact_match);
        assert_eq!(result.parse.confidence_tier, ConfidenceTier::High);
        assert_eq!(result.parse.confidence_percent, DEFINITIVE_PERCENT);
        assert_eq!(result.similar_guitars.len(), 2);
        assert_eq!(result.similar_guitars[1].model_name.as_deref(), Some("D-28"));
    }

    #[test]
    fn test_lookup_country_prefers_pattern() {
        let mut p = pattern(1, "F", None, None);
        p.manufacture_country = Some("Korea".to_string());
        let result = lookup("F512345", None, &[p], &[]).unwrap();
        assert_eq!(result.parse.country_guess, "Korea");
    }

    #[test]
    fn test_lookup_matched_models_deduplicated() {
        let mut a = pattern(1, "CS", None, None);
        a.model = Some(model(10, "GA-35"));
        let mut b = pattern(2, "CS", None, None);
        b.model = Some(model(10, "GA-35"));
        let mut c = pattern(3, "CS", None, None);
        c.model = Some(model(11, "DY-28"));
        c.confidence_notes = Some("Factory records confirmed".to_string());

        let result = lookup("CS10030021", None, &[a, b, c], &[]).unwrap();
        assert_eq!(result.matched_models.len(), 2);
        assert_eq!(result.matched_models[0].id, 10);
        assert_eq!(result.matched_models[1].name, "DY-28");
        assert!(result.parse.notes.contains("Factory records confirmed"));
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let patterns = vec![pattern(1, "A", Some(1975), Some(1980))];
        let first = lookup("A12345", Some("7"), &patterns, &[]).unwrap();
        let second = lookup("A12345", Some("7"), &patterns, &[]).unwrap();
        assert_eq!(first, second);
    }
}

//! ネックブロック刻印（元号コード）解読モジュール
//!
//! - 45-63: 昭和（1970-1988）
//! - 1-12: 平成（1989-2000）か2000年代（2001-2012）か判別不能
//! - 13-99: 2000年代
//! - 6桁: 工場ごとに形式が異なるため解読しない

use crate::types::{Era, NeckBlockResult};
use tracing::debug;

/// 昭和コード → 西暦
const SHOWA_TABLE: [(u32, i32); 19] = [
    (45, 1970),
    (46, 1971),
    (47, 1972),
    (48, 1973),
    (49, 1974),
    (50, 1975),
    (51, 1976),
    (52, 1977),
    (53, 1978),
    (54, 1979),
    (55, 1980),
    (56, 1981),
    (57, 1982),
    (58, 1983),
    (59, 1984),
    (60, 1985),
    (61, 1986),
    (62, 1987),
    (63, 1988),
];

const HEISEI_BASE: i32 = 1988;
const MODERN_BASE: i32 = 2000;

/// 刻印コードを解読する
///
/// 1-12 のコードは平成と2000年代の両方に該当するため、
/// `NeckBlockResult::Ambiguous` で候補を両方返す。
pub fn resolve_neck_block(code: &str) -> NeckBlockResult {
    let code = code.trim();

    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return NeckBlockResult::Undecoded {
            notes: "invalid format".to_string(),
        };
    }

    if code.len() == 6 {
        return NeckBlockResult::Undecoded {
            notes: "Six-digit neck-block stamp: format varies by factory and cannot be decoded \
                    from the emperor-code chart."
                .to_string(),
        };
    }

    let value = match code.parse::<u32>() {
        Ok(v) => v,
        Err(_) => return not_in_chart(code),
    };

    let result = if let Some(&(_, year)) = SHOWA_TABLE.iter().find(|(c, _)| *c == value) {
        NeckBlockResult::Decoded {
            year,
            era: Era::Showa,
            notes: format!("Showa {} = {}.", value, year),
        }
    } else if (1..=12).contains(&value) {
        let heisei = HEISEI_BASE + value as i32;
        let modern = MODERN_BASE + value as i32;
        NeckBlockResult::Ambiguous {
            possible_years: [heisei, modern],
            notes: format!(
                "Code {} is ambiguous: Heisei {} = {} or {}. Use the model's production \
                 window or other evidence to decide.",
                value, value, heisei, modern
            ),
        }
    } else if (13..=99).contains(&value) {
        let year = MODERN_BASE + value as i32;
        NeckBlockResult::Decoded {
            year,
            era: Era::Modern,
            notes: format!("Code {} = {}.", value, year),
        }
    } else {
        not_in_chart(code)
    };

    debug!(code, year = ?result.year(), "ネックブロック解読");
    result
}

fn not_in_chart(code: &str) -> NeckBlockResult {
    NeckBlockResult::Undecoded {
        notes: format!("Code {} not found in chart.", code),
    }
}

/// 曖昧な候補をモデルの生産期間で絞り込む
///
/// 候補のうちちょうど1つだけが期間内にある場合のみ返す。
/// 0個・2個とも該当する場合や期間が不明な場合は `None`。
pub fn narrow_by_production(
    possible_years: [i32; 2],
    production_start: Option<i32>,
    production_end: Option<i32>,
) -> Option<i32> {
    if production_start.is_none() && production_end.is_none() {
        return None;
    }

    let start = production_start.unwrap_or(i32::MIN);
    let end = production_end.unwrap_or(i32::MAX);
    let inside: Vec<i32> = possible_years
        .iter()
        .copied()
        .filter(|y| (start..=end).contains(y))
        .collect();

    match inside.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

//! シリアル分類モジュール
//!
//! 正規化済みシリアル文字列を構造化された分類結果に変換する。
//!
//! ## 判定順序（最初に一致した規則のみ採用）
//! 1. `E` + YY + MM + 連番 → 中国製、信頼度 高
//! 2. `CS` + YY + MM + 連番 → 中国製、信頼度 高
//! 3. `CD` + YY + MM + 連番 → 中国製、信頼度 中
//! 4. `F` + 1-3桁 → 中国/韓国製（先頭2/3のみ年推定）
//! 5. `S` + YY → 韓国/中国製
//! 6. `A` + 数字 → 日本製ビンテージ（ネックブロック要確認）
//! 7. 9桁数字 YYMMXXXXX
//! 8. 4-6桁数字 → Yairi連番（年月なし）
//! 9. 6桁数字 → 日本製（8と重複するため実際には到達しない）
//! 10. その他の数字のみ → 日本製
//! 11. 上記以外 → 不明

use crate::error::{Error, Result};
use crate::types::{ConfidenceTier, ParseResult, SerialFormat};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref E_RE: Regex = Regex::new(r"^E([0-9]{2})([0-9]{2})[0-9]+$").unwrap();
    static ref CS_RE: Regex = Regex::new(r"^CS([0-9]{2})([0-9]{2})[0-9]+$").unwrap();
    static ref CD_RE: Regex = Regex::new(r"^CD([0-9]{2})([0-9]{2})[0-9]+$").unwrap();
    static ref F_RE: Regex = Regex::new(r"^F([0-9]{1,3})[0-9]*$").unwrap();
    static ref S_RE: Regex = Regex::new(r"^S([0-9]{2})[0-9]*$").unwrap();
    static ref A_RE: Regex = Regex::new(r"^A[0-9]+$").unwrap();
    static ref NINE_DIGIT_RE: Regex = Regex::new(r"^[0-9]{9}$").unwrap();
    static ref YAIRI_RE: Regex = Regex::new(r"^[0-9]{4,6}$").unwrap();
    static ref SIX_DIGIT_RE: Regex = Regex::new(r"^[0-9]{6}$").unwrap();
    static ref NUMERIC_RE: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

const UNKNOWN_PERCENT: u8 = 10;

/// ティアごとの既定パーセンテージ
pub fn default_percent(tier: ConfidenceTier) -> u8 {
    match tier {
        ConfidenceTier::High => 90,
        ConfidenceTier::Medium => 60,
        ConfidenceTier::Low => 30,
    }
}

/// 入力シリアルを正規化（前後空白除去＋大文字化）
///
/// 空文字列は分類前に `Error::MissingSerial` として呼び出し側に返す。
pub fn normalize_serial(raw: &str) -> Result<String> {
    let normalized = raw.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(Error::MissingSerial);
    }
    Ok(normalized)
}

/// シリアルを分類する
///
/// 判定不能な形式もエラーにはせず `SerialFormat::Unknown` を返す。
///
/// # Examples
/// ```
/// use guitar_id_common::classify;
///
/// let result = classify("E25115614");
/// assert_eq!(result.estimated_year, Some(2025));
/// assert_eq!(result.estimated_month, Some(11));
/// ```
pub fn classify(serial: &str) -> ParseResult {
    let serial = serial.trim().to_uppercase();

    let result = if let Some(caps) = E_RE.captures(&serial) {
        dated_modern("E", &caps[1], &caps[2], ConfidenceTier::High)
    } else if let Some(caps) = CS_RE.captures(&serial) {
        dated_modern("CS", &caps[1], &caps[2], ConfidenceTier::High)
    } else if let Some(caps) = CD_RE.captures(&serial) {
        // E/CSと同じ構造だがこの期間の刻印は信頼度を一段下げる
        dated_modern("CD", &caps[1], &caps[2], ConfidenceTier::Medium)
    } else if let Some(caps) = F_RE.captures(&serial) {
        f_prefix(&caps[1])
    } else if let Some(caps) = S_RE.captures(&serial) {
        s_prefix(&caps[1])
    } else if A_RE.is_match(&serial) {
        ParseResult {
            year_range_display: "Pre-2000s (vintage)".to_string(),
            country_guess: "Japan".to_string(),
            notes: "A-prefix vintage serial. Year cannot be read from the serial; \
                    check the neck block for an emperor-code stamp."
                .to_string(),
            needs_emperor_code: true,
            prefix: Some("A".to_string()),
            ..base(SerialFormat::Legacy, ConfidenceTier::Low)
        }
    } else if NINE_DIGIT_RE.is_match(&serial) {
        nine_digit(&serial)
    } else if YAIRI_RE.is_match(&serial) {
        ParseResult {
            year_range_display: "Unknown (sequence number)".to_string(),
            country_guess: "Japan".to_string(),
            notes: "Yairi sequence number. The serial alone cannot date this instrument; \
                    for pre-2000s units, inspect the neck block for an emperor-code stamp."
                .to_string(),
            is_yairi: true,
            ..base(SerialFormat::Yairi, ConfidenceTier::Low)
        }
    } else if SIX_DIGIT_RE.is_match(&serial) {
        let value: u64 = serial.parse().unwrap_or(0);
        let range = if value < 500_000 { "1980s" } else { "1980s-1990s" };
        legacy_numeric(range, "Six-digit Japanese serial.")
    } else if NUMERIC_RE.is_match(&serial) {
        let range = match serial.parse::<u64>() {
            Ok(value) if value < 100_000 => "1960s-1980s",
            _ => "Unknown",
        };
        legacy_numeric(range, "Numeric Japanese serial.")
    } else {
        ParseResult {
            year_range_display: "Unknown".to_string(),
            country_guess: "Unknown".to_string(),
            notes: "Unrecognized serial format.".to_string(),
            confidence_percent: UNKNOWN_PERCENT,
            ..base(SerialFormat::Unknown, ConfidenceTier::Low)
        }
    };

    debug!(
        serial = %serial,
        format = %result.format,
        year = ?result.estimated_year,
        "シリアル分類完了"
    );
    result
}

fn base(format: SerialFormat, tier: ConfidenceTier) -> ParseResult {
    ParseResult {
        format,
        estimated_year: None,
        estimated_month: None,
        year_range_display: String::new(),
        confidence_tier: tier,
        confidence_percent: default_percent(tier),
        country_guess: String::new(),
        notes: String::new(),
        is_yairi: false,
        needs_emperor_code: false,
        prefix: None,
    }
}

/// 月を検証（1-12以外は None）
fn valid_month(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|m| (1..=12).contains(m))
}

fn invalid_month_note(digits: &str) -> String {
    format!(" Month digits \"{}\" are not a valid month (1-12).", digits)
}

/// E / CS / CD 形式（YYMM埋め込み）
fn dated_modern(prefix: &str, yy: &str, mm: &str, tier: ConfidenceTier) -> ParseResult {
    let year = 2000 + yy.parse::<i32>().unwrap_or(0);
    let month = valid_month(mm);

    let mut notes = format!("{}-prefix factory serial, year {}", prefix, year);
    match month {
        Some(m) => notes.push_str(&format!(", month {}.", m)),
        None => {
            notes.push('.');
            notes.push_str(&invalid_month_note(mm));
        }
    }

    ParseResult {
        estimated_year: Some(year),
        estimated_month: month,
        year_range_display: year.to_string(),
        country_guess: "China".to_string(),
        notes,
        prefix: Some(prefix.to_string()),
        ..base(SerialFormat::Modern, tier)
    }
}

/// F形式: 先頭桁が2/3のときのみ年を推定
fn f_prefix(indicator: &str) -> ParseResult {
    let year = match indicator.chars().next() {
        Some('2') => Some(2002),
        Some('3') => Some(2003),
        _ => None,
    };

    let (range, notes) = match year {
        Some(y) => (
            "2002-2008".to_string(),
            format!("F-prefix serial, indicator {} suggests {}.", indicator, y),
        ),
        None => (
            "Early-mid 2000s".to_string(),
            format!("F-prefix serial, indicator {} carries no year.", indicator),
        ),
    };

    ParseResult {
        estimated_year: year,
        year_range_display: range,
        country_guess: "China or Korea".to_string(),
        notes,
        prefix: Some("F".to_string()),
        ..base(SerialFormat::Modern, ConfidenceTier::Medium)
    }
}

/// S形式: 90-99 → 1990年代、00-10 → 2000年代
fn s_prefix(yy: &str) -> ParseResult {
    let value = yy.parse::<i32>().unwrap_or(-1);
    let year = match value {
        90..=99 => Some(1900 + value),
        0..=10 => Some(2000 + value),
        _ => None,
    };

    let (range, notes) = match year {
        Some(y) => (y.to_string(), format!("S-prefix serial, year {}.", y)),
        None => (
            "1990s".to_string(),
            format!("S-prefix serial, year digits {} outside known ranges.", yy),
        ),
    };

    ParseResult {
        estimated_year: year,
        year_range_display: range,
        country_guess: "Korea or China".to_string(),
        notes,
        prefix: Some("S".to_string()),
        ..base(SerialFormat::Modern, ConfidenceTier::Medium)
    }
}

/// 9桁 YYMMXXXXX
fn nine_digit(serial: &str) -> ParseResult {
    let yy = &serial[0..2];
    let mm = &serial[2..4];
    let value = yy.parse::<i32>().unwrap_or(-1);
    let year = match value {
        0..=25 => Some(2000 + value),
        80..=99 => Some(1900 + value),
        _ => None,
    };
    let month = valid_month(mm);

    let mut notes = match year {
        Some(y) => format!("Nine-digit serial (YYMMXXXXX), year {}.", y),
        None => format!("Nine-digit serial (YYMMXXXXX), year digits {} not recognized.", yy),
    };
    if month.is_none() {
        notes.push_str(&invalid_month_note(mm));
    }

    ParseResult {
        estimated_year: year,
        estimated_month: month,
        year_range_display: year.map(|y| y.to_string()).unwrap_or_else(|| "Unknown".to_string()),
        country_guess: "Unknown".to_string(),
        notes,
        ..base(SerialFormat::NineDigit, ConfidenceTier::Medium)
    }
}

fn legacy_numeric(range: &str, lead: &str) -> ParseResult {
    ParseResult {
        year_range_display: range.to_string(),
        country_guess: "Japan".to_string(),
        notes: format!("{} Check the neck block for an emperor-code stamp.", lead),
        needs_emperor_code: true,
        ..base(SerialFormat::Legacy, ConfidenceTier::Low)
    }
}

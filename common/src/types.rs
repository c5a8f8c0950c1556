//! 判定エンジンの型定義
//!
//! CLIと外部コラボレータ（永続化層・UI層）で共有される値オブジェクト:
//! - ParseResult: シリアル分類の出力
//! - NeckBlockResult: ネックブロック刻印の解読結果
//! - PatternRecord / ApprovedGuitarRecord / ModelRecord: 外部から渡されるカタログ
//! - Feature / ModelFeatureAssociation / MatchResult: 特徴照合の入出力
//! - AggregateResult: 製造年判定の最終出力
//!
//! すべて呼び出しごとに再計算される不変値で、独自のライフサイクルは持たない。

use serde::{Deserialize, Serialize};

/// シリアル形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerialFormat {
    Modern,
    Yairi,
    Legacy,
    NineDigit,
    Unknown,
}

impl std::fmt::Display for SerialFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerialFormat::Modern => write!(f, "modern"),
            SerialFormat::Yairi => write!(f, "yairi"),
            SerialFormat::Legacy => write!(f, "legacy"),
            SerialFormat::NineDigit => write!(f, "nine_digit"),
            SerialFormat::Unknown => write!(f, "unknown"),
        }
    }
}

/// 信頼度ティア
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceTier::High => write!(f, "high"),
            ConfidenceTier::Medium => write!(f, "medium"),
            ConfidenceTier::Low => write!(f, "low"),
        }
    }
}

/// シリアル分類結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub format: SerialFormat,
    pub estimated_year: Option<i32>,
    /// 1-12のみ。範囲外の月は notes に原文のまま残す
    pub estimated_month: Option<u32>,
    pub year_range_display: String,
    pub confidence_tier: ConfidenceTier,
    pub confidence_percent: u8,
    pub country_guess: String,
    pub notes: String,
    pub is_yairi: bool,
    pub needs_emperor_code: bool,
    pub prefix: Option<String>,
}

impl ParseResult {
    /// 年と月の両方が判明しているか
    pub fn has_specific_date(&self) -> bool {
        self.estimated_year.is_some() && self.estimated_month.is_some()
    }
}

/// 和暦の区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Era {
    Showa,
    Heisei,
    /// 2000年以降の西暦下2桁
    Modern,
}

/// ネックブロック刻印の解読結果
///
/// 曖昧なコードは `Ambiguous` として候補2つをそのまま返す。
/// どちらか一方を推測で選ぶことはしない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NeckBlockResult {
    Decoded {
        year: i32,
        era: Era,
        notes: String,
    },
    Ambiguous {
        #[serde(rename = "possibleYears")]
        possible_years: [i32; 2],
        notes: String,
    },
    Undecoded {
        notes: String,
    },
}

impl NeckBlockResult {
    /// 一意に確定した年（曖昧・解読不能なら None）
    pub fn year(&self) -> Option<i32> {
        match self {
            NeckBlockResult::Decoded { year, .. } => Some(*year),
            _ => None,
        }
    }

    /// 曖昧な場合の候補 [平成年, 2000年代]
    pub fn possible_years(&self) -> Option<[i32; 2]> {
        match self {
            NeckBlockResult::Ambiguous { possible_years, .. } => Some(*possible_years),
            _ => None,
        }
    }

    pub fn notes(&self) -> &str {
        match self {
            NeckBlockResult::Decoded { notes, .. }
            | NeckBlockResult::Ambiguous { notes, .. }
            | NeckBlockResult::Undecoded { notes } => notes,
        }
    }
}

/// モデル情報（外部カタログ、読み取り専用）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub country_of_origin: Option<String>,
    #[serde(default)]
    pub production_start: Option<i32>,
    #[serde(default)]
    pub production_end: Option<i32>,
}

/// シリアルプレフィックスのパターン（外部カタログ、読み取り専用）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRecord {
    pub id: i64,
    pub prefix: String,
    #[serde(default)]
    pub year_start: Option<i32>,
    #[serde(default)]
    pub year_end: Option<i32>,
    #[serde(default)]
    pub serial_range_start: Option<u64>,
    #[serde(default)]
    pub serial_range_end: Option<u64>,
    #[serde(default)]
    pub manufacture_country: Option<String>,
    /// 永続化層で結合済みのモデル
    #[serde(default)]
    pub model: Option<ModelRecord>,
    #[serde(default)]
    pub confidence_notes: Option<String>,
}

/// 承認済みギター（外部カタログ、読み取り専用）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedGuitarRecord {
    pub id: i64,
    pub serial_number: String,
    #[serde(default)]
    pub estimated_year: Option<i32>,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// 特徴（チューナー形状、ブリッジ材、ラベル色など）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: i64,
    /// 分類キー（例: "tuner_type"）
    pub category: String,
    pub name: String,
}

/// カテゴリごとに選択された特徴
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureObservation {
    pub category: String,
    pub feature_id: i64,
}

/// モデルと特徴の関連（外部カタログ、読み取り専用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelFeatureAssociation {
    pub model_id: i64,
    pub feature_id: i64,
    #[serde(default)]
    pub is_required: bool,
}

/// 特徴照合の結果（1モデル分）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub model_id: i64,
    pub matched_required: usize,
    pub total_required: usize,
    pub matched_optional: usize,
    pub matched_features: usize,
    pub total_features: usize,
    pub required_missing: usize,
    pub match_percentage: u8,
}

/// 判定に寄与した根拠
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceSource {
    /// シリアルから年月まで特定
    SerialDate,
    /// ネックブロック刻印で年を確定
    NeckBlock,
    /// プレフィックスパターンの年範囲
    PatternRange,
    /// シリアル分類の範囲・備考のみ
    SerialFallback,
    /// 一致パターン数による信頼度引き上げ
    PatternEscalation,
    /// 承認済みギターとシリアル完全一致
    ExactMatch,
}

/// 製造年判定の最終結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    #[serde(flatten)]
    pub parse: ParseResult,
    pub neck_block: Option<NeckBlockResult>,
    pub matched_models: Vec<ModelRecord>,
    pub similar_guitars: Vec<ApprovedGuitarRecord>,
    pub pattern_count: usize,
    pub exact_match: bool,
    pub sources: Vec<ConfidenceSource>,
}

//! Guitar ID Common Library
//!
//! ギターの製造年・モデル判定エンジン。
//! CLIと外部コラボレータ（UI層・永続化層）で共有される純粋関数と型。

pub mod types;
pub mod error;
pub mod serial;
pub mod neck_block;
pub mod lookup;
pub mod feature_match;
pub mod quiz;

pub use types::{
    AggregateResult, ApprovedGuitarRecord, ConfidenceSource, ConfidenceTier, Era, Feature,
    FeatureObservation, MatchResult, ModelFeatureAssociation, ModelRecord, NeckBlockResult,
    ParseResult, PatternRecord, SerialFormat,
};
pub use error::{Error, Result};
pub use serial::{classify, normalize_serial};
pub use neck_block::{narrow_by_production, resolve_neck_block};
pub use lookup::lookup;
pub use feature_match::match_features;
pub use quiz::{default_categories, summarize_answers, QuizCategory, QuizFlow, QuizState};

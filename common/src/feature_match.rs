//! 特徴照合モジュール
//!
//! 選択された特徴とモデル↔特徴の関連から候補モデルをランク付けする。
//!
//! ## 並び順
//! 1. 必須特徴の不足数（昇順）
//! 2. 一致した必須特徴数（降順）
//! 3. 一致した特徴の総数（降順）
//! 4. 一致率（降順）
//! 5. モデルID（昇順、完全な同点の決定用）
//!
//! 必須特徴をすべて満たすモデルは、一致数に関係なく不足のあるモデルより上位になる。

use crate::types::{FeatureObservation, MatchResult, ModelFeatureAssociation};
use std::collections::{BTreeMap, HashSet};
use tracing::trace;

/// 候補モデルをランク付けする
///
/// 一致が1つもないモデルは結果から除外する。
pub fn match_features(
    observations: &[FeatureObservation],
    associations: &[ModelFeatureAssociation],
) -> Vec<MatchResult> {
    let selected: HashSet<i64> = observations.iter().map(|o| o.feature_id).collect();

    let mut by_model: BTreeMap<i64, Vec<&ModelFeatureAssociation>> = BTreeMap::new();
    for assoc in associations {
        by_model.entry(assoc.model_id).or_default().push(assoc);
    }

    let mut results: Vec<MatchResult> = by_model
        .into_iter()
        .filter_map(|(model_id, assocs)| score_model(model_id, &assocs, &selected))
        .collect();

    results.sort_by(|a, b| {
        a.required_missing
            .cmp(&b.required_missing)
            .then_with(|| b.matched_required.cmp(&a.matched_required))
            .then_with(|| b.matched_features.cmp(&a.matched_features))
            .then_with(|| b.match_percentage.cmp(&a.match_percentage))
            .then_with(|| a.model_id.cmp(&b.model_id))
    });

    trace!(candidates = results.len(), "特徴照合完了");
    results
}

fn score_model(
    model_id: i64,
    assocs: &[&ModelFeatureAssociation],
    selected: &HashSet<i64>,
) -> Option<MatchResult> {
    let (required, optional): (Vec<&ModelFeatureAssociation>, Vec<&ModelFeatureAssociation>) =
        assocs.iter().copied().partition(|a| a.is_required);

    let matched_required = required.iter().filter(|a| selected.contains(&a.feature_id)).count();
    let matched_optional = optional.iter().filter(|a| selected.contains(&a.feature_id)).count();
    let matched_features = matched_required + matched_optional;
    let total_features = assocs.len();

    if matched_features == 0 || total_features == 0 {
        return None;
    }

    let match_percentage =
        ((100 * matched_features) as f64 / total_features as f64).round() as u8;

    Some(MatchResult {
        model_id,
        matched_required,
        total_required: required.len(),
        matched_optional,
        matched_features,
        total_features,
        required_missing: required.len() - matched_required,
        match_percentage,
    })
}

//! 特徴クイズ（フロー状態管理）モジュール
//!
//! カテゴリ順に特徴を1つずつ選択し、選択のたびに特徴照合を再計算する。
//! UI層が保持するのは回答マップとステップ位置のみで、描画とは独立している。
//!
//! ## 状態遷移
//! - 未回答 → 回答済み（`answer`）
//! - 回答済み → 次のカテゴリ（`advance`）→ … → 完了
//! - `back` は回答を保持したまま1つ戻る
//! - `reset` はすべての状態を破棄する

use crate::error::{Error, Result};
use crate::feature_match::match_features;
use crate::types::{Feature, FeatureObservation, MatchResult, ModelFeatureAssociation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// クイズのカテゴリ定義（外部設定、順序付き）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizCategory {
    /// 特徴の分類キー（`Feature::category` と一致）
    pub key: String,
    /// 表示ラベル
    pub label: String,
}

impl QuizCategory {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// 組み込みのカテゴリ順
///
/// 設定ファイルがない場合に使用する。
pub fn default_categories() -> Vec<QuizCategory> {
    vec![
        QuizCategory::new("label_color", "Label color"),
        QuizCategory::new("tuner_type", "Tuner type"),
        QuizCategory::new("headstock_shape", "Headstock shape"),
        QuizCategory::new("bridge_material", "Bridge material"),
        QuizCategory::new("fingerboard_material", "Fingerboard material"),
        QuizCategory::new("body_binding", "Body binding"),
        QuizCategory::new("rosette", "Rosette"),
        QuizCategory::new("pickguard", "Pickguard"),
        QuizCategory::new("top_wood", "Top wood"),
    ]
}

/// 現在の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    Unanswered,
    Answered,
    Complete,
}

/// クイズの進行状態
#[derive(Debug, Clone)]
pub struct QuizFlow {
    categories: Vec<QuizCategory>,
    step: usize,
    answers: BTreeMap<String, i64>,
}

impl QuizFlow {
    /// 関連データに実際に登場するカテゴリのみで構成する
    ///
    /// # Arguments
    /// * `config` - カテゴリの順序付きリスト
    /// * `features` - 特徴カタログ
    /// * `associations` - モデル↔特徴の関連
    pub fn new(
        config: &[QuizCategory],
        features: &[Feature],
        associations: &[ModelFeatureAssociation],
    ) -> Self {
        let referenced: HashSet<i64> = associations.iter().map(|a| a.feature_id).collect();
        let present: HashSet<&str> = features
            .iter()
            .filter(|f| referenced.contains(&f.id))
            .map(|f| f.category.as_str())
            .collect();

        let categories = config
            .iter()
            .filter(|c| present.contains(c.key.as_str()))
            .cloned()
            .collect();

        Self {
            categories,
            step: 0,
            answers: BTreeMap::new(),
        }
    }

    pub fn categories(&self) -> &[QuizCategory] {
        &self.categories
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// ステップ位置がカテゴリ数に達したら完了
    pub fn is_complete(&self) -> bool {
        self.step == self.categories.len()
    }

    pub fn state(&self) -> QuizState {
        match self.current_category() {
            None => QuizState::Complete,
            Some(c) if self.answers.contains_key(&c.key) => QuizState::Answered,
            Some(_) => QuizState::Unanswered,
        }
    }

    pub fn current_category(&self) -> Option<&QuizCategory> {
        self.categories.get(self.step)
    }

    /// 現在のカテゴリで選択できる特徴
    pub fn options<'a>(&self, features: &'a [Feature]) -> Vec<&'a Feature> {
        match self.current_category() {
            Some(c) => features.iter().filter(|f| f.category == c.key).collect(),
            None => Vec::new(),
        }
    }

    /// 現在のカテゴリの回答（選択済みの特徴ID）
    pub fn current_answer(&self) -> Option<i64> {
        self.current_category()
            .and_then(|c| self.answers.get(&c.key))
            .copied()
    }

    /// 現在のカテゴリに回答する（再回答は上書き）
    pub fn answer(&mut self, feature: &Feature) -> Result<()> {
        let category = self
            .current_category()
            .ok_or_else(|| Error::UnknownFeature(feature.name.clone()))?;
        if category.key != feature.category {
            return Err(Error::UnknownFeature(feature.name.clone()));
        }
        self.answers.insert(feature.category.clone(), feature.id);
        Ok(())
    }

    /// 次のカテゴリへ進む
    pub fn advance(&mut self) -> Result<QuizState> {
        match self.state() {
            QuizState::Complete => {}
            QuizState::Unanswered => {
                let key = self
                    .current_category()
                    .map(|c| c.key.clone())
                    .unwrap_or_default();
                return Err(Error::QuizUnanswered(key));
            }
            QuizState::Answered => self.step += 1,
        }
        Ok(self.state())
    }

    /// 1つ前のカテゴリへ戻る（回答は保持）
    pub fn back(&mut self) -> bool {
        if self.step == 0 {
            return false;
        }
        self.step -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.step = 0;
        self.answers.clear();
    }

    /// 回答をカテゴリ順の観測リストに変換
    pub fn observations(&self) -> Vec<FeatureObservation> {
        self.categories
            .iter()
            .filter_map(|c| {
                self.answers.get(&c.key).map(|&feature_id| FeatureObservation {
                    category: c.key.clone(),
                    feature_id,
                })
            })
            .collect()
    }

    /// 現在の回答で候補モデルを照合
    pub fn matches(&self, associations: &[ModelFeatureAssociation]) -> Vec<MatchResult> {
        match_features(&self.observations(), associations)
    }
}

/// 回答を投稿フォームの備考欄用テキストにまとめる
///
/// `"<ラベル>: <特徴名>"` をカテゴリ順に改行区切りで並べる。
pub fn summarize_answers(flow: &QuizFlow, features: &[Feature]) -> String {
    let names: BTreeMap<i64, &str> = features.iter().map(|f| (f.id, f.name.as_str())).collect();

    flow.categories
        .iter()
        .filter_map(|c| {
            let id = flow.answers.get(&c.key)?;
            let name = names.get(id)?;
            Some(format!("{}: {}", c.label, name))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

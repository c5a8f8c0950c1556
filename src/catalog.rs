//! カタログ読み込みモジュール
//!
//! 永続化層がエクスポートしたJSON配列をフォルダから読み込む。
//! ファイルがない場合は「外部根拠なし」として空リストで続行する。

use crate::error::{GuitarIdError, Result};
use guitar_id_common::{
    default_categories, ApprovedGuitarRecord, Feature, ModelFeatureAssociation, ModelRecord,
    PatternRecord, QuizCategory,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, warn};

pub const PATTERNS_FILE: &str = "patterns.json";
pub const APPROVED_GUITARS_FILE: &str = "approved_guitars.json";
pub const MODELS_FILE: &str = "models.json";
pub const FEATURES_FILE: &str = "features.json";
pub const MODEL_FEATURES_FILE: &str = "model_features.json";
pub const QUIZ_CATEGORIES_FILE: &str = "quiz_categories.json";

#[derive(Debug, Clone)]
pub struct Catalog {
    pub patterns: Vec<PatternRecord>,
    pub approved_guitars: Vec<ApprovedGuitarRecord>,
    pub models: Vec<ModelRecord>,
    pub features: Vec<Feature>,
    pub associations: Vec<ModelFeatureAssociation>,
    pub quiz_categories: Vec<QuizCategory>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            approved_guitars: Vec::new(),
            models: Vec::new(),
            features: Vec::new(),
            associations: Vec::new(),
            quiz_categories: default_categories(),
        }
    }
}

impl Catalog {
    /// フォルダからカタログを読み込み
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(GuitarIdError::CatalogNotFound(dir.display().to_string()));
        }

        let quiz_categories: Vec<QuizCategory> = load_list(dir, QUIZ_CATEGORIES_FILE)?;
        let catalog = Self {
            patterns: load_list(dir, PATTERNS_FILE)?,
            approved_guitars: load_list(dir, APPROVED_GUITARS_FILE)?,
            models: load_list(dir, MODELS_FILE)?,
            features: load_list(dir, FEATURES_FILE)?,
            associations: load_list(dir, MODEL_FEATURES_FILE)?,
            quiz_categories: if quiz_categories.is_empty() {
                default_categories()
            } else {
                quiz_categories
            },
        };

        debug!(
            patterns = catalog.patterns.len(),
            approved = catalog.approved_guitars.len(),
            models = catalog.models.len(),
            features = catalog.features.len(),
            associations = catalog.associations.len(),
            "カタログ読み込み完了"
        );
        Ok(catalog)
    }

    /// 設定されたフォルダから読み込み（未設定なら空カタログ）
    pub fn load_optional(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::load(dir),
            None => {
                warn!("カタログフォルダが未設定のため、外部データなしで判定します");
                Ok(Self::default())
            }
        }
    }

    pub fn model(&self, id: i64) -> Option<&ModelRecord> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn feature(&self, id: i64) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }
}

fn load_list<T: DeserializeOwned>(dir: &Path, file_name: &str) -> Result<Vec<T>> {
    let path = dir.join(file_name);
    if !path.exists() {
        warn!(file = file_name, "カタログファイルがありません（空として扱います）");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(&path)?;
    serde_json::from_str(&content)
        .map_err(|e| GuitarIdError::InvalidCatalog(format!("{}: {}", file_name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_has_quiz_categories() {
        let catalog = Catalog::default();
        assert!(catalog.patterns.is_empty());
        assert!(!catalog.quiz_categories.is_empty());
        assert_eq!(catalog.quiz_categories, default_categories());
    }

    #[test]
    fn test_load_missing_dir() {
        let result = Catalog::load(Path::new("/nonexistent/catalog/12345"));
        assert!(matches!(result, Err(GuitarIdError::CatalogNotFound(_))));
    }

    #[test]
    fn test_load_optional_none() {
        let catalog = Catalog::load_optional(None).unwrap();
        assert!(catalog.associations.is_empty());
    }
}

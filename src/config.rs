use crate::error::{GuitarIdError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// カタログフォルダを上書きする環境変数
pub const CATALOG_DIR_ENV: &str = "GUITAR_ID_CATALOG_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog_dir: Option<PathBuf>,
    pub default_output: OutputFormat,
    /// 0 = rayonの既定スレッド数
    pub batch_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_dir: None,
            default_output: OutputFormat::Text,
            batch_threads: 0,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| GuitarIdError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("guitar-id").join("config.json"))
    }

    /// カタログフォルダを取得（環境変数を優先）
    pub fn catalog_dir(&self) -> Option<PathBuf> {
        Self::resolve_catalog_dir(std::env::var(CATALOG_DIR_ENV).ok(), self.catalog_dir.clone())
    }

    fn resolve_catalog_dir(env: Option<String>, configured: Option<PathBuf>) -> Option<PathBuf> {
        env.filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or(configured)
    }

    pub fn set_catalog_dir(&mut self, dir: PathBuf) -> Result<()> {
        if !dir.is_dir() {
            return Err(GuitarIdError::CatalogNotFound(dir.display().to_string()));
        }
        self.catalog_dir = Some(dir);
        self.save()
    }
}

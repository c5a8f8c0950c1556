use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuitarIdError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("カタログフォルダが見つかりません: {0}。`guitar-id config --set-catalog-dir DIR` で設定してください")]
    CatalogNotFound(String),

    #[error("カタログファイルが不正: {0}")]
    InvalidCatalog(String),

    #[error("入力ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("対話入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] guitar_id_common::Error),
}

pub type Result<T> = std::result::Result<T, GuitarIdError>;

//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// 上流の解析結果にカテゴリ/ステータスが欠けている
    #[error("Malformed upstream payload: {0}")]
    MalformedPayload(String),

    /// カタログにキーに対応するアセットが無い
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Invalid composite key: {0}")]
    InvalidKey(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

use crate::analyzer::AnalyzerBackend;
use crate::error::{AssessError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const ANALYZER_URL_ENV: &str = "CAR_ASSESS_ANALYZER_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 上流の解析サービス（`<url>/upload` にPOSTする）
    pub analyzer_url: Option<String>,
    /// 検出スクリプトの実行コマンド
    pub detector_command: String,
    /// 検出スクリプトの引数（画像パスは末尾に追加される）
    pub detector_args: Vec<String>,
    /// 既定の解析バックエンド
    pub backend: AnalyzerBackend,
    /// glbを置いたディレクトリ
    pub asset_dir: PathBuf,
    pub timeout_seconds: u64,
    /// 損傷のない検出部位も結果に含める
    pub include_detected_parts: bool,
    pub listen_addr: String,
    /// HTTPサービスへのクロスオリジン呼び出しを許可するオリジン
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analyzer_url: None,
            detector_command: "python3".into(),
            detector_args: vec!["detect.py".into()],
            backend: AnalyzerBackend::Detector,
            asset_dir: PathBuf::from("assets"),
            timeout_seconds: 120,
            include_detected_parts: false,
            listen_addr: "127.0.0.1:8080".into(),
            cors_allowed_origins: vec!["http://localhost:3000".into()],
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
            .ok_or_else(|| AssessError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("car-assess").join("config.json"))
    }

    pub fn get_analyzer_url(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(url) = std::env::var(ANALYZER_URL_ENV) {
            if !url.trim().is_empty() {
                return Ok(url.trim_end_matches('/').to_string());
            }
        }

        self.analyzer_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or(AssessError::MissingAnalyzerUrl)
    }

    pub fn set_analyzer_url(&mut self, url: String) -> Result<()> {
        self.analyzer_url = Some(url);
        self.save()
    }

    pub fn set_asset_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.asset_dir = dir;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.detector_command, "python3");
        assert_eq!(config.asset_dir, PathBuf::from("assets"));
        assert_eq!(config.timeout_seconds, 120);
        assert!(!config.include_detected_parts);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"analyzer_url": "http://localhost:9000/", "backend": "http"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.backend, AnalyzerBackend::Http);
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.analyzer_url.as_deref(), Some("http://localhost:9000/"));
    }
}

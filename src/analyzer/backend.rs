use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 解析バックエンド
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerBackend {
    /// ローカルの検出スクリプトを実行
    Detector,
    /// 上流の解析サービスにHTTPで問い合わせ
    Http,
}

impl AnalyzerBackend {
    pub fn name(&self) -> &'static str {
        match self {
            AnalyzerBackend::Detector => "detector",
            AnalyzerBackend::Http => "http",
        }
    }
}

impl std::fmt::Display for AnalyzerBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

//! 上流解析サービス連携
//!
//! 画像を multipart の `image` フィールドで `<analyzer_url>/upload` に送り、
//! JSON ペイロード（bumpers/doors/body/status）を受け取る。

use crate::config::Config;
use crate::error::{AssessError, Result};
use car_assess_common::{parse_payload, AnalysisPayload};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::time::Duration;

/// 1枚の画像を解析
pub async fn analyze(image: &Path, config: &Config) -> Result<AnalysisPayload> {
    let url = format!("{}/upload", config.get_analyzer_url()?);
    let bytes = tokio::fs::read(image).await?;
    let file_name = image
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image.jpg".to_string());

    analyze_bytes(&url, bytes, file_name, config.timeout_seconds).await
}

/// 画像バイト列を送信して解析
pub async fn analyze_bytes(
    url: &str,
    bytes: Vec<u8>,
    file_name: String,
    timeout_seconds: u64,
) -> Result<AnalysisPayload> {
    let mime = mime_for(&file_name);
    let part = Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime)
        .map_err(|e| AssessError::ApiCall(e.to_string()))?;
    let form = Form::new().part("image", part);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| AssessError::ApiCall(e.to_string()))?;

    tracing::debug!(url = %url, "posting image to analyzer");

    let response = client
        .post(url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| AssessError::ApiCall(format!("{}: {}", url, e)))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AssessError::ApiCall(e.to_string()))?;

    if !status.is_success() {
        return Err(AssessError::ApiCall(format!(
            "analyzer failed with status {}: {}",
            status, text
        )));
    }

    tracing::debug!(len = text.len(), "analyzer response received");

    Ok(parse_payload(&text)?)
}

fn mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for("car.PNG"), "image/png");
        assert_eq!(mime_for("car.jpg"), "image/jpeg");
        assert_eq!(mime_for("car"), "image/jpeg");
    }

    #[tokio::test]
    async fn test_missing_analyzer_url() {
        let config = Config::default();
        if std::env::var("CAR_ASSESS_ANALYZER_URL").is_ok() {
            return;
        }
        let result = analyze(Path::new("car.jpg"), &config).await;
        assert!(matches!(result, Err(AssessError::MissingAnalyzerUrl)));
    }
}

//! 検出スクリプト連携モジュール
//!
//! 部位検出・損傷検出・汚れ判定を行うローカルのスクリプトを画像ごとに起動し、
//! 標準出力を共通パーサーで上流ペイロードに変換する。

use crate::config::Config;
use crate::error::{AssessError, Result};
use car_assess_common::parser::DAMAGE_SECTION_MARKER;
use car_assess_common::{parse_detector_output, AnalysisPayload};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// 1枚の画像を解析
pub async fn analyze(image: &Path, config: &Config) -> Result<AnalysisPayload> {
    let output = run_detector(image, config).await?;
    parse_output(&output, config.include_detected_parts)
}

fn parse_output(output: &str, include_detected_parts: bool) -> Result<AnalysisPayload> {
    if !output.contains(DAMAGE_SECTION_MARKER) {
        let preview: String = output.chars().take(500).collect();
        return Err(AssessError::ApiParse(format!(
            "検出器の出力に損傷一覧がありません: {}",
            preview
        )));
    }

    let report = parse_detector_output(output);
    tracing::debug!(
        parts = ?report.parts,
        issues = ?report.issues(),
        status = %report.status,
        "detector output parsed"
    );

    Ok(report.categorize(include_detected_parts))
}

async fn run_detector(image: &Path, config: &Config) -> Result<String> {
    tracing::debug!(
        command = %config.detector_command,
        args = ?config.detector_args,
        image = %image.display(),
        "running detector"
    );

    let mut command = Command::new(&config.detector_command);
    command.args(&config.detector_args).arg(image).kill_on_drop(true);

    let output = tokio::time::timeout(Duration::from_secs(config.timeout_seconds), command.output())
        .await
        .map_err(|_| {
            AssessError::CliExecution(format!("タイムアウト ({}秒)", config.timeout_seconds))
        })?
        .map_err(|e| AssessError::CliExecution(format!("{}: {}", config.detector_command, e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AssessError::CliExecution(format!(
            "detector failed (code {:?})\nStderr: {}\nStdout: {}",
            output.status.code(),
            stderr,
            stdout
        )));
    }

    Ok(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use car_assess_common::StatusKind;

    const OUTPUT: &str = "\
0: 512x512 1 back_left_door, 1 hood, 40.1ms
🔧 Повреждённые детали:
  back_left_door (dent)
🧹 Состояние грязи/чисто:
  Чисто
";

    #[test]
    fn test_parse_output() {
        let payload = parse_output(OUTPUT, false).unwrap();
        assert_eq!(payload.defects.doors, vec!["back_left_door (dent)"]);
        assert!(payload.defects.body.is_empty());
        assert_eq!(payload.status, StatusKind::Clean);
    }

    #[test]
    fn test_parse_output_with_detected_parts() {
        let payload = parse_output(OUTPUT, true).unwrap();
        assert_eq!(payload.defects.body, vec!["hood"]);
    }

    #[test]
    fn test_parse_output_without_sections() {
        let result = parse_output("Traceback (most recent call last):", false);
        assert!(matches!(result, Err(AssessError::ApiParse(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_detector_missing_command() {
        let config = Config {
            detector_command: "car-assess-no-such-detector".into(),
            detector_args: vec![],
            ..Config::default()
        };
        let result = run_detector(Path::new("car.jpg"), &config).await;
        assert!(matches!(result, Err(AssessError::CliExecution(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_detector_nonzero_exit() {
        let config = Config {
            detector_command: "sh".into(),
            detector_args: vec!["-c".into(), "echo boom >&2; exit 3".into()],
            ..Config::default()
        };
        let result = run_detector(Path::new("car.jpg"), &config).await;
        match result {
            Err(AssessError::CliExecution(msg)) => assert!(msg.contains("boom")),
            other => panic!("Expected CliExecution, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_analyze_with_script() {
        let script = format!("printf '{}'", OUTPUT.replace('\n', "\\n"));
        let config = Config {
            detector_command: "sh".into(),
            detector_args: vec!["-c".into(), script],
            ..Config::default()
        };
        let payload = analyze(Path::new("car.jpg"), &config).await.unwrap();
        assert_eq!(payload.defects.doors, vec!["back_left_door (dent)"]);
    }
}

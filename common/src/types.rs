//! 解析結果の型定義
//!
//! CLIとHTTPサービスで共有される型:
//! - StatusKind: 車両状態
//! - CategorizedDefects: バンパー/ドア/車体の3カテゴリに分けた損傷
//! - AnalysisPayload: 上流の解析サービスが返すペイロード

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 車両状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum StatusKind {
    Clean,
    Dirty,
    Damaged,
    /// 未判定・不明
    #[default]
    Pending,
}

impl StatusKind {
    /// 上流の状態文字列を解釈する
    ///
    /// 検出器はロシア語で状態を出力するため両方を受け付ける。
    /// 解釈できない値は Pending。
    pub fn from_reported(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "clean" | "чисто" => StatusKind::Clean,
            "dirty" | "грязно" => StatusKind::Dirty,
            "damaged" | "повреждено" => StatusKind::Damaged,
            _ => StatusKind::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Clean => "clean",
            StatusKind::Dirty => "dirty",
            StatusKind::Damaged => "damaged",
            StatusKind::Pending => "pending",
        }
    }

    /// 状態の説明
    pub fn summary(&self) -> &'static str {
        match self {
            StatusKind::Clean => "Good condition",
            StatusKind::Dirty => "Needs washing",
            StatusKind::Damaged => "Needs repair",
            StatusKind::Pending => "Pending",
        }
    }
}

impl From<String> for StatusKind {
    fn from(value: String) -> Self {
        Self::from_reported(&value)
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// カテゴリ別の損傷
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedDefects<T> {
    pub bumpers: Vec<T>,
    pub doors: Vec<T>,
    pub body: Vec<T>,
}

impl<T> CategorizedDefects<T> {
    /// 全カテゴリを bumpers → doors → body の順で走査
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.bumpers.iter().chain(self.doors.iter()).chain(self.body.iter())
    }

    pub fn len(&self) -> usize {
        self.bumpers.len() + self.doors.len() + self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 各要素を変換（カテゴリ構造は保つ）
    pub fn map<U, F>(&self, mut f: F) -> CategorizedDefects<U>
    where
        F: FnMut(&T) -> U,
    {
        CategorizedDefects {
            bumpers: self.bumpers.iter().map(&mut f).collect(),
            doors: self.doors.iter().map(&mut f).collect(),
            body: self.body.iter().map(&mut f).collect(),
        }
    }
}

/// 上流の解析サービスのペイロード
///
/// 3カテゴリとステータスはすべて必須。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    #[serde(flatten)]
    pub defects: CategorizedDefects<String>,
    pub status: StatusKind,
}

/// 上流ペイロードをパース
///
/// カテゴリやステータスの欠落は `Error::MalformedPayload`。
pub fn parse_payload(json: &str) -> Result<AnalysisPayload> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| Error::MalformedPayload(format!("not JSON: {}", e)))?;

    // 空のステータス文字列も欠落扱い
    match value.get("status") {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {}
        _ => return Err(Error::MalformedPayload("missing field `status`".into())),
    }

    serde_json::from_value(value).map_err(|e| Error::MalformedPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_reported() {
        assert_eq!(StatusKind::from_reported("clean"), StatusKind::Clean);
        assert_eq!(StatusKind::from_reported("Чисто"), StatusKind::Clean);
        assert_eq!(StatusKind::from_reported("  Грязно "), StatusKind::Dirty);
        assert_eq!(StatusKind::from_reported("Повреждено"), StatusKind::Damaged);
        assert_eq!(StatusKind::from_reported("Не обнаружено"), StatusKind::Pending);
        assert_eq!(StatusKind::from_reported(""), StatusKind::Pending);
    }

    #[test]
    fn test_status_serialize() {
        assert_eq!(serde_json::to_string(&StatusKind::Damaged).unwrap(), "\"damaged\"");
        assert_eq!(serde_json::to_string(&StatusKind::Pending).unwrap(), "\"pending\"");
    }

    #[test]
    fn test_status_deserialize_tolerant() {
        let status: StatusKind = serde_json::from_str("\"Грязно\"").unwrap();
        assert_eq!(status, StatusKind::Dirty);
        let status: StatusKind = serde_json::from_str("\"sparkling\"").unwrap();
        assert_eq!(status, StatusKind::Pending);
    }

    #[test]
    fn test_parse_payload() {
        let json = r#"{
            "bumpers": ["front_bumper (scratch)"],
            "doors": ["front_right_door (dent)"],
            "body": [],
            "status": "Чисто"
        }"#;

        let payload = parse_payload(json).unwrap();
        assert_eq!(payload.defects.bumpers, vec!["front_bumper (scratch)"]);
        assert_eq!(payload.defects.doors, vec!["front_right_door (dent)"]);
        assert!(payload.defects.body.is_empty());
        assert_eq!(payload.status, StatusKind::Clean);
    }

    #[test]
    fn test_parse_payload_missing_category() {
        let json = r#"{"bumpers": [], "body": [], "status": "clean"}"#;
        let result = parse_payload(json);
        match result {
            Err(Error::MalformedPayload(msg)) => assert!(msg.contains("doors")),
            other => panic!("Expected MalformedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_payload_missing_status() {
        let json = r#"{"bumpers": [], "doors": [], "body": []}"#;
        assert!(matches!(parse_payload(json), Err(Error::MalformedPayload(_))));

        let json = r#"{"bumpers": [], "doors": [], "body": [], "status": ""}"#;
        assert!(matches!(parse_payload(json), Err(Error::MalformedPayload(_))));
    }

    #[test]
    fn test_parse_payload_not_json() {
        assert!(matches!(parse_payload("<html>"), Err(Error::MalformedPayload(_))));
    }

    #[test]
    fn test_categorized_iter_order() {
        let defects = CategorizedDefects {
            bumpers: vec!["b"],
            doors: vec!["d1", "d2"],
            body: vec!["h"],
        };
        let all: Vec<_> = defects.iter().copied().collect();
        assert_eq!(all, vec!["b", "d1", "d2", "h"]);
        assert_eq!(defects.len(), 4);
        assert!(!defects.is_empty());
    }
}

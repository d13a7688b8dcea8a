use car_assess_common::AssessmentResult;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// 1枚の写真の判定記録
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub file_name: String,

    /// 画像ファイルのパス
    #[serde(default)]
    pub file_path: String,

    /// 撮影日時（EXIF DateTimeOriginal）
    #[serde(default)]
    pub date: String,

    pub analyzed_at: DateTime<Local>,

    pub result: AssessmentResult,

    /// 表示する3Dモデルのファイル名（`<key>.glb`）
    pub asset: String,
}

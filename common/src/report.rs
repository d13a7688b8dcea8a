//! 判定結果の組み立て
//!
//! カテゴリ別の損傷文字列と上流のステータスから、表示用の判定結果を作る。

use crate::defect::{parse_defect, ParsedDefect};
use crate::key::{resolve_key, CompositeKey};
use crate::types::{AnalysisPayload, CategorizedDefects, StatusKind};
use serde::{Deserialize, Serialize};

pub const NO_DAMAGE_DESCRIPTION: &str = "The vehicle is in excellent condition, no damage found.";
pub const SINGLE_DAMAGE_DESCRIPTION: &str = "The vehicle has one damage that requires repair.";
pub const MULTIPLE_DAMAGE_DESCRIPTION: &str = "The vehicle has multiple damages that require repair.";

/// 判定結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub categorized_defects: CategorizedDefects<ParsedDefect>,
    pub status: StatusKind,
    pub description: String,
    pub composite_key: CompositeKey,
}

impl AssessmentResult {
    /// 全カテゴリの損傷
    pub fn defects(&self) -> impl Iterator<Item = &ParsedDefect> {
        self.categorized_defects.iter()
    }

    pub fn defect_count(&self) -> usize {
        self.categorized_defects.len()
    }
}

/// 判定結果を組み立てる
///
/// 損傷が1件でもあれば上流のステータスに関係なく `Damaged`。
pub fn assemble(categorized: &CategorizedDefects<String>, reported_status: StatusKind) -> AssessmentResult {
    let parsed = categorized.map(|raw| parse_defect(raw));
    let flattened: Vec<ParsedDefect> = parsed.iter().cloned().collect();
    let composite_key = resolve_key(&flattened);

    let count = flattened.len();
    let status = if count == 0 { reported_status } else { StatusKind::Damaged };

    AssessmentResult {
        categorized_defects: parsed,
        status,
        description: describe(count).to_string(),
        composite_key,
    }
}

/// 上流ペイロードからそのまま組み立てる
pub fn assemble_payload(payload: &AnalysisPayload) -> AssessmentResult {
    assemble(&payload.defects, payload.status)
}

fn describe(count: usize) -> &'static str {
    match count {
        0 => NO_DAMAGE_DESCRIPTION,
        1 => SINGLE_DAMAGE_DESCRIPTION,
        _ => MULTIPLE_DAMAGE_DESCRIPTION,
    }
}

//! 検出器出力パーサー
//!
//! ローカルの検出スクリプトの標準出力から、検出部位・損傷一覧・汚れ状態を
//! 取り出し、上流ペイロード（3カテゴリ + ステータス）に変換する。
//!
//! 出力例:
//! ```text
//! 0: 384x640 1 front_bumper, 1 hood, 45.3ms
//! 🔧 Повреждённые детали:
//!   front_bumper (scratch)
//! 🧹 Состояние грязи/чисто:
//!   Грязно
//! ```

use crate::taxonomy::{DefectCategory, PartName};
use crate::types::{AnalysisPayload, CategorizedDefects, StatusKind};
use regex::Regex;

/// 損傷一覧の見出し
pub const DAMAGE_SECTION_MARKER: &str = "🔧 Повреждённые детали:";
/// 汚れ状態の見出し
pub const STATUS_SECTION_MARKER: &str = "🧹 Состояние грязи/чисто:";

/// 検出器の出力
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectorReport {
    /// 検出された部位名（出現順・重複なし）
    pub parts: Vec<String>,
    /// 損傷一覧の行（`"<part> (<damage>)"` など）
    pub summary: Vec<String>,
    /// 汚れ状態の生文字列
    pub status: String,
}

/// 検出器の標準出力をパース
///
/// 認識できない行は読み飛ばす。
pub fn parse_detector_output(output: &str) -> DetectorReport {
    let mut report = DetectorReport::default();
    let lines: Vec<&str> = output.lines().map(str::trim).collect();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if line.starts_with(DAMAGE_SECTION_MARKER) {
            i += 1;
            while i < lines.len() && !lines[i].starts_with('🧹') {
                if !lines[i].is_empty() {
                    report.summary.push(lines[i].to_string());
                }
                i += 1;
            }
            continue;
        }

        if line.starts_with(STATUS_SECTION_MARKER) {
            if let Some(next) = lines.get(i + 1) {
                report.status = next.to_string();
            }
            i += 2;
            continue;
        }

        for part in detection_names(line) {
            if !report.parts.contains(&part) {
                report.parts.push(part);
            }
        }
        i += 1;
    }

    report
}

/// 検出行（`0: 384x640 1 hood, 2 doors, 45.3ms`）から名前を取り出す
fn detection_names(line: &str) -> Vec<String> {
    lazy_static::lazy_static! {
        static ref DETECTION_LINE: Regex =
            Regex::new(r"^\d+:\s+\d+x\d+\s+(.*?),?\s*[\d.]+ms").unwrap();
        static ref DETECTION_ITEM: Regex = Regex::new(r"(\d+)\s+([A-Za-z_]+)").unwrap();
    }

    let Some(caps) = DETECTION_LINE.captures(line) else {
        return Vec::new();
    };

    DETECTION_ITEM
        .captures_iter(&caps[1])
        .map(|item| singular_name(&item[2]))
        .collect()
}

/// 複数検出時の複数形（`hoods`）を部位名に戻す
fn singular_name(name: &str) -> String {
    if PartName::from_token(name).is_none() {
        if let Some(stem) = name.strip_suffix('s') {
            if PartName::from_token(stem).is_some() {
                return stem.to_string();
            }
        }
    }
    name.to_string()
}

impl DetectorReport {
    /// 損傷の種類（重複なし、出現順）
    pub fn issues(&self) -> Vec<String> {
        let mut issues: Vec<String> = Vec::new();
        for entry in &self.summary {
            if let Some((_, rest)) = entry.split_once(" (") {
                let issue = rest.strip_suffix(')').unwrap_or(rest).trim().to_string();
                if !issue.is_empty() && !issues.contains(&issue) {
                    issues.push(issue);
                }
            }
        }
        issues
    }

    /// 3カテゴリに振り分けて上流ペイロードにする
    ///
    /// - 損傷行はタクソノミー上の部位のみ採用（重複排除）
    /// - `include_detected_parts` が真なら、損傷のない検出部位も部位名のみで追加
    pub fn categorize(&self, include_detected_parts: bool) -> AnalysisPayload {
        let mut defects = CategorizedDefects::default();
        let mut damaged: Vec<&str> = Vec::new();

        for entry in &self.summary {
            let Some((part, _)) = entry.split_once(" (") else {
                continue;
            };
            damaged.push(part);
            if let Some(known) = PartName::from_token(part) {
                push_unique(&mut defects, known.category(), entry);
            }
        }

        if include_detected_parts {
            for part in &self.parts {
                if damaged.contains(&part.as_str()) {
                    continue;
                }
                if let Some(known) = PartName::from_token(part) {
                    push_unique(&mut defects, known.category(), part);
                }
            }
        }

        AnalysisPayload {
            defects,
            status: StatusKind::from_reported(&self.status),
        }
    }
}

fn push_unique(defects: &mut CategorizedDefects<String>, category: DefectCategory, entry: &str) {
    let list = match category {
        DefectCategory::Bumpers => &mut defects.bumpers,
        DefectCategory::Doors => &mut defects.doors,
        DefectCategory::Body => &mut defects.body,
    };
    if !list.iter().any(|e| e == entry) {
        list.push(entry.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
0: 384x640 1 front_bumper, 2 hoods, 1 front_right_door, 45.3ms
Speed: 1.2ms preprocess, 45.3ms inference, 0.8ms postprocess per image at shape (1, 3, 384, 640)
0: 384x640 1 scratch, 1 dent, 38.1ms
🔧 Повреждённые детали:
  front_bumper (scratch)
  front_right_door (dent)
  front_bumper (scratch)
  spoiler (crack)
🧹 Состояние грязи/чисто:
  Грязно
✅ Результат сохранён: runs/predict_combined/car.jpg
";

    #[test]
    fn test_parse_detected_parts() {
        let report = parse_detector_output(SAMPLE);
        assert_eq!(
            report.parts,
            vec!["front_bumper", "hood", "front_right_door", "scratch", "dent"]
        );
    }

    #[test]
    fn test_parse_summary_and_status() {
        let report = parse_detector_output(SAMPLE);
        assert_eq!(report.summary.len(), 4);
        assert_eq!(report.summary[0], "front_bumper (scratch)");
        assert_eq!(report.status, "Грязно");
    }

    #[test]
    fn test_issues_unique() {
        let report = parse_detector_output(SAMPLE);
        assert_eq!(report.issues(), vec!["scratch", "dent", "crack"]);
    }

    #[test]
    fn test_categorize_damaged_only() {
        let payload = parse_detector_output(SAMPLE).categorize(false);
        assert_eq!(payload.defects.bumpers, vec!["front_bumper (scratch)"]);
        assert_eq!(payload.defects.doors, vec!["front_right_door (dent)"]);
        assert!(payload.defects.body.is_empty());
        assert_eq!(payload.status, StatusKind::Dirty);
    }

    #[test]
    fn test_categorize_with_detected_parts() {
        let payload = parse_detector_output(SAMPLE).categorize(true);
        assert_eq!(payload.defects.body, vec!["hood"]);
        // 損傷ありの部位は部位名のみでは追加しない
        assert_eq!(payload.defects.bumpers, vec!["front_bumper (scratch)"]);
    }

    #[test]
    fn test_no_damage_output() {
        let output = "\
0: 384x640 (no detections), 40.0ms
🔧 Повреждённые детали:
  Не обнаружено
🧹 Состояние грязи/чисто:
  Чисто
";
        let report = parse_detector_output(output);
        assert!(report.parts.is_empty());
        assert_eq!(report.summary, vec!["Не обнаружено"]);
        assert!(report.issues().is_empty());

        let payload = report.categorize(true);
        assert!(payload.defects.is_empty());
        assert_eq!(payload.status, StatusKind::Clean);
    }

    #[test]
    fn test_empty_output() {
        let report = parse_detector_output("");
        assert_eq!(report, DetectorReport::default());
        assert_eq!(report.categorize(false).status, StatusKind::Pending);
    }
}

//! 損傷文字列パーサー
//!
//! 検出器が返す `"<part> (<damage>)"` 形式の文字列を構造化する。
//! 未知の部位名・損傷名はエラーにせず、そのまま表示に使う。

use crate::taxonomy::PartName;
use serde::{Deserialize, Serialize};

/// 損傷の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    Dent,
    Scratch,
    Crack,
    /// 未知のトークン（原文は `raw_damage_token` に残る）
    Unknown,
}

impl DefectKind {
    pub fn from_token(token: &str) -> Self {
        match token {
            "dent" => DefectKind::Dent,
            "scratch" => DefectKind::Scratch,
            "crack" => DefectKind::Crack,
            _ => DefectKind::Unknown,
        }
    }

    /// 表示名（Unknownは None、呼び出し側で原文を使う）
    pub fn display_label(&self) -> Option<&'static str> {
        match self {
            DefectKind::Dent => Some("dent"),
            DefectKind::Scratch => Some("scratch"),
            DefectKind::Crack => Some("crack"),
            DefectKind::Unknown => None,
        }
    }
}

/// 構造化された損傷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDefect {
    /// 部位トークン（未知のものもそのまま）
    pub part: String,
    /// 損傷の種類（損傷トークンが無ければ None）
    pub damage: Option<DefectKind>,
    pub raw_damage_token: String,
    pub display_label: String,
}

impl ParsedDefect {
    /// タクソノミー上の部位
    pub fn known_part(&self) -> Option<PartName> {
        PartName::from_token(&self.part)
    }
}

/// 損傷文字列をパース
///
/// 失敗しない。`" ("` が無ければ部位のみの結果を返す。
///
/// # Examples
/// ```
/// use car_assess_common::parse_defect;
///
/// let defect = parse_defect("front_bumper (scratch)");
/// assert_eq!(defect.display_label, "Front bumper: scratch");
///
/// let unknown = parse_defect("spoiler (scratch)");
/// assert_eq!(unknown.display_label, "spoiler: scratch");
/// ```
pub fn parse_defect(raw: &str) -> ParsedDefect {
    let (part_token, damage_token) = match raw.split_once(" (") {
        Some((part, rest)) => {
            let rest = rest.trim();
            let damage = rest.strip_suffix(')').unwrap_or(rest);
            (part.trim(), damage.trim())
        }
        None => (raw.trim(), ""),
    };

    let part_label = PartName::from_token(part_token)
        .map(|p| p.display_label())
        .unwrap_or(part_token);

    if damage_token.is_empty() {
        return ParsedDefect {
            part: part_token.to_string(),
            damage: None,
            raw_damage_token: String::new(),
            display_label: part_label.to_string(),
        };
    }

    let kind = DefectKind::from_token(damage_token);
    let damage_label = kind.display_label().unwrap_or(damage_token);

    ParsedDefect {
        part: part_token.to_string(),
        damage: Some(kind),
        raw_damage_token: damage_token.to_string(),
        display_label: format!("{}: {}", part_label, damage_label),
    }
}

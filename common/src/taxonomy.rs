//! 部位タクソノミー
//!
//! 検出器が返す部位名を、3Dモデルの領域ID（1桁の整数）へ対応付ける。
//! 複数の部位が同じ領域に集約される（ボンネット・前後ガラス → 車体）。

use serde::{Deserialize, Serialize};

/// 検出器が認識する部位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartName {
    FrontLeftDoor,
    BackLeftDoor,
    FrontRightDoor,
    BackRightDoor,
    Hood,
    FrontGlass,
    BackGlass,
    FrontBumper,
    BackBumper,
}

/// 3Dモデルの領域ID
///
/// 判別値がそのまま合成キーの1桁になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum RegionId {
    FrontLeftDoor = 1,
    BackLeftDoor = 2,
    FrontRightDoor = 3,
    BackRightDoor = 4,
    Body = 5,
    Bumper = 6,
}

/// 結果表示上のカテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectCategory {
    Bumpers,
    Doors,
    Body,
}

/// 部位 → (トークン, 領域, カテゴリ, 表示名)
const TAXONOMY: &[(PartName, &str, RegionId, DefectCategory, &str)] = &[
    (PartName::FrontLeftDoor, "front_left_door", RegionId::FrontLeftDoor, DefectCategory::Doors, "Front left door"),
    (PartName::BackLeftDoor, "back_left_door", RegionId::BackLeftDoor, DefectCategory::Doors, "Back left door"),
    (PartName::FrontRightDoor, "front_right_door", RegionId::FrontRightDoor, DefectCategory::Doors, "Front right door"),
    (PartName::BackRightDoor, "back_right_door", RegionId::BackRightDoor, DefectCategory::Doors, "Back right door"),
    (PartName::Hood, "hood", RegionId::Body, DefectCategory::Body, "Hood"),
    (PartName::FrontGlass, "front_glass", RegionId::Body, DefectCategory::Body, "Front glass"),
    (PartName::BackGlass, "back_glass", RegionId::Body, DefectCategory::Body, "Back glass"),
    (PartName::FrontBumper, "front_bumper", RegionId::Bumper, DefectCategory::Bumpers, "Front bumper"),
    (PartName::BackBumper, "back_bumper", RegionId::Bumper, DefectCategory::Bumpers, "Back bumper"),
];

impl PartName {
    /// 全部位
    pub const ALL: [PartName; 9] = [
        PartName::FrontLeftDoor,
        PartName::BackLeftDoor,
        PartName::FrontRightDoor,
        PartName::BackRightDoor,
        PartName::Hood,
        PartName::FrontGlass,
        PartName::BackGlass,
        PartName::FrontBumper,
        PartName::BackBumper,
    ];

    /// 検出器のトークンから部位を引く（未知のトークンは None）
    pub fn from_token(token: &str) -> Option<Self> {
        TAXONOMY
            .iter()
            .find(|(_, t, ..)| *t == token)
            .map(|(part, ..)| *part)
    }

    fn entry(&self) -> &'static (PartName, &'static str, RegionId, DefectCategory, &'static str) {
        // TAXONOMYは全バリアントを網羅している
        &TAXONOMY[*self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        self.entry().1
    }

    pub fn region(&self) -> RegionId {
        self.entry().2
    }

    pub fn category(&self) -> DefectCategory {
        self.entry().3
    }

    /// 表示名
    pub fn display_label(&self) -> &'static str {
        self.entry().4
    }
}

impl std::fmt::Display for PartName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RegionId {
    /// 数値から領域を引く（1〜6以外は None）
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(RegionId::FrontLeftDoor),
            2 => Some(RegionId::BackLeftDoor),
            3 => Some(RegionId::FrontRightDoor),
            4 => Some(RegionId::BackRightDoor),
            5 => Some(RegionId::Body),
            6 => Some(RegionId::Bumper),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// キー文字列上の1桁
    pub fn digit(&self) -> char {
        char::from(b'0' + self.as_u8())
    }
}

/// 部位トークン → 領域ID
///
/// 未知の部位は None（呼び出し側で読み捨てる）。
pub fn region_id_of(part: &str) -> Option<RegionId> {
    PartName::from_token(part).map(|p| p.region())
}

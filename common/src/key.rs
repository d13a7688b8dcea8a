//! 合成キー解決
//!
//! 損傷部位の集合から、3Dモデルを引くための合成キーを作る。
//! キーは領域IDを昇順・重複なしで連結した数字列で、空集合は `"0"`。

use crate::defect::ParsedDefect;
use crate::error::{Error, Result};
use crate::taxonomy::{region_id_of, RegionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 合成キー
///
/// 不変条件: 数字は狭義単調増加（重複なし）、または番兵 `"0"`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompositeKey(String);

impl CompositeKey {
    /// 損傷なしを表す番兵キー
    pub const SENTINEL: &'static str = "0";

    pub fn sentinel() -> Self {
        Self(Self::SENTINEL.to_string())
    }

    /// 領域IDの集合からキーを作る（順序・重複は無関係）
    pub fn from_regions<I>(regions: I) -> Self
    where
        I: IntoIterator<Item = RegionId>,
    {
        let unique: BTreeSet<RegionId> = regions.into_iter().collect();
        if unique.is_empty() {
            return Self::sentinel();
        }
        Self(unique.iter().map(|r| r.digit()).collect())
    }

    /// 領域番号（1〜6）の列からキーを作る
    ///
    /// 範囲外の番号と0は無視する。
    pub fn from_region_numbers(numbers: &[u8]) -> Self {
        Self::from_regions(numbers.iter().filter_map(|&n| RegionId::from_u8(n)))
    }

    /// キー文字列を検証してパース
    pub fn parse(s: &str) -> Result<Self> {
        if s == Self::SENTINEL {
            return Ok(Self::sentinel());
        }
        if s.is_empty() {
            return Err(Error::InvalidKey("empty key".into()));
        }

        let mut previous = 0u8;
        for c in s.chars() {
            let digit = c
                .to_digit(10)
                .and_then(|d| RegionId::from_u8(d as u8))
                .ok_or_else(|| Error::InvalidKey(s.to_string()))?;
            if digit.as_u8() <= previous {
                return Err(Error::InvalidKey(s.to_string()));
            }
            previous = digit.as_u8();
        }

        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_sentinel(&self) -> bool {
        self.0 == Self::SENTINEL
    }

    /// キーに含まれる領域
    pub fn regions(&self) -> Vec<RegionId> {
        self.0
            .chars()
            .filter_map(|c| c.to_digit(10))
            .filter_map(|d| RegionId::from_u8(d as u8))
            .collect()
    }

    /// アセットのファイル名（`<key>.glb`）
    pub fn asset_file_name(&self) -> String {
        format!("{}.glb", self.0)
    }
}

impl std::fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CompositeKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CompositeKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CompositeKey> for String {
    fn from(key: CompositeKey) -> Self {
        key.0
    }
}

/// 解析済み損傷から合成キーを解決
///
/// 手順: 領域へ変換 → 未知部位を捨てる → 重複排除 → 昇順 → 連結 → 空なら `"0"`
///
/// # Examples
/// ```
/// use car_assess_common::{parse_defect, resolve_key};
///
/// let defects = vec![
///     parse_defect("front_bumper (scratch)"),
///     parse_defect("front_right_door (dent)"),
/// ];
/// assert_eq!(resolve_key(&defects).as_str(), "36");
/// ```
pub fn resolve_key(defects: &[ParsedDefect]) -> CompositeKey {
    CompositeKey::from_regions(defects.iter().filter_map(|d| region_id_of(&d.part)))
}

/// 部位トークンの列から合成キーを解決
pub fn resolve_key_from_parts<S: AsRef<str>>(parts: &[S]) -> CompositeKey {
    CompositeKey::from_regions(parts.iter().filter_map(|p| region_id_of(p.as_ref())))
}

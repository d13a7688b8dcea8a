//! アセットストア
//!
//! 合成キーと同名の3Dモデル（glb）をカタログから読み出す。
//! カタログは事前に用意された読み取り専用のキー→バイナリの対応で、
//! 保存先（メモリ/ファイルシステム）は `AssetCatalog` 実装で差し替える。

use crate::error::{Error, Result};
use crate::key::CompositeKey;
use std::collections::HashMap;

/// glbのContent-Type
pub const GLB_CONTENT_TYPE: &str = "model/gltf-binary";

/// 3Dモデル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryAsset {
    /// 実際に読み出したキー（フォールバック時は番兵）
    pub key: CompositeKey,
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// 読み取り専用のアセットカタログ
pub trait AssetCatalog {
    /// キーに対応するアセットを読む（無ければ None）
    fn read(&self, key: &CompositeKey) -> Result<Option<Vec<u8>>>;

    /// カタログ内のキー一覧
    fn keys(&self) -> Result<Vec<CompositeKey>>;
}

/// キーのアセットを取得
///
/// 無ければ `Error::AssetNotFound`。キャッシュはしない。
pub fn fetch_asset<C: AssetCatalog + ?Sized>(catalog: &C, key: &CompositeKey) -> Result<BinaryAsset> {
    match catalog.read(key)? {
        Some(bytes) => Ok(BinaryAsset {
            key: key.clone(),
            bytes,
            content_type: GLB_CONTENT_TYPE,
        }),
        None => Err(Error::AssetNotFound(key.to_string())),
    }
}

/// キーのアセットを取得し、無ければ番兵 `"0"` のアセットを返す
///
/// 番兵のアセットも無ければ `Error::AssetNotFound`。
pub fn fetch_asset_or_default<C: AssetCatalog + ?Sized>(
    catalog: &C,
    key: &CompositeKey,
) -> Result<BinaryAsset> {
    match fetch_asset(catalog, key) {
        Err(Error::AssetNotFound(_)) if !key.is_sentinel() => {
            fetch_asset(catalog, &CompositeKey::sentinel())
        }
        other => other,
    }
}

/// メモリ上のカタログ（組み込みバンドル・テスト用）
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    entries: HashMap<CompositeKey, Vec<u8>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, key: CompositeKey, bytes: Vec<u8>) -> Self {
        self.entries.insert(key, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssetCatalog for MemoryCatalog {
    fn read(&self, key: &CompositeKey) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn keys(&self) -> Result<Vec<CompositeKey>> {
        let mut keys: Vec<CompositeKey> = self.entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> CompositeKey {
        CompositeKey::parse(s).unwrap()
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_asset(key("0"), b"glTF-default".to_vec())
            .with_asset(key("36"), b"glTF-36".to_vec())
    }

    #[test]
    fn test_fetch_existing_asset() {
        let asset = fetch_asset(&catalog(), &key("36")).unwrap();
        assert_eq!(asset.key.as_str(), "36");
        assert_eq!(asset.bytes, b"glTF-36");
        assert_eq!(asset.content_type, GLB_CONTENT_TYPE);
    }

    #[test]
    fn test_fetch_missing_asset() {
        let result = fetch_asset(&catalog(), &key("14"));
        match result {
            Err(Error::AssetNotFound(k)) => assert_eq!(k, "14"),
            other => panic!("Expected AssetNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_fallback_to_sentinel() {
        let asset = fetch_asset_or_default(&catalog(), &key("14")).unwrap();
        assert!(asset.key.is_sentinel());
        assert_eq!(asset.bytes, b"glTF-default");
    }

    #[test]
    fn test_fallback_not_used_when_present() {
        let asset = fetch_asset_or_default(&catalog(), &key("36")).unwrap();
        assert_eq!(asset.key.as_str(), "36");
    }

    #[test]
    fn test_missing_sentinel_is_hard_failure() {
        let catalog = MemoryCatalog::new().with_asset(key("36"), vec![1, 2, 3]);
        let result = fetch_asset_or_default(&catalog, &key("14"));
        match result {
            Err(Error::AssetNotFound(k)) => assert_eq!(k, "0"),
            other => panic!("Expected AssetNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_keys_sorted() {
        let keys = catalog().keys().unwrap();
        let names: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["0", "36"]);
    }
}

//! ファイルシステム上のアセットカタログ
//!
//! `<asset_dir>/<key>.glb` を1キー1ファイルで置く。読み込みは毎回ディスクから行う。

use car_assess_common::{AssetCatalog, CompositeKey, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FsCatalog {
    root: PathBuf,
}

impl FsCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// キーに対応するファイルのパス
    ///
    /// キーは検証済みの数字列なので、ディレクトリ外は指さない。
    pub fn path_for(&self, key: &CompositeKey) -> PathBuf {
        self.root.join(key.asset_file_name())
    }
}

impl AssetCatalog for FsCatalog {
    fn read(&self, key: &CompositeKey) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(bytes) => {
                tracing::debug!(path = %path.display(), size = bytes.len(), "asset read");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "asset missing");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// カタログ内のキー一覧（キーとして不正な名前のファイルは無視）
    fn keys(&self) -> Result<Vec<CompositeKey>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("glb") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(key) = CompositeKey::parse(stem) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

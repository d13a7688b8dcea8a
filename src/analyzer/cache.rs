//! 解析結果キャッシュモジュール
//!
//! 画像のSHA-256ハッシュをキーにして上流ペイロードをキャッシュし、
//! 同じ画像の再解析をスキップする。

use crate::error::Result;
use crate::scanner::ImageInfo;
use car_assess_common::AnalysisPayload;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const CACHE_FILE_NAME: &str = ".assess-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// ファイルハッシュ → 解析結果のマップ
    entries: HashMap<String, CacheEntry>,
}

/// キャッシュエントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub file_name: String,
    pub file_size: u64,
    pub payload: AnalysisPayload,
}

impl CacheFile {
    const CURRENT_VERSION: u32 = 1;

    pub fn cache_path(folder: &Path) -> PathBuf {
        folder.join(CACHE_FILE_NAME)
    }

    /// キャッシュファイルを読み込み
    ///
    /// 存在しない・壊れている・バージョン違いの場合は空のキャッシュ。
    pub fn load(folder: &Path) -> Self {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, CacheFile>(reader) {
            Ok(cache) if cache.version == Self::CURRENT_VERSION => cache,
            Ok(_) => {
                tracing::warn!(path = %cache_path.display(), "cache version mismatch, rebuilding");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %cache_path.display(), error = %e, "cache file unreadable, ignoring");
                Self::default()
            }
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, folder: &Path) -> Result<()> {
        let file = File::create(Self::cache_path(folder))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// キャッシュファイルを削除（存在しなければ false）
    pub fn clear(folder: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(cache_path)?;
        Ok(true)
    }

    pub fn get(&self, hash: &str) -> Option<&AnalysisPayload> {
        self.entries.get(hash).map(|e| &e.payload)
    }

    pub fn insert(&mut self, hash: String, file_name: String, file_size: u64, payload: AnalysisPayload) {
        self.entries.insert(hash, CacheEntry {
            file_name,
            file_size,
            payload,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// 画像ファイルのハッシュを計算（SHA-256, hex）
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// キャッシュ済みと未キャッシュの画像に分ける
///
/// 未キャッシュ側にはハッシュも返す（計算失敗時は空文字）。
pub fn filter_cached_images(
    images: &[ImageInfo],
    cache: &CacheFile,
) -> (Vec<(ImageInfo, AnalysisPayload)>, Vec<(ImageInfo, String)>) {
    let mut cached = Vec::new();
    let mut uncached = Vec::new();

    for img in images {
        let hash = match compute_file_hash(&img.path) {
            Ok(h) => h,
            Err(_) => {
                uncached.push((img.clone(), String::new()));
                continue;
            }
        };

        if let Some(payload) = cache.get(&hash) {
            cached.push((img.clone(), payload.clone()));
        } else {
            uncached.push((img.clone(), hash));
        }
    }

    (cached, uncached)
}

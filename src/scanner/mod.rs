mod exif;

use crate::error::{AssessError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    /// EXIFの撮影日時
    pub date: Option<String>,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// フォルダ直下の写真を列挙（ファイル名順）
pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(AssessError::FolderNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| has_image_extension(path))
        .map(|path| {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let date = exif::capture_date(&path);
            ImageInfo { path, file_name, date }
        })
        .collect();

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    tracing::debug!(folder = %folder.display(), count = images.len(), "scanned folder");

    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// 画像ファイルとして読めるか検証し、MIMEタイプを返す
pub fn validate_image(path: &Path) -> Result<&'static str> {
    if !path.is_file() {
        return Err(AssessError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    validate_image_bytes(&bytes)
        .map_err(|e| AssessError::ImageLoad(format!("{}: {}", path.display(), e)))
}

/// バイト列の画像形式を判定し、MIMEタイプを返す
pub fn validate_image_bytes(bytes: &[u8]) -> std::result::Result<&'static str, String> {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .map_err(|e| e.to_string())
}

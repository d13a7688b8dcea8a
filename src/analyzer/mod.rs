mod backend;
pub mod cache;
mod detector_cli;
pub mod http;
mod types;

pub use backend::AnalyzerBackend;
pub use cache::CacheFile;
pub use types::AssessmentRecord;

use crate::config::Config;
use crate::error::Result;
use crate::scanner::ImageInfo;
use car_assess_common::{assemble_payload, AnalysisPayload};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// 1枚の画像を指定バックエンドで解析
pub async fn analyze_image(
    image: &Path,
    backend: AnalyzerBackend,
    config: &Config,
) -> Result<AnalysisPayload> {
    tracing::info!(image = %image.display(), backend = %backend, "analyzing image");
    match backend {
        AnalyzerBackend::Detector => detector_cli::analyze(image, config).await,
        AnalyzerBackend::Http => http::analyze(image, config).await,
    }
}

/// 複数画像を順に解析して判定記録を作る
pub async fn assess_images(
    images: &[ImageInfo],
    backend: AnalyzerBackend,
    config: &Config,
) -> Result<Vec<AssessmentRecord>> {
    let progress = progress_bar(images.len());
    let mut records = Vec::with_capacity(images.len());

    for img in images {
        progress.set_message(img.file_name.clone());
        let payload = analyze_image(&img.path, backend, config).await?;
        records.push(to_record(img, &payload));
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(records)
}

/// キャッシュを使って解析（未キャッシュの画像のみ解析する）
pub async fn assess_images_with_cache(
    images: &[ImageInfo],
    folder: &Path,
    backend: AnalyzerBackend,
    config: &Config,
) -> Result<Vec<AssessmentRecord>> {
    let mut cache = CacheFile::load(folder);
    let (cached, uncached) = cache::filter_cached_images(images, &cache);

    println!("  キャッシュ: {}枚ヒット / {}枚解析", cached.len(), uncached.len());

    let mut records: Vec<AssessmentRecord> = cached
        .iter()
        .map(|(img, payload)| to_record(img, payload))
        .collect();

    let progress = progress_bar(uncached.len());
    for (img, hash) in &uncached {
        progress.set_message(img.file_name.clone());
        let payload = analyze_image(&img.path, backend, config).await?;
        records.push(to_record(img, &payload));

        if !hash.is_empty() {
            let file_size = std::fs::metadata(&img.path).map(|m| m.len()).unwrap_or(0);
            cache.insert(hash.clone(), img.file_name.clone(), file_size, payload);
            // 途中で失敗しても解析済み分は残す
            cache.save(folder)?;
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    // ファイル名順に戻す
    records.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(records)
}

/// ペイロードから判定記録を作る
pub fn to_record(img: &ImageInfo, payload: &AnalysisPayload) -> AssessmentRecord {
    let result = assemble_payload(payload);
    let asset = result.composite_key.asset_file_name();

    AssessmentRecord {
        file_name: img.file_name.clone(),
        file_path: img.path.display().to_string(),
        date: img.date.clone().unwrap_or_default(),
        analyzed_at: chrono::Local::now(),
        result,
        asset,
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let progress = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("  [{bar:30}] {pos}/{len} {msg}") {
        progress.set_style(style.progress_chars("=> "));
    }
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use car_assess_common::{CategorizedDefects, StatusKind};
    use std::path::PathBuf;

    #[test]
    fn test_to_record() {
        let img = ImageInfo {
            path: PathBuf::from("/photos/car.jpg"),
            file_name: "car.jpg".to_string(),
            date: Some("2025-03-01 10:00:00".to_string()),
        };
        let payload = AnalysisPayload {
            defects: CategorizedDefects {
                bumpers: vec!["front_bumper (scratch)".to_string()],
                doors: vec!["front_right_door (dent)".to_string()],
                body: vec![],
            },
            status: StatusKind::Clean,
        };

        let record = to_record(&img, &payload);
        assert_eq!(record.file_name, "car.jpg");
        assert_eq!(record.date, "2025-03-01 10:00:00");
        assert_eq!(record.asset, "36.glb");
        assert_eq!(record.result.status, StatusKind::Damaged);
    }
}

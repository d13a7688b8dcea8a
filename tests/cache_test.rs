//! キャッシュ機能テスト
//!
//! 解析結果キャッシュの動作を検証

use car_assess::analyzer::cache::{compute_file_hash, filter_cached_images, CacheFile};
use car_assess::scanner::ImageInfo;
use car_assess_common::{AnalysisPayload, CategorizedDefects, StatusKind};
use tempfile::tempdir;

fn payload(doors: &[&str], status: StatusKind) -> AnalysisPayload {
    AnalysisPayload {
        defects: CategorizedDefects {
            bumpers: vec![],
            doors: doors.iter().map(|s| s.to_string()).collect(),
            body: vec![],
        },
        status,
    }
}

/// 空のキャッシュファイル
#[test]
fn test_cache_file_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let cache = CacheFile::load(dir.path());

    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());
}

/// キャッシュの保存と読み込み
#[test]
fn test_cache_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = CacheFile::load(dir.path());
    cache.insert(
        "abc123".to_string(),
        "car.jpg".to_string(),
        1024,
        payload(&["front_left_door (dent)"], StatusKind::Dirty),
    );
    cache.save(dir.path()).expect("キャッシュ保存失敗");

    let loaded = CacheFile::load(dir.path());
    assert_eq!(loaded.len(), 1);

    let cached = loaded.get("abc123").expect("キャッシュが見つからない");
    assert_eq!(cached.defects.doors, vec!["front_left_door (dent)"]);
    assert_eq!(cached.status, StatusKind::Dirty);
}

/// キャッシュの上書き
#[test]
fn test_cache_overwrite() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = CacheFile::load(dir.path());
    cache.insert("same".to_string(), "car.jpg".to_string(), 10, payload(&[], StatusKind::Clean));
    cache.insert(
        "same".to_string(),
        "car.jpg".to_string(),
        10,
        payload(&["back_right_door (scratch)"], StatusKind::Clean),
    );

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("same").unwrap().defects.doors.len(), 1);
}

/// キャッシュファイルが破損している場合
#[test]
fn test_cache_corrupted_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(CacheFile::cache_path(dir.path()), "{ invalid json }").unwrap();

    let cache = CacheFile::load(dir.path());
    assert!(cache.is_empty());
}

/// 古いバージョンのキャッシュは読み捨てる
#[test]
fn test_cache_version_mismatch() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(
        CacheFile::cache_path(dir.path()),
        r#"{"version": 0, "entries": {}}"#,
    )
    .unwrap();

    assert!(CacheFile::load(dir.path()).is_empty());
}

/// キャッシュの削除
#[test]
fn test_cache_clear() {
    let dir = tempdir().expect("Failed to create temp dir");
    assert!(!CacheFile::clear(dir.path()).unwrap());

    CacheFile::default().save(dir.path()).unwrap();
    assert!(CacheFile::clear(dir.path()).unwrap());
    assert!(!CacheFile::cache_path(dir.path()).exists());
}

/// 同じ内容のファイルは同じハッシュ
#[test]
fn test_compute_file_hash() {
    let dir = tempdir().expect("Failed to create temp dir");
    let a = dir.path().join("a.jpg");
    let b = dir.path().join("b.jpg");
    let c = dir.path().join("c.jpg");
    std::fs::write(&a, b"same bytes").unwrap();
    std::fs::write(&b, b"same bytes").unwrap();
    std::fs::write(&c, b"other bytes").unwrap();

    let hash_a = compute_file_hash(&a).unwrap();
    assert_eq!(hash_a.len(), 64);
    assert_eq!(hash_a, compute_file_hash(&b).unwrap());
    assert_ne!(hash_a, compute_file_hash(&c).unwrap());
}

/// filter_cached_imagesのテスト
#[test]
fn test_filter_cached_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    let img1_path = dir.path().join("img1.jpg");
    let img2_path = dir.path().join("img2.jpg");
    std::fs::write(&img1_path, b"fake image 1").unwrap();
    std::fs::write(&img2_path, b"fake image 2").unwrap();

    let images = vec![
        ImageInfo {
            file_name: "img1.jpg".to_string(),
            path: img1_path.clone(),
            date: None,
        },
        ImageInfo {
            file_name: "img2.jpg".to_string(),
            path: img2_path.clone(),
            date: Some("2025:03:01 10:00:00".to_string()),
        },
    ];

    let mut cache = CacheFile::load(dir.path());
    let (cached, uncached) = filter_cached_images(&images, &cache);
    assert!(cached.is_empty());
    assert_eq!(uncached.len(), 2);

    // img1のみキャッシュ
    let hash = compute_file_hash(&img1_path).unwrap();
    cache.insert(hash, "img1.jpg".to_string(), 12, payload(&[], StatusKind::Clean));

    let (cached, uncached) = filter_cached_images(&images, &cache);
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].0.file_name, "img1.jpg");
    assert_eq!(uncached.len(), 1);
    assert_eq!(uncached[0].0.file_name, "img2.jpg");
    assert_eq!(uncached[0].1.len(), 64);
}

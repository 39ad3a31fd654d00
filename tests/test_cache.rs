//! Cache manager behaviour that needs no network.

mod common;

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use wastemarket_sdk::models::DropPoint;
use wastemarket_sdk::MarketError;

#[test]
fn load_json_reads_plain_files() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("meta.json"), r#"{"version": "2024.05.01"}"#).unwrap();
    let mut cache = common::offline_cache(tmp.path());

    let meta = cache.load_json("meta").unwrap();
    assert_eq!(meta["version"], "2024.05.01");
}

#[test]
fn load_json_inflates_gzip_content() {
    let tmp = tempfile::tempdir().unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(br#"{"version": "gz"}"#).unwrap();
    std::fs::write(tmp.path().join("meta.json"), encoder.finish().unwrap()).unwrap();
    let mut cache = common::offline_cache(tmp.path());

    assert_eq!(cache.load_json("meta").unwrap()["version"], "gz");
}

#[test]
fn corrupt_file_is_removed() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("catalog.json");
    std::fs::write(&path, "{not json").unwrap();
    let mut cache = common::offline_cache(tmp.path());

    let err = cache.load_json("catalog").unwrap_err();
    assert!(matches!(err, MarketError::NotFound(_)));
    assert!(err.to_string().contains("corrupt"));
    assert!(!path.exists());
}

#[test]
fn offline_missing_file_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cache = common::offline_cache(tmp.path());

    let err = cache.ensure_json("transactions").unwrap_err();
    assert!(err.to_string().contains("offline"));
}

#[test]
fn unknown_logical_name_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cache = common::offline_cache(tmp.path());

    let err = cache.ensure_json("sellers").unwrap_err();
    assert!(err.to_string().contains("Unknown data file"));
}

#[test]
fn load_records_accepts_bare_array_and_data_wrapper() {
    let tmp = tempfile::tempdir().unwrap();
    let points = serde_json::to_value(common::sample_drop_points()).unwrap();
    std::fs::write(tmp.path().join("drop-points.json"), points.to_string()).unwrap();
    let mut cache = common::offline_cache(tmp.path());

    let bare: Vec<DropPoint> = cache.load_records("drop_points").unwrap();
    assert_eq!(bare.len(), 3);

    let wrapped = serde_json::json!({ "data": points });
    std::fs::write(tmp.path().join("drop-points.json"), wrapped.to_string()).unwrap();
    let unwrapped: Vec<DropPoint> = cache.load_records("drop_points").unwrap();
    assert_eq!(unwrapped, bare);
}

#[test]
fn offline_cache_without_version_is_stale() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cache = common::offline_cache(tmp.path());
    assert!(cache.is_stale().unwrap());

    std::fs::write(tmp.path().join("version.txt"), "2024.05.01").unwrap();
    assert!(!cache.is_stale().unwrap());
}

#[test]
fn clear_empties_the_cache_directory() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("meta.json"), "{}").unwrap();
    let cache = common::offline_cache(tmp.path());

    cache.clear().unwrap();
    assert!(tmp.path().exists());
    assert!(!tmp.path().join("meta.json").exists());
}

#[test]
fn api_base_drops_trailing_slash() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = wastemarket_sdk::CacheManager::new(
        Some(tmp.path().to_path_buf()),
        "http://backend.invalid/v1/",
        true,
        std::time::Duration::from_secs(5),
    )
    .unwrap();
    assert_eq!(cache.api_base(), "http://backend.invalid/v1");
}

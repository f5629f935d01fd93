//! Integration tests for the pipeline module.
//!
//! These tests run the whole scan-and-write cycle against real directories:
//! - Idempotence and forced regeneration
//! - Staleness after a source changes
//! - Extension and hidden file filtering
//! - Per-file failure isolation
//! - Configuration errors

use assert_fs::prelude::*;
use filetime::{set_file_mtime, FileTime};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thumbgen::core::pipeline::{Pipeline, PipelineBuilder};
use thumbgen::core::SizeClass;
use thumbgen::error::ConfigError;

fn create_test_image(path: &Path, width: u32, height: u32, format: ImageFormat) {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(img)
        .save_with_format(path, format)
        .unwrap();
}

fn builder(source: &Path, cache: &Path) -> PipelineBuilder {
    Pipeline::builder()
        .paths(vec![source.to_path_buf()])
        .output_dir(cache)
}

/// All PNG files in one size directory, sorted
fn entries(cache: &Path, size: SizeClass) -> Vec<PathBuf> {
    let dir = cache.join(size.name());
    let Ok(read) = fs::read_dir(&dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = read.map(|e| e.unwrap().path()).collect();
    paths.sort();
    paths
}

#[test]
fn pipeline_fills_both_size_directories() {
    let source = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    create_test_image(source.child("a.png").path(), 400, 200, ImageFormat::Png);
    create_test_image(source.child("b.jpg").path(), 300, 300, ImageFormat::Jpeg);

    let report = builder(source.path(), cache.path())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.files_processed, 2);
    assert_eq!(report.generated, 4);
    assert!(report.is_clean());

    cache.child("normal").assert(predicate::path::is_dir());
    cache.child("large").assert(predicate::path::is_dir());
    assert_eq!(entries(cache.path(), SizeClass::Normal).len(), 2);
    assert_eq!(entries(cache.path(), SizeClass::Large).len(), 2);

    for path in entries(cache.path(), SizeClass::Normal) {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name.len(), 36, "{} is not <md5>.png", name);
        assert!(name.ends_with(".png"));
    }
}

#[test]
fn second_run_is_idempotent() {
    let source = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    create_test_image(source.child("a.png").path(), 400, 200, ImageFormat::Png);

    let pipeline = builder(source.path(), cache.path()).build().unwrap();
    let first = pipeline.run().unwrap();
    assert_eq!(first.generated, 2);

    let normal = entries(cache.path(), SizeClass::Normal);
    let before = fs::read(&normal[0]).unwrap();
    let mtime_before = fs::metadata(&normal[0]).unwrap().modified().unwrap();

    let second = pipeline.run().unwrap();
    assert_eq!(second.generated, 0);
    assert_eq!(second.up_to_date, 2);
    assert_eq!(second.files_processed, 0);

    assert_eq!(fs::read(&normal[0]).unwrap(), before);
    assert_eq!(
        fs::metadata(&normal[0]).unwrap().modified().unwrap(),
        mtime_before
    );
}

#[test]
fn force_rewrites_fresh_entries() {
    let source = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    create_test_image(source.child("a.png").path(), 400, 200, ImageFormat::Png);

    builder(source.path(), cache.path())
        .build()
        .unwrap()
        .run()
        .unwrap();
    let before = fs::read(&entries(cache.path(), SizeClass::Normal)[0]).unwrap();

    let forced = builder(source.path(), cache.path())
        .force(true)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(forced.generated, 2);
    assert_eq!(forced.up_to_date, 0);
    // Same source, same metadata: same bytes
    assert_eq!(
        fs::read(&entries(cache.path(), SizeClass::Normal)[0]).unwrap(),
        before
    );
}

#[test]
fn touched_source_is_regenerated_alone() {
    let source = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    create_test_image(source.child("a.png").path(), 400, 200, ImageFormat::Png);
    create_test_image(source.child("b.png").path(), 200, 400, ImageFormat::Png);

    let pipeline = builder(source.path(), cache.path()).build().unwrap();
    pipeline.run().unwrap();

    let future = SystemTime::now() + Duration::from_secs(3600);
    set_file_mtime(source.child("b.png").path(), FileTime::from_system_time(future)).unwrap();

    let report = pipeline.run().unwrap();
    assert_eq!(report.generated, 2);
    assert_eq!(report.up_to_date, 2);
    assert_eq!(report.files_processed, 1);
}

#[test]
fn extension_filter_is_case_insensitive_and_anchored() {
    let source = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    source.child("notes.txt").write_str("not an image").unwrap();
    source.child("photo.jpg.bak").write_str("backup").unwrap();
    create_test_image(source.child("photo.JPEG").path(), 200, 100, ImageFormat::Jpeg);

    let report = builder(source.path(), cache.path())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.generated, 2);
    assert!(report.is_clean());
}

#[test]
fn custom_extension_pattern_narrows_the_scan() {
    let source = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    create_test_image(source.child("a.png").path(), 64, 64, ImageFormat::Png);
    create_test_image(source.child("b.jpg").path(), 64, 64, ImageFormat::Jpeg);

    let report = builder(source.path(), cache.path())
        .extension_pattern("png")
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.files_scanned, 1);
}

#[test]
fn hidden_files_are_included_unless_skipped() {
    let source = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    source.child(".album").create_dir_all().unwrap();
    create_test_image(source.child(".album/a.png").path(), 64, 64, ImageFormat::Png);
    create_test_image(source.child("b.png").path(), 64, 64, ImageFormat::Png);

    let all = builder(source.path(), cache.path())
        .build()
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(all.files_scanned, 2);

    let visible = builder(source.path(), cache.path())
        .include_hidden(false)
        .build()
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(visible.files_scanned, 1);
}

#[test]
fn corrupt_file_does_not_stop_the_run() {
    let source = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    source
        .child("corrupt.jpg")
        .write_binary(b"this is not a valid image file")
        .unwrap();
    create_test_image(source.child("good.png").path(), 300, 200, ImageFormat::Png);

    let report = builder(source.path(), cache.path())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.generated, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].source.ends_with("corrupt.jpg"));
    assert_eq!(report.failures[0].size, None);
    assert!(!report.is_clean());

    assert_eq!(entries(cache.path(), SizeClass::Normal).len(), 1);
    assert_eq!(entries(cache.path(), SizeClass::Large).len(), 1);
}

#[test]
fn fresh_entry_is_reported_when_source_later_fails() {
    let source = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    let image = source.child("a.png");
    create_test_image(image.path(), 400, 200, ImageFormat::Png);

    builder(source.path(), cache.path())
        .skip_large(true)
        .build()
        .unwrap()
        .run()
        .unwrap();

    // Corrupt the source without touching its mtime
    let mtime = FileTime::from_last_modification_time(&fs::metadata(image.path()).unwrap());
    image.write_binary(b"garbage").unwrap();
    set_file_mtime(image.path(), mtime).unwrap();

    let report = builder(source.path(), cache.path())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.up_to_date, 1);
    assert_eq!(report.generated, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].size, None);
}

#[test]
fn extension_pattern_matches_from_the_start() {
    let source = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    create_test_image(source.child("a.tiff").path(), 64, 64, ImageFormat::Tiff);
    create_test_image(source.child("b.png").path(), 64, 64, ImageFormat::Png);

    let report = builder(source.path(), cache.path())
        .extension_pattern("tif")
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.generated, 2);
}

#[test]
fn skip_large_writes_only_normal() {
    let source = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    create_test_image(source.child("a.png").path(), 400, 200, ImageFormat::Png);

    let report = builder(source.path(), cache.path())
        .skip_large(true)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.generated, 1);
    cache.child("large").assert(predicate::path::missing());
}

#[test]
fn missing_scan_root_is_reported_not_fatal() {
    let cache = assert_fs::TempDir::new().unwrap();

    let report = Pipeline::builder()
        .paths(vec![PathBuf::from("/nonexistent/path/12345")])
        .output_dir(cache.path())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.files_scanned, 0);
    assert_eq!(report.scan_errors.len(), 1);
}

#[test]
fn missing_output_dir_stops_before_scanning() {
    let source = assert_fs::TempDir::new().unwrap();

    let result = builder(source.path(), Path::new("/nonexistent/cache/12345")).build();

    assert!(matches!(result, Err(ConfigError::OutputDirMissing { .. })));
}

#[test]
fn invalid_extension_pattern_is_a_config_error() {
    let source = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();

    let result = builder(source.path(), cache.path())
        .extension_pattern("jpe?g|(")
        .build();

    assert!(matches!(
        result,
        Err(ConfigError::InvalidExtensionPattern { .. })
    ));
}

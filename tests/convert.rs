//! End-to-end conversions with the real codec backend.
//!
//! Inputs are written as PNG (lossless) so trimmed sizes are exact; outputs
//! are decoded again to check what actually landed on disk.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use webpify::batch::run;
use webpify::config::ConvertConfig;
use webpify::imaging::{ImageBackend, Quality, RustBackend};

/// White canvas with a dark red block at `[x0, x1) × [y0, y1)`.
fn write_framed_png(path: &Path, size: (u32, u32), block: (u32, u32, u32, u32)) {
    let (x0, y0, x1, y1) = block;
    let img = RgbImage::from_fn(size.0, size.1, |x, y| {
        if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
            Rgb([120, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });
    img.save_with_format(path, ImageFormat::Png).unwrap();
}

fn dimensions(path: &Path) -> (u32, u32) {
    let img = RustBackend::new().decode(path).unwrap();
    (img.width(), img.height())
}

fn config_for(dir: &Path) -> ConvertConfig {
    ConvertConfig {
        images_dir: dir.to_path_buf(),
        threads: Some(2),
        ..ConvertConfig::default()
    }
}

fn is_webp_file(path: &Path) -> bool {
    let bytes = fs::read(path).unwrap();
    bytes.len() > 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP"
}

#[test]
fn converts_trims_and_removes_original() {
    let tmp = TempDir::new().unwrap();
    write_framed_png(&tmp.path().join("photo.png"), (200, 120), (50, 20, 150, 100));
    let config = ConvertConfig {
        keep_original: false,
        quality: 90,
        ..config_for(tmp.path())
    };

    let summary = run(&config, None).unwrap();

    assert!(summary.is_success());
    let output = tmp.path().join("photo.webp");
    assert!(is_webp_file(&output));
    assert_eq!(dimensions(&output), (100, 80));
    assert!(!tmp.path().join("photo.png").exists());
}

#[test]
fn keep_whitespace_preserves_full_canvas() {
    let tmp = TempDir::new().unwrap();
    write_framed_png(&tmp.path().join("photo.png"), (200, 120), (50, 20, 150, 100));
    let config = ConvertConfig {
        trim_whitespace: false,
        ..config_for(tmp.path())
    };

    run(&config, None).unwrap();

    assert_eq!(dimensions(&tmp.path().join("photo.webp")), (200, 120));
    assert!(tmp.path().join("photo.png").exists());
}

#[test]
fn dimension_limit_caps_larger_side() {
    let tmp = TempDir::new().unwrap();
    write_framed_png(&tmp.path().join("wide.png"), (800, 400), (0, 0, 800, 400));
    let config = ConvertConfig {
        max_dimension: 400,
        ..config_for(tmp.path())
    };

    run(&config, None).unwrap();

    // Uniform images have no border to trim.
    assert_eq!(dimensions(&tmp.path().join("wide.webp")), (400, 200));
}

#[test]
fn area_limit_caps_megapixels() {
    let tmp = TempDir::new().unwrap();
    write_framed_png(&tmp.path().join("square.png"), (2000, 2000), (0, 0, 2000, 2000));
    let config = ConvertConfig {
        max_megapixels: 1,
        ..config_for(tmp.path())
    };

    run(&config, None).unwrap();

    assert_eq!(dimensions(&tmp.path().join("square.webp")), (1000, 1000));
}

#[test]
fn existing_webp_kept_gets_numbered_output() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("photo.webp");
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([10, 120, 200])));
    RustBackend::new()
        .encode_webp(&img, &input, Quality::new(80))
        .unwrap();
    let original_bytes = fs::read(&input).unwrap();

    let summary = run(&config_for(tmp.path()), None).unwrap();

    assert_eq!(summary.converted.len(), 1);
    assert_eq!(summary.converted[0].output, tmp.path().join("photo (1).webp"));
    assert!(is_webp_file(&tmp.path().join("photo (1).webp")));
    assert_eq!(fs::read(&input).unwrap(), original_bytes);
}

#[test]
fn existing_webp_not_kept_is_overwritten_in_place() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("photo.webp");
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([10, 120, 200])));
    RustBackend::new()
        .encode_webp(&img, &input, Quality::new(100))
        .unwrap();
    let config = ConvertConfig {
        keep_original: false,
        max_dimension: 32,
        ..config_for(tmp.path())
    };

    let summary = run(&config, None).unwrap();

    assert_eq!(summary.originals_removed(), 0);
    assert!(input.exists());
    assert_eq!(dimensions(&input), (32, 24));
    let entries = fs::read_dir(tmp.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn directory_with_only_ignore_file_is_untouched() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".gitignore"), "*\n!.gitignore\n").unwrap();

    let summary = run(&config_for(tmp.path()), None).unwrap();

    assert!(summary.is_empty());
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    assert_eq!(
        fs::read_to_string(tmp.path().join(".gitignore")).unwrap(),
        "*\n!.gitignore\n"
    );
}

#[test]
fn unreadable_file_fails_alone() {
    let tmp = TempDir::new().unwrap();
    write_framed_png(&tmp.path().join("good.png"), (40, 40), (10, 10, 30, 30));
    fs::write(tmp.path().join("notes.txt"), "hello").unwrap();
    let config = ConvertConfig {
        keep_original: false,
        ..config_for(tmp.path())
    };

    let summary = run(&config, None).unwrap();

    assert_eq!(summary.converted.len(), 1);
    assert_eq!(summary.failed.len(), 1);
    assert!(tmp.path().join("notes.txt").exists());
    assert!(!tmp.path().join("notes.webp").exists());
    assert!(tmp.path().join("good.webp").exists());
}

#![cfg(feature = "cli")]

use assert_cmd::Command;
use colorbar::io::{DetectConfig, DetectReport};
use nalgebra::Point2;
use predicates::prelude::*;
use std::path::Path;

fn write_marker_png(path: &Path) {
    let mut img = image::RgbaImage::from_pixel(90, 40, image::Rgba([90, 90, 90, 255]));
    let mut fill = |x0: u32, y0: u32, x1: u32, y1: u32, c: [u8; 4]| {
        for y in y0..=y1 {
            for x in x0..=x1 {
                img.put_pixel(x, y, image::Rgba(c));
            }
        }
    };
    fill(8, 10, 15, 29, [235, 215, 25, 255]);
    fill(72, 10, 79, 29, [235, 215, 25, 255]);
    fill(16, 15, 33, 24, [215, 35, 30, 255]);
    fill(34, 15, 52, 24, [30, 190, 40, 255]);
    fill(53, 15, 71, 24, [25, 40, 210, 255]);
    img.save(path).expect("write png");
}

fn colorbar() -> Command {
    Command::cargo_bin("colorbar").expect("binary")
}

#[test]
fn print_config_emits_default_json() {
    let out = colorbar()
        .arg("print-config")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let cfg: DetectConfig = serde_json::from_slice(&out).expect("config json");
    assert_eq!(cfg, DetectConfig::default());
}

#[test]
fn detect_writes_report_and_overlay() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("marker.png");
    let report = dir.path().join("report.json");
    let overlay = dir.path().join("overlay.png");
    write_marker_png(&image);

    colorbar()
        .args(["detect", image.to_str().expect("utf8"), "RGB"])
        .arg("--report")
        .arg(&report)
        .arg("--overlay")
        .arg(&overlay)
        .args(["--log-level", "warn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[RGB] - 1 appearances"));

    let report = DetectReport::load_json(&report).expect("report");
    assert_eq!(report.width, 90);
    assert_eq!(report.summary.boxes, 2);
    let best = report.best().expect("match");
    assert_eq!(best.segment.start, Point2::new(16, 19));
    assert_eq!(best.segment.end, Point2::new(71, 19));
    assert!(best.score > 0.9);

    let drawn = image::open(&overlay).expect("overlay").to_rgba8();
    assert_eq!(drawn.dimensions(), (90, 40));
    assert_eq!(drawn.get_pixel(40, 19).0, [0, 0, 255, 255]);
}

#[test]
fn config_file_and_overrides_apply() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("marker.png");
    let config = dir.path().join("cfg.json");
    write_marker_png(&image);
    DetectConfig::default().write_json(&config).expect("config");

    colorbar()
        .args(["detect", image.to_str().expect("utf8"), "RGB"])
        .arg("--config")
        .arg(&config)
        .args(["--min-length", "200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 appearances"));
}

#[test]
fn invalid_pattern_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("marker.png");
    write_marker_png(&image);

    colorbar()
        .args(["detect", image.to_str().expect("utf8"), "RGX"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("UnknownColor"));
}

#[test]
fn missing_image_fails() {
    colorbar()
        .args(["detect", "/nonexistent/frame.png", "RGB"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open"));
}

// animclip-core/tests/sweep_tests.rs

use animclip_core::config::CoreConfigBuilder;
use animclip_core::{CoreConfig, SweepReport, clear_all, sweep_stale};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::{TempDir, tempdir};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn populated() -> (TempDir, CoreConfig) {
    let root = tempdir().expect("tempdir");
    let config = CoreConfigBuilder::new()
        .upload_dir(root.path().join("uploads"))
        .output_dir(root.path().join("output"))
        .artifact_max_age(DAY)
        .build();
    config.ensure_directories().unwrap();

    for name in ["1_abc_clip.mp4", "2_def_other.mov"] {
        fs::write(config.upload_dir.join(name), b"video").unwrap();
    }
    for name in [
        "converted_1700000000000_x1y2z3.gif",
        "party_palette.png",
        "party_temp.mp4",
        "party_optimized.webp",
        "party.gif",
        "notes.txt",
    ] {
        fs::write(config.output_dir.join(name), b"data").unwrap();
    }
    (root, config)
}

fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_sweep_keeps_fresh_files() {
    let (_root, config) = populated();
    let report = sweep_stale(&config, SystemTime::now());
    assert_eq!(report, SweepReport::default());
    assert_eq!(names(&config.upload_dir).len(), 2);
    assert_eq!(names(&config.output_dir).len(), 6);
}

#[test]
fn test_sweep_removes_stale_artifacts_only() {
    let (_root, config) = populated();
    let later = SystemTime::now() + DAY + Duration::from_secs(60);

    let report = sweep_stale(&config, later);

    assert_eq!(report.removed, 6);
    assert_eq!(report.failed, 0);
    assert!(names(&config.upload_dir).is_empty());
    // Custom-named outputs and unrelated files survive the age sweep
    assert_eq!(names(&config.output_dir), vec!["notes.txt", "party.gif"]);
}

#[test]
fn test_clear_all_ignores_age() {
    let (_root, config) = populated();
    let report = clear_all(&config);

    assert_eq!(report.removed, 7);
    assert!(names(&config.upload_dir).is_empty());
    assert_eq!(names(&config.output_dir), vec!["notes.txt"]);
}

#[test]
fn test_sweep_missing_directories_is_noop() {
    let root = tempdir().unwrap();
    let config = CoreConfigBuilder::new()
        .upload_dir(root.path().join("nope"))
        .output_dir(root.path().join("also-nope"))
        .build();
    assert_eq!(clear_all(&config), SweepReport::default());
    assert_eq!(sweep_stale(&config, SystemTime::now()), SweepReport::default());
}

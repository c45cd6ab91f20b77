// animclip-core/tests/conversion_pipeline_tests.rs

use animclip_core::config::CoreConfigBuilder;
use animclip_core::external::mocks::{MockFfmpegSpawner, MockMetadataProvider};
use animclip_core::{
    ConversionRequest, CoreConfig, ErrorKind, OutputFormat, StdFsMetadataProvider, convert_video,
    receive_upload,
};
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

const MIB: u64 = 1024 * 1024;

// Helper to create a dummy file with some content
fn create_dummy_file(dir: &Path, filename: &str) -> PathBuf {
    let file_path = dir.join(filename);
    let mut file = File::create(&file_path).expect("Failed to create dummy file");
    file.write_all(b"dummy content").expect("Failed to write dummy content");
    file_path
}

fn workspace() -> (TempDir, CoreConfig) {
    let root = tempdir().expect("tempdir");
    let config = CoreConfigBuilder::new()
        .upload_dir(root.path().join("uploads"))
        .output_dir(root.path().join("output"))
        .build();
    (root, config)
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
fn test_upload_then_gif_conversion() -> Result<(), Box<dyn std::error::Error>> {
    let (root, config) = workspace();
    let original = create_dummy_file(root.path(), "beach day.mp4");
    let staged = receive_upload(&original, &config)?;

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("palettegen=max_colors=211:stats_mode=full", vec![], true);
    spawner.add_success_expectation("paletteuse=dither=floyd_steinberg", vec![], true);

    let request = ConversionRequest {
        start_time: 0.0,
        end_time: 10.0,
        quality: 80,
        fade_in_frames: 10,
        fade_out_frames: 10,
        format: OutputFormat::Gif,
        custom_filename: Some("beach".to_string()),
    };
    let result = convert_video(
        &spawner,
        &StdFsMetadataProvider,
        &config,
        &staged.path,
        &request,
    );

    assert!(result.success, "{result:?}");
    assert_eq!(result.output_filename.as_deref(), Some("beach.gif"));
    assert!(original.exists(), "the user's own file is never touched");
    assert!(dir_entries(&config.upload_dir).is_empty());
    assert_eq!(dir_entries(&config.output_dir), vec!["beach.gif"]);

    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 2);
    let staged_arg = staged.path.to_string_lossy().into_owned();
    for call in &calls {
        assert!(call.windows(2).any(|w| w[0] == "-i" && w[1] == staged_arg));
        assert!(call.windows(2).any(|w| w[0] == "-t" && w[1] == "10"));
    }
    assert!(calls[1].iter().any(|a| a.ends_with("beach_palette.png")));
    Ok(())
}

#[test]
fn test_rejected_request_still_removes_upload() -> Result<(), Box<dyn std::error::Error>> {
    let (root, config) = workspace();
    let staged = receive_upload(&create_dummy_file(root.path(), "long.mov"), &config)?;

    let spawner = MockFfmpegSpawner::new();
    let request = ConversionRequest {
        end_time: 65.0,
        ..ConversionRequest::default()
    };
    let result = convert_video(
        &spawner,
        &StdFsMetadataProvider,
        &config,
        &staged.path,
        &request,
    );

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Validation));
    assert!(result.error.unwrap().contains("60 seconds"));
    assert!(spawner.get_received_calls().is_empty());
    assert!(!staged.path.exists());
    Ok(())
}

#[test]
fn test_tool_failure_reports_diagnostics() -> Result<(), Box<dyn std::error::Error>> {
    let (root, config) = workspace();
    let staged = receive_upload(&create_dummy_file(root.path(), "broken.webm"), &config)?;

    let spawner = MockFfmpegSpawner::new();
    spawner.add_exit_error_expectation(
        "libwebp",
        vec![FfmpegEvent::Log(
            LogLevel::Error,
            "broken.webm: Invalid data found when processing input".to_string(),
        )],
        1,
    );

    let request = ConversionRequest {
        format: OutputFormat::Webp,
        ..ConversionRequest::default()
    };
    let result = convert_video(
        &spawner,
        &StdFsMetadataProvider,
        &config,
        &staged.path,
        &request,
    );

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::ToolExecution));
    assert!(result.error.unwrap().contains("Invalid data found"));
    assert!(!staged.path.exists());
    assert!(dir_entries(&config.output_dir).is_empty());
    Ok(())
}

#[test]
fn test_oversized_webp_goes_through_tier_one() -> Result<(), Box<dyn std::error::Error>> {
    let (root, config) = workspace();
    let staged = receive_upload(&create_dummy_file(root.path(), "talk.mp4"), &config)?;

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("default", vec![], true);
    spawner.add_success_expectation("libx264", vec![], true);
    spawner.add_success_expectation("picture", vec![], true);

    let metadata = MockMetadataProvider::new();
    metadata.set_size("talk.webp", 21 * MIB);
    metadata.set_size("talk_optimized.webp", 6 * MIB);

    let request = ConversionRequest {
        start_time: 30.0,
        end_time: 55.0,
        quality: 90,
        format: OutputFormat::Webp,
        custom_filename: Some("talk".to_string()),
        ..ConversionRequest::default()
    };
    let result = convert_video(&spawner, &metadata, &config, &staged.path, &request);

    assert!(result.success, "{result:?}");
    assert_eq!(result.output_filename.as_deref(), Some("talk_optimized.webp"));
    assert_eq!(result.file_size, Some(6 * MIB));
    assert_eq!(dir_entries(&config.output_dir), vec!["talk_optimized.webp"]);

    let calls = spawner.get_received_calls();
    // Long clip: quality lowered to 80, 12 fps, medium resolution
    assert!(calls[0].windows(2).any(|w| w[0] == "-quality" && w[1] == "80"));
    assert!(calls[0].windows(2).any(|w| w[0] == "-r" && w[1] == "12"));
    // Tier one: quality floor(90 * 0.6) = 54
    assert!(calls[2].windows(2).any(|w| w[0] == "-quality" && w[1] == "54"));
    Ok(())
}

// ============================================================================
// animclip-core/src/conversion/optimizer.rs
// ============================================================================
//
// SIZE OPTIMIZER: One Degraded Re-encode of an Oversized Output
//
// Runs when the primary output exceeds the size ceiling. The degradation is
// applied exactly once; the caller re-stats the result and decides whether
// it is acceptable.
//
// POLICY:
// - GIF: new palette at a reduced color count, re-applied to the oversized GIF
// - WebP tier 1: oversized WebP -> x264 intermediate -> 640x360 10fps WebP
// - WebP tier 2 (tier 1 failed): a single still frame as a static WebP
//
// The tier 1 intermediate and the GIF palette never outlive this call.

use super::OutputFormat;
use super::plan::Resolution;
use crate::error::CoreResult;
use crate::external::{FfmpegSpawner, FfmpegStage, StageInput, run_ffmpeg_stage};
use crate::temp_files::{TempArtifact, sibling_path};

use log::{info, warn};
use std::path::{Path, PathBuf};

/// Lowest quality the GIF degradation goes to.
pub const GIF_MIN_QUALITY: u8 = 30;
/// Lowest palette size the GIF degradation goes to.
pub const GIF_MIN_COLORS: u32 = 64;
/// Lowest quality the WebP degradation goes to.
pub const WEBP_MIN_QUALITY: u8 = 50;

/// Fixed frame size of the tier 1 WebP re-encode.
pub const WEBP_OPTIMIZED_RESOLUTION: Resolution = Resolution::LOW;
/// Fixed frame rate of the tier 1 WebP re-encode.
pub const WEBP_OPTIMIZED_FPS: u32 = 10;
/// Constant rate factor of the tier 1 intermediate video.
pub const INTERMEDIATE_CRF: u32 = 28;

/// Degraded GIF settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifDegradation {
    pub quality: u8,
    pub colors: u32,
}

/// GIF degradation for the requested `quality`.
///
/// Depends only on the requested quality, so repeated runs agree.
#[must_use]
pub fn gif_degradation(quality: u8) -> GifDegradation {
    let degraded = ((f64::from(quality) * 0.7).floor() as u8).max(GIF_MIN_QUALITY);
    let colors = ((f64::from(degraded) / 100.0 * 256.0).floor() as u32).max(GIF_MIN_COLORS);
    GifDegradation {
        quality: degraded,
        colors,
    }
}

/// WebP quality used by both optimization tiers.
#[must_use]
pub fn webp_degraded_quality(quality: u8) -> u8 {
    ((f64::from(quality) * 0.6).floor() as u8).max(WEBP_MIN_QUALITY)
}

/// Where the optimized version of `oversized` is written.
#[must_use]
pub fn optimized_path(oversized: &Path, format: OutputFormat) -> PathBuf {
    sibling_path(oversized, "_optimized", format.extension())
}

/// Palette stage and palette application stage for the GIF optimization.
#[must_use]
pub fn gif_optimization_stages(
    oversized: &Path,
    optimized: &Path,
    degradation: GifDegradation,
) -> (FfmpegStage, FfmpegStage) {
    let palette = sibling_path(optimized, "_palette", "png");

    let palette_stage = FfmpegStage {
        label: "optimized palette generation",
        inputs: vec![StageInput::whole(oversized)],
        video_filter: Some(format!("palettegen=max_colors={}", degradation.colors)),
        filter_complex: None,
        output_args: Vec::new(),
        output: palette.clone(),
    };

    let apply_stage = FfmpegStage {
        label: "optimized palette application",
        inputs: vec![StageInput::whole(oversized), StageInput::whole(palette)],
        video_filter: None,
        filter_complex: Some("[0][1]paletteuse".to_string()),
        output_args: vec!["-gifflags".to_string(), "+transdiff".to_string()],
        output: optimized.to_path_buf(),
    };

    (palette_stage, apply_stage)
}

/// The two tier 1 stages for WebP: intermediate video, then the re-encode.
#[must_use]
pub fn webp_tier1_stages(
    oversized: &Path,
    optimized: &Path,
    quality: u8,
) -> (FfmpegStage, FfmpegStage) {
    let intermediate = sibling_path(oversized, "_temp", "mp4");

    let transcode = FfmpegStage {
        label: "intermediate transcode",
        inputs: vec![StageInput::whole(oversized)],
        video_filter: None,
        filter_complex: None,
        output_args: vec![
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "fast".to_string(),
            "-crf".to_string(),
            INTERMEDIATE_CRF.to_string(),
            "-an".to_string(),
        ],
        output: intermediate.clone(),
    };

    let reencode = FfmpegStage {
        label: "optimized webp encode",
        inputs: vec![StageInput::whole(intermediate)],
        video_filter: Some(format!(
            "scale={}:{}",
            WEBP_OPTIMIZED_RESOLUTION.width, WEBP_OPTIMIZED_RESOLUTION.height
        )),
        filter_complex: None,
        output_args: vec![
            "-c:v".to_string(),
            "libwebp".to_string(),
            "-quality".to_string(),
            quality.to_string(),
            "-preset".to_string(),
            "picture".to_string(),
            "-loop".to_string(),
            "0".to_string(),
            "-r".to_string(),
            WEBP_OPTIMIZED_FPS.to_string(),
        ],
        output: optimized.to_path_buf(),
    };

    (transcode, reencode)
}

/// The tier 2 stage for WebP: first frame only, as a static image.
#[must_use]
pub fn webp_still_stage(oversized: &Path, optimized: &Path, quality: u8) -> FfmpegStage {
    FfmpegStage {
        label: "still frame encode",
        inputs: vec![StageInput::whole(oversized)],
        video_filter: None,
        filter_complex: None,
        output_args: vec![
            "-vframes".to_string(),
            "1".to_string(),
            "-c:v".to_string(),
            "libwebp".to_string(),
            "-quality".to_string(),
            quality.to_string(),
        ],
        output: optimized.to_path_buf(),
    }
}

/// Applies the degradation policy once to `oversized`.
///
/// Returns a guard over the optimized file; it is deleted if the caller
/// drops the guard without keeping it. `oversized` itself is left alone.
pub fn optimize_file_size<S: FfmpegSpawner>(
    spawner: &S,
    oversized: &Path,
    format: OutputFormat,
    quality: u8,
) -> CoreResult<TempArtifact> {
    let optimized = TempArtifact::new(optimized_path(oversized, format));

    match format {
        OutputFormat::Gif => {
            let degradation = gif_degradation(quality);
            info!(
                "Optimizing GIF: quality {} -> {}, {} colors",
                quality, degradation.quality, degradation.colors
            );
            let (palette_stage, apply_stage) =
                gif_optimization_stages(oversized, optimized.path(), degradation);
            let _palette = TempArtifact::new(&palette_stage.output);
            run_ffmpeg_stage(spawner, &palette_stage)?;
            run_ffmpeg_stage(spawner, &apply_stage)?;
        }
        OutputFormat::Webp => {
            let degraded = webp_degraded_quality(quality);
            info!("Optimizing WebP: quality {quality} -> {degraded}");

            let (transcode, reencode) = webp_tier1_stages(oversized, optimized.path(), degraded);
            let intermediate = TempArtifact::new(&transcode.output);

            let tier1 = run_ffmpeg_stage(spawner, &transcode)
                .and_then(|()| run_ffmpeg_stage(spawner, &reencode));
            drop(intermediate);

            if let Err(e) = tier1 {
                warn!("WebP re-encode failed, falling back to a still frame: {e}");
                run_ffmpeg_stage(spawner, &webp_still_stage(oversized, optimized.path(), degraded))?;
            }
        }
    }

    Ok(optimized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::external::mocks::MockFfmpegSpawner;
    use std::fs::File;

    #[test]
    fn test_gif_degradation_values() {
        assert_eq!(
            gif_degradation(80),
            GifDegradation {
                quality: 56,
                colors: 143
            }
        );
        // Floors
        assert_eq!(
            gif_degradation(20),
            GifDegradation {
                quality: 30,
                colors: 76
            }
        );
        assert_eq!(gif_degradation(100).quality, 70);
    }

    #[test]
    fn test_gif_degradation_depends_only_on_request_quality() {
        let first = gif_degradation(90);
        let second = gif_degradation(90);
        assert_eq!(first, second);
    }

    #[test]
    fn test_webp_degraded_quality() {
        assert_eq!(webp_degraded_quality(80), 50);
        assert_eq!(webp_degraded_quality(100), 60);
        assert_eq!(webp_degraded_quality(10), 50);
    }

    #[test]
    fn test_gif_optimization_stage_args() {
        let (palette, apply) = gif_optimization_stages(
            Path::new("/out/clip.gif"),
            Path::new("/out/clip_optimized.gif"),
            gif_degradation(80),
        );
        assert_eq!(
            palette.args(),
            vec![
                "-i",
                "/out/clip.gif",
                "-vf",
                "palettegen=max_colors=143",
                "-y",
                "/out/clip_optimized_palette.png",
            ]
        );
        assert_eq!(
            apply.args(),
            vec![
                "-i",
                "/out/clip.gif",
                "-i",
                "/out/clip_optimized_palette.png",
                "-filter_complex",
                "[0][1]paletteuse",
                "-gifflags",
                "+transdiff",
                "-y",
                "/out/clip_optimized.gif",
            ]
        );
    }

    #[test]
    fn test_gif_optimization_removes_palette() {
        let dir = tempfile::tempdir().unwrap();
        let oversized = dir.path().join("clip.gif");
        File::create(&oversized).unwrap();

        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("palettegen=max_colors=143", vec![], true);
        spawner.add_success_expectation("[0][1]paletteuse", vec![], true);

        let optimized = optimize_file_size(&spawner, &oversized, OutputFormat::Gif, 80).unwrap();
        assert_eq!(optimized.path(), dir.path().join("clip_optimized.gif"));
        assert!(optimized.path().exists());
        assert!(oversized.exists());
        assert!(!dir.path().join("clip_optimized_palette.png").exists());
        assert_eq!(spawner.pending_expectations(), 0);
    }

    #[test]
    fn test_webp_tier1_success() {
        let dir = tempfile::tempdir().unwrap();
        let oversized = dir.path().join("clip.webp");
        File::create(&oversized).unwrap();

        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("libx264", vec![], true);
        spawner.add_success_expectation("picture", vec![], true);

        let optimized = optimize_file_size(&spawner, &oversized, OutputFormat::Webp, 80).unwrap();
        let kept = optimized.keep();
        assert!(kept.exists());
        assert!(!dir.path().join("clip_temp.mp4").exists());

        let calls = spawner.get_received_calls();
        assert_eq!(calls.len(), 2);
        let reencode = &calls[1];
        assert!(reencode.windows(2).any(|w| w[0] == "-vf" && w[1] == "scale=640:360"));
        assert!(reencode.windows(2).any(|w| w[0] == "-quality" && w[1] == "50"));
        assert!(reencode.windows(2).any(|w| w[0] == "-r" && w[1] == "10"));
    }

    #[test]
    fn test_webp_tier2_after_intermediate_failure() {
        let dir = tempfile::tempdir().unwrap();
        let oversized = dir.path().join("clip.webp");
        File::create(&oversized).unwrap();
        // Leftover from a partial intermediate encode
        File::create(dir.path().join("clip_temp.mp4")).unwrap();

        let spawner = MockFfmpegSpawner::new();
        spawner.add_exit_error_expectation("libx264", vec![], 1);
        spawner.add_success_expectation("-vframes", vec![], true);

        let optimized = optimize_file_size(&spawner, &oversized, OutputFormat::Webp, 80).unwrap();
        assert!(optimized.path().exists());
        assert!(!dir.path().join("clip_temp.mp4").exists());

        let calls = spawner.get_received_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].iter().any(|a| a == "-vframes"));
    }

    #[test]
    fn test_webp_both_tiers_fail() {
        let dir = tempfile::tempdir().unwrap();
        let oversized = dir.path().join("clip.webp");
        File::create(&oversized).unwrap();

        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("libx264", vec![], true);
        spawner.add_exit_error_expectation("picture", vec![], 1);
        spawner.add_exit_error_expectation("-vframes", vec![], 1);

        let err = optimize_file_size(&spawner, &oversized, OutputFormat::Webp, 80).unwrap_err();
        assert!(matches!(err, CoreError::CommandFailed(..)));
        assert!(!dir.path().join("clip_temp.mp4").exists());
        assert!(!dir.path().join("clip_optimized.webp").exists());
    }
}

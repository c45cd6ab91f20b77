// ============================================================================
// animclip-core/src/conversion/plan.rs
// ============================================================================
//
// PROCESSING PLAN: Request to FFmpeg Stage Mapping
//
// Pure functions that translate a ConversionRequest into the ffmpeg stages
// that produce it. Nothing here touches the filesystem or spawns processes;
// the orchestrator runs the resulting stages.
//
// TIERS:
// - Resolution (both formats): >30s 640x360, >15s 720x405, else 800x450
// - GIF frame rate from quality (5-20), colors from quality (32-256)
// - WebP frame rate from duration: >30s 10, >15s 12, >5s 15, else 20
//
// GIF is two-stage (palettegen, then paletteuse with dithering); WebP is a
// single libwebp encode.

use super::{ConversionRequest, OutputFormat};
use crate::external::{FfmpegStage, StageInput, Trim, VideoFilterChain};
use crate::temp_files::sibling_path;

use std::fmt;
use std::path::{Path, PathBuf};

/// Frame rate WebP fade lengths are divided by, regardless of target fps.
pub const WEBP_FADE_REFERENCE_FPS: f64 = 30.0;

/// WebP clips longer than this get their quality lowered up front.
pub const WEBP_LONG_CLIP_SECS: f64 = 20.0;

/// Floor for the up-front WebP quality reduction.
pub const WEBP_LONG_CLIP_QUALITY_FLOOR: u8 = 70;

/// Output frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const LOW: Resolution = Resolution::new(640, 360);
    pub const MEDIUM: Resolution = Resolution::new(720, 405);
    pub const HIGH: Resolution = Resolution::new(800, 450);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One entry of a video filter chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    FadeIn { duration: f64 },
    FadeOut { start: f64, duration: f64 },
    /// Lanczos scaling to a fixed size
    Scale(Resolution),
    FrameRate(u32),
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::FadeIn { duration } => write!(f, "fade=t=in:st=0:d={duration}"),
            Filter::FadeOut { start, duration } => write!(f, "fade=t=out:st={start}:d={duration}"),
            Filter::Scale(res) => write!(f, "scale={}:{}:flags=lanczos", res.width, res.height),
            Filter::FrameRate(fps) => write!(f, "fps={fps}"),
        }
    }
}

/// Everything needed to produce one output, derived from a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingPlan {
    pub format: OutputFormat,
    pub trim: Trim,
    pub resolution: Resolution,
    pub fps: u32,
    /// Palette size, GIF only
    pub colors: Option<u32>,
    /// Encoder quality after any adjustment
    pub quality: u8,
    /// Filter chain of the final encode, in order
    pub filters: Vec<Filter>,
    /// ffmpeg invocations, run in order
    pub stages: Vec<FfmpegStage>,
    /// Files the stages create that are not the output
    pub intermediates: Vec<PathBuf>,
    pub output: PathBuf,
}

impl ProcessingPlan {
    pub fn has_fade_in(&self) -> bool {
        self.filters.iter().any(|f| matches!(f, Filter::FadeIn { .. }))
    }

    pub fn has_fade_out(&self) -> bool {
        self.filters.iter().any(|f| matches!(f, Filter::FadeOut { .. }))
    }
}

/// Resolution tier for a clip of `duration` seconds.
#[must_use]
pub fn resolution_for(duration: f64) -> Resolution {
    if duration > 30.0 {
        Resolution::LOW
    } else if duration > 15.0 {
        Resolution::MEDIUM
    } else {
        Resolution::HIGH
    }
}

/// GIF frame rate: `round(5 + q/100 * 15)`.
#[must_use]
pub fn gif_fps(quality: u8) -> u32 {
    (5.0 + (f64::from(quality) / 100.0) * 15.0).round() as u32
}

/// GIF palette size: `round(32 + q/100 * 224)`.
#[must_use]
pub fn gif_colors(quality: u8) -> u32 {
    (32.0 + (f64::from(quality) / 100.0) * 224.0).round() as u32
}

/// WebP frame rate tier for a clip of `duration` seconds.
#[must_use]
pub fn webp_fps(duration: f64) -> u32 {
    if duration > 30.0 {
        10
    } else if duration > 15.0 {
        12
    } else if duration > 5.0 {
        15
    } else {
        20
    }
}

/// libwebp quality: long clips get `max(70, q - 10)`, others keep `q`.
#[must_use]
pub fn webp_quality(quality: u8, duration: f64) -> u8 {
    if duration > WEBP_LONG_CLIP_SECS {
        quality.saturating_sub(10).max(WEBP_LONG_CLIP_QUALITY_FLOOR)
    } else {
        quality
    }
}

/// Fade filters for a clip, lengths in frames divided by `frame_rate`.
///
/// The fade-out ends at the clip end and is dropped when its start would not
/// be strictly positive.
#[must_use]
pub fn fade_filters(
    fade_in_frames: u32,
    fade_out_frames: u32,
    frame_rate: f64,
    duration: f64,
) -> Vec<Filter> {
    let mut filters = Vec::with_capacity(2);

    if fade_in_frames > 0 {
        filters.push(Filter::FadeIn {
            duration: f64::from(fade_in_frames) / frame_rate,
        });
    }

    if fade_out_frames > 0 {
        let fade_duration = f64::from(fade_out_frames) / frame_rate;
        let start = duration - fade_duration;
        if start > 0.0 {
            filters.push(Filter::FadeOut {
                start,
                duration: fade_duration,
            });
        }
    }

    filters
}

/// Builds the plan converting `source` into `output` for `request`.
///
/// The request is assumed to be validated.
#[must_use]
pub fn build_plan(request: &ConversionRequest, source: &Path, output: &Path) -> ProcessingPlan {
    match request.format {
        OutputFormat::Gif => gif_plan(request, source, output),
        OutputFormat::Webp => webp_plan(request, source, output),
    }
}

fn trim_of(request: &ConversionRequest) -> Trim {
    Trim {
        start: request.start_time,
        duration: request.duration(),
    }
}

fn gif_plan(request: &ConversionRequest, source: &Path, output: &Path) -> ProcessingPlan {
    let trim = trim_of(request);
    let fps = gif_fps(request.quality);
    let colors = gif_colors(request.quality);
    let resolution = resolution_for(trim.duration);

    let mut filters = fade_filters(
        request.fade_in_frames,
        request.fade_out_frames,
        f64::from(fps),
        trim.duration,
    );
    filters.push(Filter::Scale(resolution));

    let palette = sibling_path(output, "_palette", "png");

    let palette_graph = VideoFilterChain::new()
        .extend(&filters)
        .add_filter(format!("palettegen=max_colors={colors}:stats_mode=full"))
        .build();

    filters.push(Filter::FrameRate(fps));
    // Never empty: scale and fps are always present
    let chain = VideoFilterChain::new().extend(&filters).build().unwrap_or_default();

    let stages = vec![
        FfmpegStage {
            label: "palette generation",
            inputs: vec![StageInput::trimmed(source, trim)],
            video_filter: palette_graph,
            filter_complex: None,
            output_args: Vec::new(),
            output: palette.clone(),
        },
        FfmpegStage {
            label: "palette application",
            inputs: vec![StageInput::trimmed(source, trim), StageInput::whole(&palette)],
            video_filter: None,
            filter_complex: Some(format!(
                "{chain}[x];[x][1:v]paletteuse=dither=floyd_steinberg"
            )),
            output_args: vec!["-gifflags".to_string(), "+transdiff".to_string()],
            output: output.to_path_buf(),
        },
    ];

    ProcessingPlan {
        format: OutputFormat::Gif,
        trim,
        resolution,
        fps,
        colors: Some(colors),
        quality: request.quality,
        filters,
        stages,
        intermediates: vec![palette],
        output: output.to_path_buf(),
    }
}

fn webp_plan(request: &ConversionRequest, source: &Path, output: &Path) -> ProcessingPlan {
    let trim = trim_of(request);
    let fps = webp_fps(trim.duration);
    let quality = webp_quality(request.quality, trim.duration);
    let resolution = resolution_for(trim.duration);

    let mut filters = fade_filters(
        request.fade_in_frames,
        request.fade_out_frames,
        WEBP_FADE_REFERENCE_FPS,
        trim.duration,
    );
    filters.push(Filter::Scale(resolution));

    let stage = FfmpegStage {
        label: "webp encode",
        inputs: vec![StageInput::trimmed(source, trim)],
        video_filter: VideoFilterChain::new().extend(&filters).build(),
        filter_complex: None,
        output_args: vec![
            "-c:v".to_string(),
            "libwebp".to_string(),
            "-quality".to_string(),
            quality.to_string(),
            "-preset".to_string(),
            "default".to_string(),
            "-loop".to_string(),
            "0".to_string(),
            "-r".to_string(),
            fps.to_string(),
        ],
        output: output.to_path_buf(),
    };

    ProcessingPlan {
        format: OutputFormat::Webp,
        trim,
        resolution,
        fps,
        colors: None,
        quality,
        filters,
        stages: vec![stage],
        intermediates: Vec::new(),
        output: output.to_path_buf(),
    }
}

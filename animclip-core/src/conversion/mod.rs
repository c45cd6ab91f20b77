// ============================================================================
// animclip-core/src/conversion/mod.rs
// ============================================================================
//
// CONVERSION: Request, Result and Pipeline Modules
//
// This module defines the data exchanged with callers of the conversion
// pipeline and wires together its parts.
//
// KEY COMPONENTS:
// - ConversionRequest: time range, quality, fades, format, optional name
// - ConversionResult: serializable outcome handed back to the front end
// - plan: pure mapping from a request to ffmpeg stages
// - optimizer: degraded re-encode for outputs over the size ceiling
// - orchestrator: validation, sequencing, size check and cleanup
//
// WORKFLOW:
// 1. Validate the request (duration bounds, quality range)
// 2. Build a processing plan and run its stages
// 3. Stat the output; run the optimizer once if it exceeds the ceiling
// 4. Reclaim every temporary artifact and report the result

pub mod optimizer;
pub mod orchestrator;
pub mod plan;

pub use optimizer::{GifDegradation, gif_degradation, optimize_file_size, webp_degraded_quality};
pub use orchestrator::{PipelineState, convert_video};
pub use plan::{Filter, ProcessingPlan, Resolution, build_plan};

use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::temp_files;
use crate::utils::sanitize_output_name;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default segment start in seconds.
pub const DEFAULT_START_TIME: f64 = 0.0;
/// Default segment end in seconds.
pub const DEFAULT_END_TIME: f64 = 5.0;
/// Default quality on the 0-100 scale.
pub const DEFAULT_QUALITY: u8 = 80;
/// Default fade length in frames, for both fade-in and fade-out.
pub const DEFAULT_FADE_FRAMES: u32 = 10;
/// Highest accepted quality value.
pub const MAX_QUALITY: u8 = 100;

/// Animated image format produced by a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Gif,
    Webp,
}

impl OutputFormat {
    /// File extension, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Gif => "gif",
            OutputFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gif" => Ok(OutputFormat::Gif),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(CoreError::Validation(format!(
                "unsupported output format '{other}', expected gif or webp"
            ))),
        }
    }
}

/// Parameters of a single conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionRequest {
    /// Segment start in seconds
    pub start_time: f64,
    /// Segment end in seconds
    pub end_time: f64,
    /// 0-100; drives frame rate, color count and encoder quality
    pub quality: u8,
    pub fade_in_frames: u32,
    pub fade_out_frames: u32,
    pub format: OutputFormat,
    /// Output name without extension; sanitized before use
    pub custom_filename: Option<String>,
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self {
            start_time: DEFAULT_START_TIME,
            end_time: DEFAULT_END_TIME,
            quality: DEFAULT_QUALITY,
            fade_in_frames: DEFAULT_FADE_FRAMES,
            fade_out_frames: DEFAULT_FADE_FRAMES,
            format: OutputFormat::default(),
            custom_filename: None,
        }
    }
}

impl ConversionRequest {
    /// Length of the requested segment in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Checks the request against the segment limit.
    pub fn validate(&self, max_segment_secs: f64) -> CoreResult<()> {
        if !self.start_time.is_finite() || !self.end_time.is_finite() || self.start_time < 0.0 {
            return Err(CoreError::Validation(
                "start and end times must be non-negative numbers".to_string(),
            ));
        }

        let duration = self.duration();
        if duration <= 0.0 {
            return Err(CoreError::Validation(
                "end time must be greater than start time".to_string(),
            ));
        }
        if duration > max_segment_secs {
            return Err(CoreError::Validation(format!(
                "segment duration cannot exceed {max_segment_secs} seconds"
            )));
        }
        if self.quality > MAX_QUALITY {
            return Err(CoreError::Validation(format!(
                "quality must be between 0 and {MAX_QUALITY}, got {}",
                self.quality
            )));
        }
        Ok(())
    }

    /// File name for the converted output.
    ///
    /// A non-blank custom name is sanitized and used as-is; otherwise the
    /// name is `converted_<millis>_<random>` so concurrent runs never collide.
    #[must_use]
    pub fn output_file_name(&self) -> String {
        let ext = self.format.extension();
        match self.custom_filename.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("{}.{ext}", sanitize_output_name(name)),
            _ => format!(
                "converted_{}_{}.{ext}",
                temp_files::timestamp_millis(),
                temp_files::random_suffix(6)
            ),
        }
    }
}

/// Outcome of a conversion, ready to be serialized for the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ConversionResult {
    /// A successful result pointing at the final artifact.
    pub fn succeeded(path: &Path, file_size: u64, message: impl Into<String>) -> Self {
        Self {
            success: true,
            file_size: Some(file_size),
            output_filename: path.file_name().map(|n| n.to_string_lossy().into_owned()),
            output_path: Some(path.to_path_buf()),
            message: Some(message.into()),
            error: None,
            error_kind: None,
        }
    }

    /// A failed result describing `err`.
    pub fn failed(err: &CoreError) -> Self {
        Self {
            success: false,
            file_size: None,
            output_filename: None,
            output_path: None,
            message: None,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
        }
    }

    /// Serializes the result as pretty-printed JSON.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

//! Configuration structures and constants for the animclip-core library.
//!
//! This module provides the configuration for the conversion pipeline:
//! where uploads and outputs live, the output size ceiling, segment limits,
//! and how long ffmpeg may run before it is killed.

mod builder;

use crate::error::{CoreError, CoreResult};
use std::path::PathBuf;
use std::time::Duration;

pub use builder::CoreConfigBuilder;

// Default constants

/// Maximum acceptable output size before the optimizer runs (20 MiB).
pub const DEFAULT_MAX_OUTPUT_SIZE: u64 = 20 * 1024 * 1024;

/// Maximum accepted source file size (100 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Longest segment, in seconds, that may be converted.
pub const DEFAULT_MAX_SEGMENT_SECS: f64 = 60.0;

/// Default ffmpeg timeout per stage.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;

/// Age after which leftover artifacts are swept (24 hours).
pub const DEFAULT_ARTIFACT_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Directory that receives staged uploads.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Directory that receives converted outputs and their intermediates.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Main configuration structure for the animclip-core library.
///
/// All fields have sensible defaults. The builder pattern provides a
/// convenient way to create and configure instances.
///
/// # Examples
///
/// ```rust,no_run
/// use animclip_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
/// use std::time::Duration;
///
/// let config = CoreConfigBuilder::new()
///     .upload_dir(PathBuf::from("/tmp/animclip/uploads"))
///     .output_dir(PathBuf::from("/tmp/animclip/out"))
///     .max_output_size(10 * 1024 * 1024)
///     .command_timeout(Some(Duration::from_secs(120)))
///     .build();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory where staged source videos are written
    pub upload_dir: PathBuf,

    /// Directory where converted outputs and their intermediates are written
    pub output_dir: PathBuf,

    /// Output size ceiling in bytes; larger outputs trigger the optimizer
    pub max_output_size: u64,

    /// Largest source file accepted by `receive_upload`
    pub max_upload_size: u64,

    /// Longest convertible segment in seconds
    pub max_segment_secs: f64,

    /// Per-stage ffmpeg timeout; `None` waits indefinitely
    pub command_timeout: Option<Duration>,

    /// Artifacts older than this are removed by `sweep_stale`
    pub artifact_max_age: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_output_size: DEFAULT_MAX_OUTPUT_SIZE,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            max_segment_secs: DEFAULT_MAX_SEGMENT_SECS,
            command_timeout: Some(Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS)),
            artifact_max_age: Duration::from_secs(DEFAULT_ARTIFACT_MAX_AGE_SECS),
        }
    }
}

impl CoreConfig {
    /// Creates a configuration with the given directories and default limits.
    pub fn new(upload_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            upload_dir,
            output_dir,
            ..Self::default()
        }
    }

    /// Checks the limits for values the pipeline cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_output_size == 0 {
            return Err(CoreError::Config(
                "max_output_size must be greater than zero".to_string(),
            ));
        }
        if self.max_upload_size == 0 {
            return Err(CoreError::Config(
                "max_upload_size must be greater than zero".to_string(),
            ));
        }
        if !self.max_segment_secs.is_finite() || self.max_segment_secs <= 0.0 {
            return Err(CoreError::Config(format!(
                "max_segment_secs must be a positive number, got {}",
                self.max_segment_secs
            )));
        }
        if self.command_timeout.is_some_and(|t| t.is_zero()) {
            return Err(CoreError::Config(
                "command_timeout must be non-zero; use None to disable it".to_string(),
            ));
        }
        Ok(())
    }

    /// Creates the upload and output directories if they are missing.
    pub fn ensure_directories(&self) -> CoreResult<()> {
        for dir in [&self.upload_dir, &self.output_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                CoreError::PathError(format!(
                    "Failed to create directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_output_size, 20 * 1024 * 1024);
        assert_eq!(config.max_segment_secs, 60.0);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let mut config = CoreConfig::default();
        config.max_output_size = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = CoreConfig::default();
        config.max_segment_secs = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = CoreConfig::default();
        config.command_timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());

        let mut config = CoreConfig::default();
        config.command_timeout = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ensure_directories_creates_both() {
        let tmp = tempfile::tempdir().unwrap();
        let config = CoreConfig::new(tmp.path().join("up"), tmp.path().join("out"));
        config.ensure_directories().unwrap();
        assert!(config.upload_dir.is_dir());
        assert!(config.output_dir.is_dir());
    }
}

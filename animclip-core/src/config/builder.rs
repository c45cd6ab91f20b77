// ============================================================================
// animclip-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// This module implements the builder pattern for the CoreConfig structure,
// providing a fluent API for creating and configuring CoreConfig instances.
// Every field starts at its default, so callers only set what they override.

// ---- Standard library imports ----
use std::path::PathBuf;
use std::time::Duration;

// ---- Internal crate imports ----
use super::CoreConfig;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use animclip_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .output_dir(PathBuf::from("/path/to/output"))
///     .max_segment_secs(30.0)
///     .build();
/// assert_eq!(config.max_segment_secs, 30.0);
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl Default for CoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values.
    pub fn new() -> Self {
        Self {
            config: CoreConfig::default(),
        }
    }

    /// Sets the directory staged uploads are written to.
    pub fn upload_dir(mut self, dir: PathBuf) -> Self {
        self.config.upload_dir = dir;
        self
    }

    /// Sets the directory converted outputs are written to.
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output_dir = dir;
        self
    }

    /// Sets the output size ceiling in bytes.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Outputs larger than this trigger the size optimizer
    ///
    /// # Returns
    ///
    /// * Self for method chaining
    pub fn max_output_size(mut self, bytes: u64) -> Self {
        self.config.max_output_size = bytes;
        self
    }

    /// Sets the largest accepted source file in bytes.
    pub fn max_upload_size(mut self, bytes: u64) -> Self {
        self.config.max_upload_size = bytes;
        self
    }

    /// Sets the longest convertible segment in seconds.
    pub fn max_segment_secs(mut self, secs: f64) -> Self {
        self.config.max_segment_secs = secs;
        self
    }

    /// Sets the per-stage ffmpeg timeout. `None` disables it.
    pub fn command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.command_timeout = timeout;
        self
    }

    /// Sets the age after which leftover artifacts are swept.
    pub fn artifact_max_age(mut self, age: Duration) -> Self {
        self.config.artifact_max_age = age;
        self
    }

    /// Builds the CoreConfig instance.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_config_defaults() {
        let built = CoreConfigBuilder::new().build();
        let default = CoreConfig::default();
        assert_eq!(built.max_output_size, default.max_output_size);
        assert_eq!(built.command_timeout, default.command_timeout);
        assert_eq!(built.upload_dir, default.upload_dir);
    }

    #[test]
    fn test_builder_overrides() {
        let config = CoreConfigBuilder::new()
            .upload_dir(PathBuf::from("/a"))
            .output_dir(PathBuf::from("/b"))
            .max_output_size(1024)
            .max_upload_size(2048)
            .command_timeout(None)
            .artifact_max_age(Duration::from_secs(60))
            .build();

        assert_eq!(config.upload_dir, PathBuf::from("/a"));
        assert_eq!(config.output_dir, PathBuf::from("/b"));
        assert_eq!(config.max_output_size, 1024);
        assert_eq!(config.max_upload_size, 2048);
        assert_eq!(config.command_timeout, None);
        assert_eq!(config.artifact_max_age, Duration::from_secs(60));
    }
}

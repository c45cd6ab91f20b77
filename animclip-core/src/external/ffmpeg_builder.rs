//! FFmpeg command builder utilities
//!
//! This module provides a builder pattern for constructing FFmpeg commands
//! with the common options every stage shares, and a helper for joining
//! video filters into a single chain.

use ffmpeg_sidecar::command::FfmpegCommand;
use std::fmt::Display;

/// Builder for creating `FFmpeg` commands with common configurations
pub struct FfmpegCommandBuilder {
    cmd: FfmpegCommand,
}

impl Default for FfmpegCommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegCommandBuilder {
    /// Creates a new `FFmpeg` command builder with sensible defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            cmd: FfmpegCommand::new(),
        }
    }

    /// Builds the `FFmpeg` command with all configured options
    #[must_use]
    pub fn build(mut self) -> FfmpegCommand {
        self.cmd.arg("-hide_banner");
        self.cmd
    }
}

/// Builder for constructing video filter chains
#[derive(Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter to the chain. Empty filters are ignored.
    #[must_use]
    pub fn add_filter(mut self, filter: impl Display) -> Self {
        let filter = filter.to_string();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Adds every filter from an iterator, in order
    #[must_use]
    pub fn extend<I, T>(self, filters: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        filters.into_iter().fold(self, Self::add_filter)
    }

    /// Builds the filter chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}

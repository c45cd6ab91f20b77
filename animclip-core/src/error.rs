// ============================================================================
// animclip-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Core Error Types
//
// This module defines the error type shared by every part of the core
// library, the result alias built on it, and the coarse classification that
// conversion results expose to callers.
//
// KEY COMPONENTS:
// - CoreError: All failure modes of the conversion pipeline
// - CoreResult: Result alias used throughout the crate
// - ErrorKind: Caller-facing classification of a failed conversion
// - command_*_error helpers: Uniform construction of process errors

use serde::{Deserialize, Serialize};
use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by the animclip core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    /// The request parameters are out of bounds. User-correctable.
    #[error("{0}")]
    Validation(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Required dependency '{0}' not found")]
    DependencyNotFound(String),

    #[error("Failed to start '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed while waiting for '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    /// Non-zero exit. The last field holds the diagnostics ffmpeg reported.
    #[error("'{0}' failed ({1}): {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("'{0}' timed out after {1:?}")]
    CommandTimeout(String, Duration),

    #[error("{0}")]
    OptimizationExhausted(String),

    #[error("JSON error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for animclip core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Classification of a failed conversion as reported in a `ConversionResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad request parameters or an input file that cannot be converted.
    Validation,
    /// ffmpeg could not be started, exited non-zero, or timed out.
    ToolExecution,
    /// The output stayed over the size ceiling after the optimizer ran.
    OptimizationExhausted,
    /// Anything else: filesystem trouble, configuration problems.
    Internal,
}

impl CoreError {
    /// Maps this error onto the classification exposed to callers.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) | CoreError::UnsupportedInput(_) => ErrorKind::Validation,
            CoreError::CommandStart(..)
            | CoreError::CommandWait(..)
            | CoreError::CommandFailed(..)
            | CoreError::CommandTimeout(..)
            | CoreError::DependencyNotFound(_) => ErrorKind::ToolExecution,
            CoreError::OptimizationExhausted(_) => ErrorKind::OptimizationExhausted,
            _ => ErrorKind::Internal,
        }
    }
}

/// Builds the error for a process that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds the error for a process whose exit status could not be collected.
pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

/// Builds the error for a process that exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    diagnostics: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, diagnostics.into())
}

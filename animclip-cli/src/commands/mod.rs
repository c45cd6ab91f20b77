//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Converts a video segment into a GIF or WebP.
pub mod convert;

/// Removes stale or all workspace files.
pub mod cleanup;

/// Reports host and workspace status.
pub mod info;

pub use cleanup::run_cleanup;
pub use convert::run_convert;
pub use info::run_info;

//! Logging to a file instead of the terminal.
//!
//! Used by the CLI when a log directory is given. Each run gets its own
//! timestamped file so concurrent or repeated runs never interleave.

mod setup;

pub use setup::{LOG_PATTERN, setup_file_logging};

use chrono::Local;
use std::path::{Path, PathBuf};

/// Path of a new log file inside `log_dir`: `animclip_<YYYYmmdd_HHMMSS>.log`.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("animclip_{}.log", Local::now().format("%Y%m%d_%H%M%S")))
}

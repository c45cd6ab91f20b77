// ============================================================================
// animclip-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Terminal and File Logging
//
// All user-facing output flows through the `log` facade. Without a log
// directory env_logger prints bare messages to stderr; with one, the core's
// log4rs setup writes a timestamped file and mirrors messages to stderr.
//
// USAGE:
// - default: info level
// - --verbose: debug level, including every ffmpeg command line
// - RUST_LOG overrides the level when no log directory is given

use crate::error::CliResult;

use animclip_core::CoreError;
use animclip_core::file_logging::{log_file_path, setup_file_logging};
use log::LevelFilter;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Level used for a run with or without `--verbose`.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger. Returns the log file path when one was
/// requested.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let level = level_for(verbose);

    let Some(dir) = log_dir else {
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .init();
        return Ok(None);
    };

    let log_file = log_file_path(dir);
    setup_file_logging(&log_file, level).map_err(|e| {
        CoreError::OperationFailed(format!(
            "Failed to set up logging in {}: {}",
            dir.display(),
            e
        ))
    })?;
    log::debug!("Run started at {}", get_timestamp());
    Ok(Some(log_file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format() {
        let ts = get_timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(ts.as_bytes()[8], b'_');
        assert!(ts.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_level_for_verbose() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Info);
    }
}

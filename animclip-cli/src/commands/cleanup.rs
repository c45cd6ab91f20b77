//! The `cleanup` command.

use crate::cli::{Cli, CleanupArgs};
use crate::config::workspace_config;
use crate::error::CliResult;
use crate::terminal;

use animclip_core::{SweepReport, clear_all, sweep_stale};
use std::time::SystemTime;

/// Removes stale artifacts, or everything with `--all`.
pub fn run_cleanup(cli: &Cli, args: &CleanupArgs) -> CliResult<SweepReport> {
    let config = workspace_config(cli).build();

    terminal::print_section("Cleanup");
    terminal::print_status("Uploads", &config.upload_dir.display().to_string(), false);
    terminal::print_status("Outputs", &config.output_dir.display().to_string(), false);

    let report = if args.all {
        clear_all(&config)
    } else {
        sweep_stale(&config, SystemTime::now())
    };

    if report.failed > 0 {
        terminal::print_warning(&format!(
            "Removed {} file(s); {} could not be removed",
            report.removed, report.failed
        ));
    } else {
        terminal::print_success(&format!("Removed {} file(s)", report.removed));
    }
    Ok(report)
}

//! The `info` command: host details and workspace status.

use crate::cli::{Cli, InfoArgs};
use crate::config::workspace_config;
use crate::error::CliResult;
use crate::terminal;

use animclip_core::{SystemInfo, format_bytes};

/// Prints host and workspace information.
pub fn run_info(cli: &Cli, args: &InfoArgs) -> CliResult<()> {
    let config = workspace_config(cli).build();
    let info = SystemInfo::collect(&config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    terminal::print_section("System");
    terminal::print_status("Hostname", &info.hostname, false);
    terminal::print_status("OS", &info.os, false);
    terminal::print_status("CPU", &info.cpu, false);
    terminal::print_status("Memory", &memory_line(&info), false);
    if let Some(uptime) = info.uptime_secs {
        terminal::print_status("Uptime", &format_uptime(uptime), false);
    }

    terminal::print_section("Workspace");
    terminal::print_status(
        "ffmpeg",
        if info.ffmpeg_available { "found" } else { "not found" },
        false,
    );
    terminal::print_status("Uploads", &config.upload_dir.display().to_string(), false);
    terminal::print_status("Pending", &info.upload_count.to_string(), false);
    terminal::print_status("Outputs", &config.output_dir.display().to_string(), false);
    Ok(())
}

fn memory_line(info: &SystemInfo) -> String {
    match (info.available_memory, info.total_memory) {
        (Some(available), Some(total)) => {
            format!("{} free of {}", format_bytes(available), format_bytes(total))
        }
        (None, Some(total)) => format_bytes(total),
        _ => "unknown".to_string(),
    }
}

fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else {
        format!("{hours}h {minutes}m")
    }
}

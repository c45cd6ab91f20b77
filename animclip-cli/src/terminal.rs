//! Terminal UI components and styling for animclip.
//!
//! Output goes through the `log` macros so it reaches both the terminal and
//! any log file. Lines are indented by hierarchy level and colored unless
//! NO_COLOR is set.

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::sync::{LazyLock, Mutex};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

/// Visual hierarchy levels in the CLI output
#[derive(Debug, Clone, Copy)]
pub enum OutputLevel {
    /// Main sections (===== SECTION =====)
    Section,
    /// Processing steps (» Step)
    Subsection,
    /// Items under a step
    Progress,
    /// Key-value status information
    Status,
}

impl OutputLevel {
    fn indent(&self) -> &'static str {
        match self {
            OutputLevel::Section => "",
            OutputLevel::Subsection => "  ",
            OutputLevel::Progress => "    ",
            OutputLevel::Status => "      ",
        }
    }
}

const STATUS_LABEL_WIDTH: usize = 15;

static SPINNER: LazyLock<Mutex<Option<ProgressBar>>> = LazyLock::new(|| Mutex::new(None));

/// Check if color should be used (respects NO_COLOR environment variable)
fn should_use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Print an item at the specified hierarchy level
pub fn print_item(level: OutputLevel, symbol: Option<&str>, text: &str, bold: bool) {
    let indent = level.indent();
    let prefix = symbol.map(|s| format!("{s} ")).unwrap_or_default();

    if should_use_color() && bold {
        info!("{indent}{prefix}{}", style(text).bold());
    } else {
        info!("{indent}{prefix}{text}");
    }
}

/// Print a processing step
pub fn print_processing(message: &str) {
    info!("");
    print_item(OutputLevel::Subsection, Some("»"), message, true);
}

/// Print a sub-item under a processing step
pub fn print_sub_item(message: &str) {
    print_item(OutputLevel::Progress, None, message, false);
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let padding = STATUS_LABEL_WIDTH.saturating_sub(label.width()).max(1);
    let indent = OutputLevel::Status.indent();

    if !should_use_color() {
        info!("{indent}{label}:{} {value}", " ".repeat(padding));
        return;
    }

    let colored_value = match () {
        () if label.contains("Reduction") => match value.strip_suffix('%') {
            Some(pct) if pct.parse::<u64>().is_ok_and(|p| p >= 50) => value.green().to_string(),
            _ => value.to_string(),
        },
        () if value == "missing" || value == "not found" => value.yellow().to_string(),
        () if label.contains("Quality") || label.contains("Format") => value.bold().to_string(),
        () if highlight => value.bold().to_string(),
        () => value.to_string(),
    };
    info!("{indent}{label}:{} {colored_value}", " ".repeat(padding));
}

/// Print a success message
pub fn print_success(message: &str) {
    info!("");
    if should_use_color() {
        info!("  ✓ {}", message.green());
    } else {
        info!("  ✓ {message}");
    }
}

/// Print a warning message
pub fn print_warning(message: &str) {
    if should_use_color() {
        info!("  ⚠ {}", message.yellow());
    } else {
        info!("  ⚠ {message}");
    }
}

/// Print an error message
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    info!("");
    if should_use_color() {
        info!("✗ {}", title.red().bold());
    } else {
        info!("✗ {title}");
    }

    info!("");
    info!("  Message:  {message}");

    if let Some(suggestion_text) = suggestion {
        info!("");
        info!("  Suggestion: {suggestion_text}");
    }

    info!("");
}

/// Starts a spinner on stderr while ffmpeg runs. Hidden when stderr is not
/// a terminal.
pub fn start_spinner(message: &str) {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("  {spinner} {msg} ({elapsed})") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(message.to_string());

    if !std::io::stderr().is_terminal() {
        spinner.set_draw_target(ProgressDrawTarget::hidden());
    }
    spinner.enable_steady_tick(Duration::from_millis(100));

    if let Ok(mut current) = SPINNER.lock() {
        if let Some(previous) = current.replace(spinner) {
            previous.finish_and_clear();
        }
    }
}

/// Removes the spinner started by [`start_spinner`], if any.
pub fn clear_spinner() {
    if let Ok(mut current) = SPINNER.lock() {
        if let Some(spinner) = current.take() {
            spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_grows_with_level() {
        assert!(OutputLevel::Section.indent().is_empty());
        assert!(OutputLevel::Subsection.indent().len() < OutputLevel::Progress.indent().len());
        assert!(OutputLevel::Progress.indent().len() < OutputLevel::Status.indent().len());
    }

    #[test]
    fn test_spinner_start_and_clear() {
        start_spinner("Encoding");
        start_spinner("Optimizing");
        clear_spinner();
        assert!(SPINNER.lock().unwrap().is_none());
        clear_spinner();
    }
}

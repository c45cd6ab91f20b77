//! Host and workspace status, as shown by `animclip info`.

use crate::config::CoreConfig;
use crate::external::check_dependency;

use serde::Serialize;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    /// `std::env::consts::OS`, e.g. `linux`
    pub platform: String,
    pub hostname: String,
    pub os: String,
    pub cpu: String,
    pub total_memory: Option<u64>,
    pub available_memory: Option<u64>,
    /// Host uptime in seconds
    pub uptime_secs: Option<u64>,
    pub ffmpeg_available: bool,
    /// Staged uploads waiting in the upload directory
    pub upload_count: usize,
}

impl SystemInfo {
    pub fn collect(config: &CoreConfig) -> Self {
        let (total_memory, available_memory) = get_memory_info();
        Self {
            platform: std::env::consts::OS.to_string(),
            hostname: get_hostname(),
            os: get_os_info(),
            cpu: get_cpu_info(),
            total_memory,
            available_memory,
            uptime_secs: get_uptime(),
            ffmpeg_available: check_dependency("ffmpeg").is_ok(),
            upload_count: count_files(&config.upload_dir),
        }
    }
}

/// Number of regular files directly inside `dir`; 0 if it cannot be read.
pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
                .count()
        })
        .unwrap_or(0)
}

fn get_hostname() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| {
            Command::new("hostname")
                .output()
                .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                .map_err(|_| std::env::VarError::NotPresent)
        })
        .unwrap_or_else(|_| "Unknown".to_string())
}

fn get_os_info() -> String {
    #[cfg(target_os = "macos")]
    {
        Command::new("sw_vers")
            .args(["-productVersion"])
            .output()
            .map(|output| {
                format!(
                    "macOS {}",
                    String::from_utf8_lossy(&output.stdout).trim()
                )
            })
            .unwrap_or_else(|_| "macOS".to_string())
    }

    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/etc/os-release")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find_map(|line| line.strip_prefix("PRETTY_NAME="))
                    .map(|value| value.trim_matches('"').to_string())
            })
            .unwrap_or_else(|| {
                // Fallback to uname
                Command::new("uname")
                    .args(["-s", "-r"])
                    .output()
                    .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                    .unwrap_or_else(|_| "Linux".to_string())
            })
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        std::env::consts::OS.to_string()
    }
}

fn get_cpu_info() -> String {
    #[cfg(target_os = "macos")]
    {
        Command::new("sysctl")
            .args(["-n", "machdep.cpu.brand_string"])
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_else(|_| "Unknown CPU".to_string())
    }

    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|line| line.starts_with("model name"))
                    .and_then(|line| line.split(':').nth(1))
                    .map(|name| name.trim().to_string())
            })
            .unwrap_or_else(|| "Unknown CPU".to_string())
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        "Unknown CPU".to_string()
    }
}

/// Total and available memory in bytes.
fn get_memory_info() -> (Option<u64>, Option<u64>) {
    #[cfg(target_os = "macos")]
    {
        let total = Command::new("sysctl")
            .args(["-n", "hw.memsize"])
            .output()
            .ok()
            .and_then(|output| String::from_utf8_lossy(&output.stdout).trim().parse().ok());
        (total, None)
    }

    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/meminfo")
            .map(|content| {
                (
                    meminfo_bytes(&content, "MemTotal:"),
                    meminfo_bytes(&content, "MemAvailable:"),
                )
            })
            .unwrap_or((None, None))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        (None, None)
    }
}

// /proc/meminfo reports kB
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn meminfo_bytes(content: &str, key: &str) -> Option<u64> {
    content
        .lines()
        .find(|line| line.starts_with(key))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb * 1024)
}

fn get_uptime() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/uptime")
            .ok()
            .and_then(|content| {
                content
                    .split_whitespace()
                    .next()
                    .and_then(|secs| secs.parse::<f64>().ok())
            })
            .map(|secs| secs as u64)
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_meminfo_parsing() {
        let content = "MemTotal:       16318480 kB\nMemFree:  1000 kB\nMemAvailable:   8000 kB\n";
        assert_eq!(meminfo_bytes(content, "MemTotal:"), Some(16_318_480 * 1024));
        assert_eq!(meminfo_bytes(content, "MemAvailable:"), Some(8000 * 1024));
        assert_eq!(meminfo_bytes(content, "SwapTotal:"), None);
    }

    #[test]
    fn test_count_files_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"a").unwrap();
        fs::write(dir.path().join("b.mp4"), b"b").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        assert_eq!(count_files(dir.path()), 2);
        assert_eq!(count_files(&dir.path().join("missing")), 0);
    }

    #[test]
    fn test_collect_reports_upload_count() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::new(dir.path().to_path_buf(), dir.path().join("out"));
        fs::write(dir.path().join("1_x_clip.mp4"), b"x").unwrap();

        let info = SystemInfo::collect(&config);
        assert_eq!(info.upload_count, 1);
        assert_eq!(info.platform, std::env::consts::OS);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["uploadCount"], 1);
        assert!(json.get("ffmpegAvailable").is_some());
    }
}

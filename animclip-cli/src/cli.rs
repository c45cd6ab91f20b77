// ============================================================================
// animclip-cli/src/cli.rs
// ============================================================================
//
// COMMAND-LINE INTERFACE: Argument Definitions
//
// This module defines the command-line interface structure using clap's
// derive macros. Directory and limit options are global so every subcommand
// sees the same workspace; each can also be set through an ANIMCLIP_*
// environment variable.
//
// KEY COMPONENTS:
// - Cli: Top-level structure with global workspace options
// - Commands: convert, cleanup and info subcommands
// - ConvertArgs: Segment, quality, fade and format options

use animclip_core::OutputFormat;
use animclip_core::config::{
    DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_OUTPUT_DIR, DEFAULT_UPLOAD_DIR,
};
use animclip_core::conversion::{
    DEFAULT_END_TIME, DEFAULT_FADE_FRAMES, DEFAULT_QUALITY, DEFAULT_START_TIME,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "animclip: turn a video segment into an animated GIF or WebP",
    long_about = "Trims a time range from a video, applies fades and encodes it as an \
                  animated GIF or WebP with ffmpeg, shrinking the result when it exceeds \
                  the size limit."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output for troubleshooting
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to a timestamped file in this directory
    #[arg(long, global = true, value_name = "DIR", env = "ANIMCLIP_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Directory for staged source videos
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        env = "ANIMCLIP_UPLOAD_DIR",
        default_value = DEFAULT_UPLOAD_DIR
    )]
    pub upload_dir: PathBuf,

    /// Directory for converted outputs and their intermediates
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        env = "ANIMCLIP_OUTPUT_DIR",
        default_value = DEFAULT_OUTPUT_DIR
    )]
    pub output_dir: PathBuf,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts a segment of a video into an animated GIF or WebP
    Convert(ConvertArgs),

    /// Removes leftover uploads and generated files
    Cleanup(CleanupArgs),

    /// Shows host information and workspace status
    Info(InfoArgs),
}

/// Arguments for the convert command
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Source video (mp4, avi, mov, webm, mpeg)
    #[arg(short = 'i', long = "input", value_name = "VIDEO")]
    pub input_path: PathBuf,

    /// Copy the finished file to this file or directory
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub destination: Option<PathBuf>,

    /// Segment start in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_START_TIME)]
    pub start: f64,

    /// Segment end in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_END_TIME)]
    pub end: f64,

    /// Quality from 0 to 100; drives frame rate, colors and encoder quality
    #[arg(
        short,
        long,
        value_name = "0-100",
        default_value_t = DEFAULT_QUALITY,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub quality: u8,

    /// Fade-in length in frames (0 disables)
    #[arg(long, value_name = "FRAMES", default_value_t = DEFAULT_FADE_FRAMES)]
    pub fade_in: u32,

    /// Fade-out length in frames (0 disables)
    #[arg(long, value_name = "FRAMES", default_value_t = DEFAULT_FADE_FRAMES)]
    pub fade_out: u32,

    /// Output format: gif or webp
    #[arg(short, long, value_name = "FORMAT", default_value = "gif")]
    pub format: OutputFormat,

    /// Output file name without extension
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Output size limit in MiB before the optimizer runs
    #[arg(long, value_name = "MIB", env = "ANIMCLIP_MAX_SIZE_MIB")]
    pub max_size_mib: Option<u64>,

    /// Seconds each ffmpeg run may take before it is killed (0 disables)
    #[arg(
        long,
        value_name = "SECONDS",
        env = "ANIMCLIP_TIMEOUT",
        default_value_t = DEFAULT_COMMAND_TIMEOUT_SECS
    )]
    pub timeout: u64,

    /// Print the result as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the cleanup command
#[derive(Args, Debug, Clone)]
pub struct CleanupArgs {
    /// Remove every upload and generated file, not only stale ones
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the info command
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Print the information as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Parses command-line arguments
pub fn parse_cli() -> Cli {
    Cli::parse()
}

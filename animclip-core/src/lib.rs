//! Core library for converting video segments into animated GIF or WebP
//! images using ffmpeg.
//!
//! This crate trims a time range from a video, applies fades, encodes it
//! (two-pass palette GIF or single-pass WebP), and re-encodes the result
//! with degraded settings when it exceeds a size ceiling. Every temporary
//! file is removed before a conversion returns.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use animclip_core::{
//!     ConversionRequest, CoreConfig, OutputFormat, StdFsMetadataProvider, SidecarSpawner,
//!     convert_video, receive_upload,
//! };
//! use std::path::{Path, PathBuf};
//!
//! let config = CoreConfig::new(PathBuf::from("uploads"), PathBuf::from("output"));
//! config.validate().unwrap();
//!
//! let staged = receive_upload(Path::new("holiday.mp4"), &config).unwrap();
//! let request = ConversionRequest {
//!     start_time: 3.0,
//!     end_time: 9.5,
//!     format: OutputFormat::Webp,
//!     ..ConversionRequest::default()
//! };
//!
//! let result = convert_video(
//!     &SidecarSpawner::from_config(&config),
//!     &StdFsMetadataProvider,
//!     &config,
//!     &staged.path,
//!     &request,
//! );
//! println!("{}", result.to_json().unwrap());
//! ```

pub mod config;
pub mod conversion;
pub mod error;
pub mod external;
pub mod file_logging;
pub mod intake;
pub mod sweep;
pub mod system_info;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use conversion::{
    ConversionRequest, ConversionResult, OutputFormat, PipelineState, ProcessingPlan, build_plan,
    convert_video,
};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use external::{
    FfmpegSpawner, FileMetadataProvider, SidecarSpawner, StdFsMetadataProvider, check_dependency,
};
pub use intake::{StagedSource, deliver, receive_upload};
pub use sweep::{SweepReport, clear_all, sweep_stale};
pub use system_info::SystemInfo;
pub use temp_files::TempArtifact;
pub use utils::{format_bytes, format_duration};

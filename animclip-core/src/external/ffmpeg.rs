//! FFmpeg stage description and execution
//!
//! A stage is one fully-resolved ffmpeg invocation: its inputs (optionally
//! trimmed with input seeking), a simple or complex filter graph, encoder
//! arguments, and the output file. Stages are plain data so the planning code
//! never builds shell strings; this module turns a stage into an argument
//! list and runs it through an [`FfmpegSpawner`].

use crate::error::{CoreResult, command_failed_error};
use crate::external::ffmpeg_builder::FfmpegCommandBuilder;
use crate::external::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use log::{debug, error};

use std::path::PathBuf;

/// Time window read from an input, applied as `-ss <start> -t <duration>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trim {
    pub start: f64,
    pub duration: f64,
}

/// One `-i` input of a stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageInput {
    pub path: PathBuf,
    pub trim: Option<Trim>,
}

impl StageInput {
    pub fn whole(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            trim: None,
        }
    }

    pub fn trimmed(path: impl Into<PathBuf>, trim: Trim) -> Self {
        Self {
            path: path.into(),
            trim: Some(trim),
        }
    }
}

/// A single ffmpeg invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegStage {
    /// Short human-readable name used in logs and errors
    pub label: &'static str,
    pub inputs: Vec<StageInput>,
    /// Simple filter graph, passed with `-vf`
    pub video_filter: Option<String>,
    /// Complex filter graph, passed with `-filter_complex`
    pub filter_complex: Option<String>,
    /// Encoder and muxer arguments placed before the output
    pub output_args: Vec<String>,
    pub output: PathBuf,
}

impl FfmpegStage {
    /// The argument list for this stage, excluding the binary and the
    /// banner flag. The output path is always last.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();

        for input in &self.inputs {
            if let Some(trim) = input.trim {
                args.push("-ss".to_string());
                args.push(trim.start.to_string());
                args.push("-t".to_string());
                args.push(trim.duration.to_string());
            }
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().into_owned());
        }

        if let Some(filter) = &self.video_filter {
            args.push("-vf".to_string());
            args.push(filter.clone());
        }
        if let Some(graph) = &self.filter_complex {
            args.push("-filter_complex".to_string());
            args.push(graph.clone());
        }

        args.extend(self.output_args.iter().cloned());
        args.push("-y".to_string());
        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

/// Builds the ffmpeg command for a stage.
#[must_use]
pub fn build_stage_command(stage: &FfmpegStage) -> FfmpegCommand {
    let mut cmd = FfmpegCommandBuilder::new().build();
    cmd.args(stage.args());
    cmd
}

/// Runs one stage to completion.
///
/// Succeeds when ffmpeg exits with status zero. On any other exit the error
/// carries every error-level line ffmpeg printed. No retries happen here.
pub fn run_ffmpeg_stage<S: FfmpegSpawner>(spawner: &S, stage: &FfmpegStage) -> CoreResult<()> {
    let cmd = build_stage_command(stage);
    debug!("FFmpeg command ({}): ffmpeg {}", stage.label, stage.args().join(" "));

    let mut process = spawner.spawn(cmd)?;
    let mut diagnostics: Vec<String> = Vec::new();

    process.handle_events(|event| {
        match event {
            FfmpegEvent::Error(msg) | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg) => {
                debug!("ffmpeg ({}): {}", stage.label, msg);
                diagnostics.push(msg);
            }
            FfmpegEvent::Log(LogLevel::Warning, msg) => {
                debug!("ffmpeg warning ({}): {}", stage.label, msg);
            }
            _ => {}
        }
        Ok(())
    })?;

    let status = process.wait()?;
    if !status.success() {
        error!("FFmpeg {} failed with {}", stage.label, status);
        let detail = if diagnostics.is_empty() {
            "ffmpeg reported no error output".to_string()
        } else {
            diagnostics.join("\n")
        };
        return Err(command_failed_error(
            format!("ffmpeg ({})", stage.label),
            status,
            detail,
        ));
    }

    debug!("FFmpeg {} finished: {}", stage.label, stage.output.display());
    Ok(())
}

// ============================================================================
// animclip-cli/src/commands/convert.rs
// ============================================================================
//
// CONVERT COMMAND: Video Segment to Animated Image
//
// Stages the input video, runs the conversion pipeline with the real ffmpeg
// spawner and reports the result either as terminal status lines or as JSON
// on stdout. Failures are reported, not propagated, so JSON callers always
// receive a result object.

use crate::cli::{Cli, ConvertArgs};
use crate::config::convert_config;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal;

use animclip_core::{
    ConversionRequest, ConversionResult, CoreConfig, ErrorKind, SidecarSpawner,
    StdFsMetadataProvider, check_dependency, convert_video, deliver, format_bytes,
    format_duration, receive_upload,
};
use log::debug;

/// Maps the command-line options onto a conversion request.
pub fn request_from_args(args: &ConvertArgs) -> ConversionRequest {
    ConversionRequest {
        start_time: args.start,
        end_time: args.end,
        quality: args.quality,
        fade_in_frames: args.fade_in,
        fade_out_frames: args.fade_out,
        format: args.format,
        custom_filename: args.name.clone(),
    }
}

/// Runs the convert command. Returns whether the conversion succeeded.
pub fn run_convert(cli: &Cli, args: &ConvertArgs) -> CliResult<bool> {
    let request = request_from_args(args);

    let mut result = match convert_config(cli, args).and_then(|config| {
        print_plan(args, &request, &config);
        convert(&config, args, &request)
    }) {
        Ok(result) => result,
        Err(e) => ConversionResult::failed(&e),
    };

    if result.success {
        if let (Some(destination), Some(path)) = (&args.destination, result.output_path.clone()) {
            let delivered = deliver(&path, destination)
                .cli_with_context(|| format!("Failed to copy output to {}", destination.display()))?;
            result.output_path = Some(delivered);
        }
    }

    if args.json {
        println!("{}", result.to_json()?);
    } else {
        report(&result);
    }
    Ok(result.success)
}

fn convert(
    config: &CoreConfig,
    args: &ConvertArgs,
    request: &ConversionRequest,
) -> CliResult<ConversionResult> {
    check_dependency("ffmpeg")?;
    let staged = receive_upload(&args.input_path, config)?;
    debug!(
        "Staged {} ({})",
        staged.original_filename,
        format_bytes(staged.size)
    );

    terminal::start_spinner(&format!("Encoding {}", request.format));
    let result = convert_video(
        &SidecarSpawner::from_config(config),
        &StdFsMetadataProvider,
        config,
        &staged.path,
        request,
    );
    terminal::clear_spinner();
    Ok(result)
}

fn print_plan(args: &ConvertArgs, request: &ConversionRequest, config: &CoreConfig) {
    if args.json {
        return;
    }
    terminal::print_section("Conversion");
    terminal::print_status("Input", &args.input_path.display().to_string(), false);
    terminal::print_status(
        "Segment",
        &format!(
            "{} to {} ({})",
            format_duration(request.start_time),
            format_duration(request.end_time),
            format_duration(request.duration())
        ),
        false,
    );
    terminal::print_status("Format", &request.format.to_string(), false);
    terminal::print_status("Quality", &request.quality.to_string(), false);
    terminal::print_status(
        "Fades",
        &format!(
            "{} in, {} out (frames)",
            request.fade_in_frames, request.fade_out_frames
        ),
        false,
    );
    terminal::print_status("Size limit", &format_bytes(config.max_output_size), false);
}

fn report(result: &ConversionResult) {
    if result.success {
        terminal::print_success(result.message.as_deref().unwrap_or("Conversion complete"));
        if let Some(path) = &result.output_path {
            terminal::print_status("Output", &path.display().to_string(), true);
        }
        if let Some(size) = result.file_size {
            terminal::print_status("Size", &format_bytes(size), false);
        }
        return;
    }

    let message = result.error.as_deref().unwrap_or("unknown error");
    terminal::print_error("Conversion failed", message, suggestion_for(result));
}

fn suggestion_for(result: &ConversionResult) -> Option<&'static str> {
    match result.error_kind? {
        ErrorKind::Validation => Some("Check --start, --end and the input file type"),
        ErrorKind::ToolExecution => Some("Run with --verbose to see the ffmpeg command lines"),
        ErrorKind::OptimizationExhausted | ErrorKind::Internal => None,
    }
}

// ============================================================================
// animclip-core/src/conversion/orchestrator.rs
// ============================================================================
//
// CONVERSION ORCHESTRATOR: Per-Request State Machine
//
// Validating -> Converting -> SizeChecking -> (Done | Optimizing -> Done)
// with Failed reachable from every non-terminal state.
//
// Every file the pipeline touches is held by a TempArtifact guard. The staged
// source is deleted whatever the outcome; intermediates are deleted as soon
// as their stage group finishes. Outputs are written under a per-run working
// name and renamed onto the requested name only once the run is Done, so a
// failed run never removes a file it did not create. Errors never escape:
// they are folded into a failed ConversionResult.

use super::optimizer::{optimize_file_size, optimized_path};
use super::plan::build_plan;
use super::{ConversionRequest, ConversionResult};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, FileMetadataProvider, run_ffmpeg_stage};
use crate::temp_files::{TempArtifact, work_file_name};
use crate::utils::{format_bytes, format_duration};

use log::{debug, error, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

/// Reported when the optimizer cannot bring an output under the ceiling.
pub const OPTIMIZATION_EXHAUSTED_MESSAGE: &str =
    "file too large and could not be optimized; choose a shorter segment or lower the quality setting";

/// Status message of a conversion that fit the ceiling directly.
pub const CONVERTED_MESSAGE: &str = "Conversion complete";

/// Status message of a conversion that needed the optimizer.
pub const OPTIMIZED_MESSAGE: &str = "Conversion complete; the file was optimized to fit the size limit";

/// Pipeline state of a single conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Validating,
    Converting,
    SizeChecking,
    Optimizing,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Validating => "validating",
            PipelineState::Converting => "converting",
            PipelineState::SizeChecking => "size checking",
            PipelineState::Optimizing => "optimizing",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

struct Pipeline<'a, S, M> {
    spawner: &'a S,
    metadata: &'a M,
    config: &'a CoreConfig,
    request: &'a ConversionRequest,
    state: PipelineState,
}

struct FinalArtifact {
    path: PathBuf,
    size: u64,
    optimized: bool,
}

impl<S: FfmpegSpawner, M: FileMetadataProvider> Pipeline<'_, S, M> {
    fn advance(&mut self, next: PipelineState) {
        debug_assert!(!self.state.is_terminal(), "no transition out of {}", self.state);
        debug!("Conversion state: {} -> {}", self.state, next);
        self.state = next;
    }

    fn run(&mut self, source: &Path) -> CoreResult<FinalArtifact> {
        self.request.validate(self.config.max_segment_secs)?;

        self.advance(PipelineState::Converting);
        std::fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            CoreError::PathError(format!(
                "Failed to create output directory '{}': {}",
                self.config.output_dir.display(),
                e
            ))
        })?;

        let final_name = self.request.output_file_name();
        let final_path = self.config.output_dir.join(&final_name);
        let work_path = self.config.output_dir.join(work_file_name(&final_name));
        let plan = build_plan(self.request, source, &work_path);
        info!(
            "Converting {} of {} to {} ({}, {} fps{})",
            format_duration(plan.trim.duration),
            source.display(),
            final_name,
            plan.resolution,
            plan.fps,
            plan.colors.map(|c| format!(", {c} colors")).unwrap_or_default()
        );

        let output = TempArtifact::new(&plan.output);
        {
            let _intermediates: Vec<TempArtifact> =
                plan.intermediates.iter().map(TempArtifact::new).collect();
            for stage in &plan.stages {
                run_ffmpeg_stage(self.spawner, stage)?;
            }
        }

        self.advance(PipelineState::SizeChecking);
        let size = self.metadata.get_size(output.path())?;
        if size <= self.config.max_output_size {
            return Ok(FinalArtifact {
                path: publish(output, &final_path)?,
                size,
                optimized: false,
            });
        }

        info!(
            "Output is {} which exceeds the {} limit, optimizing",
            format_bytes(size),
            format_bytes(self.config.max_output_size)
        );
        self.advance(PipelineState::Optimizing);

        let optimized = optimize_file_size(
            self.spawner,
            output.path(),
            self.request.format,
            self.request.quality,
        )
        .map_err(|e| {
            error!("Optimization failed: {e}");
            CoreError::OptimizationExhausted(OPTIMIZATION_EXHAUSTED_MESSAGE.to_string())
        })?;

        let optimized_size = self.metadata.get_size(optimized.path()).map_err(|e| {
            error!("Optimized output unreadable: {e}");
            CoreError::OptimizationExhausted(OPTIMIZATION_EXHAUSTED_MESSAGE.to_string())
        })?;
        if optimized_size > self.config.max_output_size {
            warn!(
                "Optimized output is still {}, above the {} limit",
                format_bytes(optimized_size),
                format_bytes(self.config.max_output_size)
            );
            return Err(CoreError::OptimizationExhausted(
                OPTIMIZATION_EXHAUSTED_MESSAGE.to_string(),
            ));
        }

        // The oversized original goes away with its guard
        drop(output);
        let target = optimized_path(&final_path, self.request.format);
        Ok(FinalArtifact {
            path: publish(optimized, &target)?,
            size: optimized_size,
            optimized: true,
        })
    }
}

/// Moves a finished working file onto its published name. Nothing under the
/// published name is touched before this point.
fn publish(artifact: TempArtifact, target: &Path) -> CoreResult<PathBuf> {
    artifact.persist(target).map_err(|e| {
        CoreError::PathError(format!(
            "Failed to move output to '{}': {}",
            target.display(),
            e
        ))
    })
}

/// Converts the staged `source` according to `request`.
///
/// `source` is consumed: it is deleted before this returns, on success and
/// on failure alike. Errors are reported in the returned result, never
/// propagated.
pub fn convert_video<S, M>(
    spawner: &S,
    metadata: &M,
    config: &CoreConfig,
    source: &Path,
    request: &ConversionRequest,
) -> ConversionResult
where
    S: FfmpegSpawner,
    M: FileMetadataProvider,
{
    let _source = TempArtifact::new(source);
    let mut pipeline = Pipeline {
        spawner,
        metadata,
        config,
        request,
        state: PipelineState::Validating,
    };

    match pipeline.run(source) {
        Ok(artifact) => {
            pipeline.advance(PipelineState::Done);
            info!(
                "Created {} ({})",
                artifact.path.display(),
                format_bytes(artifact.size)
            );
            let message = if artifact.optimized {
                OPTIMIZED_MESSAGE
            } else {
                CONVERTED_MESSAGE
            };
            ConversionResult::succeeded(&artifact.path, artifact.size, message)
        }
        Err(e) => {
            let failed_in = pipeline.state;
            pipeline.advance(PipelineState::Failed);
            match &e {
                CoreError::Validation(msg) => info!("Rejected conversion request: {msg}"),
                other => error!("Conversion failed while {failed_in}: {other}"),
            }
            ConversionResult::failed(&e)
        }
    }
}

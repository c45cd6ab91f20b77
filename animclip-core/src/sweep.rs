//! Removal of leftover artifacts.
//!
//! The pipeline reclaims its own temporaries, but delivered outputs and
//! anything left behind by a killed process stay on disk. [`sweep_stale`]
//! removes such files once they are older than the configured age and is
//! meant to be run periodically by whoever hosts the library; [`clear_all`]
//! empties both directories on demand.

use crate::config::CoreConfig;
use crate::temp_files::{WORK_FILE_PREFIX, remove_artifact};

use log::{debug, info, warn};
use serde::Serialize;
use std::path::Path;
use std::time::SystemTime;

/// Counts of a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub removed: usize,
    pub failed: usize,
}

impl SweepReport {
    fn record(&mut self, removed: bool) {
        if removed {
            self.removed += 1;
        } else {
            self.failed += 1;
        }
    }

    fn merge(self, other: SweepReport) -> SweepReport {
        SweepReport {
            removed: self.removed + other.removed,
            failed: self.failed + other.failed,
        }
    }
}

/// Whether `name` looks like something the pipeline wrote into the output
/// directory: working files, intermediates, optimized outputs and generated
/// outputs.
pub fn is_pipeline_artifact(name: &str) -> bool {
    name.starts_with(WORK_FILE_PREFIX)
        || name.ends_with("_palette.png")
        || name.contains("_temp")
        || name.contains("_optimized")
        || (name.starts_with("converted_") && (name.ends_with(".gif") || name.ends_with(".webp")))
}

/// Whether `name` is removed from the output directory by [`clear_all`]:
/// every pipeline artifact plus any GIF or WebP.
pub fn is_clearable_output(name: &str) -> bool {
    is_pipeline_artifact(name) || name.ends_with(".gif") || name.ends_with(".webp")
}

fn sweep_dir<F>(dir: &Path, mut should_remove: F) -> SweepReport
where
    F: FnMut(&str, &std::fs::Metadata) -> bool,
{
    let mut report = SweepReport::default();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping sweep of {}: {}", dir.display(), e);
            return report;
        }
    };

    for entry in entries.filter_map(Result::ok) {
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if should_remove(&name, &metadata) {
            report.record(remove_artifact(&entry.path()));
        }
    }

    if report.failed > 0 {
        warn!(
            "Could not remove {} file(s) from {}",
            report.failed,
            dir.display()
        );
    }
    report
}

fn older_than(metadata: &std::fs::Metadata, now: SystemTime, max_age: std::time::Duration) -> bool {
    metadata
        .modified()
        .ok()
        .and_then(|modified| now.duration_since(modified).ok())
        .is_some_and(|age| age > max_age)
}

/// Removes uploads and pipeline artifacts last modified more than
/// `artifact_max_age` before `now`. User files in the output directory that
/// do not look like pipeline artifacts are left alone.
pub fn sweep_stale(config: &CoreConfig, now: SystemTime) -> SweepReport {
    let max_age = config.artifact_max_age;

    let uploads = sweep_dir(&config.upload_dir, |_, metadata| {
        older_than(metadata, now, max_age)
    });
    let outputs = sweep_dir(&config.output_dir, |name, metadata| {
        is_pipeline_artifact(name) && older_than(metadata, now, max_age)
    });

    let report = uploads.merge(outputs);
    if report.removed > 0 {
        info!("Swept {} stale file(s)", report.removed);
    }
    report
}

/// Removes every staged upload and every generated output regardless of age.
pub fn clear_all(config: &CoreConfig) -> SweepReport {
    let uploads = sweep_dir(&config.upload_dir, |_, _| true);
    let outputs = sweep_dir(&config.output_dir, |name, _| is_clearable_output(name));

    let report = uploads.merge(outputs);
    info!("Cleared {} file(s)", report.removed);
    report
}

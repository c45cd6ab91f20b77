// ============================================================================
// animclip-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning and interacting with FFmpeg
// processes. It defines traits and implementations for executing FFmpeg
// commands and handling their events and lifecycle.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar, with an
//   optional wall-clock timeout after which the process is killed

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::process::ExitStatus;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess {
    child: SidecarChild,
    started: Instant,
    timeout: Option<Duration>,
}

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.child.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {e}");
            CoreError::OperationFailed(format!("Failed to read ffmpeg output: {e}"))
        })?;

        let Some(timeout) = self.timeout else {
            for event in iterator {
                handler(event)?;
            }
            return Ok(());
        };

        // The iterator blocks until ffmpeg writes something, so it is drained
        // on a separate thread and the deadline is enforced here.
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for event in iterator {
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        let deadline = self.started + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(event) => handler(event)?,
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
                Err(RecvTimeoutError::Timeout) => {
                    log::error!("ffmpeg exceeded its {timeout:?} timeout, killing it");
                    if let Err(e) = self.child.kill() {
                        log::warn!("Failed to kill timed out ffmpeg process: {e}");
                    }
                    // Reap the killed process
                    let _ = self.child.wait();
                    return Err(CoreError::CommandTimeout("ffmpeg".to_string(), timeout));
                }
            }
        }
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.child
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidecarSpawner {
    timeout: Option<Duration>,
}

impl SidecarSpawner {
    /// Creates a spawner whose processes are killed after `timeout`.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Creates a spawner using the configured command timeout.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.command_timeout)
    }
}

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(|child| SidecarProcess {
                child,
                started: Instant::now(),
                timeout: self.timeout,
            })
            .map_err(|e| command_start_error("ffmpeg (sidecar)", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawner_timeout_from_config() {
        let config = CoreConfig {
            command_timeout: Some(Duration::from_secs(42)),
            ..CoreConfig::default()
        };
        assert_eq!(
            SidecarSpawner::from_config(&config),
            SidecarSpawner::new(Some(Duration::from_secs(42)))
        );
        assert_eq!(SidecarSpawner::default(), SidecarSpawner::new(None));
    }

    // Stands in for ffmpeg: never writes output and outlives any test timeout
    #[cfg(unix)]
    fn hanging_tool(dir: &std::path::Path) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-ffmpeg");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 10\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[test]
    fn test_hanging_process_is_killed_at_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = SidecarSpawner::new(Some(Duration::from_millis(300)));
        let cmd = FfmpegCommand::new_with_path(hanging_tool(dir.path()));

        let started = Instant::now();
        let mut process = spawner.spawn(cmd).unwrap();
        let result = process.handle_events(|_| Ok(()));
        let elapsed = started.elapsed();

        match result {
            Err(CoreError::CommandTimeout(cmd, timeout)) => {
                assert_eq!(cmd, "ffmpeg");
                assert_eq!(timeout, Duration::from_millis(300));
            }
            other => panic!("expected a timeout, got {other:?}"),
        }
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(5), "{elapsed:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_fast_process_finishes_within_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("quick-ffmpeg");
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        let spawner = SidecarSpawner::new(Some(Duration::from_secs(5)));

        let mut process = spawner.spawn(FfmpegCommand::new_with_path(&script)).unwrap();
        process.handle_events(|_| Ok(())).unwrap();
        assert!(process.wait().unwrap().success());
    }
}

//! Spawning ffmpeg and consuming its event stream
//!
//! The encode executor only sees [`FfmpegSpawner`] and [`FfmpegProcess`], so
//! tests can substitute `mocks::MockFfmpegSpawner` for the real binary.

use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::process::ExitStatus;

/// A running ffmpeg.
pub trait FfmpegProcess {
    /// Feeds every event to `handler` until ffmpeg closes its output or the
    /// handler returns an error.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for exit. Call after [`FfmpegProcess::handle_events`].
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Starts an [`FfmpegProcess`] from a prepared command.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

/// ffmpeg started through ffmpeg-sidecar.
pub struct SidecarProcess {
    child: FfmpegChild,
}

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let mut events = self.child.iter().map_err(|e| {
            CoreError::OperationFailed(format!("cannot read ffmpeg output: {e}"))
        })?;
        events.try_for_each(handler)
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.child.wait().map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Spawns the `ffmpeg` found on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let child = cmd.spawn().map_err(|e| command_start_error("ffmpeg", e))?;
        Ok(SidecarProcess { child })
    }
}

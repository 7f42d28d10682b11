// ============================================================================
// recompress-core/src/processing/executor.rs
// ============================================================================
//
// ENCODE EXECUTOR: Run one ffmpeg encode to completion
//
// Spawns ffmpeg through an FfmpegSpawner, streams its events to the progress
// display, and waits. The encode counts as successful only when ffmpeg exits
// 0 AND the destination exists and is non-empty; anything else removes the
// partial destination before returning.
//
// AI-ASSISTANT-INFO: Supervised execution of a single encode command

use crate::error::{CoreError, CoreResult, command_failed_error};
use crate::external::{EncodeCommand, FfmpegProcess, FfmpegSpawner};
use crate::progress_reporting::{self, ffmpeg_handler::FfmpegProgressHandler};

use std::fs;
use std::path::{Path, PathBuf};

/// Result of one encode attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeOutcome {
    /// Staged output at the given path.
    Succeeded(PathBuf),
    /// Human-readable reason; no partial output remains.
    Failed(String),
}

/// Runs `command` and reports whether it produced usable output.
///
/// `frame_count` sizes the progress bar; 0 shows a spinner instead.
pub fn execute_encode<S: FfmpegSpawner>(
    spawner: &S,
    command: EncodeCommand,
    frame_count: u64,
) -> EncodeOutcome {
    let destination = command.destination.clone();

    let result = run_ffmpeg(spawner, command, frame_count).and_then(|()| verify_output(&destination));

    match result {
        Ok(()) => EncodeOutcome::Succeeded(destination),
        Err(e) => {
            log::debug!("Encode to {} failed: {e}", destination.display());
            remove_partial_output(&destination);
            EncodeOutcome::Failed(e.to_string())
        }
    }
}

fn run_ffmpeg<S: FfmpegSpawner>(spawner: &S, command: EncodeCommand, frame_count: u64) -> CoreResult<()> {
    let cmd_line = format!("ffmpeg {}", command.to_args().join(" "));
    log::debug!("{cmd_line}");
    progress_reporting::ffmpeg_command(&cmd_line);

    let mut process = spawner.spawn(command.into_ffmpeg_command())?;
    let mut handler = FfmpegProgressHandler::new(frame_count);

    let events = process.handle_events(|event| handler.handle_event(event));
    progress_reporting::clear_progress();
    let status = process.wait()?;
    events?;

    if !status.success() {
        let detail = handler
            .error_summary()
            .unwrap_or_else(|| "no error output captured".to_string());
        return Err(command_failed_error("ffmpeg", status, detail));
    }

    log::debug!("ffmpeg finished after {} frames", handler.last_frame());
    Ok(())
}

fn verify_output(destination: &Path) -> CoreResult<()> {
    match fs::metadata(destination) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        Ok(_) => Err(CoreError::OperationFailed(format!(
            "encoder produced an empty file at {}",
            destination.display()
        ))),
        Err(_) => Err(CoreError::OperationFailed(format!(
            "encoder produced no file at {}",
            destination.display()
        ))),
    }
}

fn remove_partial_output(destination: &Path) {
    if !destination.exists() {
        return;
    }
    match fs::remove_file(destination) {
        Ok(()) => log::debug!("Removed partial output {}", destination.display()),
        Err(e) => log::warn!(
            "Failed to remove partial output {}: {e}",
            destination.display()
        ),
    }
}

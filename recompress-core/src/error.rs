// ============================================================================
// recompress-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for recompress-core
//
// This module defines the error taxonomy of the library. Errors fall into two
// groups: fatal preflight errors (configuration, missing dependencies) which
// stop a batch before any file is touched, and per-file errors (probing,
// encoding, finalization) which the batch orchestrator converts into a
// `JobResult` for that file only.
//
// AI-ASSISTANT-INFO: Error types and helper constructors for recompress-core

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by recompress-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid job configuration (fatal).
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A required external program is not installed or not on PATH (fatal).
    #[error("Required dependency '{0}' not found. Please install it and make sure it is on your PATH.")]
    DependencyNotFound(String),

    #[error("Failed to start '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed waiting for '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("'{cmd}' exited with {status}: {stderr}")]
    CommandFailed {
        cmd: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("'{0}' timed out after {1} seconds and was killed")]
    CommandTimeout(String, u64),

    /// The probing engine found no video stream in the input.
    #[error("No video stream found in {0}")]
    NotAVideo(PathBuf),

    /// The probing engine could not be run, or its output was unusable.
    #[error("Probe failed: {0}")]
    ProbeFailure(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for recompress-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`], mapping a missing executable to
/// [`CoreError::DependencyNotFound`].
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    let cmd = cmd.into();
    if err.kind() == io::ErrorKind::NotFound {
        CoreError::DependencyNotFound(cmd)
    } else {
        CoreError::CommandStart(cmd, err)
    }
}

pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        cmd: cmd.into(),
        status,
        stderr: stderr.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_maps_to_dependency_not_found() {
        let err = command_start_error("ffprobe", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, CoreError::DependencyNotFound(ref name) if name == "ffprobe"));
    }

    #[test]
    fn other_start_failures_keep_the_io_error() {
        let err = command_start_error(
            "ffmpeg",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, CoreError::CommandStart(ref name, _) if name == "ffmpeg"));
        assert!(err.to_string().contains("Failed to start 'ffmpeg'"));
    }
}

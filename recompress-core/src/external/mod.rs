// ============================================================================
// recompress-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// Every external program the pipeline runs goes through one of two traits:
//
// - ProcessRunner: run a program to completion and capture its output. Used
//   for ffprobe queries and dependency checks.
// - FfmpegSpawner: spawn ffmpeg and stream its events while it runs. Used for
//   the encode itself.
//
// Production implementations live here and in `ffmpeg_executor`; the `mocks`
// submodule (behind the "test-mocks" feature) provides scripted
// implementations so the pipeline can be tested without ffmpeg installed.
//
// AI-ASSISTANT-INFO: External tool interactions and abstractions for ffmpeg/ffprobe

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};

// ---- Standard library imports ----
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Encode command construction (libx265 arguments, thread hints)
pub mod ffmpeg;

/// Traits and implementations for spawning ffmpeg processes
pub mod ffmpeg_executor;

/// Scripted runner and spawner used by tests
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg::{EncodeCommand, ThreadHints, build_encode_command};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};

/// Programs that must be installed before a batch may start.
pub const REQUIRED_TOOLS: [&str; 2] = ["ffmpeg", "ffprobe"];

const TIMEOUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// COMMAND DESCRIPTION
// ============================================================================

/// A program invocation described as data rather than a shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Kill the process if it runs longer than this.
    pub timeout: Option<Duration>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends a filesystem path argument.
    pub fn path_arg(self, path: &Path) -> Self {
        let arg = path.to_string_lossy().into_owned();
        self.arg(arg)
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// A successful exit with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed exit with the given code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

// ============================================================================
// PROCESS RUNNER
// ============================================================================

/// Runs an external program to completion and captures its output.
///
/// A non-zero exit is *not* an error at this level; callers inspect
/// [`ProcessOutput::success`]. Errors are reserved for programs that could
/// not be started, waited on, or that exceeded their timeout.
pub trait ProcessRunner {
    fn run(&self, cmd: &ToolCommand) -> CoreResult<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, cmd: &ToolCommand) -> CoreResult<ProcessOutput> {
        log::trace!("Running: {cmd}");

        let child = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_start_error(cmd.program.as_str(), e))?;

        match cmd.timeout {
            None => {
                let output = child
                    .wait_with_output()
                    .map_err(|e| command_wait_error(cmd.program.as_str(), e))?;
                Ok(ProcessOutput {
                    success: output.status.success(),
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            Some(limit) => wait_with_timeout(child, &cmd.program, limit),
        }
    }
}

/// Polls `child` until it exits or `limit` elapses, killing it on expiry.
///
/// Pipes are drained on helper threads so a chatty process cannot block on a
/// full pipe while we poll.
fn wait_with_timeout(mut child: Child, program: &str, limit: Duration) -> CoreResult<ProcessOutput> {
    let stdout_reader = child.stdout.take().map(spawn_pipe_reader);
    let stderr_reader = child.stderr.take().map(spawn_pipe_reader);
    let deadline = Instant::now() + limit;

    let status = loop {
        match child.try_wait().map_err(|e| command_wait_error(program, e))? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                log::warn!("{program} exceeded {}s, killing it", limit.as_secs());
                // The process may have exited between try_wait and kill.
                let _ = child.kill();
                let _ = child.wait();
                return Err(CoreError::CommandTimeout(program.to_string(), limit.as_secs()));
            }
            None => thread::sleep(TIMEOUT_POLL_INTERVAL),
        }
    };

    Ok(ProcessOutput {
        success: status.success(),
        code: status.code(),
        stdout: join_pipe_reader(stdout_reader),
        stderr: join_pipe_reader(stderr_reader),
    })
}

fn spawn_pipe_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_pipe_reader(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that `cmd_name` can be started by running it with `-version`.
///
/// # Returns
///
/// * `Ok(())` - The command started
/// * `Err(CoreError::DependencyNotFound)` - The command is not installed
/// * `Err(CoreError::CommandStart)` - The command exists but failed to start
pub fn check_dependency<R: ProcessRunner>(runner: &R, cmd_name: &str) -> CoreResult<()> {
    match runner.run(&ToolCommand::new(cmd_name).arg("-version")) {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) => {
            log::debug!("Dependency check for '{cmd_name}' failed: {e}");
            Err(e)
        }
    }
}

/// Checks every program in [`REQUIRED_TOOLS`], stopping at the first missing one.
pub fn check_dependencies<R: ProcessRunner>(runner: &R) -> CoreResult<()> {
    REQUIRED_TOOLS
        .iter()
        .try_for_each(|tool| check_dependency(runner, tool))
}

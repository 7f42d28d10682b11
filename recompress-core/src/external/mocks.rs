// recompress-core/src/external/mocks.rs
//
// Scripted stand-ins for ffprobe and ffmpeg, so unit tests and the
// integration tests under `tests/` can drive the whole pipeline without
// either tool installed. Only compiled for tests or with the "test-mocks"
// feature.

#![cfg(any(test, feature = "test-mocks"))]

use super::{FfmpegProcess, FfmpegSpawner, ProcessOutput, ProcessRunner, ToolCommand};
use crate::error::{CoreError, CoreResult};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

/// Bytes written by [`MockFfmpegSpawner`] when it fakes an encode.
pub const DUMMY_OUTPUT: &[u8] = b"mock hevc bitstream";

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

// ============================================================================
// PROCESS RUNNER MOCK
// ============================================================================

#[derive(Debug, Clone)]
enum MockResponse {
    Output(ProcessOutput),
    Missing,
    Timeout,
}

#[derive(Debug, Clone)]
struct MockRule {
    program: String,
    needles: Vec<String>,
    response: MockResponse,
}

impl MockRule {
    fn matches(&self, cmd: &ToolCommand) -> bool {
        self.program == cmd.program
            && self
                .needles
                .iter()
                .all(|needle| cmd.args.iter().any(|arg| arg.contains(needle.as_str())))
    }
}

/// [`ProcessRunner`] answering from registered rules.
///
/// A rule matches when the program name is equal and every needle is a
/// substring of some argument. The most recently registered matching rule
/// wins, so tests can override earlier setup.
#[derive(Clone, Default)]
pub struct MockProcessRunner {
    rules: Rc<RefCell<Vec<MockRule>>>,
    received_calls: Rc<RefCell<Vec<ToolCommand>>>,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Default::default()
    }

    fn push(&self, program: &str, needles: &[&str], response: MockResponse) {
        self.rules.borrow_mut().push(MockRule {
            program: program.to_string(),
            needles: needles.iter().map(|n| n.to_string()).collect(),
            response,
        });
    }

    /// Answers `program` calls containing `needle` with `output`.
    pub fn respond(&self, program: &str, needle: &str, output: ProcessOutput) {
        self.push(program, &[needle], MockResponse::Output(output));
    }

    /// Answers calls matching every needle with `output`.
    pub fn respond_all(&self, program: &str, needles: &[&str], output: ProcessOutput) {
        self.push(program, needles, MockResponse::Output(output));
    }

    /// Makes every call to `program` fail as if it were not installed.
    pub fn missing_program(&self, program: &str) {
        self.push(program, &[], MockResponse::Missing);
    }

    /// Makes matching calls fail with a timeout.
    pub fn time_out(&self, program: &str, needles: &[&str]) {
        self.push(program, needles, MockResponse::Timeout);
    }

    /// Registers `-version` answers for ffmpeg and ffprobe.
    pub fn with_tools_installed(self) -> Self {
        self.respond("ffmpeg", "-version", ProcessOutput::ok("ffmpeg version mock"));
        self.respond("ffprobe", "-version", ProcessOutput::ok("ffprobe version mock"));
        self
    }

    /// Scripts the three ffprobe queries for a file with one video stream.
    pub fn expect_video(&self, path: &Path, codec: &str, width: u32, height: u32, frames: u64) {
        let path = path.to_string_lossy().into_owned();
        self.respond_all(
            "ffprobe",
            &[path.as_str(), "stream=codec_type"],
            ProcessOutput::ok("video\naudio\nsubtitle\n"),
        );
        self.respond_all(
            "ffprobe",
            &[path.as_str(), "stream=codec_name,width,height"],
            ProcessOutput::ok(format!("{codec},{width},{height}\n")),
        );
        self.respond_all(
            "ffprobe",
            &[path.as_str(), "stream=nb_read_packets"],
            ProcessOutput::ok(format!("{frames}\n")),
        );
    }

    /// Scripts ffprobe to reject `path` as not being media at all.
    pub fn expect_not_media(&self, path: &Path) {
        let path = path.to_string_lossy().into_owned();
        self.respond_all(
            "ffprobe",
            &[path.as_str(), "stream=codec_type"],
            ProcessOutput::failed(1, "Invalid data found when processing input"),
        );
    }

    pub fn received_calls(&self) -> Vec<ToolCommand> {
        self.received_calls.borrow().clone()
    }

    /// Number of recorded calls whose arguments contain `needle`.
    pub fn count_calls(&self, needle: &str) -> usize {
        self.received_calls
            .borrow()
            .iter()
            .filter(|cmd| cmd.args.iter().any(|arg| arg.contains(needle)))
            .count()
    }
}

impl ProcessRunner for MockProcessRunner {
    fn run(&self, cmd: &ToolCommand) -> CoreResult<ProcessOutput> {
        self.received_calls.borrow_mut().push(cmd.clone());

        let rule = self
            .rules
            .borrow()
            .iter()
            .rev()
            .find(|rule| rule.matches(cmd))
            .cloned();

        match rule.map(|r| r.response) {
            Some(MockResponse::Output(output)) => Ok(output),
            Some(MockResponse::Missing) => Err(CoreError::DependencyNotFound(cmd.program.clone())),
            Some(MockResponse::Timeout) => Err(CoreError::CommandTimeout(
                cmd.program.clone(),
                cmd.timeout.map_or(0, |t| t.as_secs()),
            )),
            None => {
                log::error!("MockProcessRunner: no response registered for: {cmd}");
                Err(CoreError::OperationFailed(format!(
                    "MockProcessRunner: no response registered for: {cmd}"
                )))
            }
        }
    }
}

// ============================================================================
// FFMPEG SPAWNER MOCK
// ============================================================================

/// Mock implementation of [`FfmpegProcess`].
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Rc<RefCell<Vec<FfmpegEvent>>>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let events = self.events_to_emit.borrow().clone();
        for event in events {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// What the mock writes at the destination before "exiting".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOutputFile {
    None,
    Empty,
    Dummy,
}

/// Represents an expected ffmpeg call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub output_file: MockOutputFile,
    /// Runs with the output path once the output file has been written.
    pub after_write: Option<Box<dyn FnOnce(&Path)>>,
}

/// Mock implementation of [`FfmpegSpawner`] supporting multiple expectations.
///
/// Each expectation is consumed by the first spawn whose arguments contain
/// its pattern. Spawning with no matching expectation panics.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        output_file: MockOutputFile,
    ) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            output_file,
            after_write: None,
        });
    }

    /// Exit 0 and write a non-empty output file.
    pub fn add_success_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>) {
        let process = MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            exit_status: exit_status(0),
        };
        self.add_expectation(arg_pattern, Ok(process), MockOutputFile::Dummy);
    }

    /// Like [`Self::add_success_expectation`], then hands the output path to
    /// `after_write` so a test can change the filesystem mid-encode.
    pub fn add_success_expectation_then(
        &self,
        arg_pattern: &str,
        after_write: impl FnOnce(&Path) + 'static,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(Vec::new())),
            exit_status: exit_status(0),
        };
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result: Ok(process),
            output_file: MockOutputFile::Dummy,
            after_write: Some(Box::new(after_write)),
        });
    }

    /// Exit 0 but leave an empty output file behind.
    pub fn add_empty_output_expectation(&self, arg_pattern: &str) {
        let process = MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(Vec::new())),
            exit_status: exit_status(0),
        };
        self.add_expectation(arg_pattern, Ok(process), MockOutputFile::Empty);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), MockOutputFile::None);
    }

    /// Write a partial output file, then exit with `exit_code`.
    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            exit_status: exit_status(exit_code),
        };
        self.add_expectation(arg_pattern, Ok(process), MockOutputFile::Dummy);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    /// Expectations registered but never spawned.
    pub fn pending_expectations(&self) -> usize {
        self.expectations.borrow().len()
    }
}

fn write_output_file(output_path: &Path, kind: MockOutputFile) {
    let contents: &[u8] = match kind {
        MockOutputFile::None => return,
        MockOutputFile::Empty => b"",
        MockOutputFile::Dummy => DUMMY_OUTPUT,
    };
    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            log::error!("MockFfmpegSpawner failed to create parent dir {parent:?}: {e}");
        }
    }
    match std::fs::write(output_path, contents) {
        Ok(()) => log::debug!("MockFfmpegSpawner wrote output file: {output_path:?}"),
        Err(e) => log::error!("MockFfmpegSpawner failed to write {output_path:?}: {e}"),
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        let mut expectations = self.expectations.borrow_mut();
        let found_index = expectations
            .iter()
            .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));

        let Some(index) = found_index else {
            panic!("MockFfmpegSpawner: No expectation found for command args: {args:?}");
        };

        let expectation = expectations.remove(index);
        log::debug!(
            "MockFfmpegSpawner: Matched expectation with pattern '{}'",
            expectation.arg_pattern
        );

        let process = expectation.result?;
        if let Some(output_path) = args.last() {
            let output_path = PathBuf::from(output_path);
            write_output_file(&output_path, expectation.output_file);
            if let Some(after_write) = expectation.after_write {
                after_write(&output_path);
            }
        }
        Ok(process)
    }
}

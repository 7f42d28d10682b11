//! Progress and status reporting
//!
//! The pipeline never prints directly. It calls the free functions below,
//! which forward to a single installed [`ProgressReporter`]; the CLI installs
//! [`crate::terminal::TerminalReporter`]. With nothing installed (library
//! use, most tests) every call is a no-op.

pub mod ffmpeg_handler;

use std::sync::{LazyLock, Mutex, PoisonError};

/// Kinds of one-line messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLevel {
    /// Run phase header
    Section,
    /// Start of work on one file
    Processing,
    Success,
    /// File left alone on purpose
    Skip,
    Warning,
    Error,
    Info,
}

/// Receives status output and encode progress from the pipeline.
pub trait ProgressReporter: Send + Sync {
    fn output(&self, level: OutputLevel, text: &str);

    /// Key/value line, e.g. `Source: h264 1920x1080`.
    fn output_status(&self, label: &str, value: &str, highlight: bool);

    /// Advance the encode display. `total_frames` is 0 when unknown.
    fn progress_bar(&self, frame: u64, total_frames: u64, fps: f32, speed: f32);

    fn clear_progress_bar(&self);

    /// Full ffmpeg command line about to run.
    fn ffmpeg_command(&self, cmd_line: &str);
}

type SharedReporter = Mutex<Option<Box<dyn ProgressReporter>>>;

static REPORTER: LazyLock<SharedReporter> = LazyLock::new(|| Mutex::new(None));

/// Installs the global reporter, replacing any previous one.
pub fn set_progress_reporter(reporter: Box<dyn ProgressReporter>) {
    *REPORTER.lock().unwrap_or_else(PoisonError::into_inner) = Some(reporter);
}

/// Runs `f` against the installed reporter, if any.
///
/// A reporter that panicked mid-call does not silence later output.
pub fn with_reporter<F>(f: F)
where
    F: FnOnce(&dyn ProgressReporter),
{
    let guard = REPORTER.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(reporter) = guard.as_deref() {
        f(reporter);
    }
}

pub fn section(title: &str) {
    with_reporter(|r| r.output(OutputLevel::Section, title));
}

pub fn processing(filename: &str) {
    with_reporter(|r| r.output(OutputLevel::Processing, filename));
}

pub fn status(label: &str, value: &str, highlight: bool) {
    with_reporter(|r| r.output_status(label, value, highlight));
}

pub fn success(message: &str) {
    with_reporter(|r| r.output(OutputLevel::Success, message));
}

pub fn skip(message: &str) {
    with_reporter(|r| r.output(OutputLevel::Skip, message));
}

pub fn warning(message: &str) {
    with_reporter(|r| r.output(OutputLevel::Warning, message));
}

pub fn error(message: &str) {
    with_reporter(|r| r.output(OutputLevel::Error, message));
}

pub fn info(message: &str) {
    with_reporter(|r| r.output(OutputLevel::Info, message));
}

pub fn progress(frame: u64, total_frames: u64, fps: f32, speed: f32) {
    with_reporter(|r| r.progress_bar(frame, total_frames, fps, speed));
}

pub fn clear_progress() {
    with_reporter(|r| r.clear_progress_bar());
}

pub fn ffmpeg_command(cmd_line: &str) {
    with_reporter(|r| r.ffmpeg_command(cmd_line));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl ProgressReporter for Recorder {
        fn output(&self, level: OutputLevel, text: &str) {
            self.0.lock().unwrap().push(format!("{level:?} {text}"));
        }
        fn output_status(&self, label: &str, value: &str, _highlight: bool) {
            self.0.lock().unwrap().push(format!("Status {label}={value}"));
        }
        fn progress_bar(&self, frame: u64, total_frames: u64, _fps: f32, _speed: f32) {
            self.0.lock().unwrap().push(format!("Progress {frame}/{total_frames}"));
        }
        fn clear_progress_bar(&self) {}
        fn ffmpeg_command(&self, _cmd_line: &str) {}
    }

    #[test]
    fn helpers_route_to_the_installed_reporter() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        set_progress_reporter(Box::new(Recorder(Arc::clone(&lines))));

        skip("routing-check.mkv is already HEVC");
        status("routing-check", "ok", false);
        progress(7, 70, 24.0, 1.0);

        // Other tests may report concurrently; only look at our own lines.
        let recorded = lines.lock().unwrap().clone();
        assert!(recorded.contains(&"Skip routing-check.mkv is already HEVC".to_string()));
        assert!(recorded.contains(&"Status routing-check=ok".to_string()));
        assert!(recorded.contains(&"Progress 7/70".to_string()));
    }
}

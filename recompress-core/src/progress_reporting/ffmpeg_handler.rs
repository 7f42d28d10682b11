//! `FFmpeg` event handler
//!
//! Turns the ffmpeg-sidecar event stream of an encode into progress updates
//! and log lines, and keeps the tail of ffmpeg's error output so a failed
//! encode can say why it failed.

use crate::error::CoreResult;
use crate::progress_reporting;
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel as FfmpegLogLevel};
use std::collections::VecDeque;

/// Error lines kept for the failure message.
const MAX_ERROR_LINES: usize = 5;

/// Handler for `FFmpeg` events during one encode
pub struct FfmpegProgressHandler {
    total_frames: u64,
    last_frame: u64,
    error_lines: VecDeque<String>,
}

impl FfmpegProgressHandler {
    /// `total_frames` of 0 means the length is unknown.
    #[must_use]
    pub fn new(total_frames: u64) -> Self {
        Self {
            total_frames,
            last_frame: 0,
            error_lines: VecDeque::with_capacity(MAX_ERROR_LINES),
        }
    }

    /// Handles an `FFmpeg` event
    pub fn handle_event(&mut self, event: FfmpegEvent) -> CoreResult<()> {
        match event {
            FfmpegEvent::Progress(progress) => self.handle_progress(&progress),
            FfmpegEvent::Log(level, message) => self.handle_log(&level, &message),
            FfmpegEvent::Error(error) => self.handle_error(&error),
            _ => {}
        }
        Ok(())
    }

    /// Last frame number ffmpeg reported.
    #[must_use]
    pub fn last_frame(&self) -> u64 {
        self.last_frame
    }

    /// The most recent error lines, oldest first, joined with "; ".
    #[must_use]
    pub fn error_summary(&self) -> Option<String> {
        if self.error_lines.is_empty() {
            None
        } else {
            Some(self.error_lines.iter().cloned().collect::<Vec<_>>().join("; "))
        }
    }

    fn handle_progress(&mut self, progress: &FfmpegProgress) {
        self.last_frame = u64::from(progress.frame);
        progress_reporting::progress(
            self.last_frame,
            self.total_frames,
            progress.fps,
            progress.speed,
        );
    }

    fn handle_log(&mut self, level: &FfmpegLogLevel, message: &str) {
        let log_level = map_ffmpeg_log_level(level);
        if log_level <= log::Level::Error && !is_non_critical_ffmpeg_error(message) {
            self.remember_error(message);
        }

        if log_level == log::Level::Info {
            log::trace!(target: "ffmpeg_log", "{message}");
        } else {
            log::log!(target: "ffmpeg_log", log_level, "{message}");
        }
    }

    fn handle_error(&mut self, error: &str) {
        if is_non_critical_ffmpeg_error(error) {
            log::debug!("ffmpeg non-critical message: {error}");
        } else {
            log::debug!("ffmpeg error: {error}");
            self.remember_error(error);
        }
    }

    fn remember_error(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if self.error_lines.len() == MAX_ERROR_LINES {
            self.error_lines.pop_front();
        }
        self.error_lines.push_back(line.to_string());
    }
}

/// Maps `FFmpeg` log level to Rust log level
fn map_ffmpeg_log_level(level: &FfmpegLogLevel) -> log::Level {
    match level {
        FfmpegLogLevel::Fatal | FfmpegLogLevel::Error => log::Level::Error,
        FfmpegLogLevel::Warning => log::Level::Warn,
        FfmpegLogLevel::Info => log::Level::Info,
        _ => log::Level::Trace,
    }
}

/// `FFmpeg` messages that appear on stderr without indicating a real problem.
fn is_non_critical_ffmpeg_error(error: &str) -> bool {
    error.contains("deprecated pixel format")
        || error.contains("No accelerated colorspace conversion")
        || error.contains("automatically inserted filter")
        || error.contains("Timestamps are unset")
        || error.contains("Queue input is backward")
        || error.contains("first frame is no keyframe")
}

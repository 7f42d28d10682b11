//! FFmpeg command building for HEVC re-encoding
//!
//! Turns a validated [`JobConfig`] and a [`ScalingPlan`] into an
//! [`EncodeCommand`]: every stream of the source is mapped and stream-copied,
//! then the first video stream is overridden with 10-bit libx265. The command
//! is plain data until [`EncodeCommand::into_ffmpeg_command`] hands it to
//! ffmpeg-sidecar, which keeps argument assembly testable without ffmpeg.

use crate::config::{JobConfig, SpeedPreset};
use crate::processing::decision::ScalingPlan;

use ffmpeg_sidecar::command::FfmpegCommand;

use std::path::{Path, PathBuf};

pub const VIDEO_CODEC: &str = "libx265";
pub const PIXEL_FORMAT: &str = "yuv420p10le";

/// Codec tag written for the HEVC stream so Apple players recognise it.
pub const CODEC_TAG: &str = "hvc1";

/// x265 threading parameters derived from the host core count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadHints {
    pub pools: usize,
    pub frame_threads: usize,
}

impl ThreadHints {
    /// `pools = max(cpus, 1)`, `frame-threads = max(cpus / 2, 1)`.
    #[must_use]
    pub fn from_cpu_count(cpu_count: usize) -> Self {
        Self {
            pools: cpu_count.max(1),
            frame_threads: (cpu_count / 2).max(1),
        }
    }

    /// Renders the value of `-x265-params`.
    #[must_use]
    pub fn to_x265_params(&self) -> String {
        format!("pools={}:frame-threads={}", self.pools, self.frame_threads)
    }
}

/// A fully described encode of one file.
///
/// Not `Clone`: the executor takes it by value so each command runs once.
#[derive(Debug, PartialEq, Eq)]
pub struct EncodeCommand {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub scale_filter: Option<String>,
    pub codec: &'static str,
    pub pixel_format: &'static str,
    pub codec_tag: &'static str,
    pub quality: u8,
    pub preset: SpeedPreset,
    pub threads: ThreadHints,
}

/// Builds the encode command for `source`, writing to `destination`.
///
/// # Examples
///
/// ```rust
/// use std::path::Path;
/// use recompress_core::config::JobConfigBuilder;
/// use recompress_core::external::build_encode_command;
/// use recompress_core::processing::decision::ScalingPlan;
///
/// let config = JobConfigBuilder::new().cpu_count(8).build().unwrap();
/// let plan = ScalingPlan::compute(1280, 720, 1920, 1080);
/// let cmd = build_encode_command(&config, Path::new("in.mkv"), Path::new("out.mkv"), &plan);
///
/// assert_eq!(cmd.threads.to_x265_params(), "pools=8:frame-threads=4");
/// assert!(cmd.scale_filter.is_none());
/// ```
#[must_use]
pub fn build_encode_command(
    config: &JobConfig,
    source: &Path,
    destination: &Path,
    plan: &ScalingPlan,
) -> EncodeCommand {
    EncodeCommand {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        scale_filter: plan.scale_filter(),
        codec: VIDEO_CODEC,
        pixel_format: PIXEL_FORMAT,
        codec_tag: CODEC_TAG,
        quality: config.quality,
        preset: config.speed,
        threads: ThreadHints::from_cpu_count(config.cpu_count),
    }
}

impl EncodeCommand {
    /// The ffmpeg argument list, destination last.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-y".into(),
            "-i".into(),
            self.source.to_string_lossy().into_owned(),
            // Every stream, copied unless overridden below.
            "-map".into(),
            "0".into(),
            "-c".into(),
            "copy".into(),
            "-c:v:0".into(),
            self.codec.into(),
            "-pix_fmt:v:0".into(),
            self.pixel_format.into(),
            "-tag:v:0".into(),
            self.codec_tag.into(),
            "-crf".into(),
            self.quality.to_string(),
            "-preset".into(),
            self.preset.as_str().into(),
            "-x265-params".into(),
            self.threads.to_x265_params(),
        ];

        if let Some(filter) = &self.scale_filter {
            args.push("-filter:v:0".into());
            args.push(filter.clone());
        }

        args.extend([
            "-map_metadata".into(),
            "0".into(),
            "-map_chapters".into(),
            "0".into(),
            self.destination.to_string_lossy().into_owned(),
        ]);
        args
    }

    /// Converts the description into an ffmpeg-sidecar command.
    #[must_use]
    pub fn into_ffmpeg_command(self) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new();
        cmd.args(self.to_args());
        cmd
    }
}

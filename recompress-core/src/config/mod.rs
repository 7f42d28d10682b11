//! Configuration structures and constants for the recompress-core library.
//!
//! A [`JobConfig`] is built once per run (normally through
//! [`JobConfigBuilder`]), validated, and then shared by reference with every
//! per-file operation. Nothing in the pipeline mutates it.

mod builder;

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub use builder::JobConfigBuilder;

// Default constants

/// Default CRF quality. Lower values produce higher quality but larger files.
pub const DEFAULT_QUALITY: u8 = 26;

/// Lowest accepted CRF value.
pub const MIN_QUALITY: u8 = 18;

/// Highest accepted CRF value.
pub const MAX_QUALITY: u8 = 35;

/// Default bounding box width; larger sources are scaled down to fit.
pub const DEFAULT_MAX_WIDTH: u32 = 1920;

/// Default bounding box height.
pub const DEFAULT_MAX_HEIGHT: u32 = 1080;

pub const MIN_MAX_WIDTH: u32 = 100;
pub const MIN_MAX_HEIGHT: u32 = 50;

/// Directory (relative to the working directory) receiving finished output.
pub const DEFAULT_OUTPUT_ROOT: &str = "_recompressed";

/// Name of the staging subdirectory inside the output root.
pub const STAGING_DIR_NAME: &str = "_working";

/// Named x265 speed presets.
///
/// Declaration order follows x265: fastest encode first, best compression
/// last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpeedPreset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    Medium,
    Slow,
    #[default]
    Slower,
    Veryslow,
}

impl SpeedPreset {
    pub const ALL: [SpeedPreset; 9] = [
        SpeedPreset::Ultrafast,
        SpeedPreset::Superfast,
        SpeedPreset::Veryfast,
        SpeedPreset::Faster,
        SpeedPreset::Fast,
        SpeedPreset::Medium,
        SpeedPreset::Slow,
        SpeedPreset::Slower,
        SpeedPreset::Veryslow,
    ];

    /// The preset name as ffmpeg's `-preset` option expects it.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedPreset::Ultrafast => "ultrafast",
            SpeedPreset::Superfast => "superfast",
            SpeedPreset::Veryfast => "veryfast",
            SpeedPreset::Faster => "faster",
            SpeedPreset::Fast => "fast",
            SpeedPreset::Medium => "medium",
            SpeedPreset::Slow => "slow",
            SpeedPreset::Slower => "slower",
            SpeedPreset::Veryslow => "veryslow",
        }
    }

    /// Comma-separated list of every preset name, for help and error text.
    #[must_use]
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(SpeedPreset::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SpeedPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpeedPreset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|preset| preset.as_str() == s)
            .ok_or_else(|| {
                CoreError::Config(format!(
                    "unknown speed preset '{s}' (expected one of: {})",
                    Self::names()
                ))
            })
    }
}

/// Validated settings for one batch run.
///
/// # Examples
///
/// ```rust
/// use recompress_core::config::{JobConfigBuilder, SpeedPreset};
///
/// let config = JobConfigBuilder::new()
///     .quality(22)
///     .speed(SpeedPreset::Slow)
///     .max_dimensions(1280, 720)
///     .cpu_count(8)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.quality, 22);
/// assert_eq!(config.max_width, 1280);
/// ```
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// CRF quality, 18-35
    pub quality: u8,

    /// x265 speed preset
    pub speed: SpeedPreset,

    /// Bounding box width (>= 100)
    pub max_width: u32,

    /// Bounding box height (>= 50)
    pub max_height: u32,

    /// Re-encode even when the source is already HEVC
    pub force_encode: bool,

    /// Logical processors available to the encoder
    pub cpu_count: usize,

    /// Directory receiving finished files; staging lives below it
    pub output_root: PathBuf,

    /// Optional limit for each ffprobe invocation
    pub probe_timeout: Option<Duration>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            speed: SpeedPreset::default(),
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            force_encode: false,
            cpu_count: num_cpus::get().max(1),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            probe_timeout: None,
        }
    }
}

impl JobConfig {
    /// Directory holding in-progress output.
    #[must_use]
    pub fn staging_dir(&self) -> PathBuf {
        self.output_root.join(STAGING_DIR_NAME)
    }

    /// Checks every field against its accepted range.
    pub fn validate(&self) -> CoreResult<()> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(CoreError::Config(format!(
                "quality must be between {MIN_QUALITY} and {MAX_QUALITY}, got {}",
                self.quality
            )));
        }

        if self.max_width < MIN_MAX_WIDTH {
            return Err(CoreError::Config(format!(
                "width must be at least {MIN_MAX_WIDTH}, got {}",
                self.max_width
            )));
        }

        if self.max_height < MIN_MAX_HEIGHT {
            return Err(CoreError::Config(format!(
                "height must be at least {MIN_MAX_HEIGHT}, got {}",
                self.max_height
            )));
        }

        if self.cpu_count == 0 {
            return Err(CoreError::Config("cpu count must be at least 1".to_string()));
        }

        if self.output_root.as_os_str().is_empty() {
            return Err(CoreError::Config("output directory must not be empty".to_string()));
        }

        if self.probe_timeout.is_some_and(|t| t.is_zero()) {
            return Err(CoreError::Config("probe timeout must be greater than zero".to_string()));
        }

        Ok(())
    }
}

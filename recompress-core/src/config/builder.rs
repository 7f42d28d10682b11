// ============================================================================
// recompress-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for JobConfig
//
// Fluent construction of a JobConfig. The host core count is the one value
// read from the machine; it defaults to `num_cpus::get()` and can be injected
// explicitly so that thread hints are deterministic in tests.
//
// AI-ASSISTANT-INFO: Builder pattern implementation for JobConfig

// ---- Standard library imports ----
use std::path::PathBuf;
use std::time::Duration;

// ---- Internal crate imports ----
use super::{JobConfig, SpeedPreset};
use crate::error::CoreResult;

/// Builder for creating validated [`JobConfig`] instances.
///
/// # Examples
///
/// ```rust
/// use recompress_core::config::JobConfigBuilder;
///
/// let config = JobConfigBuilder::new()
///     .force_encode(true)
///     .output_root("/tmp/out")
///     .build()
///     .unwrap();
/// assert!(config.force_encode);
/// ```
#[derive(Debug, Clone)]
pub struct JobConfigBuilder {
    config: JobConfig,
    cpu_count: Option<usize>,
}

impl Default for JobConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JobConfigBuilder {
    /// Creates a builder populated with the documented defaults.
    pub fn new() -> Self {
        Self {
            config: JobConfig::default(),
            cpu_count: None,
        }
    }

    /// Sets the CRF quality (18-35).
    pub fn quality(mut self, quality: u8) -> Self {
        self.config.quality = quality;
        self
    }

    /// Sets the x265 speed preset.
    pub fn speed(mut self, speed: SpeedPreset) -> Self {
        self.config.speed = speed;
        self
    }

    /// Sets the bounding box for output dimensions.
    pub fn max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.config.max_width = width;
        self.config.max_height = height;
        self
    }

    pub fn max_width(mut self, width: u32) -> Self {
        self.config.max_width = width;
        self
    }

    pub fn max_height(mut self, height: u32) -> Self {
        self.config.max_height = height;
        self
    }

    /// Re-encode files that are already HEVC.
    pub fn force_encode(mut self, force: bool) -> Self {
        self.config.force_encode = force;
        self
    }

    /// Overrides the detected number of logical processors.
    pub fn cpu_count(mut self, count: usize) -> Self {
        self.cpu_count = Some(count);
        self
    }

    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.output_root = root.into();
        self
    }

    /// Limits each ffprobe call; `None` waits indefinitely.
    pub fn probe_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    /// Builds the configuration, validating every field.
    pub fn build(self) -> CoreResult<JobConfig> {
        let mut config = self.config;
        if let Some(count) = self.cpu_count {
            config.cpu_count = count;
        }
        config.validate()?;
        Ok(config)
    }
}

//! Core library for batch re-encoding of video files to HEVC with ffmpeg.
//!
//! For each input the library probes the file with ffprobe, decides whether
//! it needs encoding (and whether it must be scaled down to fit a bounding
//! box), runs libx265 through ffmpeg into a staging directory, and moves the
//! result into the output directory once it is known to be good.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use recompress_core::config::JobConfigBuilder;
//! use recompress_core::external::{SidecarSpawner, SystemProcessRunner};
//! use recompress_core::{BatchSummary, process_videos};
//! use std::path::PathBuf;
//!
//! let config = JobConfigBuilder::new().quality(24).build().unwrap();
//! let files = vec![PathBuf::from("movie.mkv")];
//!
//! let reports = process_videos(&SystemProcessRunner, &SidecarSpawner, &config, &files).unwrap();
//! let summary = BatchSummary::from_reports(&reports);
//! println!("{} encoded, {} skipped, {} failed", summary.succeeded, summary.skipped, summary.failed);
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod media;
pub mod processing;
pub mod progress_reporting;
pub mod terminal;
pub mod utils;

// Re-exports for public API
pub use config::{JobConfig, JobConfigBuilder, SpeedPreset};
pub use error::{CoreError, CoreResult};
pub use media::{MediaDescriptor, probe_media};
pub use processing::{BatchSummary, FileReport, JobResult, process_file, process_videos};
pub use utils::{calculate_size_reduction, format_bytes, format_duration};

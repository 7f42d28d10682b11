//! Per-file decision-and-transform pipeline and the batch loop around it.
//!
//! Leaf-first: [`decision`] is pure, [`executor`] runs ffmpeg, [`finalize`]
//! moves results into place, and [`batch`] ties them together.

/// Batch loop and per-file handler
pub mod batch;

/// Skip-or-encode decision and scaling plan
pub mod decision;

/// Supervised ffmpeg encode
pub mod executor;

/// Staging layout, atomic move and directory cleanup
pub mod finalize;

pub use batch::{BatchSummary, FileReport, JobResult, process_file, process_videos};
pub use decision::{Decision, ScalingPlan, decide};
pub use executor::{EncodeOutcome, execute_encode};
pub use finalize::{CleanupOutcome, OutputLayout, cleanup_empty_dirs, finalize_output};

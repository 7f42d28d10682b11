// ============================================================================
// recompress-core/src/processing/batch.rs
// ============================================================================
//
// BATCH ORCHESTRATION: Sequential per-file pipeline
//
// `process_videos` is the main entry point of the library. It runs the fatal
// preflight (configuration validation, ffmpeg/ffprobe presence) and then
// hands each input, in order, to `process_file`, which walks the per-file
// state machine:
//
//   Pending -> Probed -> Decided -> (Skipped | Encoded -> Finalized)
//                                 \-> Failed
//
// Per-file problems never abort the batch; they become a JobResult for that
// file. Empty output/staging directories are removed after every file.
//
// AI-ASSISTANT-INFO: Batch loop, per-file handler, reports and summary

// ---- Internal crate imports ----
use crate::config::JobConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, ProcessRunner, build_encode_command, check_dependencies};
use crate::media::probe_media;
use crate::processing::decision::{Decision, decide};
use crate::processing::executor::{EncodeOutcome, execute_encode};
use crate::processing::finalize::{OutputLayout, cleanup_empty_dirs, finalize_output};
use crate::progress_reporting;
use crate::utils::{calculate_size_reduction, format_bytes, get_filename_safe};

// ---- Standard library imports ----
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Terminal outcome for one input file. Never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    Skipped(String),
    /// Final output location.
    Succeeded(PathBuf),
    Failed(String),
}

/// Per-file pipeline stages, logged at debug level as a file advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileStage {
    Pending,
    Probed,
    Decided,
    Encoded,
    Finalized,
    Skipped,
    Failed,
}

fn enter(filename: &str, stage: FileStage) {
    log::debug!("{filename}: {stage:?}");
}

/// Everything known about one processed file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub result: JobResult,
    pub elapsed: Duration,
    pub input_size: Option<u64>,
    /// Size of the final output; only set for successful encodes.
    pub output_size: Option<u64>,
}

/// Aggregate counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Input bytes of successfully encoded files.
    pub input_bytes: u64,
    /// Output bytes of successfully encoded files.
    pub output_bytes: u64,
    pub elapsed: Duration,
}

impl BatchSummary {
    #[must_use]
    pub fn from_reports(reports: &[FileReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            summary.elapsed += report.elapsed;
            match report.result {
                JobResult::Succeeded(_) => {
                    summary.succeeded += 1;
                    summary.input_bytes += report.input_size.unwrap_or(0);
                    summary.output_bytes += report.output_size.unwrap_or(0);
                }
                JobResult::Skipped(_) => summary.skipped += 1,
                JobResult::Failed(_) => summary.failed += 1,
            }
            summary
        })
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

// ============================================================================
// BATCH ENTRY POINT
// ============================================================================

/// Processes `files` in order and returns one report per file.
///
/// # Errors
///
/// Only preflight problems are errors: an invalid `config`
/// ([`CoreError::Config`]) or a missing ffmpeg/ffprobe
/// ([`CoreError::DependencyNotFound`]). No file is touched in that case.
pub fn process_videos<R: ProcessRunner, S: FfmpegSpawner>(
    runner: &R,
    spawner: &S,
    config: &JobConfig,
    files: &[PathBuf],
) -> CoreResult<Vec<FileReport>> {
    config.validate()?;
    check_dependencies(runner)?;

    log::debug!(
        "Batch of {} file(s): quality {}, preset {}, box {}x{}, force {}, {} cpu(s)",
        files.len(),
        config.quality,
        config.speed,
        config.max_width,
        config.max_height,
        config.force_encode,
        config.cpu_count
    );

    let mut reports = Vec::with_capacity(files.len());
    for input in files {
        let start = Instant::now();
        let input_size = fs::metadata(input).ok().map(|m| m.len());

        let result = process_file(runner, spawner, config, input);

        let output_size = match &result {
            JobResult::Succeeded(path) => fs::metadata(path).ok().map(|m| m.len()),
            _ => None,
        };
        reports.push(FileReport {
            input: input.clone(),
            result,
            elapsed: start.elapsed(),
            input_size,
            output_size,
        });
    }

    Ok(reports)
}

// ============================================================================
// PER-FILE HANDLER
// ============================================================================

/// Runs the full pipeline for one input and reports its outcome.
///
/// Empty output and staging directories are removed afterwards, whatever
/// the outcome.
pub fn process_file<R: ProcessRunner, S: FfmpegSpawner>(
    runner: &R,
    spawner: &S,
    config: &JobConfig,
    input: &Path,
) -> JobResult {
    let layout = OutputLayout::new(config);
    let result = run_pipeline(runner, spawner, config, &layout, input);

    let cleanup = cleanup_empty_dirs(&layout);
    for dir in &cleanup.removed {
        log::debug!("Removed empty directory {}", dir.display());
    }
    for (dir, reason) in &cleanup.retained {
        log::debug!("Kept directory {}: {reason}", dir.display());
    }

    result
}

fn run_pipeline<R: ProcessRunner, S: FfmpegSpawner>(
    runner: &R,
    spawner: &S,
    config: &JobConfig,
    layout: &OutputLayout,
    input: &Path,
) -> JobResult {
    let filename = match get_filename_safe(input) {
        Ok(name) => name,
        Err(e) => return fail(&input.display().to_string(), e.to_string()),
    };
    enter(&filename, FileStage::Pending);
    progress_reporting::processing(&filename);

    let descriptor = match probe_media(runner, input, config.probe_timeout) {
        Ok(descriptor) => descriptor,
        Err(CoreError::NotAVideo(_)) => {
            progress_reporting::warning(&format!("{filename} is not a video file, skipping"));
            return skipped(&filename, "not a video file");
        }
        Err(e) => {
            progress_reporting::warning(&format!("Could not probe {filename}, skipping: {e}"));
            return skipped(&filename, &format!("probe failed: {e}"));
        }
    };
    enter(&filename, FileStage::Probed);
    progress_reporting::status(
        "Source",
        &format!("{} {}x{}", descriptor.codec_name, descriptor.width, descriptor.height),
        false,
    );

    let plan = match decide(&descriptor, config) {
        Decision::Skip => {
            progress_reporting::skip(&format!("{filename} is already HEVC"));
            return skipped(&filename, "already HEVC");
        }
        Decision::Encode(plan) => plan,
    };
    enter(&filename, FileStage::Decided);

    let final_path = layout.final_path(&filename);
    if final_path.exists() {
        progress_reporting::skip(&format!(
            "{} already exists, not overwriting",
            final_path.display()
        ));
        return skipped(&filename, "output already exists");
    }

    if plan.required {
        progress_reporting::status(
            "Scaling",
            &format!("{}x{} -> {}x{}", descriptor.width, descriptor.height, plan.width, plan.height),
            true,
        );
        if plan.has_odd_dimensions() {
            progress_reporting::warning(&format!(
                "Scaled size {}x{} has an odd dimension",
                plan.width, plan.height
            ));
        }
    }

    if let Err(e) = layout.prepare() {
        return fail(&filename, e.to_string());
    }

    let staged = layout.staging_path(&filename);
    let command = build_encode_command(config, input, &staged, &plan);
    progress_reporting::status("Quality", &format!("CRF {}, preset {}", config.quality, config.speed), false);

    let staged = match execute_encode(spawner, command, descriptor.frame_count) {
        EncodeOutcome::Succeeded(path) => path,
        EncodeOutcome::Failed(reason) => return fail(&filename, format!("encode failed: {reason}")),
    };
    enter(&filename, FileStage::Encoded);

    match finalize_output(layout, &staged) {
        Ok(final_path) => {
            enter(&filename, FileStage::Finalized);
            report_success(input, &final_path);
            JobResult::Succeeded(final_path)
        }
        Err(e) => {
            if let Err(remove_err) = fs::remove_file(&staged) {
                log::debug!("Could not remove staged file {}: {remove_err}", staged.display());
            }
            fail(&filename, e.to_string())
        }
    }
}

fn skipped(filename: &str, reason: &str) -> JobResult {
    enter(filename, FileStage::Skipped);
    JobResult::Skipped(reason.to_string())
}

fn fail(filename: &str, reason: String) -> JobResult {
    enter(filename, FileStage::Failed);
    progress_reporting::error(&format!("{filename}: {reason}"));
    JobResult::Failed(reason)
}

fn report_success(input: &Path, final_path: &Path) {
    progress_reporting::success(&format!("Wrote {}", final_path.display()));

    let sizes = fs::metadata(input)
        .and_then(|i| fs::metadata(final_path).map(|o| (i.len(), o.len())));
    if let Ok((input_size, output_size)) = sizes {
        progress_reporting::status(
            "Size",
            &format!(
                "{} -> {} ({}% smaller)",
                format_bytes(input_size),
                format_bytes(output_size),
                calculate_size_reduction(input_size, output_size)
            ),
            false,
        );
    }
}

// recompress-cli/src/commands/encode.rs
//
// Runs a batch: turns parsed flags into a JobConfig, hands the files to
// recompress-core and prints the run summary.

use crate::cli::Cli;
use crate::error::CliResult;
use crate::logging::get_timestamp;

use recompress_core::external::{FfmpegSpawner, ProcessRunner};
use recompress_core::progress_reporting::{info, section, status};
use recompress_core::{
    BatchSummary, CoreError, FileReport, JobConfig, JobConfigBuilder, calculate_size_reduction,
    format_bytes, format_duration, process_videos,
};
use std::time::{Duration, Instant};

/// Builds the job configuration from command-line flags.
pub fn build_config(args: &Cli) -> CliResult<JobConfig> {
    JobConfigBuilder::new()
        .quality(args.quality)
        .speed(args.speed)
        .max_dimensions(args.width, args.height)
        .force_encode(args.force)
        .probe_timeout(args.probe_timeout.map(Duration::from_secs))
        .build()
}

/// Processes every file named on the command line.
///
/// Per-file problems are reported and counted; only an empty file list, an
/// invalid configuration or a missing ffmpeg/ffprobe come back as errors.
pub fn run_encode<R: ProcessRunner, S: FfmpegSpawner>(
    runner: &R,
    spawner: &S,
    args: &Cli,
) -> CliResult<BatchSummary> {
    if args.files.is_empty() {
        return Err(CoreError::Config(
            "No input files given (see --help)".to_string(),
        ));
    }
    let config = build_config(args)?;

    section("recompress");
    status("Started", &get_timestamp(), false);
    status("Files", &args.files.len().to_string(), false);
    status("Quality", &format!("CRF {}", config.quality), false);
    status("Preset", config.speed.as_str(), false);
    status(
        "Max size",
        &format!("{}x{}", config.max_width, config.max_height),
        false,
    );
    status("Output", &config.output_root.display().to_string(), false);
    if config.force_encode {
        status("Force", "re-encoding HEVC sources", true);
    }

    let start = Instant::now();
    let reports = process_videos(runner, spawner, &config, &args.files)?;
    let summary = BatchSummary::from_reports(&reports);

    print_summary(&reports, &summary, start.elapsed());
    Ok(summary)
}

fn print_summary(reports: &[FileReport], summary: &BatchSummary, elapsed: Duration) {
    section("Summary");

    for report in reports {
        log::debug!(
            "{}: {:?} in {}",
            report.input.display(),
            report.result,
            format_duration(report.elapsed)
        );
    }

    status("Encoded", &summary.succeeded.to_string(), false);
    status("Skipped", &summary.skipped.to_string(), false);
    status("Failed", &summary.failed.to_string(), summary.failed > 0);

    if summary.succeeded > 0 {
        status(
            "Size",
            &format!(
                "{} -> {} ({}% smaller)",
                format_bytes(summary.input_bytes),
                format_bytes(summary.output_bytes),
                calculate_size_reduction(summary.input_bytes, summary.output_bytes)
            ),
            false,
        );
    }
    status("Elapsed", &format_duration(elapsed), false);
    info(&format!("Finished at {}", get_timestamp()));
}

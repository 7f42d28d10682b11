// recompress-core/tests/process_videos_failure_tests.rs

use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use recompress_core::config::{JobConfig, JobConfigBuilder};
use recompress_core::error::CoreError;
use recompress_core::external::ProcessOutput;
use recompress_core::external::mocks::{MockFfmpegSpawner, MockProcessRunner};
use recompress_core::processing::{JobResult, process_videos};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

fn create_dummy_file(dir: &Path, filename: &str) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, b"dummy source content").expect("Failed to write dummy file");
    file_path
}

fn config_for(root: &Path) -> JobConfig {
    JobConfigBuilder::new()
        .cpu_count(4)
        .output_root(root.join("_recompressed"))
        .build()
        .expect("valid config")
}

#[test]
fn test_encoder_failure_leaves_no_output() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let input = create_dummy_file(root.path(), "broken.mkv");
    let config = config_for(root.path());

    let runner = MockProcessRunner::new().with_tools_installed();
    runner.expect_video(&input, "h264", 1920, 1080, 1000);
    let spawner = MockFfmpegSpawner::new();
    spawner.add_exit_error_expectation(
        "libx265",
        vec![FfmpegEvent::Log(
            LogLevel::Error,
            "Error while decoding stream #0:0".to_string(),
        )],
        1,
    );

    let reports = process_videos(&runner, &spawner, &config, &[input])?;

    match &reports[0].result {
        JobResult::Failed(reason) => {
            assert!(reason.contains("encode failed"), "reason: {reason}");
            assert!(reason.contains("Error while decoding"), "reason: {reason}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    // Staging file removed, then both empty directories.
    assert!(!root.path().join("_recompressed").exists());
    Ok(())
}

#[test]
fn test_failure_does_not_stop_the_batch() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let bad = create_dummy_file(root.path(), "bad.mkv");
    let good = create_dummy_file(root.path(), "good.mkv");
    let config = config_for(root.path());

    let runner = MockProcessRunner::new().with_tools_installed();
    runner.expect_video(&bad, "h264", 1920, 1080, 10);
    runner.expect_video(&good, "h264", 1920, 1080, 10);
    let spawner = MockFfmpegSpawner::new();
    spawner.add_exit_error_expectation("bad.mkv", Vec::new(), 187);
    spawner.add_success_expectation("good.mkv", Vec::new());

    let reports = process_videos(&runner, &spawner, &config, &[bad, good])?;

    assert!(matches!(reports[0].result, JobResult::Failed(_)));
    assert!(matches!(reports[1].result, JobResult::Succeeded(_)));
    let output_dir = root.path().join("_recompressed");
    assert!(!output_dir.join("bad.mkv").exists());
    assert!(output_dir.join("good.mkv").exists());
    Ok(())
}

#[test]
fn test_failed_move_discards_the_staged_file() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let blocked = create_dummy_file(root.path(), "blocked.mkv");
    let next = create_dummy_file(root.path(), "next.mkv");
    let config = config_for(root.path());
    let output_dir = root.path().join("_recompressed");

    let runner = MockProcessRunner::new().with_tools_installed();
    runner.expect_video(&blocked, "h264", 1920, 1080, 10);
    runner.expect_video(&next, "h264", 1920, 1080, 10);
    let spawner = MockFfmpegSpawner::new();
    // A non-empty directory appears at the final path while encoding.
    let occupied = output_dir.join("blocked.mkv");
    spawner.add_success_expectation_then("blocked.mkv", move |_staged| {
        fs::create_dir_all(&occupied).expect("create directory at final path");
        fs::write(occupied.join("keep"), b"x").expect("fill directory");
    });
    spawner.add_success_expectation("next.mkv", Vec::new());

    let reports = process_videos(&runner, &spawner, &config, &[blocked, next])?;

    match &reports[0].result {
        JobResult::Failed(reason) => assert!(reason.contains("failed to move"), "reason: {reason}"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!output_dir.join("_working").join("blocked.mkv").exists());
    assert!(output_dir.join("blocked.mkv").join("keep").exists());

    assert_eq!(
        reports[1].result,
        JobResult::Succeeded(output_dir.join("next.mkv"))
    );
    assert!(output_dir.join("next.mkv").is_file());
    Ok(())
}

#[test]
fn test_missing_ffprobe_is_fatal() {
    let root = tempdir().unwrap();
    let input = create_dummy_file(root.path(), "movie.mkv");
    let config = config_for(root.path());

    let runner = MockProcessRunner::new();
    runner.respond("ffmpeg", "-version", ProcessOutput::ok("ffmpeg version 7"));
    runner.missing_program("ffprobe");
    let spawner = MockFfmpegSpawner::new();

    let err = process_videos(&runner, &spawner, &config, &[input]).unwrap_err();
    assert!(matches!(err, CoreError::DependencyNotFound(ref tool) if tool == "ffprobe"));
    // Nothing probed after the failed check.
    assert_eq!(runner.count_calls("stream="), 0);
}

#[test]
fn test_invalid_config_is_fatal() {
    let root = tempdir().unwrap();
    let input = create_dummy_file(root.path(), "movie.mkv");
    let config = JobConfig {
        quality: 40,
        ..config_for(root.path())
    };

    let runner = MockProcessRunner::new().with_tools_installed();
    let spawner = MockFfmpegSpawner::new();

    let err = process_videos(&runner, &spawner, &config, &[input]).unwrap_err();
    assert!(matches!(err, CoreError::Config(_)));
    assert!(runner.received_calls().is_empty());
}

#[test]
fn test_probe_failures_skip_the_file() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let garbled = create_dummy_file(root.path(), "garbled.mkv");
    let slow = create_dummy_file(root.path(), "slow.mkv");
    let config = JobConfigBuilder::new()
        .output_root(root.path().join("_recompressed"))
        .probe_timeout(Some(Duration::from_secs(3)))
        .build()?;

    let runner = MockProcessRunner::new().with_tools_installed();
    runner.expect_video(&garbled, "h264", 1920, 1080, 10);
    runner.respond_all(
        "ffprobe",
        &["garbled.mkv", "stream=codec_name,width,height"],
        ProcessOutput::ok("h264,N/A,N/A\n"),
    );
    runner.time_out("ffprobe", &["slow.mkv"]);
    let spawner = MockFfmpegSpawner::new();

    let reports = process_videos(&runner, &spawner, &config, &[garbled, slow])?;

    for report in &reports {
        match &report.result {
            JobResult::Skipped(reason) => assert!(reason.starts_with("probe failed"), "{reason}"),
            other => panic!("expected skip, got {other:?}"),
        }
    }
    assert!(spawner.get_received_calls().is_empty());
    Ok(())
}

#[test]
fn test_missing_input_is_skipped_as_not_a_video() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let missing = root.path().join("does-not-exist.mkv");
    let config = config_for(root.path());

    let runner = MockProcessRunner::new().with_tools_installed();
    runner.expect_not_media(&missing);
    let spawner = MockFfmpegSpawner::new();

    let reports = process_videos(&runner, &spawner, &config, &[missing])?;
    assert_eq!(reports[0].result, JobResult::Skipped("not a video file".to_string()));
    assert_eq!(reports[0].input_size, None);
    Ok(())
}

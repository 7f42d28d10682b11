// recompress-cli/tests/cli_integration.rs
//
// Runs the compiled `recompress` binary end to end. Batch tests put small
// shell scripts named ffmpeg/ffprobe first on PATH, so no real encoder is
// needed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn recompress() -> Command {
    let mut cmd = Command::cargo_bin("recompress").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// ffprobe stand-in: every input is an HEVC 1080p video.
#[cfg(unix)]
const HEVC_FFPROBE: &str = r#"case "$*" in
  *-version*) echo "ffprobe version fake"; exit 0 ;;
  *stream=codec_type*) printf 'video\naudio\n' ;;
  *stream=codec_name,width,height*) echo 'hevc,1920,1080' ;;
  *nb_read_packets*) echo '100' ;;
esac
exit 0
"#;

/// ffprobe stand-in: nothing is a media file.
#[cfg(unix)]
const NOT_MEDIA_FFPROBE: &str = r#"case "$*" in
  *-version*) echo "ffprobe version fake"; exit 0 ;;
esac
echo "Invalid data found when processing input" >&2
exit 1
"#;

#[cfg(unix)]
fn fake_tools(ffprobe: &str) -> tempfile::TempDir {
    let bin = tempdir().unwrap();
    write_script(bin.path(), "ffmpeg", "echo 'ffmpeg version fake'\nexit 0\n");
    write_script(bin.path(), "ffprobe", ffprobe);
    bin
}

#[test]
fn test_help_exits_zero() {
    recompress()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--installmanpage"))
        .stdout(predicate::str::contains("--quality"));
}

#[test]
fn test_version_exits_zero() {
    recompress()
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_quality_out_of_range_exits_one() {
    recompress()
        .args(["-q", "17", "movie.mkv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--quality"));
}

#[test]
fn test_unknown_speed_preset_exits_one() {
    recompress()
        .args(["-s", "placebo", "movie.mkv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown speed preset 'placebo'"));
}

#[test]
fn test_width_below_minimum_exits_one() {
    recompress().args(["-x", "99", "movie.mkv"]).assert().code(1);
}

#[test]
fn test_unknown_flag_exits_one() {
    recompress().args(["--bogus", "movie.mkv"]).assert().code(1);
}

#[test]
fn test_no_files_exits_one() {
    recompress()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No input files"));
}

#[test]
fn test_install_manpage_into_custom_dir() {
    let dir = tempdir().unwrap();
    let man_dir = dir.path().join("man1");

    recompress()
        .args(["-M", "--man-dir"])
        .arg(&man_dir)
        .assert()
        .success();

    let page = fs::read_to_string(man_dir.join("recompress.1")).unwrap();
    assert!(page.starts_with(".TH RECOMPRESS 1"));
}

#[test]
fn test_install_manpage_dir_from_env() {
    let dir = tempdir().unwrap();

    recompress()
        .arg("--installmanpage")
        .env("RECOMPRESS_MAN_DIR", dir.path())
        .assert()
        .success();

    assert!(dir.path().join("recompress.1").exists());
}

#[test]
fn test_install_manpage_failure_exits_one() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("man1");
    fs::write(&blocker, b"file in the way").unwrap();

    recompress()
        .args(["-M", "--man-dir"])
        .arg(&blocker)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot create"));
}

#[test]
fn test_missing_tools_exit_one() {
    let empty_bin = tempdir().unwrap();
    let work = tempdir().unwrap();
    fs::write(work.path().join("movie.mkv"), b"data").unwrap();

    recompress()
        .current_dir(work.path())
        .env("PATH", empty_bin.path())
        .arg("movie.mkv")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Required dependency 'ffmpeg' not found"));

    assert!(!work.path().join("_recompressed").exists());
}

#[cfg(unix)]
#[test]
fn test_hevc_input_is_skipped() {
    let bin = fake_tools(HEVC_FFPROBE);
    let work = tempdir().unwrap();
    fs::write(work.path().join("movie.mkv"), b"data").unwrap();

    recompress()
        .current_dir(work.path())
        .env("PATH", bin.path())
        .arg("movie.mkv")
        .assert()
        .success()
        .stderr(predicate::str::contains("already HEVC"));

    assert!(!work.path().join("_recompressed").exists());
}

#[cfg(unix)]
#[test]
fn test_non_video_is_skipped_and_batch_succeeds() {
    let bin = fake_tools(NOT_MEDIA_FFPROBE);
    let work = tempdir().unwrap();
    fs::write(work.path().join("notes.txt"), b"just text").unwrap();

    recompress()
        .current_dir(work.path())
        .env("PATH", bin.path())
        .arg("notes.txt")
        .assert()
        .success()
        .stderr(predicate::str::contains("not a video file"));

    assert!(work.path().join("notes.txt").exists());
    assert!(!work.path().join("_recompressed").exists());
}

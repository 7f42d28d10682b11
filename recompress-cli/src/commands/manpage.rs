// recompress-cli/src/commands/manpage.rs
//
// Renders and installs the recompress(1) manual page.

use crate::cli::DEFAULT_MAN_DIR;
use crate::error::{CliResult, IoResultExt};
use recompress_core::config::{
    DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_OUTPUT_ROOT, DEFAULT_QUALITY, MAX_QUALITY,
    MIN_MAX_HEIGHT, MIN_MAX_WIDTH, MIN_QUALITY, STAGING_DIR_NAME, SpeedPreset,
};
use std::fs;
use std::path::{Path, PathBuf};

pub const MANPAGE_FILENAME: &str = "recompress.1";

/// Returns the manual page as roff source.
pub fn render_manpage() -> String {
    let date = chrono::Local::now().format("%Y-%m-%d");
    let version = env!("CARGO_PKG_VERSION");
    let presets = SpeedPreset::names();
    let default_preset = SpeedPreset::default();

    format!(
        r#".TH RECOMPRESS 1 "{date}" "recompress {version}" "User Commands"
.SH NAME
recompress \- re-encode video files to 10-bit HEVC
.SH SYNOPSIS
.B recompress
[\fIOPTIONS\fR] \fIFILE\fR...
.br
.B recompress
\fB\-M\fR [\fB\-\-man\-dir\fR \fIDIR\fR]
.SH DESCRIPTION
Each \fIFILE\fR is probed with ffprobe. The first video stream is re-encoded
with libx265 to 10-bit HEVC (yuv420p10le, tagged hvc1); every other stream,
the container metadata and the chapters are copied unchanged. Videos larger
than the maximum size are scaled down, keeping their aspect ratio.
.PP
Files without a video stream and files that are already HEVC are skipped.
Encoded files are written to \fI./{DEFAULT_OUTPUT_ROOT}/\fR under their original
name, via the staging directory \fI./{DEFAULT_OUTPUT_ROOT}/{STAGING_DIR_NAME}/\fR.
An existing output is never overwritten. Source files are never modified.
.SH OPTIONS
.TP
.BR \-f ", " \-\-force
Re-encode files that are already HEVC.
.TP
.BR \-q ", " \-\-quality " \fICRF\fR"
Constant rate factor, {MIN_QUALITY} to {MAX_QUALITY} (default {DEFAULT_QUALITY}). Lower values give
better quality and larger files.
.TP
.BR \-s ", " \-\-speed " \fIPRESET\fR"
x265 speed preset (default {default_preset}). One of: {presets}.
.TP
.BR \-x ", " \-\-width " \fIPIXELS\fR"
Maximum output width, at least {MIN_MAX_WIDTH} (default {DEFAULT_MAX_WIDTH}).
.TP
.BR \-y ", " \-\-height " \fIPIXELS\fR"
Maximum output height, at least {MIN_MAX_HEIGHT} (default {DEFAULT_MAX_HEIGHT}).
.TP
.B \-\-probe\-timeout \fISECS\fR
Give up on ffprobe calls that run longer than \fISECS\fR seconds; the file is
skipped.
.TP
.BR \-M ", " \-\-installmanpage
Install this manual page and exit.
.TP
.B \-\-man\-dir \fIDIR\fR
Where \fB\-M\fR installs the page (default {DEFAULT_MAN_DIR}, or
\fBRECOMPRESS_MAN_DIR\fR).
.TP
.BR \-v ", " \-\-verbose
Enable debug logging.
.TP
.BR \-V ", " \-\-version
Print the version and exit.
.TP
.BR \-h ", " \-\-help
Print help and exit.
.SH EXIT STATUS
0 when the batch ran, whatever happened to individual files, and on
\fB\-\-help\fR, \fB\-\-version\fR and \fB\-M\fR. 1 on invalid options, when no
files are given, when ffmpeg or ffprobe is missing, or when \fB\-M\fR cannot
write the page.
.SH ENVIRONMENT
.TP
.B RUST_LOG
Log filter, used when \fB\-v\fR is not given.
.TP
.B NO_COLOR
Disable colored output.
.SH SEE ALSO
.BR ffmpeg (1),
.BR ffprobe (1),
.BR x265 (1)
"#
    )
}

/// Writes the manual page into `dir`, creating it if needed.
pub fn install_manpage(dir: &Path) -> CliResult<PathBuf> {
    fs::create_dir_all(dir).with_path("Cannot create", dir)?;

    let path = dir.join(MANPAGE_FILENAME);
    fs::write(&path, render_manpage()).with_path("Cannot write", &path)?;

    log::debug!("Installed manual page at {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recompress_core::CoreError;
    use tempfile::tempdir;

    #[test]
    fn page_documents_every_option() {
        let page = render_manpage();
        assert!(page.starts_with(".TH RECOMPRESS 1"));
        for flag in [
            "\\-\\-force",
            "\\-\\-quality",
            "\\-\\-speed",
            "\\-\\-width",
            "\\-\\-height",
            "\\-\\-installmanpage",
            "\\-\\-probe\\-timeout",
        ] {
            assert!(page.contains(flag), "missing {flag}");
        }
        assert!(page.contains("ultrafast, superfast"));
        assert!(page.contains("default slower"));
    }

    #[test]
    fn install_creates_missing_directories() {
        let root = tempdir().unwrap();
        let dir = root.path().join("share/man/man1");

        let path = install_manpage(&dir).unwrap();

        assert_eq!(path, dir.join("recompress.1"));
        assert!(fs::read_to_string(&path).unwrap().contains(".SH NAME"));
    }

    #[test]
    fn install_over_a_file_fails() {
        let root = tempdir().unwrap();
        let blocker = root.path().join("man1");
        fs::write(&blocker, b"not a directory").unwrap();

        let err = install_manpage(&blocker).unwrap_err();
        assert!(matches!(err, CoreError::PathError(ref msg) if msg.starts_with("Cannot create")));
    }
}

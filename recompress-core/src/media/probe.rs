//! ffprobe queries for codec and geometry
//!
//! Three queries are run per file, each asking ffprobe for flat
//! comma-separated output (`-of csv=p=0`):
//!
//! 1. stream listing (`stream=codec_type`) to confirm a video stream exists
//! 2. first video stream's `codec_name,width,height`
//! 3. first video stream's packet count, used as the frame total for progress
//!
//! The parsers are separate pure functions so they can be tested against
//! captured ffprobe output.

use crate::error::{CoreError, CoreResult};
use crate::external::{ProcessOutput, ProcessRunner, ToolCommand};

use std::path::Path;
use std::time::Duration;

/// What the pipeline needs to know about an input's first video stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescriptor {
    pub codec_name: String,
    pub width: u32,
    pub height: u32,
    /// 0 when ffprobe cannot count packets.
    pub frame_count: u64,
}

fn ffprobe_query(path: &Path, selector: &[&str], timeout: Option<Duration>) -> ToolCommand {
    ToolCommand::new("ffprobe")
        .args(["-v", "error"])
        .args(selector.iter().copied())
        .args(["-of", "csv=p=0"])
        .path_arg(path)
        .timeout(timeout)
}

fn run_query<R: ProcessRunner>(runner: &R, cmd: &ToolCommand) -> CoreResult<ProcessOutput> {
    runner.run(cmd).map_err(|e| {
        log::debug!("ffprobe invocation failed: {e}");
        CoreError::ProbeFailure(e.to_string())
    })
}

/// Probes `path` for its first video stream.
///
/// # Errors
///
/// * [`CoreError::NotAVideo`] - ffprobe rejects the file or lists no video stream
/// * [`CoreError::ProbeFailure`] - ffprobe could not run, timed out, or its
///   output could not be parsed
pub fn probe_media<R: ProcessRunner>(
    runner: &R,
    path: &Path,
    timeout: Option<Duration>,
) -> CoreResult<MediaDescriptor> {
    log::debug!("Probing {}", path.display());

    let listing = run_query(
        runner,
        &ffprobe_query(path, &["-show_entries", "stream=codec_type"], timeout),
    )?;
    if !listing.success {
        log::debug!(
            "ffprobe rejected {} ({:?}): {}",
            path.display(),
            listing.code,
            listing.stderr.trim()
        );
        return Err(CoreError::NotAVideo(path.to_path_buf()));
    }
    if !has_video_stream(&listing.stdout) {
        return Err(CoreError::NotAVideo(path.to_path_buf()));
    }

    let geometry = run_query(
        runner,
        &ffprobe_query(
            path,
            &["-select_streams", "v:0", "-show_entries", "stream=codec_name,width,height"],
            timeout,
        ),
    )?;
    if !geometry.success {
        return Err(CoreError::ProbeFailure(format!(
            "ffprobe could not read video stream of {}: {}",
            path.display(),
            geometry.stderr.trim()
        )));
    }
    let (codec_name, width, height) = parse_stream_geometry(&geometry.stdout)?;

    let packets = run_query(
        runner,
        &ffprobe_query(
            path,
            &[
                "-select_streams",
                "v:0",
                "-count_packets",
                "-show_entries",
                "stream=nb_read_packets",
            ],
            timeout,
        ),
    )?;
    let frame_count = if packets.success {
        parse_packet_count(&packets.stdout)?
    } else {
        log::debug!("Packet count unavailable for {}", path.display());
        0
    };

    let descriptor = MediaDescriptor {
        codec_name,
        width,
        height,
        frame_count,
    };
    log::debug!("Probed {}: {descriptor:?}", path.display());
    Ok(descriptor)
}

/// True when any line of a `stream=codec_type` listing is exactly `video`.
#[must_use]
pub fn has_video_stream(listing: &str) -> bool {
    listing.lines().any(|line| line.trim() == "video")
}

/// Parses `codec_name,width,height` from the first non-empty line.
///
/// Trailing separators are ignored; ffprobe emits one when the stream carries
/// side data such as a display matrix.
pub fn parse_stream_geometry(output: &str) -> CoreResult<(String, u32, u32)> {
    let line = output
        .lines()
        .map(|line| line.trim().trim_end_matches(','))
        .find(|line| !line.is_empty())
        .ok_or_else(|| CoreError::ProbeFailure("ffprobe returned no video stream details".into()))?;

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [codec, width, height] = fields.as_slice() else {
        return Err(CoreError::ProbeFailure(format!(
            "expected codec_name,width,height but got '{line}'"
        )));
    };

    if codec.is_empty() {
        return Err(CoreError::ProbeFailure(format!("missing codec name in '{line}'")));
    }
    let width = parse_dimension(width, "width", line)?;
    let height = parse_dimension(height, "height", line)?;

    Ok((codec.to_string(), width, height))
}

fn parse_dimension(value: &str, name: &str, line: &str) -> CoreResult<u32> {
    match value.parse::<u32>() {
        Ok(0) => Err(CoreError::ProbeFailure(format!("{name} is zero in '{line}'"))),
        Ok(v) => Ok(v),
        Err(_) => Err(CoreError::ProbeFailure(format!(
            "invalid {name} '{value}' in '{line}'"
        ))),
    }
}

/// Parses the packet count. Empty output or `N/A` means unknown (0).
pub fn parse_packet_count(output: &str) -> CoreResult<u64> {
    let value = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    match value {
        "" | "N/A" => Ok(0),
        v => v
            .parse::<u64>()
            .map_err(|_| CoreError::ProbeFailure(format!("invalid packet count '{v}'"))),
    }
}

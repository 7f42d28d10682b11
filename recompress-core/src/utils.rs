//! Small formatting and path helpers shared by the pipeline and the CLI.

use crate::error::{CoreError, CoreResult};
use std::path::Path;
use std::time::Duration;

/// `HH:MM:SS`, truncating sub-second parts. Hours are not capped at 24.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats a byte count with binary units, two decimals above 1 KiB.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KiB", "MiB", "GiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// The final path component, used as the output basename.
///
/// Fails for paths such as `/`, `` or `dir/..` that do not name a file.
pub fn get_filename_safe(path: &Path) -> CoreResult<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CoreError::PathError(format!("{} does not name a file", path.display())))
}

/// Percentage size reduction from input to output; 0 when nothing was saved.
#[must_use]
pub fn calculate_size_reduction(input_size: u64, output_size: u64) -> u64 {
    if input_size == 0 || output_size >= input_size {
        0
    } else {
        100 - ((u128::from(output_size) * 100) / u128::from(input_size)) as u64
    }
}

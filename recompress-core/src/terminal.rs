//! Terminal UI components and styling for recompress.
//!
//! Consistent terminal output using a small visual hierarchy: section
//! headers, one `»` line per file, indented key/value status lines, and a
//! symbol-prefixed line for every outcome. Text goes through the `log`
//! facade at info level so the CLI's logger decides where it lands; the
//! encode progress bar is drawn by indicatif on stderr.

use crate::progress_reporting::{OutputLevel, ProgressReporter};
use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use std::io::IsTerminal;
use std::sync::{LazyLock, Mutex};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

const STATUS_INDENT: &str = "    ";
const STATUS_LABEL_WIDTH: usize = 12;

static PROGRESS_BAR: LazyLock<Mutex<Option<ProgressBar>>> = LazyLock::new(|| Mutex::new(None));

/// Whether styled output is wanted. Log lines land on stderr, so this follows
/// console's stderr setting, which the CLI turns off for `NO_COLOR`.
fn should_use_color() -> bool {
    console::colors_enabled_stderr()
}

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", style(title.to_uppercase()).cyan().bold());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Print the header line for a file about to be processed
pub fn print_processing(message: &str) {
    info!("");
    if should_use_color() {
        info!("  » {}", style(message).bold());
    } else {
        info!("  » {message}");
    }
}

/// Pads `label` to a fixed display width, counting wide characters correctly.
#[must_use]
pub fn format_status_line(label: &str, value: &str) -> String {
    let padding = STATUS_LABEL_WIDTH.saturating_sub(label.width());
    format!("{STATUS_INDENT}{label}:{} {value}", " ".repeat(padding))
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    if should_use_color() && highlight {
        info!("{}", format_status_line(label, &style(value).bold().to_string()));
    } else {
        info!("{}", format_status_line(label, value));
    }
}

pub fn print_success(message: &str) {
    if should_use_color() {
        info!("  ✓ {}", style(message).green());
    } else {
        info!("  ✓ {message}");
    }
}

/// Print a line for a file that was deliberately left alone
pub fn print_skip(message: &str) {
    if should_use_color() {
        info!("  ↷ {}", style(message).cyan());
    } else {
        info!("  ↷ {message}");
    }
}

pub fn print_warning(message: &str) {
    if should_use_color() {
        info!("  ⚠ {}", style(message).yellow());
    } else {
        info!("  ⚠ {message}");
    }
}

pub fn print_error(message: &str) {
    if should_use_color() {
        info!("  ✗ {}", style(message).red().bold());
    } else {
        info!("  ✗ {message}");
    }
}

fn bar_style(total_frames: u64) -> ProgressStyle {
    let term_width = Term::stderr().size().1 as usize;
    let template = if total_frames == 0 {
        "  {spinner} Encoding: {pos} frames ({elapsed_precise}) {msg}"
    } else if term_width >= 100 {
        "  ⧖ Encoding: {percent:>3}% [{bar:30}] {pos}/{len} frames ({elapsed_precise} / {eta_precise}) {msg}"
    } else {
        "  ⧖ {percent:>3}% [{bar:20}] ETA {eta_precise}"
    };

    let style = if total_frames == 0 {
        ProgressStyle::default_spinner()
    } else {
        ProgressStyle::default_bar()
    };
    style
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##.")
}

fn init_progress_bar(total_frames: u64) -> ProgressBar {
    let pb = if total_frames == 0 {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::new(total_frames)
    };
    pb.set_style(bar_style(total_frames));

    if !std::io::stderr().is_terminal() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Advance the encode progress bar, creating it on first use
pub fn update_progress_bar(frame: u64, total_frames: u64, fps: f32, speed: f32) {
    let Ok(mut state) = PROGRESS_BAR.lock() else {
        return;
    };
    let pb = state.get_or_insert_with(|| init_progress_bar(total_frames));
    pb.set_position(if total_frames > 0 { frame.min(total_frames) } else { frame });
    pb.set_message(format!("{fps:.1} fps, {speed:.2}x"));
}

/// Remove the progress bar from the terminal
pub fn clear_progress_bar() {
    if let Ok(mut state) = PROGRESS_BAR.lock() {
        if let Some(pb) = state.take() {
            pb.finish_and_clear();
        }
    }
}

/// [`ProgressReporter`] that renders to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalReporter;

impl ProgressReporter for TerminalReporter {
    fn output(&self, level: OutputLevel, text: &str) {
        match level {
            OutputLevel::Section => print_section(text),
            OutputLevel::Processing => print_processing(text),
            OutputLevel::Success => print_success(text),
            OutputLevel::Skip => print_skip(text),
            OutputLevel::Warning => print_warning(text),
            OutputLevel::Error => print_error(text),
            OutputLevel::Info => info!("{STATUS_INDENT}{text}"),
        }
    }

    fn output_status(&self, label: &str, value: &str, highlight: bool) {
        print_status(label, value, highlight);
    }

    fn progress_bar(&self, frame: u64, total_frames: u64, fps: f32, speed: f32) {
        update_progress_bar(frame, total_frames, fps, speed);
    }

    fn clear_progress_bar(&self) {
        clear_progress_bar();
    }

    fn ffmpeg_command(&self, cmd_data: &str) {
        log::debug!("{cmd_data}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines_align_values() {
        assert_eq!(format_status_line("Source", "h264"), "    Source:       h264");
        assert_eq!(format_status_line("Quality", "CRF 26"), "    Quality:      CRF 26");
    }

    #[test]
    fn long_labels_are_not_padded() {
        let line = format_status_line("A very long label", "v");
        assert_eq!(line, "    A very long label: v");
    }

    #[test]
    fn colour_follows_the_console_setting() {
        let before = console::colors_enabled_stderr();

        console::set_colors_enabled_stderr(false);
        assert!(!should_use_color());
        console::set_colors_enabled_stderr(true);
        assert!(should_use_color());

        console::set_colors_enabled_stderr(before);
    }

    #[test]
    fn wide_characters_count_double() {
        // Two CJK characters are four columns wide.
        assert_eq!(format_status_line("映像", "x"), format!("    映像:{} x", " ".repeat(8)));
    }
}

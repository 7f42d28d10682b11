// ============================================================================
// recompress-cli/src/logging.rs
// ============================================================================
//
// LOGGING: env_logger setup for the CLI
//
// All user-facing output from the core goes through the `log` facade (see
// recompress_core::terminal), so the logger prints info lines bare and only
// prefixes other levels with their name.
//
// - default: info
// - -v/--verbose: debug
// - otherwise RUST_LOG is honoured (e.g. RUST_LOG=trace)
//
// AI-ASSISTANT-INFO: Logging setup and helper functions

use log::{Level, LevelFilter};
use std::io::Write;

/// Installs the global logger. Safe to call more than once.
pub fn init_logging(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }

    builder.format(|buf, record| match record.level() {
        Level::Info => writeln!(buf, "{}", record.args()),
        level => writeln!(buf, "[{level}] {}", record.args()),
    });

    if builder.try_init().is_ok() {
        log::debug!("Logger initialized (verbose: {verbose})");
    }
}

/// Returns the current local time formatted as "YYYY-MM-DD HH:MM:SS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

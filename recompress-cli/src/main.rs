// ============================================================================
// recompress-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: recompress binary
//
// Parses arguments, installs the logger and terminal reporter, then either
// installs the manual page or runs the batch. Exit status is 0 whenever the
// batch ran (per-file skips and failures are reported, not fatal) and 1 on
// usage errors or fatal errors.
//
// AI-ASSISTANT-INFO: Entry point for the recompress CLI

use clap::Parser;
use clap::error::ErrorKind;
use console::style;
use recompress_cli::{Cli, CliResult, commands, logging};
use recompress_core::external::{SidecarSpawner, SystemProcessRunner};
use recompress_core::progress_reporting::set_progress_reporter;
use recompress_core::terminal::{self, TerminalReporter};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    if std::env::var_os("NO_COLOR").is_some() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    logging::init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            terminal::clear_progress_bar();
            eprintln!("{} {e}", style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    if cli.install_manpage {
        let path = commands::install_manpage(&cli.man_dir)?;
        terminal::print_success(&format!("Installed manual page: {}", path.display()));
        return Ok(());
    }

    set_progress_reporter(Box::new(TerminalReporter));
    let summary = commands::run_encode(&SystemProcessRunner, &SidecarSpawner, cli)?;
    log::debug!("{} of {} file(s) failed", summary.failed, summary.total());
    Ok(())
}

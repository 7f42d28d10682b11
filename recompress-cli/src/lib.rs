// ============================================================================
// recompress-cli/src/lib.rs
// ============================================================================
//
// RECOMPRESS CLI LIBRARY: Exposes the CLI internals to main.rs and tests
//
// KEY COMPONENTS:
// - cli: clap argument definitions
// - commands: batch encode and manpage installation
// - error: CLI result alias and I/O error context
// - logging: env_logger setup and timestamps
//
// AI-ASSISTANT-INFO: Library interface for the recompress CLI

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::Cli;
pub use commands::{install_manpage, run_encode};
pub use error::{CliResult, IoResultExt};

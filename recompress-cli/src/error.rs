// ============================================================================
// recompress-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING
//
// The CLI reports recompress-core's CoreError directly; the only errors it
// produces itself are filesystem failures around manpage installation, which
// need the path and the attempted action in the message.
//
// AI-ASSISTANT-INFO: CLI result alias and I/O error context

use recompress_core::{CoreError, CoreResult};
use std::io;
use std::path::Path;

/// Result type for CLI operations.
pub type CliResult<T> = CoreResult<T>;

/// Attaches an action and a path to an I/O failure.
pub trait IoResultExt<T> {
    /// Maps the error to `CoreError::PathError("<action> <path>: <error>")`.
    fn with_path(self, action: &str, path: &Path) -> CliResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path(self, action: &str, path: &Path) -> CliResult<T> {
        self.map_err(|e| CoreError::PathError(format!("{action} {}: {e}", path.display())))
    }
}

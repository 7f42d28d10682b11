//! Output finalization
//!
//! Encodes are written to a staging directory (`<output>/_working`) and
//! only renamed into the output directory once they are known to be good.
//! Both directories live under the same root, so the rename stays on one
//! filesystem and is atomic.

use crate::config::JobConfig;
use crate::error::{CoreError, CoreResult};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Output and staging directories for a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub output_dir: PathBuf,
    pub staging_dir: PathBuf,
}

impl OutputLayout {
    #[must_use]
    pub fn new(config: &JobConfig) -> Self {
        Self {
            output_dir: config.output_root.clone(),
            staging_dir: config.staging_dir(),
        }
    }

    /// Creates the staging directory (and the output directory above it).
    pub fn prepare(&self) -> CoreResult<()> {
        fs::create_dir_all(&self.staging_dir).map_err(|e| {
            CoreError::PathError(format!(
                "failed to create staging directory {}: {e}",
                self.staging_dir.display()
            ))
        })
    }

    #[must_use]
    pub fn staging_path(&self, basename: &str) -> PathBuf {
        self.staging_dir.join(basename)
    }

    #[must_use]
    pub fn final_path(&self, basename: &str) -> PathBuf {
        self.output_dir.join(basename)
    }
}

/// Moves a staged file to `<output_dir>/<basename>`.
pub fn finalize_output(layout: &OutputLayout, staged: &Path) -> CoreResult<PathBuf> {
    let basename = staged.file_name().ok_or_else(|| {
        CoreError::PathError(format!("staged path {} has no file name", staged.display()))
    })?;
    let final_path = layout.output_dir.join(basename);

    fs::rename(staged, &final_path).map_err(|e| {
        CoreError::OperationFailed(format!(
            "failed to move {} to {}: {e}",
            staged.display(),
            final_path.display()
        ))
    })?;

    log::debug!("Finalized {} -> {}", staged.display(), final_path.display());
    Ok(final_path)
}

/// Which directories [`cleanup_empty_dirs`] removed and which it left.
#[derive(Debug, Default)]
pub struct CleanupOutcome {
    pub removed: Vec<PathBuf>,
    pub retained: Vec<(PathBuf, io::Error)>,
}

/// Removes the staging directory, then the output directory, if empty.
///
/// Never fails: a directory that cannot be removed (usually because it still
/// has files) is recorded in [`CleanupOutcome::retained`].
pub fn cleanup_empty_dirs(layout: &OutputLayout) -> CleanupOutcome {
    let mut outcome = CleanupOutcome::default();
    for dir in [&layout.staging_dir, &layout.output_dir] {
        match fs::remove_dir(dir) {
            Ok(()) => outcome.removed.push(dir.clone()),
            Err(e) => outcome.retained.push((dir.clone(), e)),
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn layout_in(root: &Path) -> OutputLayout {
        let output_dir = root.join("_recompressed");
        OutputLayout {
            staging_dir: output_dir.join("_working"),
            output_dir,
        }
    }

    #[test]
    fn layout_follows_config() {
        let config = JobConfig::default();
        let layout = OutputLayout::new(&config);
        assert_eq!(layout.output_dir, PathBuf::from("_recompressed"));
        assert_eq!(layout.staging_path("a.mkv"), PathBuf::from("_recompressed/_working/a.mkv"));
        assert_eq!(layout.final_path("a.mkv"), PathBuf::from("_recompressed/a.mkv"));
    }

    #[test]
    fn finalize_moves_file_out_of_staging() {
        let root = tempdir().unwrap();
        let layout = layout_in(root.path());
        layout.prepare().unwrap();

        let staged = layout.staging_path("movie.mkv");
        fs::write(&staged, b"data").unwrap();

        let final_path = finalize_output(&layout, &staged).unwrap();
        assert_eq!(final_path, layout.final_path("movie.mkv"));
        assert!(!staged.exists());
        assert_eq!(fs::read(&final_path).unwrap(), b"data");
    }

    #[test]
    fn finalize_reports_missing_staged_file() {
        let root = tempdir().unwrap();
        let layout = layout_in(root.path());
        layout.prepare().unwrap();

        let err = finalize_output(&layout, &layout.staging_path("gone.mkv")).unwrap_err();
        assert!(matches!(err, CoreError::OperationFailed(_)));
    }

    #[test]
    fn cleanup_removes_empty_directories() {
        let root = tempdir().unwrap();
        let layout = layout_in(root.path());
        layout.prepare().unwrap();

        let outcome = cleanup_empty_dirs(&layout);
        assert_eq!(outcome.removed.len(), 2);
        assert!(outcome.retained.is_empty());
        assert!(!layout.output_dir.exists());
    }

    #[test]
    fn cleanup_keeps_directories_with_content() {
        let root = tempdir().unwrap();
        let layout = layout_in(root.path());
        layout.prepare().unwrap();
        fs::write(layout.final_path("done.mkv"), b"x").unwrap();

        let outcome = cleanup_empty_dirs(&layout);
        assert_eq!(outcome.removed, vec![layout.staging_dir.clone()]);
        assert_eq!(outcome.retained.len(), 1);
        assert!(layout.final_path("done.mkv").exists());
    }

    #[test]
    fn cleanup_tolerates_missing_directories() {
        let root = tempdir().unwrap();
        let layout = layout_in(root.path());

        let outcome = cleanup_empty_dirs(&layout);
        assert!(outcome.removed.is_empty());
        assert_eq!(outcome.retained.len(), 2);
    }
}

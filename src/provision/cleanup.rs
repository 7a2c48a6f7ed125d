//! Transient artifact removal.

use super::result::{ProvisionResult, Stage};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Owns a downloaded artifact and removes it when released or dropped.
///
/// Removal runs whether the pipeline succeeded or failed. An artifact that
/// is already gone counts as removed.
#[derive(Debug)]
pub struct ArtifactGuard {
    path: PathBuf,
    released: bool,
}

impl ArtifactGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the artifact and report the outcome as a stage result.
    ///
    /// Never carries a non-zero exit code: a removal failure is a warning.
    pub fn release(&mut self) -> ProvisionResult {
        self.released = true;
        match remove_artifact(&self.path) {
            Ok(true) => {
                ProvisionResult::success(Stage::Cleaned, format!("removed {}", self.path.display()))
            }
            Ok(false) => ProvisionResult::skipped(Stage::Cleaned, "no artifact to remove"),
            Err(e) => {
                tracing::warn!("Could not remove {}: {}", self.path.display(), e);
                ProvisionResult::degraded(
                    Stage::Cleaned,
                    0,
                    format!("could not remove {}: {}", self.path.display(), e),
                )
            }
        }
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if !self.released {
            let _ = remove_artifact(&self.path);
        }
    }
}

/// Delete a file. `Ok(false)` if it did not exist.
pub fn remove_artifact(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::result::StageStatus;
    use tempfile::TempDir;

    #[test]
    fn release_removes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("putty.msi");
        fs::write(&path, "x").unwrap();

        let result = ArtifactGuard::new(&path).release();

        assert_eq!(result.status, StageStatus::Success);
        assert!(!path.exists());
    }

    #[test]
    fn release_of_absent_file_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let result = ArtifactGuard::new(temp.path().join("gone.msi")).release();

        assert_eq!(result.status, StageStatus::Skipped);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn removal_failure_is_warning_only() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("a-directory");
        fs::create_dir_all(&dir).unwrap();

        let result = ArtifactGuard::new(&dir).release();

        assert_eq!(result.status, StageStatus::Degraded);
        assert_eq!(result.exit_code, 0);
        assert!(!result.sets_exit_code());
    }

    #[test]
    fn drop_removes_unreleased_artifact() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("putty.msi");
        fs::write(&path, "x").unwrap();

        {
            let _guard = ArtifactGuard::new(&path);
        }

        assert!(!path.exists());
    }
}

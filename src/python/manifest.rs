//! Dependency manifest lookup.

use crate::error::{OutfitError, Result};
use std::path::{Path, PathBuf};

/// Inputs for a manifest search.
#[derive(Debug, Clone)]
pub struct ManifestSearch<'a> {
    /// File name, e.g. `requirements.txt`.
    pub name: &'a str,
    /// Path given on the command line. When set, it is the only candidate.
    pub explicit: Option<&'a Path>,
    pub project_root: &'a Path,
    pub env_root: &'a Path,
}

impl ManifestSearch<'_> {
    /// Candidate paths in priority order, without duplicates.
    pub fn candidates(&self) -> Vec<PathBuf> {
        if let Some(explicit) = self.explicit {
            return vec![explicit.to_path_buf()];
        }

        let mut dirs = vec![
            self.project_root.to_path_buf(),
            self.project_root.join("src").join("Python"),
            self.project_root.join("python"),
        ];
        if let Some(parent) = self.project_root.parent() {
            dirs.push(parent.to_path_buf());
        }
        if let Some(parent) = self.env_root.parent() {
            dirs.push(parent.to_path_buf());
        }
        dirs.push(self.env_root.to_path_buf());

        let mut candidates: Vec<PathBuf> = Vec::with_capacity(dirs.len());
        for dir in dirs {
            let candidate = dir.join(self.name);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        candidates
    }

    /// First candidate that exists as a file.
    pub fn find(&self) -> Result<PathBuf> {
        let candidates = self.candidates();
        for candidate in &candidates {
            tracing::debug!("Checking for manifest at {}", candidate.display());
            if candidate.is_file() {
                return Ok(candidate.clone());
            }
        }
        let name = match self.explicit {
            Some(explicit) => explicit.display().to_string(),
            None => self.name.to_string(),
        };
        Err(OutfitError::ManifestNotFound {
            name,
            searched: candidates.len(),
        })
    }
}

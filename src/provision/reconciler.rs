//! Search path reconciliation.
//!
//! After an install, the tool's directory must be on the persistent search
//! path (for future sessions) and on the session search path (for the rest
//! of this run). Both writes are idempotent: a directory that is already
//! listed, in any letter case or with a trailing separator, is left alone.

use super::locator::{locate_in_well_known, locate_on_search_path, Location};
use super::target::ProvisionTarget;
use crate::envstore::{append_entry, contains_entry, EnvStore};
use crate::error::Result;
use crate::shell::PATH_VAR;
use std::path::PathBuf;

/// What reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Already reachable through the session search path.
    OnSearchPath { location: Location },
    /// Directory appended to the persistent search path.
    Persisted { dir: PathBuf },
    /// Persistent search path already listed the directory.
    AlreadyPersisted { dir: PathBuf },
    /// Persisting failed; only the session search path was amended.
    SessionOnly { dir: PathBuf, reason: String },
    /// Executable still absent from every probed location.
    NotFound,
}

/// Registers a tool's directory on the search path.
pub struct PathReconciler<'a> {
    persistent: &'a mut dyn EnvStore,
    session: &'a mut dyn EnvStore,
}

impl<'a> PathReconciler<'a> {
    pub fn new(persistent: &'a mut dyn EnvStore, session: &'a mut dyn EnvStore) -> Self {
        Self {
            persistent,
            session,
        }
    }

    /// Make the target's executable reachable by name.
    ///
    /// Only session-store failures are returned as errors; persistent-store
    /// failures degrade to [`ReconcileOutcome::SessionOnly`].
    pub fn reconcile(&mut self, target: &ProvisionTarget) -> Result<ReconcileOutcome> {
        let session_path = self.session.get(PATH_VAR)?.unwrap_or_default();

        if let Some(location) = locate_on_search_path(target, &session_path) {
            return Ok(ReconcileOutcome::OnSearchPath { location });
        }

        let Some(location) = locate_in_well_known(target) else {
            return Ok(ReconcileOutcome::NotFound);
        };
        let dir = location.directory;
        let dir_str = dir.display().to_string();

        let outcome = match self.persist(&dir_str) {
            Ok(true) => {
                tracing::info!("Added {} to {}", dir_str, self.persistent.describe());
                ReconcileOutcome::Persisted { dir: dir.clone() }
            }
            Ok(false) => ReconcileOutcome::AlreadyPersisted { dir: dir.clone() },
            Err(e) => {
                tracing::warn!("Could not persist {}: {}", dir_str, e);
                ReconcileOutcome::SessionOnly {
                    dir: dir.clone(),
                    reason: e.to_string(),
                }
            }
        };

        self.session
            .set(PATH_VAR, &append_entry(&session_path, &dir_str))?;
        Ok(outcome)
    }

    /// Append `dir` to the persistent search path. `Ok(false)` if present.
    fn persist(&mut self, dir: &str) -> Result<bool> {
        let current = self.persistent.get(PATH_VAR)?;
        let value = current.as_deref().unwrap_or_default();
        if contains_entry(value, dir) {
            return Ok(false);
        }

        let updated = append_entry(value, dir);
        if self
            .persistent
            .compare_and_set(PATH_VAR, current.as_deref(), &updated)?
        {
            Ok(true)
        } else {
            Err(anyhow::anyhow!(
                "{} changed concurrently; not overwriting",
                self.persistent.describe()
            )
            .into())
        }
    }
}

//! In-memory environment store.

use super::EnvStore;
use crate::error::{OutfitError, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// [`EnvStore`] backed by a `HashMap`.
///
/// Counts writes so tests can assert that an idempotent operation left the
/// store untouched, and can be told to reject writes to simulate a
/// permission failure.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnvStore {
    vars: HashMap<String, String>,
    writes: usize,
    reject_writes: bool,
}

impl MemoryEnvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a single variable.
    pub fn with_var(name: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.vars.insert(name.to_string(), value.to_string());
        store
    }

    /// Make every subsequent `set` fail with a permission error.
    pub fn reject_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl EnvStore for MemoryEnvStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.vars.get(name).cloned())
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        if self.reject_writes {
            return Err(OutfitError::PathPersistFailed {
                dir: PathBuf::from(value),
                scope: "memory".to_string(),
                message: "write rejected".to_string(),
            });
        }
        self.vars.insert(name.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory store".to_string()
    }
}

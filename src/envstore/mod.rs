//! Environment variable stores.
//!
//! The machine-level search path is global mutable state. Every read and
//! write of it goes through the [`EnvStore`] trait so that the reconciler can
//! be exercised against an in-memory fake instead of the real machine.
//!
//! # Stores
//!
//! - [`ProcessEnvStore`] - the current process environment (session scope)
//! - [`MemoryEnvStore`] - in-memory map for tests and dry runs
//! - [`RegistryEnvStore`] - Windows registry (`HKLM` / `HKCU` environment keys)
//! - [`ProfileEnvStore`] - managed shell profile snippet on Unix
//!
//! # Example
//!
//! ```
//! use outfit::envstore::{EnvStore, MemoryEnvStore};
//!
//! let mut store = MemoryEnvStore::new();
//! store.set("PATH", "/usr/bin").unwrap();
//! assert_eq!(store.get("PATH").unwrap().as_deref(), Some("/usr/bin"));
//! ```

pub mod memory;
pub mod path_list;
pub mod process;
pub mod profile;
pub mod registry;

pub use memory::MemoryEnvStore;
pub use path_list::{
    append_entry, contains_entry, normalize_entry, promote_entry, split_entries,
};
pub use process::ProcessEnvStore;
pub use profile::ProfileEnvStore;
pub use registry::RegistryEnvStore;

use crate::error::Result;
use crate::shell::CommandRunner;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named-variable store with read and write access.
pub trait EnvStore {
    /// Read a variable. `Ok(None)` means the variable is not set.
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Write a variable, replacing any previous value.
    fn set(&mut self, name: &str, value: &str) -> Result<()>;

    /// Human-readable location of the store, for messages.
    fn describe(&self) -> String;

    /// Write `value` only if the variable still holds `expected`.
    ///
    /// Returns `Ok(false)` without writing when the stored value changed
    /// since `expected` was read. The re-read and the write are two separate
    /// operations, so this narrows but does not close the race against other
    /// writers.
    fn compare_and_set(&mut self, name: &str, expected: Option<&str>, value: &str) -> Result<bool> {
        let current = self.get(name)?;
        if current.as_deref() != expected {
            return Ok(false);
        }
        self.set(name, value)?;
        Ok(true)
    }
}

/// Which persistent search path a tool directory is registered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistScope {
    /// Machine-wide; requires elevation.
    #[default]
    Machine,
    /// Current user only.
    User,
}

impl PersistScope {
    /// Whether writing this scope needs elevated privileges.
    pub fn requires_elevation(&self) -> bool {
        matches!(self, PersistScope::Machine)
    }
}

impl fmt::Display for PersistScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistScope::Machine => write!(f, "machine"),
            PersistScope::User => write!(f, "user"),
        }
    }
}

/// Build the platform's persistent store for a scope.
pub fn persistent_store<'a>(
    scope: PersistScope,
    runner: &'a dyn CommandRunner,
) -> Result<Box<dyn EnvStore + 'a>> {
    if cfg!(windows) {
        Ok(Box::new(RegistryEnvStore::new(scope, runner)))
    } else {
        Ok(Box::new(ProfileEnvStore::for_scope(scope)?))
    }
}

//! Current-process environment store.

use super::EnvStore;
use crate::error::Result;

/// [`EnvStore`] over the current process environment.
///
/// Writes affect this process and every child spawned afterwards. Only used
/// from the single provisioning thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvStore;

impl ProcessEnvStore {
    /// Create a handle to the process environment.
    pub fn new() -> Self {
        Self
    }
}

impl EnvStore for ProcessEnvStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(std::env::var_os(name).map(|v| v.to_string_lossy().into_owned()))
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        tracing::debug!("Setting process variable {}", name);
        std::env::set_var(name, value);
        Ok(())
    }

    fn describe(&self) -> String {
        "current process".to_string()
    }
}

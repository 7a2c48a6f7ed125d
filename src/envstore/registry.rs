//! Windows registry environment store.
//!
//! Reads and writes go through `reg.exe` so the store needs no native
//! bindings and can be driven by a scripted [`CommandRunner`] in tests.
//!
//! `reg add` does not broadcast `WM_SETTINGCHANGE`. New consoles and programs
//! started by an already running Explorer keep the old search path until the
//! next logon; the current process is amended through the session store.

use super::{EnvStore, PersistScope};
use crate::error::{OutfitError, Result};
use crate::shell::CommandRunner;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

const MACHINE_KEY: &str = r"HKLM\SYSTEM\CurrentControlSet\Control\Session Manager\Environment";
const USER_KEY: &str = r"HKCU\Environment";

static REG_VALUE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\S+)\s+(REG_[A-Z_]+)\s*(.*)$").expect("static regex is valid")
});

/// [`EnvStore`] over the registry environment key of a scope.
pub struct RegistryEnvStore<'a> {
    scope: PersistScope,
    runner: &'a dyn CommandRunner,
}

impl<'a> RegistryEnvStore<'a> {
    /// Create a store for `scope` using `runner` to invoke `reg.exe`.
    pub fn new(scope: PersistScope, runner: &'a dyn CommandRunner) -> Self {
        Self { scope, runner }
    }

    /// Registry key holding the environment for this scope.
    pub fn key(&self) -> &'static str {
        match self.scope {
            PersistScope::Machine => MACHINE_KEY,
            PersistScope::User => USER_KEY,
        }
    }

    /// Extract a value from `reg query` output.
    pub fn parse_query_output(output: &str, name: &str) -> Option<String> {
        output.lines().find_map(|line| {
            let caps = REG_VALUE_LINE.captures(line)?;
            if caps[1].eq_ignore_ascii_case(name) {
                Some(caps[3].trim_end().to_string())
            } else {
                None
            }
        })
    }
}

impl EnvStore for RegistryEnvStore<'_> {
    fn get(&self, name: &str) -> Result<Option<String>> {
        let args = vec![
            "query".to_string(),
            self.key().to_string(),
            "/v".to_string(),
            name.to_string(),
        ];
        let result = self.runner.run("reg", &args)?;

        if !result.success {
            // reg exits 1 with "unable to find" when the value is absent.
            if result.stderr.to_lowercase().contains("unable to find") {
                return Ok(None);
            }
            return Err(OutfitError::CommandFailed {
                command: format!("reg query {} /v {}", self.key(), name),
                code: result.exit_code,
            });
        }

        Ok(Self::parse_query_output(&result.stdout, name))
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let args = vec![
            "add".to_string(),
            self.key().to_string(),
            "/v".to_string(),
            name.to_string(),
            "/t".to_string(),
            "REG_EXPAND_SZ".to_string(),
            "/d".to_string(),
            value.to_string(),
            "/f".to_string(),
        ];
        let result = self.runner.run("reg", &args)?;

        if result.success {
            tracing::debug!("Updated {} under {}", name, self.key());
            Ok(())
        } else {
            Err(OutfitError::PathPersistFailed {
                dir: PathBuf::from(value),
                scope: self.scope.to_string(),
                message: format!(
                    "reg add exited with {:?}: {}",
                    result.exit_code,
                    result.stderr.trim()
                ),
            })
        }
    }

    fn describe(&self) -> String {
        self.key().to_string()
    }
}

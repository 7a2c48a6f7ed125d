//! Virtual environment layout and materialization polling.

use crate::config::{resolve_string, InterpolationContext};
use crate::error::{OutfitError, Result};
use crate::shell::USER_ROOT_VAR;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Bounded wait for an asynchronous side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Number of checks, at least one.
    pub attempts: u32,
    /// Sleep between checks.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 15,
            interval: Duration::from_secs(1),
        }
    }
}

impl PollPolicy {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            interval,
        }
    }

    /// Run `check` until it returns `true` or the attempts are used up.
    pub fn wait_for(&self, mut check: impl FnMut() -> bool) -> bool {
        for attempt in 1..=self.attempts {
            if check() {
                return true;
            }
            tracing::debug!("Check {}/{} not satisfied", attempt, self.attempts);
            if attempt < self.attempts && !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        }
        false
    }
}

/// On-disk layout of a virtual environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualEnv {
    root: PathBuf,
}

impl VirtualEnv {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `Scripts` on Windows, `bin` elsewhere.
    pub fn scripts_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.root.join("Scripts")
        } else {
            self.root.join("bin")
        }
    }

    /// The environment's own interpreter.
    pub fn interpreter(&self) -> PathBuf {
        if cfg!(windows) {
            self.scripts_dir().join("python.exe")
        } else {
            self.scripts_dir().join("python")
        }
    }

    /// Whether the environment's interpreter exists.
    pub fn is_materialized(&self) -> bool {
        self.interpreter().is_file()
    }

    /// Poll until the interpreter appears.
    pub fn wait_until_materialized(&self, policy: &PollPolicy) -> bool {
        policy.wait_for(|| self.is_materialized())
    }

    /// Delete the environment for a forced rebuild. Absent roots are fine.
    pub fn remove(&self) -> std::io::Result<()> {
        match std::fs::remove_dir_all(&self.root) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    /// Shell command an operator runs to activate the environment.
    pub fn activation_hint(&self) -> String {
        if cfg!(windows) {
            format!("{}", self.scripts_dir().join("activate.bat").display())
        } else {
            format!("source {}", self.scripts_dir().join("activate").display())
        }
    }
}

/// Default environment root below the per-user writable root.
pub fn default_env_root(user_root: &Path) -> PathBuf {
    if cfg!(windows) {
        user_root.join("outfit").join("venv")
    } else {
        user_root.join(".local").join("share").join("outfit").join("venv")
    }
}

/// Pick the environment root: command line, then config, then the default.
///
/// Only the default needs the user-root variable; its absence is
/// `UserRootMissing`.
pub fn resolve_env_root(
    explicit: Option<&Path>,
    configured: Option<&str>,
    ctx: &InterpolationContext,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(template) = configured {
        return Ok(PathBuf::from(resolve_string(template, ctx)?));
    }

    match ctx.resolve(USER_ROOT_VAR) {
        Some(root) if !root.trim().is_empty() => Ok(default_env_root(Path::new(&root))),
        _ => Err(OutfitError::UserRootMissing {
            var: USER_ROOT_VAR.to_string(),
        }),
    }
}

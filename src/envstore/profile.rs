//! Shell profile snippet store (Unix persistent scope).
//!
//! Variables are persisted as `export` lines in a managed snippet that login
//! shells source. Machine-wide that is `/etc/profile.d/outfit.sh`, which the
//! system profile already reads. Per user it is
//! `~/.config/outfit/profile.sh`, and the first write adds a line sourcing it
//! to `~/.profile`. The search path
//! is special: the snippet only holds the managed additions and appends them
//! to whatever `PATH` the shell already has:
//!
//! ```sh
//! # Managed by outfit. Manual edits may be overwritten.
//! export PATH="${PATH:+$PATH:}/opt/putty/bin"
//! ```

use super::EnvStore;
use crate::error::{OutfitError, Result};
use crate::shell::PATH_VAR;
use std::fs;
use std::path::{Path, PathBuf};

use super::PersistScope;

const HEADER: &str = "# Managed by outfit. Manual edits may be overwritten.";

/// [`EnvStore`] persisted in a shell profile snippet.
#[derive(Debug, Clone)]
pub struct ProfileEnvStore {
    path: PathBuf,
    startup: Option<PathBuf>,
}

impl ProfileEnvStore {
    /// Store backed by an explicit snippet file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            startup: None,
        }
    }

    /// Source the snippet from a login script the shell already reads.
    pub fn with_startup_file(mut self, startup: impl Into<PathBuf>) -> Self {
        self.startup = Some(startup.into());
        self
    }

    /// Default snippet location for a scope.
    ///
    /// The user scope needs a home directory; without one there is nowhere
    /// durable to write.
    pub fn for_scope(scope: PersistScope) -> Result<Self> {
        match scope {
            PersistScope::Machine => Ok(Self::new("/etc/profile.d/outfit.sh")),
            PersistScope::User => {
                let home = dirs::home_dir().ok_or_else(|| OutfitError::UserRootMissing {
                    var: "HOME".to_string(),
                })?;
                Ok(
                    Self::new(home.join(".config").join("outfit").join("profile.sh"))
                        .with_startup_file(home.join(".profile")),
                )
            }
        }
    }

    /// Snippet file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Login script that sources the snippet, if any.
    pub fn startup_file(&self) -> Option<&Path> {
        self.startup.as_deref()
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        read_lines(&self.path)
    }

    fn source_line(&self) -> String {
        format!(". \"{}\"", self.path.display())
    }

    /// Append a line sourcing the snippet to the startup file, once.
    fn hook_startup(&self) -> Result<()> {
        let Some(startup) = &self.startup else {
            return Ok(());
        };
        let source = self.source_line();
        let mut lines = read_lines(startup)?;
        if lines.iter().any(|line| line.trim() == source) {
            return Ok(());
        }

        if lines.last().is_some_and(|line| !line.trim().is_empty()) {
            lines.push(String::new());
        }
        lines.push("# Added by outfit".to_string());
        lines.push(source);
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(startup, content)?;
        tracing::info!("Sourcing {} from {}", self.path.display(), startup.display());
        Ok(())
    }

    fn render(name: &str, value: &str) -> String {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        if name == PATH_VAR {
            format!("export {0}=\"${{{0}:+${0}:}}{1}\"", name, escaped)
        } else {
            format!("export {}=\"{}\"", name, escaped)
        }
    }

    fn parse_line(line: &str, name: &str) -> Option<String> {
        let rest = line.trim().strip_prefix("export ")?;
        let value = rest.strip_prefix(name)?.strip_prefix('=')?;
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        let passthrough = format!("${{{0}:+${0}:}}", name);
        let value = value.strip_prefix(&passthrough).unwrap_or(value);
        Some(value.replace("\\\"", "\"").replace("\\\\", "\\"))
    }
}

impl EnvStore for ProfileEnvStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .read_lines()?
            .iter()
            .find_map(|line| Self::parse_line(line, name)))
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let mut lines = self.read_lines()?;
        let rendered = Self::render(name, value);

        match lines
            .iter()
            .position(|line| Self::parse_line(line, name).is_some())
        {
            Some(idx) => lines[idx] = rendered,
            None => lines.push(rendered),
        }
        if lines.first().map(String::as_str) != Some(HEADER) {
            lines.insert(0, HEADER.to_string());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&self.path, content)?;
        tracing::debug!("Wrote {} to {}", name, self.path.display());
        self.hook_startup()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().map(String::from).collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(OutfitError::Io(e)),
    }
}

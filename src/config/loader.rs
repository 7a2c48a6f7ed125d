//! Configuration file discovery and loading.

use crate::config::builtin::builtin_tools;
use crate::config::schema::OutfitConfig;
use crate::error::{OutfitError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the project root that holds configuration.
pub const CONFIG_DIR: &str = ".outfit";

/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yml";

/// Default project config location.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Load configuration for a project.
///
/// An explicit path must exist. Without one, `.outfit/config.yml` is used
/// when present and built-in defaults otherwise. Configured tools replace
/// built-in tools of the same name.
///
/// # Errors
///
/// Returns `ConfigNotFound` if an explicit path doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
/// Returns `ConfigValidationError` if a tool definition is inconsistent.
pub fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<OutfitConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = project_config_path(project_root);
            default.exists().then_some(default)
        }
    };

    let mut config = match path {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_config_file(&path)?
        }
        None => {
            tracing::debug!("No config file, using built-in defaults");
            OutfitConfig::default()
        }
    };

    for (name, tool) in builtin_tools() {
        config.tools.entry(name).or_insert(tool);
    }

    validate(&config)?;
    Ok(config)
}

/// Load a single config file.
pub fn load_config_file(path: &Path) -> Result<OutfitConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            OutfitError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            OutfitError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into an [`OutfitConfig`].
///
/// `source_path` is only used for error reporting.
pub fn parse_config(content: &str, source_path: &Path) -> Result<OutfitConfig> {
    if content.trim().is_empty() {
        return Ok(OutfitConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| OutfitError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Check a configuration for inconsistent tool and Python settings.
pub fn validate(config: &OutfitConfig) -> Result<()> {
    for (name, tool) in &config.tools {
        if tool.executable.trim().is_empty() {
            return Err(OutfitError::ConfigValidationError {
                message: format!("tool '{}' has an empty executable", name),
            });
        }
        if tool.url.is_some() && tool.install.is_none() {
            return Err(OutfitError::ConfigValidationError {
                message: format!(
                    "tool '{}' has a download url but no install command",
                    name
                ),
            });
        }
        if tool.success_codes.is_empty() {
            return Err(OutfitError::ConfigValidationError {
                message: format!("tool '{}' lists no success codes", name),
            });
        }
    }

    if config.python.poll_attempts == 0 {
        return Err(OutfitError::ConfigValidationError {
            message: "python.poll_attempts must be at least 1".to_string(),
        });
    }
    if config.python.manifest.trim().is_empty() {
        return Err(OutfitError::ConfigValidationError {
            message: "python.manifest must not be empty".to_string(),
        });
    }
    if config.python.interpreters.is_empty() {
        return Err(OutfitError::ConfigValidationError {
            message: "python.interpreters must list at least one candidate".to_string(),
        });
    }

    Ok(())
}

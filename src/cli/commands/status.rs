//! Status command implementation.
//!
//! The `outfit status` command probes configured tools without changing
//! anything.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::StatusArgs;
use crate::config::{load_config, InterpolationContext};
use crate::envstore::{EnvStore, ProcessEnvStore};
use crate::error::{OutfitError, Result};
use crate::provision::{locate, Location, ProvisionTarget};
use crate::shell::PATH_VAR;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Probe result for one tool.
#[derive(Debug, Serialize)]
pub struct ToolStatus {
    pub tool: String,
    pub installed: bool,
    pub location: Option<Location>,
}

/// The status command implementation.
pub struct StatusCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(project_root: &Path, config_path: Option<&Path>, args: StatusArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: config_path.map(Path::to_path_buf),
            args,
        }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Probe the selected tools against `search_path`.
    pub fn probe(&self, search_path: &str) -> Result<Vec<ToolStatus>> {
        let config = load_config(&self.project_root, self.config_path.as_deref())?;
        let ctx = InterpolationContext::from_process_env();

        let names: Vec<&String> = match &self.args.name {
            Some(name) => {
                let (key, _) = config.tools.get_key_value(name).ok_or_else(|| {
                    OutfitError::UnknownTool { name: name.clone() }
                })?;
                vec![key]
            }
            None => config.tools.keys().collect(),
        };

        let mut statuses = Vec::with_capacity(names.len());
        for name in names {
            let target = ProvisionTarget::from_config(name, &config.tools[name], &ctx)?;
            let location = locate(&target, search_path);
            statuses.push(ToolStatus {
                tool: name.clone(),
                installed: location.is_some(),
                location,
            });
        }
        Ok(statuses)
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let search_path = ProcessEnvStore::new().get(PATH_VAR)?.unwrap_or_default();
        let statuses = self.probe(&search_path)?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&statuses)
                .map_err(|e| OutfitError::Other(e.into()))?;
            println!("{}", json);
            return Ok(CommandResult::success());
        }

        ui.show_header("Tool status");
        for status in &statuses {
            let value = match &status.location {
                Some(location) => location.executable.display().to_string(),
                None => "not installed".to_string(),
            };
            ui.show_field(&status.tool, &value);
        }

        let missing: Vec<&str> = statuses
            .iter()
            .filter(|s| !s.installed)
            .map(|s| s.tool.as_str())
            .collect();
        if let [only] = missing.as_slice() {
            ui.show_hint(&format!("Run `outfit tool {}` to install it", only));
        } else if !missing.is_empty() {
            ui.show_hint("Run `outfit tool <name>` to install a missing tool");
        }

        Ok(CommandResult::success())
    }
}

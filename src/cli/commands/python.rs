//! Python command implementation.
//!
//! The `outfit python [PATH]` command provisions a virtual environment and
//! activates it for this process.

use std::path::{Path, PathBuf};

use crate::cli::args::PythonArgs;
use crate::config::{load_config, InterpolationContext, OutfitConfig};
use crate::envstore::ProcessEnvStore;
use crate::error::{OutfitError, Result};
use crate::python::{resolve_env_root, PythonOptions, PythonProvisioner};
use crate::shell::SystemRunner;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The python command implementation.
pub struct PythonCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: PythonArgs,
}

impl PythonCommand {
    /// Create a new python command.
    pub fn new(project_root: &Path, config_path: Option<&Path>, args: PythonArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: config_path.map(Path::to_path_buf),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &PythonArgs {
        &self.args
    }

    /// Resolve every setting up front; nothing below reads the process
    /// environment for configuration again.
    pub fn options(&self, config: &OutfitConfig, ctx: &InterpolationContext) -> Result<PythonOptions> {
        let root = resolve_env_root(self.args.path.as_deref(), config.python.root.as_deref(), ctx)?;

        let mut options =
            PythonOptions::from_config(&config.python, root, self.project_root.clone());
        options.explicit_manifest = self.args.manifest.clone();
        options.force = self.args.force;
        options.strict |= self.args.strict;
        Ok(options)
    }
}

impl Command for PythonCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.project_root, self.config_path.as_deref())?;
        let options = self.options(&config, &InterpolationContext::from_process_env())?;

        ui.show_header("Python environment");

        let runner = SystemRunner::captured();
        let mut session = ProcessEnvStore::new();
        let report = PythonProvisioner::new(&options, &runner, &mut session).run(ui)?;

        if self.args.json {
            let json =
                serde_json::to_string_pretty(&report).map_err(|e| OutfitError::Other(e.into()))?;
            println!("{}", json);
        }

        Ok(CommandResult::from_exit_code(report.exit_code))
    }
}

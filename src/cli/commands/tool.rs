//! Tool command implementation.
//!
//! The `outfit tool <name>` command runs the provisioning pipeline for one
//! tool and exits with the pipeline's exit code.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::args::ToolArgs;
use crate::config::{load_config, InterpolationContext, OutfitConfig};
use crate::envstore::{persistent_store, ProcessEnvStore};
use crate::error::{OutfitError, Result};
use crate::provision::{run_pipeline, CommandInstaller, HttpFetcher, PipelineContext, ProvisionTarget};
use crate::shell::{is_elevated, SystemRunner};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The tool command implementation.
pub struct ToolCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: ToolArgs,
}

impl ToolCommand {
    /// Create a new tool command.
    pub fn new(project_root: &Path, config_path: Option<&Path>, args: ToolArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: config_path.map(Path::to_path_buf),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ToolArgs {
        &self.args
    }

    fn target(&self, config: &OutfitConfig) -> Result<ProvisionTarget> {
        let tool = config
            .tools
            .get(&self.args.name)
            .ok_or_else(|| OutfitError::UnknownTool {
                name: self.args.name.clone(),
            })?;
        ProvisionTarget::from_config(
            &self.args.name,
            tool,
            &InterpolationContext::from_process_env(),
        )
    }
}

impl Command for ToolCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.project_root, self.config_path.as_deref())?;
        let target = self.target(&config)?;

        ui.show_header(&format!("Provisioning {}", target.name()));

        let probe_runner = SystemRunner::captured();
        let install_runner = if ui.output_mode().shows_command_output() {
            SystemRunner::inherited()
        } else {
            SystemRunner::captured()
        };

        let fetcher = HttpFetcher::with_timeout(Duration::from_secs(config.settings.timeout_secs))?;
        let installer = CommandInstaller::new(&install_runner);
        let mut persistent = persistent_store(target.scope(), &probe_runner)?;
        let mut session = ProcessEnvStore::new();

        let ctx = PipelineContext {
            fetcher: &fetcher,
            installer: &installer,
            persistent: persistent.as_mut(),
            session: &mut session,
            elevated: is_elevated(),
            artifact_dir: std::env::temp_dir(),
            dry_run: self.args.dry_run,
        };

        let report = run_pipeline(&target, ctx, ui);
        if report.is_success() {
            tracing::info!("{} is available", report.tool);
        } else {
            tracing::warn!(
                "Pipeline for {} finished with exit code {}",
                report.tool,
                report.exit_code
            );
        }

        if self.args.json {
            let json =
                serde_json::to_string_pretty(&report).map_err(|e| OutfitError::Other(e.into()))?;
            println!("{}", json);
        }

        Ok(CommandResult::from_exit_code(report.exit_code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn project_with(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".outfit");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), config).unwrap();
        temp
    }

    fn args(name: &str, dry_run: bool) -> ToolArgs {
        ToolArgs {
            name: name.to_string(),
            dry_run,
            json: false,
        }
    }

    #[test]
    fn unknown_tool_is_an_error() {
        let temp = TempDir::new().unwrap();
        let cmd = ToolCommand::new(temp.path(), None, args("no-such-tool", false));
        let mut ui = MockUI::new();

        let err = cmd.execute(&mut ui).unwrap_err();

        assert!(matches!(err, OutfitError::UnknownTool { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn dry_run_touches_nothing() {
        let temp = project_with(
            r#"
tools:
  ghost:
    executable: outfit-test-ghost-tool
    url: http://127.0.0.1:9/ghost.tar.gz
    install: tar xf ${artifact}
    scope: user
"#,
        );
        let cmd = ToolCommand::new(temp.path(), None, args("ghost", true));
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("[dry run] would download http://127.0.0.1:9/ghost.tar.gz"));
    }

    #[cfg(unix)]
    #[test]
    fn tool_in_well_known_dir_needs_nothing() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("opt").join("bin");
        fs::create_dir_all(&bin).unwrap();
        let exe = bin.join("outfit-test-present");
        fs::write(&exe, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();

        let config = format!(
            "tools:\n  present:\n    executable: outfit-test-present\n    well_known_dirs: [\"{}\"]\n",
            bin.display()
        );
        let config_path = temp.path().join("outfit.yml");
        fs::write(&config_path, config).unwrap();

        let cmd = ToolCommand::new(temp.path(), Some(&config_path), args("present", false));
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_success("already installed"));
    }
}

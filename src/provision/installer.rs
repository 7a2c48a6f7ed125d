//! Unattended installer execution.

use super::target::ProvisionTarget;
use crate::config::{resolve_string, InterpolationContext};
use crate::error::{OutfitError, Result};
use crate::shell::CommandRunner;
use std::path::Path;

/// Variable naming the downloaded artifact inside install commands.
pub const ARTIFACT_VAR: &str = "artifact";

/// Result of an installer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Installer exit code; `None` if killed by a signal.
    pub exit_code: Option<i32>,
    /// Whether the exit code is in the target's success set.
    pub success: bool,
}

/// Runs install and verify commands for a target.
pub trait Installer {
    /// Run the target's install command non-interactively.
    ///
    /// Non-success exit codes are reported through [`InstallOutcome`];
    /// `Err` means the installer could not be launched at all.
    fn install(&self, target: &ProvisionTarget, artifact: Option<&Path>) -> Result<InstallOutcome>;

    /// Run the target's verify command. Targets without one verify trivially.
    fn verify(&self, target: &ProvisionTarget) -> Result<bool>;
}

/// [`Installer`] that runs commands through a [`CommandRunner`].
pub struct CommandInstaller<'a> {
    runner: &'a dyn CommandRunner,
    context: InterpolationContext,
}

impl<'a> CommandInstaller<'a> {
    /// Installer resolving `${VAR}` references against the process environment.
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self::with_context(runner, InterpolationContext::from_process_env())
    }

    pub fn with_context(runner: &'a dyn CommandRunner, context: InterpolationContext) -> Self {
        Self { runner, context }
    }

    /// Expand an install command template for an artifact.
    pub fn render(&self, template: &str, artifact: Option<&Path>) -> Result<String> {
        let context = match artifact {
            Some(path) => self
                .context
                .clone()
                .with_var(ARTIFACT_VAR, path.display().to_string()),
            None => self.context.clone(),
        };
        resolve_string(template, &context)
    }
}

impl Installer for CommandInstaller<'_> {
    fn install(&self, target: &ProvisionTarget, artifact: Option<&Path>) -> Result<InstallOutcome> {
        let template = target
            .install_command()
            .ok_or_else(|| OutfitError::NoInstallMethod {
                tool: target.name().to_string(),
            })?;
        let command = self.render(template, artifact)?;

        tracing::info!("Installing {}", target.name());
        let result = self.runner.run_shell(&command)?;
        let success = target.is_success_code(result.exit_code);

        if success && result.exit_code != Some(0) {
            tracing::info!(
                "Installer for {} exited {:?}, accepted as success",
                target.name(),
                result.exit_code
            );
        } else if !success {
            tracing::debug!("Installer stderr: {}", result.stderr.trim());
        }

        Ok(InstallOutcome {
            exit_code: result.exit_code,
            success,
        })
    }

    fn verify(&self, target: &ProvisionTarget) -> Result<bool> {
        let Some(template) = target.verify_command() else {
            return Ok(true);
        };
        let command = resolve_string(template, &self.context)?;
        let result = self.runner.run_shell(&command)?;
        Ok(result.success)
    }
}

//! Tool provisioning pipeline.
//!
//! Stages run in a fixed order:
//!
//! 1. Locate: an executable found on the search path or in a well-known
//!    directory ends the run with exit code 0 and no side effects
//! 2. Preflight: abort with code 1 when elevation is required but missing
//! 3. Download the installer artifact (code 2 on failure)
//! 4. Install it unattended (code 3 on failure)
//! 5. Reconcile the search path (code 4 if still absent, 5 if persisting
//!    failed; the latter still amends the session path and continues)
//! 6. Remove the artifact, whatever happened before
//!
//! A failure in stages 3-4 jumps straight to cleanup. Failing stages carry
//! the exit code of the matching [`OutfitError`] variant.

use super::cleanup::ArtifactGuard;
use super::fetcher::Fetcher;
use super::installer::Installer;
use super::locator::{locate, LocatedVia};
use super::reconciler::{PathReconciler, ReconcileOutcome};
use super::result::{ProvisionResult, RunReport, Stage, StageStatus};
use super::target::ProvisionTarget;
use crate::envstore::EnvStore;
use crate::error::OutfitError;
use crate::shell::PATH_VAR;
use crate::ui::UserInterface;
use std::path::PathBuf;

/// Collaborators and switches for a pipeline run.
pub struct PipelineContext<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub installer: &'a dyn Installer,
    /// Persistent search path store (registry or profile script).
    pub persistent: &'a mut dyn EnvStore,
    /// This process's environment.
    pub session: &'a mut dyn EnvStore,
    /// Whether the process runs with elevated privileges.
    pub elevated: bool,
    /// Directory receiving downloaded artifacts.
    pub artifact_dir: PathBuf,
    /// Report the stages that would run without running them.
    pub dry_run: bool,
}

/// Provision one target.
///
/// Never returns an error: every failure is recorded in the report, whose
/// exit code is the process exit code.
pub fn run_pipeline<'a>(
    target: &'a ProvisionTarget,
    ctx: PipelineContext<'a>,
    ui: &mut dyn UserInterface,
) -> RunReport {
    ToolPipeline { target, ctx }.run(ui)
}

struct ToolPipeline<'a> {
    target: &'a ProvisionTarget,
    ctx: PipelineContext<'a>,
}

impl ToolPipeline<'_> {
    fn run(mut self, ui: &mut dyn UserInterface) -> RunReport {
        let mut report = RunReport::new(self.target.name());

        if self.locate(&mut report, ui) {
            return report;
        }

        if self.target.require_elevation() && !self.ctx.elevated {
            let err = OutfitError::PrivilegeRequired {
                tool: self.target.name().to_string(),
            };
            ui.error(&err.to_string());
            report.record(ProvisionResult::from_error(Stage::Preflight, &err));
            return report;
        }
        report.record(ProvisionResult::success(Stage::Preflight, "privileges sufficient"));

        if self.ctx.dry_run {
            self.plan(&mut report, ui);
            return report;
        }

        let mut guard = None;
        self.run_side_effects(&mut guard, &mut report, ui);

        let cleaned = match guard.as_mut() {
            Some(guard) => guard.release(),
            None => ProvisionResult::skipped(Stage::Cleaned, "no artifact to remove"),
        };
        if cleaned.status == StageStatus::Degraded {
            ui.warning(&cleaned.detail);
        }
        report.record(cleaned);

        report
    }

    /// Returns `true` when the executable is already present.
    fn locate(&mut self, report: &mut RunReport, ui: &mut dyn UserInterface) -> bool {
        let search_path = match self.ctx.session.get(PATH_VAR) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                tracing::debug!("Could not read session PATH: {}", e);
                String::new()
            }
        };

        match locate(self.target, &search_path) {
            Some(location) => {
                let how = match location.via {
                    LocatedVia::SearchPath => "on PATH",
                    LocatedVia::WellKnownDir => "in a well-known directory",
                };
                let message = format!(
                    "{} already installed {} ({})",
                    self.target.name(),
                    how,
                    location.executable.display()
                );
                ui.success(&message);
                report.record(ProvisionResult::success(Stage::Located, message));
                true
            }
            None => {
                report.record(ProvisionResult::success(
                    Stage::Located,
                    format!("{} not present", self.target.name()),
                ));
                false
            }
        }
    }

    fn plan(&self, report: &mut RunReport, ui: &mut dyn UserInterface) {
        let download = match self.target.download_url() {
            Some(url) => format!("would download {}", url),
            None => "no download configured".to_string(),
        };
        let install = match self.target.install_command() {
            Some(command) => format!("would run: {}", command),
            None => "no install command configured".to_string(),
        };
        let path = format!(
            "would add the install directory to the {} search path",
            self.target.scope()
        );

        for (stage, detail) in [
            (Stage::Downloaded, download),
            (Stage::Installed, install),
            (Stage::PathReconciled, path),
        ] {
            ui.message(&format!("[dry run] {}", detail));
            report.record(ProvisionResult::skipped(stage, detail));
        }
        report.record(ProvisionResult::skipped(Stage::Cleaned, "dry run"));
    }

    fn run_side_effects(
        &mut self,
        guard: &mut Option<ArtifactGuard>,
        report: &mut RunReport,
        ui: &mut dyn UserInterface,
    ) {
        if let Some(url) = self.target.download_url() {
            let dest = self.ctx.artifact_dir.join(self.target.artifact_file_name());
            let artifact = guard.insert(ArtifactGuard::new(dest));

            let mut spinner = ui.start_spinner(&format!("Downloading {}", url));
            match self.ctx.fetcher.fetch(url, artifact.path()) {
                Ok(bytes) => {
                    spinner.finish_success(&format!("Downloaded {} bytes", bytes));
                    report.record(ProvisionResult::success(
                        Stage::Downloaded,
                        format!("{} bytes from {}", bytes, url),
                    ));
                }
                Err(e) => {
                    let err = match e {
                        err @ OutfitError::TransferFailed { .. } => err,
                        other => OutfitError::TransferFailed {
                            url: url.to_string(),
                            message: other.to_string(),
                        },
                    };
                    spinner.finish_error(&err.to_string());
                    report.record(ProvisionResult::from_error(Stage::Downloaded, &err));
                    return;
                }
            }
        } else {
            report.record(ProvisionResult::skipped(
                Stage::Downloaded,
                "no download configured",
            ));
        }

        if self.target.install_command().is_none() {
            let err = OutfitError::NoInstallMethod {
                tool: self.target.name().to_string(),
            };
            ui.error(&err.to_string());
            report.record(ProvisionResult::from_error(Stage::Installed, &err));
            return;
        }

        let artifact = guard.as_ref().map(|g| g.path());
        let mut spinner = ui.start_spinner(&format!("Installing {}", self.target.name()));
        match self.ctx.installer.install(self.target, artifact) {
            Ok(outcome) if outcome.success => {
                spinner.finish_success(&format!("Installed {}", self.target.name()));
                report.record(ProvisionResult::success(
                    Stage::Installed,
                    format!("installer exited {:?}", outcome.exit_code),
                ));
            }
            Ok(outcome) => {
                let err = OutfitError::InstallFailed {
                    tool: self.target.name().to_string(),
                    code: outcome.exit_code,
                };
                spinner.finish_error(&err.to_string());
                report.record(ProvisionResult::from_error(Stage::Installed, &err));
                return;
            }
            Err(e) => {
                spinner.finish_error(&e.to_string());
                let err = match e {
                    err @ (OutfitError::InstallFailed { .. }
                    | OutfitError::NoInstallMethod { .. }) => err,
                    other => {
                        tracing::warn!("Installer for {} did not run: {}", self.target.name(), other);
                        OutfitError::InstallFailed {
                            tool: self.target.name().to_string(),
                            code: None,
                        }
                    }
                };
                report.record(ProvisionResult::from_error(Stage::Installed, &err));
                return;
            }
        }

        self.reconcile(report, ui);
    }

    fn reconcile(&mut self, report: &mut RunReport, ui: &mut dyn UserInterface) {
        let outcome = PathReconciler::new(&mut *self.ctx.persistent, &mut *self.ctx.session)
            .reconcile(self.target);

        let result = match outcome {
            Ok(ReconcileOutcome::OnSearchPath { location }) => ProvisionResult::success(
                Stage::PathReconciled,
                format!("reachable at {}", location.executable.display()),
            ),
            Ok(ReconcileOutcome::Persisted { dir }) => {
                ui.show_hint(&format!(
                    "New shells pick up {} after a fresh login ({})",
                    dir.display(),
                    self.ctx.persistent.describe()
                ));
                ProvisionResult::success(
                    Stage::PathReconciled,
                    format!("added {} to the {} search path", dir.display(), self.target.scope()),
                )
            }
            Ok(ReconcileOutcome::AlreadyPersisted { dir }) => ProvisionResult::success(
                Stage::PathReconciled,
                format!("{} already on the {} search path", dir.display(), self.target.scope()),
            ),
            Ok(ReconcileOutcome::SessionOnly { dir, reason }) => {
                let err = OutfitError::PathPersistFailed {
                    dir,
                    scope: self.target.scope().to_string(),
                    message: reason,
                };
                let message = format!("{}; added for this session only", err);
                ui.warning(&message);
                ProvisionResult::degraded(Stage::PathReconciled, err.exit_code(), message)
            }
            Ok(ReconcileOutcome::NotFound) => self.verification_failed(
                format!("{} is in no probed location", self.target.executable()),
                ui,
            ),
            Err(e) => self.verification_failed(e.to_string(), ui),
        };

        let reachable = result.status != StageStatus::Failed;
        report.record(result);
        if !reachable {
            return;
        }

        match self.ctx.installer.verify(self.target) {
            Ok(true) => ui.success(&format!("{} is ready", self.target.name())),
            Ok(false) => {
                let result = self.verification_failed("verify command failed".to_string(), ui);
                report.record(result);
            }
            Err(e) => {
                let result = self.verification_failed(e.to_string(), ui);
                report.record(result);
            }
        }
    }

    fn verification_failed(&self, message: String, ui: &mut dyn UserInterface) -> ProvisionResult {
        let err = OutfitError::VerificationFailed {
            tool: self.target.name().to_string(),
            message,
        };
        ui.error(&err.to_string());
        ProvisionResult::from_error(Stage::PathReconciled, &err)
    }
}

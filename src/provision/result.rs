//! Stage results and the run report.

use crate::error::OutfitError;
use serde::Serialize;
use std::fmt;

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Presence probe.
    Located,
    /// Privilege check before any side effect.
    Preflight,
    /// Installer artifact transfer.
    Downloaded,
    /// Unattended installer run.
    Installed,
    /// Search path registration and verification.
    PathReconciled,
    /// Transient artifact removal.
    Cleaned,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Located => "locate",
            Stage::Preflight => "preflight",
            Stage::Downloaded => "download",
            Stage::Installed => "install",
            Stage::PathReconciled => "path",
            Stage::Cleaned => "cleanup",
        };
        f.write_str(name)
    }
}

/// Outcome of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Success,
    Skipped,
    /// Completed with a workaround; the run continues.
    Degraded,
    Failed,
}

/// Result produced once per stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionResult {
    pub stage: Stage,
    pub status: StageStatus,
    pub exit_code: i32,
    pub detail: String,
}

impl ProvisionResult {
    pub fn success(stage: Stage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Success,
            exit_code: 0,
            detail: detail.into(),
        }
    }

    pub fn skipped(stage: Stage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Skipped,
            exit_code: 0,
            detail: detail.into(),
        }
    }

    pub fn degraded(stage: Stage, exit_code: i32, detail: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Degraded,
            exit_code,
            detail: detail.into(),
        }
    }

    pub fn failed(stage: Stage, exit_code: i32, detail: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Failed,
            exit_code,
            detail: detail.into(),
        }
    }

    /// Failed result whose exit code comes from the error's category.
    pub fn from_error(stage: Stage, error: &OutfitError) -> Self {
        Self::failed(stage, error.exit_code(), error.to_string())
    }

    /// Whether this result carries a non-zero code into the run's exit code.
    pub fn sets_exit_code(&self) -> bool {
        matches!(self.status, StageStatus::Failed | StageStatus::Degraded) && self.exit_code != 0
    }
}

/// Ordered stage results of one pipeline run.
///
/// The exit code is sticky: once a stage sets a code, later successful
/// stages leave it alone. A later failing stage replaces it, so when two
/// stages fail the last one wins.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub tool: String,
    pub results: Vec<ProvisionResult>,
    pub exit_code: i32,
}

impl RunReport {
    pub fn new(tool: &str) -> Self {
        Self {
            tool: tool.to_string(),
            results: Vec::new(),
            exit_code: 0,
        }
    }

    /// Append a stage result and update the exit code.
    pub fn record(&mut self, result: ProvisionResult) {
        if result.sets_exit_code() {
            self.exit_code = result.exit_code;
        }
        self.results.push(result);
    }

    /// Whether a stage was recorded with the given status.
    pub fn has(&self, stage: Stage, status: StageStatus) -> bool {
        self.results
            .iter()
            .any(|r| r.stage == stage && r.status == status)
    }

    /// The latest result recorded for a stage.
    pub fn result(&self, stage: Stage) -> Option<&ProvisionResult> {
        self.results.iter().rev().find(|r| r.stage == stage)
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

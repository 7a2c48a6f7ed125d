//! Tool provisioning.
//!
//! Makes a command-line tool available by name: find it if it is already
//! installed, otherwise download its installer, run it unattended, register
//! the install directory on the search path, and remove the installer.
//!
//! - [`target`]: what to provision
//! - [`locator`]: presence probe
//! - [`fetcher`]: artifact transfer
//! - [`installer`]: unattended install and verification commands
//! - [`reconciler`]: search path registration
//! - [`cleanup`]: artifact removal
//! - [`pipeline`]: stage ordering and exit codes

pub mod cleanup;
pub mod fetcher;
pub mod installer;
pub mod locator;
pub mod pipeline;
pub mod reconciler;
pub mod result;
pub mod target;

pub use cleanup::{remove_artifact, ArtifactGuard};
pub use fetcher::{Fetcher, HttpFetcher};
pub use installer::{CommandInstaller, InstallOutcome, Installer};
pub use locator::{locate, LocatedVia, Location};
pub use pipeline::{run_pipeline, PipelineContext};
pub use reconciler::{PathReconciler, ReconcileOutcome};
pub use result::{ProvisionResult, RunReport, Stage, StageStatus};
pub use target::ProvisionTarget;

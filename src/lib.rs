//! Outfit - Provision command-line tools and Python environments.
//!
//! Outfit makes a machine ready for a project: it installs command-line
//! tools that are missing, registers them on the search path, and builds
//! an activated Python virtual environment from a dependency manifest.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and interpolation
//! - [`envstore`] - Process, registry and profile variable stores
//! - [`error`] - Error types, result alias and exit codes
//! - [`provision`] - Tool provisioning pipeline
//! - [`python`] - Python virtual environment provisioning
//! - [`shell`] - Process execution and platform probes
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use outfit::provision::{ProvisionResult, RunReport, Stage};
//!
//! let mut report = RunReport::new("putty");
//! report.record(ProvisionResult::failed(Stage::Downloaded, 2, "HTTP 404"));
//! report.record(ProvisionResult::success(Stage::Cleaned, "removed"));
//! assert_eq!(report.exit_code, 2);
//! ```

pub mod cli;
pub mod config;
pub mod envstore;
pub mod error;
pub mod provision;
pub mod python;
pub mod shell;
pub mod ui;

pub use error::{OutfitError, Result};

//! Error types for outfit operations.
//!
//! This module defines [`OutfitError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Each provisioning failure category has its own variant so callers can
//!   tell "could not obtain installer" apart from "installer ran and failed"
//! - [`OutfitError::exit_code`] maps a variant onto the process exit code
//! - Use `anyhow::Error` (via `OutfitError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for outfit operations.
#[derive(Debug, Error)]
pub enum OutfitError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Requested tool is neither configured nor built in.
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    /// The pipeline needs elevated privileges and the process lacks them.
    #[error("Installing '{tool}' requires elevated privileges (run as administrator/root)")]
    PrivilegeRequired { tool: String },

    /// The installer artifact could not be obtained.
    #[error("Download of {url} failed: {message}")]
    TransferFailed { url: String, message: String },

    /// The target has neither an installer nor an install command.
    #[error("No installation method configured for '{tool}'")]
    NoInstallMethod { tool: String },

    /// The installer ran and reported failure.
    #[error("Installer for '{tool}' failed with exit code {code:?}")]
    InstallFailed { tool: String, code: Option<i32> },

    /// Installer reported success but the tool is still absent.
    #[error("'{tool}' not found after installation: {message}")]
    VerificationFailed { tool: String, message: String },

    /// The persistent search path could not be updated.
    #[error("Could not persist {dir} to the {scope} search path: {message}")]
    PathPersistFailed {
        dir: PathBuf,
        scope: String,
        message: String,
    },

    /// The variable designating the per-user writable root is not set.
    #[error("Environment variable {var} is not set; cannot locate the per-user directory")]
    UserRootMissing { var: String },

    /// No dependency manifest in any candidate directory.
    #[error("Dependency manifest '{name}' not found (searched {searched} locations)")]
    ManifestNotFound { name: String, searched: usize },

    /// No usable Python interpreter on the search path.
    #[error("No Python interpreter found (tried: {tried})")]
    InterpreterNotFound { tried: String },

    /// The virtual environment never materialized.
    #[error("Failed to create environment at {root}: {message}")]
    EnvironmentCreationFailed { root: PathBuf, message: String },

    /// pip is missing from the environment after upgrading it.
    #[error("Packaging tool missing from environment at {root}")]
    PackagingToolMissing { root: PathBuf },

    /// Dependency installation failed after the retry.
    #[error("Dependency install from {manifest} failed with exit code {code:?}")]
    DependencyInstallFailed { manifest: PathBuf, code: Option<i32> },

    /// The environment could not be activated.
    #[error("Failed to activate environment at {root}: {message}")]
    ActivationFailed { root: PathBuf, message: String },

    /// The activated interpreter did not answer correctly.
    #[error("Sanity check failed for environment at {root}: {message}")]
    SanityCheckFailed { root: PathBuf, message: String },

    /// Shell command could not be spawned.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OutfitError {
    /// Process exit code for this error.
    ///
    /// Tool pipeline: 1 privileges, 2 download, 3 install, 4 verification,
    /// 5 path persistence. Python pipeline: 2 manifest, 3 interpreter,
    /// 4 creation, 5 packaging tool, 7 activation, 8 sanity check; a failed
    /// dependency install propagates the installer's own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            OutfitError::PrivilegeRequired { .. } => 1,
            OutfitError::TransferFailed { .. } => 2,
            OutfitError::NoInstallMethod { .. } => 3,
            OutfitError::InstallFailed { .. } => 3,
            OutfitError::VerificationFailed { .. } => 4,
            OutfitError::PathPersistFailed { .. } => 5,
            OutfitError::ManifestNotFound { .. } => 2,
            OutfitError::InterpreterNotFound { .. } => 3,
            OutfitError::EnvironmentCreationFailed { .. } => 4,
            OutfitError::PackagingToolMissing { .. } => 5,
            OutfitError::ActivationFailed { .. } => 7,
            OutfitError::SanityCheckFailed { .. } => 8,
            OutfitError::DependencyInstallFailed { code, .. } => match code {
                Some(c) if *c != 0 => *c,
                _ => 1,
            },
            _ => 1,
        }
    }
}

/// Result type alias for outfit operations.
pub type Result<T> = std::result::Result<T, OutfitError>;

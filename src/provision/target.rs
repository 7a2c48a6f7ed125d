//! Provision targets.

use crate::config::{resolve_string, InterpolationContext, ToolConfig};
use crate::envstore::PersistScope;
use crate::error::Result;
use crate::shell::executable_name;
use std::path::PathBuf;

/// Immutable description of a tool to provision.
///
/// Built once from configuration; environment references in the download
/// URL and well-known directories are resolved at construction. The install
/// command keeps its `${artifact}` reference until the artifact exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionTarget {
    name: String,
    executable: String,
    download_url: Option<String>,
    install_command: Option<String>,
    verify_command: Option<String>,
    well_known_dirs: Vec<PathBuf>,
    success_codes: Vec<i32>,
    scope: PersistScope,
    require_elevation: bool,
}

impl ProvisionTarget {
    /// Minimal target that is only located, never installed.
    pub fn new(name: &str, executable: &str) -> Self {
        Self {
            name: name.to_string(),
            executable: executable_name(executable),
            download_url: None,
            install_command: None,
            verify_command: None,
            well_known_dirs: Vec::new(),
            success_codes: vec![0],
            scope: PersistScope::default(),
            require_elevation: false,
        }
    }

    /// Build a target from its configuration.
    ///
    /// Well-known directories referencing unset variables are dropped, so a
    /// definition can list `${ProgramFiles(x86)}` and still work on 32-bit
    /// hosts.
    pub fn from_config(name: &str, config: &ToolConfig, ctx: &InterpolationContext) -> Result<Self> {
        let download_url = config
            .url
            .as_deref()
            .map(|url| resolve_string(url, ctx))
            .transpose()?;

        let well_known_dirs = config
            .well_known_dirs
            .iter()
            .filter_map(|dir| match resolve_string(dir, ctx) {
                Ok(resolved) => Some(PathBuf::from(resolved)),
                Err(e) => {
                    tracing::debug!("Skipping well-known dir '{}' for {}: {}", dir, name, e);
                    None
                }
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            executable: executable_name(&config.executable),
            download_url,
            install_command: config.install.clone(),
            verify_command: config.verify.clone(),
            well_known_dirs,
            success_codes: config.success_codes.clone(),
            scope: config.scope,
            require_elevation: config
                .require_elevation
                .unwrap_or_else(|| config.scope.requires_elevation()),
        })
    }

    /// Set the download URL.
    pub fn with_download(mut self, url: &str) -> Self {
        self.download_url = Some(url.to_string());
        self
    }

    /// Set the install command template.
    pub fn with_install(mut self, command: &str) -> Self {
        self.install_command = Some(command.to_string());
        self
    }

    /// Set the verify command.
    pub fn with_verify(mut self, command: &str) -> Self {
        self.verify_command = Some(command.to_string());
        self
    }

    /// Append a well-known install directory.
    pub fn with_well_known_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.well_known_dirs.push(dir.into());
        self
    }

    /// Replace the accepted installer exit codes.
    pub fn with_success_codes(mut self, codes: &[i32]) -> Self {
        self.success_codes = codes.to_vec();
        self
    }

    /// Set the persist scope and the elevation requirement.
    pub fn with_scope(mut self, scope: PersistScope, require_elevation: bool) -> Self {
        self.scope = scope;
        self.require_elevation = require_elevation;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }

    pub fn install_command(&self) -> Option<&str> {
        self.install_command.as_deref()
    }

    pub fn verify_command(&self) -> Option<&str> {
        self.verify_command.as_deref()
    }

    pub fn well_known_dirs(&self) -> &[PathBuf] {
        &self.well_known_dirs
    }

    pub fn success_codes(&self) -> &[i32] {
        &self.success_codes
    }

    pub fn scope(&self) -> PersistScope {
        self.scope
    }

    pub fn require_elevation(&self) -> bool {
        self.require_elevation
    }

    /// Whether an installer exit code counts as success.
    pub fn is_success_code(&self, code: Option<i32>) -> bool {
        code.is_some_and(|c| self.success_codes.contains(&c))
    }

    /// File name for the downloaded artifact, taken from the URL.
    pub fn artifact_file_name(&self) -> String {
        let from_url = self
            .download_url
            .as_deref()
            .and_then(|url| url.split(['?', '#']).next())
            .and_then(|url| url.rsplit('/').next())
            .filter(|segment| !segment.is_empty());

        match from_url {
            Some(segment) => format!("outfit-{}-{}", std::process::id(), segment),
            None => format!("outfit-{}-{}-installer", std::process::id(), self.name),
        }
    }
}

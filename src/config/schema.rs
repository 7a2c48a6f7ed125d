//! Configuration schema.
//!
//! ```yaml
//! tools:
//!   putty:
//!     executable: putty.exe
//!     url: https://the.earth.li/~sgtatham/putty/latest/w64/putty-64bit-installer.msi
//!     install: msiexec /i "${artifact}" /qn /norestart
//!     success_codes: [0, 3010]
//!     well_known_dirs:
//!       - ${ProgramFiles}\PuTTY
//!     scope: machine
//!
//! python:
//!   manifest: requirements.txt
//!   poll_attempts: 15
//! ```

use crate::envstore::PersistScope;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutfitConfig {
    /// Tool targets by name.
    pub tools: BTreeMap<String, ToolConfig>,

    /// Python environment settings.
    pub python: PythonConfig,

    /// Global settings.
    pub settings: Settings,
}

/// Definition of an external tool to provision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Executable the presence check looks for (e.g. `putty.exe`).
    pub executable: String,

    /// Where to download the installer from.
    #[serde(default)]
    pub url: Option<String>,

    /// Unattended install command. `${artifact}` expands to the download.
    #[serde(default)]
    pub install: Option<String>,

    /// Optional command run after path reconciliation to verify the tool.
    #[serde(default)]
    pub verify: Option<String>,

    /// Install directories probed when the tool is not on the search path,
    /// in priority order.
    #[serde(default)]
    pub well_known_dirs: Vec<String>,

    /// Installer exit codes that count as success.
    #[serde(default = "default_success_codes")]
    pub success_codes: Vec<i32>,

    /// Which persistent search path to register the install directory on.
    #[serde(default)]
    pub scope: PersistScope,

    /// Override whether elevation is checked before installing.
    /// Defaults to what `scope` needs.
    #[serde(default)]
    pub require_elevation: Option<bool>,
}

fn default_success_codes() -> Vec<i32> {
    vec![0]
}

/// Python environment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    /// Environment root. Defaults to a directory under the per-user root.
    pub root: Option<String>,

    /// Dependency manifest file name.
    pub manifest: String,

    /// Interpreter candidates, most preferred first. Each entry is a
    /// program followed by its arguments.
    pub interpreters: Vec<String>,

    /// How many times to look for the new interpreter after creation.
    pub poll_attempts: u32,

    /// Delay between those checks.
    pub poll_interval_ms: u64,

    /// Treat a failed dependency install as fatal.
    pub strict: bool,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            root: None,
            manifest: "requirements.txt".to_string(),
            interpreters: vec![
                "py -3".to_string(),
                "python3".to_string(),
                "python".to_string(),
            ],
            poll_attempts: 15,
            poll_interval_ms: 1000,
            strict: false,
        }
    }
}

/// Global settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Download timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: OutfitConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.tools.is_empty());
        assert_eq!(config.python.manifest, "requirements.txt");
        assert_eq!(config.python.poll_attempts, 15);
        assert_eq!(config.python.interpreters[0], "py -3");
        assert_eq!(config.settings.timeout_secs, 300);
    }

    #[test]
    fn tool_defaults() {
        let yaml = r#"
tools:
  jq:
    executable: jq
"#;
        let config: OutfitConfig = serde_yaml::from_str(yaml).unwrap();
        let jq = &config.tools["jq"];
        assert_eq!(jq.success_codes, vec![0]);
        assert_eq!(jq.scope, PersistScope::Machine);
        assert!(jq.url.is_none());
        assert!(jq.require_elevation.is_none());
    }

    #[test]
    fn full_tool_definition() {
        let yaml = r#"
tools:
  putty:
    executable: putty.exe
    url: https://example.com/putty.msi
    install: msiexec /i "${artifact}" /qn
    success_codes: [0, 3010]
    well_known_dirs: ["C:\\Program Files\\PuTTY"]
    scope: user
    require_elevation: false
"#;
        let config: OutfitConfig = serde_yaml::from_str(yaml).unwrap();
        let putty = &config.tools["putty"];
        assert_eq!(putty.success_codes, vec![0, 3010]);
        assert_eq!(putty.scope, PersistScope::User);
        assert_eq!(putty.well_known_dirs.len(), 1);
        assert_eq!(putty.require_elevation, Some(false));
    }

    #[test]
    fn python_partial_override_keeps_other_defaults() {
        let yaml = "python:\n  strict: true\n  poll_attempts: 3\n";
        let config: OutfitConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.python.strict);
        assert_eq!(config.python.poll_attempts, 3);
        assert_eq!(config.python.poll_interval_ms, 1000);
    }
}

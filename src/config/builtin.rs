//! Built-in tool definitions.
//!
//! Config files may override any of these by name.

use super::schema::ToolConfig;
use crate::envstore::PersistScope;
use std::collections::BTreeMap;

/// Latest 64-bit PuTTY MSI.
pub const PUTTY_URL: &str =
    "https://the.earth.li/~sgtatham/putty/latest/w64/putty-64bit-installer.msi";

/// Tools that are available without any configuration.
pub fn builtin_tools() -> BTreeMap<String, ToolConfig> {
    let mut tools = BTreeMap::new();
    tools.insert(
        "putty".to_string(),
        ToolConfig {
            executable: "putty.exe".to_string(),
            url: Some(PUTTY_URL.to_string()),
            install: Some("msiexec /i \"${artifact}\" /qn /norestart".to_string()),
            verify: None,
            well_known_dirs: vec![
                "${ProgramFiles}\\PuTTY".to_string(),
                "${ProgramFiles(x86)}\\PuTTY".to_string(),
            ],
            // 3010: success, reboot required
            success_codes: vec![0, 3010],
            scope: PersistScope::Machine,
            require_elevation: None,
        },
    );
    tools
}

//! Dependency locator.
//!
//! Decides whether a target's executable is already installed. The search
//! path is probed first, then the target's well-known install directories.
//! Lookup iterates entries directly instead of shelling out to `which` or
//! `where`, whose behavior varies across systems.

use super::target::ProvisionTarget;
use crate::envstore::split_entries;
use crate::shell::PATH_SEPARATOR;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// How an executable was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatedVia {
    SearchPath,
    WellKnownDir,
}

/// Where an executable was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Directory containing the executable.
    pub directory: PathBuf,
    /// Full path to the executable.
    pub executable: PathBuf,
    pub via: LocatedVia,
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// First directory in `dirs` holding an executable named `tool`.
pub fn resolve_tool_path(tool: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    for dir in dirs {
        let candidate = dir.join(tool);
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Split a search path value into directories.
pub fn search_path_dirs(search_path: &str) -> Vec<PathBuf> {
    split_entries(search_path)
        .into_iter()
        .map(PathBuf::from)
        .collect()
}

/// Probe the search path only.
pub fn locate_on_search_path(target: &ProvisionTarget, search_path: &str) -> Option<Location> {
    let dirs = search_path_dirs(search_path);
    resolve_tool_path(target.executable(), &dirs).map(|exe| location(exe, LocatedVia::SearchPath))
}

/// Probe the target's well-known install directories only.
pub fn locate_in_well_known(target: &ProvisionTarget) -> Option<Location> {
    resolve_tool_path(target.executable(), target.well_known_dirs())
        .map(|exe| location(exe, LocatedVia::WellKnownDir))
}

/// Probe the search path, then the well-known directories.
///
/// A missing executable is not an error. The probe has no side effects.
pub fn locate(target: &ProvisionTarget, search_path: &str) -> Option<Location> {
    let found = locate_on_search_path(target, search_path).or_else(|| locate_in_well_known(target));
    match &found {
        Some(loc) => tracing::debug!(
            "Located {} at {} ({:?})",
            target.name(),
            loc.executable.display(),
            loc.via
        ),
        None => tracing::debug!(
            "{} not found on {} search path entries or {} well-known dirs",
            target.executable(),
            search_path.split(PATH_SEPARATOR).count(),
            target.well_known_dirs().len()
        ),
    }
    found
}

fn location(executable: PathBuf, via: LocatedVia) -> Location {
    let directory = executable
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Location {
        directory,
        executable,
        via,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_fake_binary(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    fn join_path(dirs: &[&Path]) -> String {
        dirs.iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(&PATH_SEPARATOR.to_string())
    }

    #[test]
    fn resolve_tool_path_finds_first_match() {
        let temp = TempDir::new().unwrap();
        let dir_a = temp.path().join("a");
        let dir_b = temp.path().join("b");
        create_fake_binary(&dir_a.join("jq"));
        create_fake_binary(&dir_b.join("jq"));

        let result = resolve_tool_path("jq", &[dir_a.clone(), dir_b]);
        assert_eq!(result, Some(dir_a.join("jq")));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_tool_path_skips_non_executable() {
        let temp = TempDir::new().unwrap();
        let dir_a = temp.path().join("a");
        let dir_b = temp.path().join("b");
        fs::create_dir_all(&dir_a).unwrap();
        fs::write(dir_a.join("jq"), "data").unwrap();
        create_fake_binary(&dir_b.join("jq"));

        let result = resolve_tool_path("jq", &[dir_a, dir_b.clone()]);
        assert_eq!(result, Some(dir_b.join("jq")));
    }

    #[test]
    fn is_executable_false_for_missing_file() {
        assert!(!is_executable(Path::new("/nonexistent/path/to/file")));
    }

    #[test]
    fn locate_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let well_known = temp.path().join("opt");
        create_fake_binary(&well_known.join(crate::shell::executable_name("jq")));
        let target = ProvisionTarget::new("jq", "jq").with_well_known_dir(&well_known);
        let search_path = join_path(&[&temp.path().join("bin")]);

        let first = locate(&target, &search_path);
        let second = locate(&target, &search_path);

        assert!(first.is_some());
        assert_eq!(first, second);

        let missing = ProvisionTarget::new("absent", "outfit-absent-tool");
        assert_eq!(locate(&missing, &search_path), locate(&missing, &search_path));
    }

    #[test]
    fn locate_prefers_search_path() {
        let temp = TempDir::new().unwrap();
        let on_path = temp.path().join("bin");
        let well_known = temp.path().join("opt");
        let exe = crate::shell::executable_name("jq");
        create_fake_binary(&on_path.join(&exe));
        create_fake_binary(&well_known.join(&exe));

        let target = ProvisionTarget::new("jq", "jq").with_well_known_dir(&well_known);
        let found = locate(&target, &join_path(&[&on_path])).unwrap();

        assert_eq!(found.via, LocatedVia::SearchPath);
        assert_eq!(found.directory, on_path);
    }

    #[test]
    fn locate_falls_back_to_well_known_dir() {
        let temp = TempDir::new().unwrap();
        let empty = temp.path().join("empty");
        fs::create_dir_all(&empty).unwrap();
        let well_known = temp.path().join("opt");
        create_fake_binary(&well_known.join(crate::shell::executable_name("jq")));

        let target = ProvisionTarget::new("jq", "jq").with_well_known_dir(&well_known);
        let found = locate(&target, &join_path(&[&empty])).unwrap();

        assert_eq!(found.via, LocatedVia::WellKnownDir);
        assert_eq!(found.directory, well_known);
    }

    #[test]
    fn locate_returns_none_when_absent() {
        let temp = TempDir::new().unwrap();
        let target = ProvisionTarget::new("jq", "jq").with_well_known_dir(temp.path().join("nope"));
        assert!(locate(&target, "").is_none());
    }

    #[test]
    fn search_path_dirs_skips_empty_entries() {
        let value = format!("/a{sep}{sep}/b{sep}", sep = PATH_SEPARATOR);
        assert_eq!(
            search_path_dirs(&value),
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }
}

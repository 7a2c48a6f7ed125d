//! System interpreter discovery.

use crate::error::{OutfitError, Result};
use crate::shell::{display_command, CommandRunner};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Python\s+(\d+)\.(\d+)(?:\.(\d+))?").expect("static regex is valid")
});

/// Default candidates: the version-selecting launcher first, then generic names.
pub const DEFAULT_CANDIDATES: &[&str] = &["py -3", "python3", "python"];

/// A Python interpreter that answered `--version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpreter {
    pub program: String,
    /// Leading arguments, e.g. `-3` for the `py` launcher.
    pub args: Vec<String>,
    pub version: String,
}

impl Interpreter {
    /// Arguments for an invocation: the leading arguments followed by `extra`.
    pub fn invocation(&self, extra: &[&str]) -> Vec<String> {
        self.args
            .iter()
            .cloned()
            .chain(extra.iter().map(|s| s.to_string()))
            .collect()
    }

    pub fn command_line(&self) -> String {
        display_command(&self.program, &self.args)
    }
}

/// Split a candidate such as `py -3` into program and leading arguments.
pub fn parse_candidate(candidate: &str) -> Option<(String, Vec<String>)> {
    let mut parts = candidate.split_whitespace();
    let program = parts.next()?.to_string();
    Some((program, parts.map(str::to_string).collect()))
}

/// Extract `X.Y[.Z]` from `--version` output. Only Python 3 qualifies.
pub fn parse_version(output: &str) -> Option<String> {
    let caps = VERSION_LINE.captures(output)?;
    if &caps[1] != "3" {
        return None;
    }
    Some(match caps.get(3) {
        Some(patch) => format!("{}.{}.{}", &caps[1], &caps[2], patch.as_str()),
        None => format!("{}.{}", &caps[1], &caps[2]),
    })
}

/// First candidate that runs and reports a Python 3 version.
pub fn find_interpreter(candidates: &[String], runner: &dyn CommandRunner) -> Result<Interpreter> {
    for candidate in candidates {
        let Some((program, args)) = parse_candidate(candidate) else {
            continue;
        };

        let mut probe = args.clone();
        probe.push("--version".to_string());
        let result = match runner.run(&program, &probe) {
            Ok(result) if result.success => result,
            Ok(result) => {
                tracing::debug!("{} --version exited {:?}", candidate, result.exit_code);
                continue;
            }
            Err(e) => {
                tracing::debug!("{} unavailable: {}", candidate, e);
                continue;
            }
        };

        // Older interpreters print the version on stderr.
        let version = parse_version(&result.stdout).or_else(|| parse_version(&result.stderr));
        match version {
            Some(version) => {
                tracing::info!("Using {} (Python {})", candidate, version);
                return Ok(Interpreter {
                    program,
                    args,
                    version,
                });
            }
            None => tracing::debug!("{} did not report a Python 3 version", candidate),
        }
    }

    Err(OutfitError::InterpreterNotFound {
        tried: candidates.join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::fake::{ok_with, ScriptedRunner};
    use crate::shell::CommandResult;

    fn candidates() -> Vec<String> {
        DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_candidate_splits_launcher_args() {
        assert_eq!(
            parse_candidate("py -3"),
            Some(("py".to_string(), vec!["-3".to_string()]))
        );
        assert_eq!(parse_candidate("python3"), Some(("python3".to_string(), vec![])));
        assert_eq!(parse_candidate("   "), None);
    }

    #[test]
    fn parse_version_accepts_two_and_three_components() {
        assert_eq!(parse_version("Python 3.12.1\n"), Some("3.12.1".to_string()));
        assert_eq!(parse_version("Python 3.13"), Some("3.13".to_string()));
        assert_eq!(parse_version("Python 2.7.18"), None);
        assert_eq!(parse_version("command not found"), None);
    }

    #[test]
    fn prefers_launcher_when_available() {
        let runner = ScriptedRunner::new(|_| Ok(ok_with("Python 3.11.4")));
        let interp = find_interpreter(&candidates(), &runner).unwrap();

        assert_eq!(interp.program, "py");
        assert_eq!(interp.invocation(&["-m", "venv"]), vec!["-3", "-m", "venv"]);
        assert_eq!(runner.calls(), vec!["py -3 --version"]);
    }

    #[test]
    fn falls_back_to_generic_names() {
        let runner = ScriptedRunner::new(|line| {
            if line.starts_with("python3") {
                Ok(ok_with("Python 3.10.12"))
            } else {
                Err(OutfitError::CommandFailed {
                    command: line.to_string(),
                    code: None,
                })
            }
        });

        let interp = find_interpreter(&candidates(), &runner).unwrap();

        assert_eq!(interp.program, "python3");
        assert_eq!(interp.version, "3.10.12");
    }

    #[test]
    fn version_on_stderr_is_accepted() {
        let runner = ScriptedRunner::new(|_| {
            let mut result = CommandResult::from_code(0);
            result.stderr = "Python 3.6.8".to_string();
            Ok(result)
        });
        let interp = find_interpreter(&["python".to_string()], &runner).unwrap();
        assert_eq!(interp.version, "3.6.8");
    }

    #[test]
    fn none_found_is_exit_3() {
        let runner = ScriptedRunner::new(|_| Ok(CommandResult::from_code(9009)));
        let err = find_interpreter(&candidates(), &runner).unwrap_err();

        assert!(matches!(err, OutfitError::InterpreterNotFound { .. }));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(runner.calls().len(), 3);
    }
}

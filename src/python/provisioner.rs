//! Python environment provisioning state machine.
//!
//! ```text
//! NoEnv -> Creating -> Created -> DependenciesInstalling(1) -> Ready(full)
//!                                  | failed
//!                                  v
//!                                ToolingUpgrade -> DependenciesInstalling(2) -> Ready(full | partial)
//! ```
//!
//! An environment whose interpreter already exists starts at `Created`
//! unless a rebuild is forced. `Ready` is only reached after the activated
//! interpreter answers with the expected prefix.

use super::interpreter::find_interpreter;
use super::manifest::ManifestSearch;
use super::venv::{PollPolicy, VirtualEnv};
use crate::config::PythonConfig;
use crate::envstore::{normalize_entry, promote_entry, EnvStore};
use crate::error::{OutfitError, Result};
use crate::shell::{CommandResult, CommandRunner, PATH_VAR};
use crate::ui::UserInterface;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Variable naming the active environment.
pub const VIRTUAL_ENV_VAR: &str = "VIRTUAL_ENV";

const PREFIX_PROBE: &str = "import sys; print(sys.prefix)";

/// Provisioner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EnvState {
    NoEnv,
    Creating,
    Created,
    DependenciesInstalling { attempt: u32 },
    ToolingUpgrade,
    Ready { dependencies: DependencyStatus },
}

/// Outcome of the dependency install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyStatus {
    Full,
    /// Install failed twice; the environment is usable without them.
    Partial,
}

/// Settings for one provisioning run, fixed at startup.
#[derive(Debug, Clone)]
pub struct PythonOptions {
    pub root: PathBuf,
    pub project_root: PathBuf,
    pub manifest_name: String,
    pub explicit_manifest: Option<PathBuf>,
    pub interpreters: Vec<String>,
    pub poll: PollPolicy,
    /// Delete and recreate an existing environment.
    pub force: bool,
    /// Fail with pip's exit code instead of finishing partially.
    pub strict: bool,
}

impl PythonOptions {
    /// Options from configuration; command-line switches are applied after.
    pub fn from_config(config: &PythonConfig, root: PathBuf, project_root: PathBuf) -> Self {
        Self {
            root,
            project_root,
            manifest_name: config.manifest.clone(),
            explicit_manifest: None,
            interpreters: config.interpreters.clone(),
            poll: PollPolicy::new(
                config.poll_attempts,
                Duration::from_millis(config.poll_interval_ms),
            ),
            force: false,
            strict: config.strict,
        }
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PythonReport {
    pub root: PathBuf,
    pub manifest: PathBuf,
    pub interpreter: PathBuf,
    /// Whether this run created the environment.
    pub created: bool,
    pub dependencies: DependencyStatus,
    /// pip's exit code from the last failed install, if any.
    pub dependency_exit_code: Option<i32>,
    /// `sys.prefix` reported by the activated interpreter.
    pub prefix: String,
    pub transitions: Vec<EnvState>,
    pub exit_code: i32,
}

/// Drives a virtual environment from nothing to activated.
pub struct PythonProvisioner<'a> {
    options: &'a PythonOptions,
    runner: &'a dyn CommandRunner,
    session: &'a mut dyn EnvStore,
    transitions: Vec<EnvState>,
}

impl<'a> PythonProvisioner<'a> {
    pub fn new(
        options: &'a PythonOptions,
        runner: &'a dyn CommandRunner,
        session: &'a mut dyn EnvStore,
    ) -> Self {
        Self {
            options,
            runner,
            session,
            transitions: Vec::new(),
        }
    }

    /// Provision, install dependencies, activate and check the environment.
    ///
    /// The manifest is located before any interpreter or environment work.
    pub fn run(mut self, ui: &mut dyn UserInterface) -> Result<PythonReport> {
        let env = VirtualEnv::new(&self.options.root);

        let manifest = ManifestSearch {
            name: &self.options.manifest_name,
            explicit: self.options.explicit_manifest.as_deref(),
            project_root: &self.options.project_root,
            env_root: env.root(),
        }
        .find()?;
        ui.show_field("manifest", &manifest.display().to_string());
        ui.show_field("root", &env.root().display().to_string());

        if self.options.force && env.root().exists() {
            ui.message(&format!("Removing existing environment at {}", env.root().display()));
            env.remove()
                .map_err(|e| creation_failed(&env, format!("could not remove: {}", e)))?;
        }

        let created = if env.is_materialized() {
            tracing::info!("Reusing environment at {}", env.root().display());
            let mut spinner = ui.start_spinner("Creating environment");
            spinner.finish_skipped("Environment already exists");
            self.transition(EnvState::Created);
            false
        } else {
            self.create(&env, ui)?;
            true
        };

        self.upgrade_pip(&env, ui);
        self.ensure_pip(&env)?;

        let (dependencies, dependency_exit_code) = self.install_dependencies(&env, &manifest, ui)?;

        self.activate(&env)?;
        let prefix = self.sanity_check(&env)?;
        self.transition(EnvState::Ready { dependencies });

        ui.success(&format!("Environment ready at {}", env.root().display()));
        ui.show_hint(&format!("Activate in your shell with: {}", env.activation_hint()));

        Ok(PythonReport {
            root: env.root().to_path_buf(),
            manifest,
            interpreter: env.interpreter(),
            created,
            dependencies,
            dependency_exit_code,
            prefix,
            transitions: self.transitions,
            exit_code: 0,
        })
    }

    fn transition(&mut self, state: EnvState) {
        tracing::debug!("Environment state: {:?}", state);
        self.transitions.push(state);
    }

    fn create(&mut self, env: &VirtualEnv, ui: &mut dyn UserInterface) -> Result<()> {
        self.transition(EnvState::NoEnv);
        let interpreter = find_interpreter(&self.options.interpreters, self.runner)?;
        ui.show_field("python", &format!("{} ({})", interpreter.command_line(), interpreter.version));

        self.transition(EnvState::Creating);
        let mut spinner = ui.start_spinner(&format!("Creating environment at {}", env.root().display()));

        let root = env.root().display().to_string();
        let args = interpreter.invocation(&["-m", "venv", root.as_str()]);
        let result = self
            .runner
            .run(&interpreter.program, &args)
            .map_err(|e| creation_failed(env, e.to_string()));
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                spinner.finish_error("Environment creation failed");
                return Err(e);
            }
        };
        if !result.success {
            spinner.finish_error("Environment creation failed");
            return Err(creation_failed(
                env,
                format!("exit code {:?}: {}", result.exit_code, result.stderr.trim()),
            ));
        }

        if !env.wait_until_materialized(&self.options.poll) {
            spinner.finish_error("Environment creation failed");
            return Err(creation_failed(
                env,
                format!(
                    "{} did not appear after {} checks",
                    env.interpreter().display(),
                    self.options.poll.attempts
                ),
            ));
        }

        spinner.finish_success("Environment created");
        self.transition(EnvState::Created);
        Ok(())
    }

    /// Upgrade pip inside the environment. Failure is only a warning.
    fn upgrade_pip(&self, env: &VirtualEnv, ui: &mut dyn UserInterface) {
        match self.pip(env, &["install", "--upgrade", "pip"]) {
            Ok(result) if result.success => tracing::debug!("pip upgraded"),
            Ok(result) => ui.warning(&format!(
                "pip upgrade exited with code {:?}",
                result.exit_code
            )),
            Err(e) => ui.warning(&format!("pip upgrade failed: {}", e)),
        }
    }

    fn ensure_pip(&self, env: &VirtualEnv) -> Result<()> {
        match self.pip(env, &["--version"]) {
            Ok(result) if result.success => Ok(()),
            _ => Err(OutfitError::PackagingToolMissing {
                root: env.root().to_path_buf(),
            }),
        }
    }

    fn install_dependencies(
        &mut self,
        env: &VirtualEnv,
        manifest: &Path,
        ui: &mut dyn UserInterface,
    ) -> Result<(DependencyStatus, Option<i32>)> {
        let manifest_arg = manifest.display().to_string();
        let mut last_code = None;

        for attempt in 1..=2 {
            self.transition(EnvState::DependenciesInstalling { attempt });
            let mut spinner = ui.start_spinner("Installing dependencies");

            match self.pip(env, &["install", "-r", manifest_arg.as_str()]) {
                Ok(result) if result.success => {
                    spinner.finish_success("Dependencies installed");
                    if ui.output_mode().shows_command_output() {
                        ui.message(result.stdout.trim_end());
                    }
                    return Ok((DependencyStatus::Full, None));
                }
                Ok(result) => {
                    last_code = result.exit_code;
                    spinner.finish_error(&format!(
                        "Dependency install exited with code {:?}",
                        result.exit_code
                    ));
                    tracing::debug!("pip stderr: {}", result.stderr.trim());
                }
                Err(e) => {
                    last_code = None;
                    spinner.finish_error(&format!("Dependency install failed: {}", e));
                }
            }

            if attempt == 1 {
                ui.warning("Upgrading pip and retrying the dependency install once");
                self.transition(EnvState::ToolingUpgrade);
                self.upgrade_pip(env, ui);
            }
        }

        if self.options.strict {
            return Err(OutfitError::DependencyInstallFailed {
                manifest: manifest.to_path_buf(),
                code: last_code,
            });
        }

        ui.warning(&format!(
            "Some dependencies from {} are missing; the environment is usable without them",
            manifest.display()
        ));
        Ok((DependencyStatus::Partial, last_code))
    }

    /// Point this process at the environment.
    fn activate(&mut self, env: &VirtualEnv) -> Result<()> {
        let activation_failed = |message: String| OutfitError::ActivationFailed {
            root: env.root().to_path_buf(),
            message,
        };

        let scripts = env.scripts_dir();
        if !scripts.is_dir() {
            return Err(activation_failed(format!("{} is missing", scripts.display())));
        }

        let path = self
            .session
            .get(PATH_VAR)
            .map_err(|e| activation_failed(e.to_string()))?
            .unwrap_or_default();
        let scripts = scripts.display().to_string();

        self.session
            .set(VIRTUAL_ENV_VAR, &env.root().display().to_string())
            .map_err(|e| activation_failed(e.to_string()))?;
        self.session
            .set(PATH_VAR, &promote_entry(&path, &scripts))
            .map_err(|e| activation_failed(e.to_string()))?;

        tracing::info!("Activated {}", env.root().display());
        Ok(())
    }

    /// Ask the interpreter found through the activated search path for its prefix.
    fn sanity_check(&self, env: &VirtualEnv) -> Result<String> {
        let sanity_failed = |message: String| OutfitError::SanityCheckFailed {
            root: env.root().to_path_buf(),
            message,
        };

        let args = vec!["-c".to_string(), PREFIX_PROBE.to_string()];
        let result = self
            .runner
            .run("python", &args)
            .map_err(|e| sanity_failed(e.to_string()))?;
        if !result.success {
            return Err(sanity_failed(format!(
                "interpreter exited with code {:?}",
                result.exit_code
            )));
        }

        let prefix = result.stdout.trim().to_string();
        if !same_location(Path::new(&prefix), env.root()) {
            return Err(sanity_failed(format!(
                "active interpreter reports prefix {}",
                prefix
            )));
        }
        Ok(prefix)
    }

    fn pip(&self, env: &VirtualEnv, args: &[&str]) -> Result<CommandResult> {
        let mut full = vec!["-m".to_string(), "pip".to_string()];
        full.extend(args.iter().map(|s| s.to_string()));
        self.runner
            .run(&env.interpreter().display().to_string(), &full)
    }
}

fn creation_failed(env: &VirtualEnv, message: String) -> OutfitError {
    OutfitError::EnvironmentCreationFailed {
        root: env.root().to_path_buf(),
        message,
    }
}

/// Compare two paths, resolving symlinks when both exist.
fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => normalize_entry(&a.display().to_string()) == normalize_entry(&b.display().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envstore::MemoryEnvStore;
    use crate::shell::fake::{ok_with, ScriptedRunner};
    use crate::shell::PATH_SEPARATOR;
    use crate::ui::MockUI;
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        options: PythonOptions,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let project = temp.path().join("project");
            fs::create_dir_all(&project).unwrap();
            fs::write(project.join("requirements.txt"), "numpy\n").unwrap();
            let options = PythonOptions {
                root: temp.path().join("env-root"),
                project_root: project,
                manifest_name: "requirements.txt".to_string(),
                explicit_manifest: None,
                interpreters: vec!["py -3".to_string(), "python3".to_string()],
                poll: PollPolicy::new(15, Duration::ZERO),
                force: false,
                strict: false,
            };
            Self {
                _temp: temp,
                options,
            }
        }

        fn materialize(&self) {
            materialize(&self.options.root);
        }
    }

    fn materialize(root: &Path) {
        let env = VirtualEnv::new(root);
        fs::create_dir_all(env.scripts_dir()).unwrap();
        fs::write(env.interpreter(), "").unwrap();
    }

    /// Answers like a healthy system: `pip install -r` exits with the codes
    /// in `install_codes`, one per attempt.
    fn healthy_runner(root: &Path, install_codes: Vec<i32>) -> (ScriptedRunner, Rc<Cell<usize>>) {
        let root = root.to_path_buf();
        let installs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&installs);
        let runner = ScriptedRunner::new(move |line| {
            if line.ends_with("--version") && !line.contains(" pip ") {
                Ok(ok_with("Python 3.12.1"))
            } else if line.contains(" -m venv ") {
                materialize(&root);
                Ok(CommandResult::from_code(0))
            } else if line.contains(" pip install -r ") {
                let n = counter.get();
                counter.set(n + 1);
                Ok(CommandResult::from_code(
                    install_codes.get(n).copied().unwrap_or(0),
                ))
            } else if line.starts_with("python -c") {
                Ok(ok_with(&format!("{}\n", root.display())))
            } else {
                Ok(CommandResult::from_code(0))
            }
        });
        (runner, installs)
    }

    #[test]
    fn fresh_environment_reaches_ready() {
        let fx = Fixture::new();
        let (runner, _) = healthy_runner(&fx.options.root, vec![0]);
        let mut session = MemoryEnvStore::with_var("PATH", "/usr/bin");
        let mut ui = MockUI::new();

        let report = PythonProvisioner::new(&fx.options, &runner, &mut session)
            .run(&mut ui)
            .unwrap();

        assert!(report.created);
        assert_eq!(report.exit_code, 0);
        assert_eq!(
            report.transitions,
            vec![
                EnvState::NoEnv,
                EnvState::Creating,
                EnvState::Created,
                EnvState::DependenciesInstalling { attempt: 1 },
                EnvState::Ready {
                    dependencies: DependencyStatus::Full
                },
            ]
        );

        let env = VirtualEnv::new(&fx.options.root);
        let path = session.get("PATH").unwrap().unwrap();
        assert!(path.starts_with(&format!(
            "{}{}",
            env.scripts_dir().display(),
            PATH_SEPARATOR
        )));
        assert_eq!(
            session.get(VIRTUAL_ENV_VAR).unwrap().unwrap(),
            fx.options.root.display().to_string()
        );
        assert!(ui.has_hint("activate"));
    }

    #[test]
    fn existing_environment_skips_creation() {
        let fx = Fixture::new();
        fx.materialize();
        let (runner, _) = healthy_runner(&fx.options.root, vec![0]);
        let mut session = MemoryEnvStore::new();
        let mut ui = MockUI::new();

        let report = PythonProvisioner::new(&fx.options, &runner, &mut session)
            .run(&mut ui)
            .unwrap();

        assert!(!report.created);
        assert_eq!(report.transitions[0], EnvState::Created);
        assert_eq!(runner.count(" -m venv "), 0);
        assert_eq!(runner.count("py -3 --version"), 0);
        assert_eq!(runner.count(" pip install -r "), 1);
    }

    #[test]
    fn force_recreates_existing_environment() {
        let mut fx = Fixture::new();
        fx.materialize();
        let marker = fx.options.root.join("stale.txt");
        fs::write(&marker, "old").unwrap();
        fx.options.force = true;
        let (runner, _) = healthy_runner(&fx.options.root, vec![0]);
        let mut session = MemoryEnvStore::new();

        let report = PythonProvisioner::new(&fx.options, &runner, &mut session)
            .run(&mut MockUI::new())
            .unwrap();

        assert!(report.created);
        assert!(!marker.exists());
        assert_eq!(runner.count(" -m venv "), 1);
    }

    #[test]
    fn missing_manifest_fails_before_any_process() {
        let fx = Fixture::new();
        fs::remove_file(fx.options.project_root.join("requirements.txt")).unwrap();
        let (runner, _) = healthy_runner(&fx.options.root, vec![0]);
        let mut session = MemoryEnvStore::new();

        let err = PythonProvisioner::new(&fx.options, &runner, &mut session)
            .run(&mut MockUI::new())
            .unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert!(runner.calls().is_empty());
        assert!(!fx.options.root.exists());
    }

    #[test]
    fn failed_install_is_retried_once_after_upgrade() {
        let fx = Fixture::new();
        let (runner, installs) = healthy_runner(&fx.options.root, vec![1, 0]);
        let mut session = MemoryEnvStore::new();

        let report = PythonProvisioner::new(&fx.options, &runner, &mut session)
            .run(&mut MockUI::new())
            .unwrap();

        assert_eq!(report.dependencies, DependencyStatus::Full);
        assert_eq!(installs.get(), 2);
        assert_eq!(runner.count("install --upgrade pip"), 2);
        assert!(report.transitions.contains(&EnvState::ToolingUpgrade));
    }

    #[test]
    fn second_failure_finishes_partially() {
        let fx = Fixture::new();
        let (runner, installs) = healthy_runner(&fx.options.root, vec![1, 1, 0]);
        let mut session = MemoryEnvStore::new();
        let mut ui = MockUI::new();

        let report = PythonProvisioner::new(&fx.options, &runner, &mut session)
            .run(&mut ui)
            .unwrap();

        assert_eq!(report.exit_code, 0);
        assert_eq!(report.dependencies, DependencyStatus::Partial);
        assert_eq!(report.dependency_exit_code, Some(1));
        assert_eq!(installs.get(), 2);
        assert!(ui.has_warning("missing"));
    }

    #[test]
    fn strict_mode_propagates_pip_code() {
        let mut fx = Fixture::new();
        fx.options.strict = true;
        let (runner, installs) = healthy_runner(&fx.options.root, vec![23, 23]);
        let mut session = MemoryEnvStore::new();

        let err = PythonProvisioner::new(&fx.options, &runner, &mut session)
            .run(&mut MockUI::new())
            .unwrap_err();

        assert_eq!(err.exit_code(), 23);
        assert_eq!(installs.get(), 2);
    }

    #[test]
    fn environment_that_never_appears_fails_after_poll_budget() {
        let fx = Fixture::new();
        let runner = ScriptedRunner::new(|line| {
            if line.ends_with("--version") {
                Ok(ok_with("Python 3.12.1"))
            } else {
                Ok(CommandResult::from_code(0))
            }
        });
        let mut session = MemoryEnvStore::new();

        let err = PythonProvisioner::new(&fx.options, &runner, &mut session)
            .run(&mut MockUI::new())
            .unwrap_err();

        assert!(matches!(err, OutfitError::EnvironmentCreationFailed { .. }));
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("15 checks"));
    }

    #[test]
    fn no_interpreter_is_exit_3() {
        let fx = Fixture::new();
        let runner = ScriptedRunner::new(|_| Ok(CommandResult::from_code(1)));
        let mut session = MemoryEnvStore::new();

        let err = PythonProvisioner::new(&fx.options, &runner, &mut session)
            .run(&mut MockUI::new())
            .unwrap_err();

        assert_eq!(err.exit_code(), 3);
        assert_eq!(runner.count(" -m venv "), 0);
    }

    #[test]
    fn missing_pip_is_exit_5() {
        let fx = Fixture::new();
        fx.materialize();
        let runner = ScriptedRunner::new(|line| {
            if line.ends_with("-m pip --version") {
                Ok(CommandResult::from_code(1))
            } else {
                Ok(CommandResult::from_code(0))
            }
        });
        let mut session = MemoryEnvStore::new();

        let err = PythonProvisioner::new(&fx.options, &runner, &mut session)
            .run(&mut MockUI::new())
            .unwrap_err();

        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn activation_failure_is_exit_7_even_after_partial_install() {
        let fx = Fixture::new();
        fx.materialize();
        let (runner, _) = healthy_runner(&fx.options.root, vec![1, 1]);
        let mut session = MemoryEnvStore::new().reject_writes();

        let err = PythonProvisioner::new(&fx.options, &runner, &mut session)
            .run(&mut MockUI::new())
            .unwrap_err();

        assert!(matches!(err, OutfitError::ActivationFailed { .. }));
        assert_eq!(err.exit_code(), 7);
    }

    #[test]
    fn foreign_prefix_fails_sanity_check() {
        let fx = Fixture::new();
        fx.materialize();
        let runner = ScriptedRunner::new(|line| {
            if line.starts_with("python -c") {
                Ok(ok_with("/usr\n"))
            } else {
                Ok(CommandResult::from_code(0))
            }
        });
        let mut session = MemoryEnvStore::new();

        let err = PythonProvisioner::new(&fx.options, &runner, &mut session)
            .run(&mut MockUI::new())
            .unwrap_err();

        assert_eq!(err.exit_code(), 8);
        assert!(err.to_string().contains("/usr"));
    }

    #[test]
    fn options_from_config_carry_poll_budget() {
        let config = PythonConfig::default();
        let options =
            PythonOptions::from_config(&config, PathBuf::from("/env"), PathBuf::from("/project"));
        assert_eq!(options.poll.attempts, config.poll_attempts);
        assert_eq!(options.manifest_name, "requirements.txt");
        assert!(!options.force);
    }
}

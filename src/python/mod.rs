//! Python virtual environment provisioning.
//!
//! Creates (or reuses) a virtual environment, installs the project's
//! dependency manifest into it, activates it for this process and checks
//! that the activated interpreter is the environment's own.

pub mod interpreter;
pub mod manifest;
pub mod provisioner;
pub mod venv;

pub use interpreter::{find_interpreter, Interpreter, DEFAULT_CANDIDATES};
pub use manifest::ManifestSearch;
pub use provisioner::{
    DependencyStatus, EnvState, PythonOptions, PythonProvisioner, PythonReport, VIRTUAL_ENV_VAR,
};
pub use venv::{default_env_root, resolve_env_root, PollPolicy, VirtualEnv};

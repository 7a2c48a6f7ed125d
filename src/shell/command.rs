//! Shell and program execution.
//!
//! Provisioning stages never spawn processes directly; they go through the
//! [`CommandRunner`] seam so tests can script installer and interpreter
//! behavior without touching the machine.

use crate::error::{OutfitError, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// Shorthand for a result with only an exit code.
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            Self::success(String::new(), String::new(), Duration::ZERO)
        } else {
            Self::failure(Some(code), String::new(), String::new(), Duration::ZERO)
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Capture stdout (if false, inherits from parent).
    pub capture_stdout: bool,

    /// Capture stderr (if false, inherits from parent).
    pub capture_stderr: bool,
}

impl CommandOptions {
    /// Options that capture both output streams.
    pub fn captured() -> Self {
        Self {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        }
    }
}

/// Execute a command line through the platform shell.
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let mut cmd = Command::new(detect_shell());
    cmd.arg(shell_flag());
    cmd.arg(command);
    run(cmd, command, options)
}

/// Execute a program directly, without a shell in between.
pub fn execute_program(
    program: &str,
    args: &[String],
    options: &CommandOptions,
) -> Result<CommandResult> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    let command_line = display_command(program, args);
    run(cmd, &command_line, options)
}

/// Render a program invocation for logs and error messages.
pub fn display_command(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

fn run(mut cmd: Command, command_line: &str, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    if options.capture_stdout {
        cmd.stdout(Stdio::piped());
    } else {
        cmd.stdout(Stdio::inherit());
    }

    if options.capture_stderr {
        cmd.stderr(Stdio::piped());
    } else {
        cmd.stderr(Stdio::inherit());
    }

    tracing::debug!("Executing: {}", command_line);

    let output = cmd.output().map_err(|e| {
        tracing::debug!("Failed to spawn '{}': {}", command_line, e);
        OutfitError::CommandFailed {
            command: command_line.to_string(),
            code: None,
        }
    })?;

    let duration = start.elapsed();

    let stdout = if options.capture_stdout {
        String::from_utf8_lossy(&output.stdout).to_string()
    } else {
        String::new()
    };

    let stderr = if options.capture_stderr {
        String::from_utf8_lossy(&output.stderr).to_string()
    } else {
        String::new()
    };

    if output.status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        Ok(CommandResult::failure(
            output.status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

/// Detect the shell used for command lines.
fn detect_shell() -> String {
    if cfg!(target_os = "windows") {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    } else {
        "/bin/sh".to_string()
    }
}

/// Get the flag to pass commands to the shell.
fn shell_flag() -> &'static str {
    if cfg!(target_os = "windows") {
        "/C"
    } else {
        "-c"
    }
}

/// Process-spawning seam used by the installer and the Python provisioner.
pub trait CommandRunner {
    /// Run a command line through the platform shell.
    fn run_shell(&self, command: &str) -> Result<CommandResult>;

    /// Run a program with explicit arguments.
    fn run(&self, program: &str, args: &[String]) -> Result<CommandResult>;
}

/// [`CommandRunner`] that spawns real processes.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    options: CommandOptions,
}

impl SystemRunner {
    /// Runner that captures output (used for probes).
    pub fn captured() -> Self {
        Self {
            options: CommandOptions::captured(),
        }
    }

    /// Runner that streams output to the terminal (used in verbose mode).
    pub fn inherited() -> Self {
        Self {
            options: CommandOptions::default(),
        }
    }

    /// Runner with explicit options.
    pub fn with_options(options: CommandOptions) -> Self {
        Self { options }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::captured()
    }
}

impl CommandRunner for SystemRunner {
    fn run_shell(&self, command: &str) -> Result<CommandResult> {
        execute(command, &self.options)
    }

    fn run(&self, program: &str, args: &[String]) -> Result<CommandResult> {
        execute_program(program, args, &self.options)
    }
}

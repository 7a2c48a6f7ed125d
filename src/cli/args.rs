//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Outfit - Provision command-line tools and Python environments.
#[derive(Debug, Parser)]
#[command(name = "outfit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .outfit/config.yml)
    #[arg(short, long, global = true, env = "OUTFIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output, including installer and pip output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Whether the selected subcommand asked for JSON output.
    pub fn json(&self) -> bool {
        match &self.command {
            Commands::Tool(args) => args.json,
            Commands::Python(args) => args.json,
            Commands::Status(args) => args.json,
            Commands::Completions(_) => false,
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Make a command-line tool available, installing it if needed
    Tool(ToolArgs),

    /// Create, populate and activate a Python virtual environment
    Python(PythonArgs),

    /// Show where configured tools are found, without changing anything
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `tool` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ToolArgs {
    /// Tool name (built in or from the config file)
    pub name: String,

    /// Report what would be done without downloading or installing
    #[arg(long)]
    pub dry_run: bool,

    /// Output the stage report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `python` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PythonArgs {
    /// Environment root (defaults to a directory under the user root)
    pub path: Option<PathBuf>,

    /// Delete and recreate an existing environment
    #[arg(short, long)]
    pub force: bool,

    /// Fail with pip's exit code when dependencies cannot be installed
    #[arg(long)]
    pub strict: bool,

    /// Dependency manifest to install (skips the candidate search)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Output the environment report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Only show this tool
    pub name: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

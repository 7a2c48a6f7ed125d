//! Configuration loading and interpolation.
//!
//! - Schema definitions in [`schema`]
//! - Built-in tool definitions in [`builtin`]
//! - File discovery and loading in [`loader`]
//! - Variable interpolation in [`interpolation`]
//!
//! # Example
//!
//! ```
//! use outfit::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".outfit");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "tools:\n  jq:\n    executable: jq\n").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! assert!(config.tools.contains_key("jq"));
//! ```

pub mod builtin;
pub mod interpolation;
pub mod loader;
pub mod schema;

pub use builtin::builtin_tools;
pub use interpolation::{
    parse_interpolation, resolve_string, InterpolationContext, Segment,
};
pub use loader::{
    load_config, load_config_file, parse_config, project_config_path, validate, CONFIG_DIR,
    CONFIG_FILE,
};
pub use schema::{OutfitConfig, PythonConfig, Settings, ToolConfig};

//! `${variable}` interpolation for configuration values.
//!
//! Tool definitions refer to the environment (`${ProgramFiles}\PuTTY`) and
//! installer commands refer to the downloaded artifact
//! (`msiexec /i "${artifact}" /qn`).
//!
//! # Syntax
//!
//! - `${name}` - replaced with the variable's value
//! - `$${name}` - literal `${name}` in the output
//!
//! # Example
//!
//! ```
//! use outfit::config::{resolve_string, InterpolationContext};
//!
//! let ctx = InterpolationContext::empty().with_var("artifact", "/tmp/putty.msi");
//! let cmd = resolve_string("msiexec /i \"${artifact}\" /qn", &ctx).unwrap();
//! assert_eq!(cmd, "msiexec /i \"/tmp/putty.msi\" /qn");
//! ```

use crate::error::{OutfitError, Result};
use std::collections::HashMap;

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Split a string into literal and `${var}` segments.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        literal.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(escaped) = tail.strip_prefix("$${") {
            // $${name} -> literal ${name}
            match escaped.find('}') {
                Some(end) => {
                    literal.push_str("${");
                    literal.push_str(&escaped[..=end]);
                    rest = &escaped[end + 1..];
                }
                None => {
                    literal.push_str(tail);
                    rest = "";
                }
            }
        } else if let Some(body) = tail.strip_prefix("${") {
            match body.find('}') {
                Some(end) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Variable(body[..end].trim().to_string()));
                    rest = &body[end + 1..];
                }
                None => {
                    // Unterminated reference stays literal.
                    literal.push_str(tail);
                    rest = "";
                }
            }
        } else {
            literal.push('$');
            rest = &tail[1..];
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// Context for variable resolution.
///
/// Explicit variables (like `artifact`) take priority over the environment.
#[derive(Debug, Clone, Default)]
pub struct InterpolationContext {
    /// Variables supplied by the caller.
    pub vars: HashMap<String, String>,

    /// Environment variables.
    pub env: HashMap<String, String>,
}

impl InterpolationContext {
    /// Context seeded with the current process environment.
    pub fn from_process_env() -> Self {
        Self {
            vars: HashMap::new(),
            env: std::env::vars().collect(),
        }
    }

    /// Context with no variables at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a caller-supplied variable.
    pub fn with_var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.insert(name.to_string(), value.into());
        self
    }

    /// Resolve a variable name to its value.
    ///
    /// Environment names match case-insensitively as a fallback, mirroring
    /// how Windows treats `%ProgramFiles%` and `%PROGRAMFILES%`.
    pub fn resolve(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .or_else(|| self.env.get(name))
            .or_else(|| {
                self.env
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .cloned()
    }
}

/// Resolve all variables in an interpolated string.
///
/// # Errors
///
/// Returns `ConfigValidationError` if any variable is not found in the context.
pub fn resolve_string(input: &str, context: &InterpolationContext) -> Result<String> {
    let mut result = String::new();

    for segment in parse_interpolation(input) {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => {
                let value =
                    context
                        .resolve(&name)
                        .ok_or_else(|| OutfitError::ConfigValidationError {
                            message: format!("Unresolved variable: ${{{}}}", name),
                        })?;
                result.push_str(&value);
            }
        }
    }

    Ok(result)
}

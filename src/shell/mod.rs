//! Process execution and platform probes.

pub mod command;
#[cfg(test)]
pub(crate) mod fake;
pub mod platform;

pub use command::{
    display_command, execute, execute_program, CommandOptions, CommandResult, CommandRunner,
    SystemRunner,
};
pub use platform::{
    executable_name, is_ci, is_elevated, PATH_SEPARATOR, PATH_VAR, USER_ROOT_VAR,
};

//! Scripted [`CommandRunner`] for unit tests.

use super::command::{display_command, CommandResult, CommandRunner};
use crate::error::Result;
use std::cell::RefCell;

type Handler = Box<dyn Fn(&str) -> Result<CommandResult>>;

/// Records every command line and answers through a handler closure.
pub struct ScriptedRunner {
    calls: RefCell<Vec<String>>,
    handler: Handler,
}

impl ScriptedRunner {
    pub fn new(handler: impl Fn(&str) -> Result<CommandResult> + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    /// Runner where every command exits 0 with no output.
    pub fn succeeding() -> Self {
        Self::new(|_| Ok(CommandResult::from_code(0)))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Number of recorded command lines containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.contains(needle))
            .count()
    }

    fn answer(&self, line: String) -> Result<CommandResult> {
        let result = (self.handler)(&line);
        self.calls.borrow_mut().push(line);
        result
    }
}

impl CommandRunner for ScriptedRunner {
    fn run_shell(&self, command: &str) -> Result<CommandResult> {
        self.answer(command.to_string())
    }

    fn run(&self, program: &str, args: &[String]) -> Result<CommandResult> {
        self.answer(display_command(program, args))
    }
}

/// Successful result carrying `stdout`.
pub fn ok_with(stdout: &str) -> CommandResult {
    let mut result = CommandResult::from_code(0);
    result.stdout = stdout.to_string();
    result
}

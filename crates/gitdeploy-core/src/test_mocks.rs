//! Mock command runner for engine and deployer tests.

use std::sync::Mutex;

use gitdeploy_exec::{CommandResult, CommandRunner, Error as ExecError, Invocation, Result as ExecResult};

/// Records every invocation and answers with scripted exit codes.
///
/// A command succeeds unless its command line contains one of the
/// registered patterns, in which case the first matching rule decides the
/// exit code and output.
#[derive(Default)]
pub struct MockRunner {
    calls: Mutex<Vec<Invocation>>,
    rules: Vec<(String, i32, String)>,
    missing: Vec<String>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit with `code` for commands containing `pattern`.
    pub fn fail_on(self, pattern: &str, code: i32) -> Self {
        self.respond(pattern, code, "")
    }

    /// Exit with `code` and `output` for commands containing `pattern`.
    pub fn respond(mut self, pattern: &str, code: i32, output: &str) -> Self {
        self.rules
            .push((pattern.to_string(), code, output.to_string()));
        self
    }

    /// Fail to start commands containing `pattern`, as if the program
    /// were not installed.
    pub fn missing(mut self, pattern: &str) -> Self {
        self.missing.push(pattern.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(Invocation::command_line).collect()
    }

    /// Number of recorded commands containing `pattern`.
    pub fn count(&self, pattern: &str) -> usize {
        self.command_lines()
            .iter()
            .filter(|line| line.contains(pattern))
            .count()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, invocation: &Invocation) -> ExecResult<CommandResult> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(invocation.clone());

        let line = invocation.command_line();
        if self.missing.iter().any(|pattern| line.contains(pattern.as_str())) {
            return Err(ExecError::Spawn {
                program: invocation.program().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let (code, output) = self
            .rules
            .iter()
            .find(|(pattern, _, _)| line.contains(pattern.as_str()))
            .map_or((0, ""), |(_, code, output)| (*code, output.as_str()));

        Ok(CommandResult::new(line.clone(), code, output, ""))
    }
}

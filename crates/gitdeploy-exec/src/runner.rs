//! Command runner backed by `std::process`.

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};

use crate::error::{Error, Result};
use crate::invocation::Invocation;
use crate::result::CommandResult;
use crate::traits::CommandRunner;

/// Runs invocations as real child processes.
///
/// Standard error shares one pipe with standard output so failures show up
/// in the captured text in the order they were written. Standard input is
/// closed. There is no timeout: a hung child blocks the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandResult> {
        let command_line = invocation.command_line();
        tracing::debug!(command = %command_line, "running command");

        let (mut reader, writer) = std::io::pipe()?;

        let mut command = Command::new(invocation.program());
        command
            .args(invocation.arguments())
            .envs(
                invocation
                    .environment()
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            )
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);

        let mut child = command.spawn().map_err(|source| Error::Spawn {
            program: invocation.program().to_string(),
            source,
        })?;

        // The command owns copies of the write end; reading would never see
        // EOF while they are alive.
        drop(command);

        let mut captured = Vec::new();
        let read = reader.read_to_end(&mut captured);
        let status = child.wait()?;
        read?;

        let code = exit_code(status);
        tracing::debug!(command = %command_line, code, "command finished");

        Ok(CommandResult::new(
            command_line,
            code,
            String::from_utf8_lossy(&captured).into_owned(),
            String::new(),
        ))
    }
}

/// Map an exit status to a shell-style integer code.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Invocation {
        Invocation::new("sh").args(["-c", script])
    }

    #[test]
    fn test_captures_stdout_and_exit_code() {
        let result = ProcessRunner::new().run(&sh("echo hello")).unwrap();
        assert_eq!(result.code, 0);
        assert_eq!(result.stdout, "hello\n");
        assert!(result.stderr.is_empty());
        assert_eq!(result.command, "sh -c 'echo hello'");
    }

    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let result = ProcessRunner::new().run(&sh("exit 3")).unwrap();
        assert_eq!(result.code, 3);
        assert!(!result.success());
    }

    #[test]
    fn test_stderr_is_merged_into_stdout() {
        let result = ProcessRunner::new()
            .run(&sh("echo out; echo err 1>&2; exit 1"))
            .unwrap();
        assert_eq!(result.code, 1);
        assert!(result.stdout.contains("out"));
        assert!(result.stdout.contains("err"));
    }

    #[test]
    fn test_env_overrides_reach_child() {
        let inv = sh("printf %s \"$GITDEPLOY_TEST_VALUE\"").env("GITDEPLOY_TEST_VALUE", "42");
        let result = ProcessRunner::new().run(&inv).unwrap();
        assert_eq!(result.stdout, "42");
    }

    #[test]
    fn test_stdin_is_closed() {
        // `cat` would block forever on an inherited terminal.
        let result = ProcessRunner::new().run(&Invocation::new("cat")).unwrap();
        assert_eq!(result.code, 0);
        assert!(result.stdout.is_empty());
    }

    #[test]
    fn test_arguments_are_not_shell_interpreted() {
        let result = ProcessRunner::new()
            .run(&Invocation::new("echo").arg("$(id); `id`"))
            .unwrap();
        assert_eq!(result.stdout, "$(id); `id`\n");
    }

    #[test]
    fn test_signal_exit_code() {
        let result = ProcessRunner::new().run(&sh("kill -9 $$")).unwrap();
        assert_eq!(result.code, 128 + 9);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = ProcessRunner::new()
            .run(&Invocation::new("gitdeploy-definitely-not-a-program"))
            .unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
        assert!(err.to_string().contains("gitdeploy-definitely-not-a-program"));
    }

    #[test]
    fn test_runs_in_inherited_directory_with_file_side_effects() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("touched");
        let result = ProcessRunner::new()
            .run(&Invocation::new("touch").arg(target.to_string_lossy()))
            .unwrap();
        assert!(result.success());
        assert!(target.exists());
    }
}

//! Synchronization engine.
//!
//! Brings one working tree in line with its remote:
//!
//! 1. clone when the location is missing, otherwise verify it is a checkout
//! 2. `git clean -f`
//! 3. `git pull`
//! 4. post-update hooks, in order
//! 5. strip group/other access from `.git`
//!
//! Each step runs only if the previous one succeeded. Nothing is retried;
//! running [`SyncEngine::execute`] again converges from any intermediate
//! state.

use gitdeploy_exec::{CommandResult, CommandRunner, Error as ExecError, Invocation};

use crate::error::{Error, Result};
use crate::repository::Repository;
use crate::session::Session;

/// Exit code git uses for "not a git repository".
pub const NOT_A_REPOSITORY: i32 = 128;

/// Exit code reported for a program that could not be started, as a shell
/// would for a missing command.
pub const COMMAND_NOT_FOUND: i32 = 127;

/// Runs the update sequence for repositories within one session.
pub struct SyncEngine<'a, R: CommandRunner> {
    runner: R,
    session: &'a Session,
}

impl<'a, R: CommandRunner> SyncEngine<'a, R> {
    /// Create an engine that runs commands through `runner` with the
    /// credentials of `session`.
    pub const fn new(runner: R, session: &'a Session) -> Self {
        Self { runner, session }
    }

    /// Update `repository` in place.
    ///
    /// Failures are returned, not logged; the caller owns reporting.
    ///
    /// # Errors
    /// Returns the error of the first step that failed.
    pub fn execute(&self, repository: &Repository) -> Result<()> {
        tracing::info!(repository = %repository, "updating");
        self.sync(repository)?;
        tracing::info!(id = repository.id(), "update finished");
        Ok(())
    }

    fn sync(&self, repository: &Repository) -> Result<()> {
        if repository.location().is_dir() {
            self.verify(repository)?;
        } else {
            self.clone_repository(repository)?;
        }

        self.clean(repository)?;
        self.pull(repository)?;
        self.run_hooks(repository)?;
        self.secure(repository)
    }

    fn verify(&self, repository: &Repository) -> Result<()> {
        let result = self.run(self.work_tree_git(repository).args(["status", "-s"]))?;
        match result.code {
            0 => Ok(()),
            NOT_A_REPOSITORY => Err(Error::InconsistentState {
                location: repository.location().to_path_buf(),
            }),
            code => {
                tracing::warn!(id = repository.id(), code, "git status reported a problem");
                Ok(())
            }
        }
    }

    fn clone_repository(&self, repository: &Repository) -> Result<()> {
        tracing::info!(origin = repository.origin(), "cloning");
        let invocation = self
            .session
            .git()
            .arg("clone")
            .arg(repository.origin())
            .arg(repository.location_text());
        let result = self.run(invocation)?;
        if result.success() {
            Ok(())
        } else {
            Err(Error::CloneFailed {
                command: result.command.clone(),
                output: result.format_output(),
            })
        }
    }

    fn clean(&self, repository: &Repository) -> Result<()> {
        let result = self.run(
            self.work_tree_git(repository)
                .args(["clean", "-f", "--quiet"]),
        )?;
        if result.success() {
            Ok(())
        } else {
            Err(Error::CleanFailed {
                command: result.command.clone(),
                output: result.format_output(),
            })
        }
    }

    fn pull(&self, repository: &Repository) -> Result<()> {
        let result = self.run(self.work_tree_git(repository).arg("pull"))?;
        if result.success() {
            Ok(())
        } else {
            Err(Error::PullFailed {
                command: result.command.clone(),
                output: result.format_output(),
            })
        }
    }

    fn run_hooks(&self, repository: &Repository) -> Result<()> {
        for hook in repository.hooks() {
            let argv = hook.argv(repository)?;
            let Some((program, args)) = argv.split_first() else {
                return Err(Error::InvalidHook {
                    command: hook.command().to_string(),
                    reason: "command is empty".into(),
                });
            };

            tracing::info!(hook = hook.command(), "running post-update hook");
            let result = self.run(self.session.command(program.as_str()).args(args))?;
            if !result.success() {
                return Err(Error::HookFailed {
                    command: result.command.clone(),
                    code: result.code,
                    output: result.format_output(),
                });
            }
        }
        Ok(())
    }

    fn secure(&self, repository: &Repository) -> Result<()> {
        let git_dir = repository.git_dir();
        let invocation = self
            .session
            .command("chmod")
            .args(["-R", "og-rx"])
            .arg(git_dir.to_string_lossy());
        let result = self.run(invocation)?;
        if result.success() {
            Ok(())
        } else {
            Err(Error::SecureFailed {
                command: result.command.clone(),
                output: result.format_output(),
            })
        }
    }

    /// Git invocation pinned to the repository's work tree and git dir.
    fn work_tree_git(&self, repository: &Repository) -> Invocation {
        self.session
            .git()
            .arg(format!("--work-tree={}", repository.location_text()))
            .arg(format!("--git-dir={}", repository.git_dir().display()))
    }

    /// Run `invocation`. A program that can't be started yields a result
    /// with [`COMMAND_NOT_FOUND`] so each step reports it as its own failure.
    fn run(&self, invocation: Invocation) -> Result<CommandResult> {
        let result = match self.runner.run(&invocation) {
            Ok(result) => result,
            Err(e @ ExecError::Spawn { .. }) => {
                tracing::debug!(error = %e, "command could not be started");
                CommandResult::new(
                    invocation.command_line(),
                    COMMAND_NOT_FOUND,
                    e.to_string(),
                    "",
                )
            }
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(
            command = %result.command,
            code = result.code,
            "command finished"
        );
        Ok(result)
    }
}

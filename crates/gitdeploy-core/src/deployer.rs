//! Deployment entry point: session lifecycle around the sync engine.

use std::sync::{Mutex, PoisonError};

use gitdeploy_exec::{CommandRunner, ProcessRunner};

use crate::config::Config;
use crate::engine::SyncEngine;
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::repository::Repository;
use crate::session::Session;
use crate::traits::Deploy;

/// Owns the configuration and runs deployments one session at a time.
///
/// Sessions are serialized by an internal lock, so a webhook and a manual
/// trigger arriving together deploy one after the other.
#[derive(Debug)]
pub struct Deployer<R = ProcessRunner> {
    config: Config,
    runner: R,
    lock: Mutex<()>,
}

impl Deployer<ProcessRunner> {
    /// Deployer that spawns real processes.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_runner(config, ProcessRunner::new())
    }
}

impl<R: CommandRunner> Deployer<R> {
    /// Deployer that runs commands through `runner`.
    #[must_use]
    pub fn with_runner(config: Config, runner: R) -> Self {
        Self {
            config,
            runner,
            lock: Mutex::new(()),
        }
    }

    /// The configuration this deployer was built from.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The command runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Deploy one repository inside a fresh session.
    ///
    /// Credential files are removed before this returns, whatever the
    /// outcome.
    ///
    /// # Errors
    /// Returns error if the session can't be provisioned or any update step
    /// fails.
    pub fn deploy(&self, repository: &Repository) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let session = Session::initialize(self.config.credentials())?;
        SyncEngine::new(&self.runner, &session).execute(repository)
    }

    /// Deploy several repositories, in order, inside one session.
    ///
    /// A failed repository is recorded and the batch moves on, unless
    /// `fail_fast` is set.
    ///
    /// # Errors
    /// Returns error only if the session can't be provisioned; per-repository
    /// failures are in the report.
    pub fn deploy_all(
        &self,
        repositories: &[&Repository],
        fail_fast: bool,
    ) -> Result<BatchReport> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let session = Session::initialize(self.config.credentials())?;
        let engine = SyncEngine::new(&self.runner, &session);

        let mut report = BatchReport::default();
        for repository in repositories {
            match engine.execute(repository) {
                Ok(()) => report.succeeded.push(repository.id().to_string()),
                Err(e) => {
                    report.failed.push((repository.id().to_string(), e));
                    if fail_fast {
                        tracing::warn!("stopping batch after first failure");
                        break;
                    }
                }
            }
        }
        Ok(report)
    }
}

impl<R: CommandRunner + Send + Sync> Deploy for Deployer<R> {
    fn registry(&self) -> &Registry {
        self.config.registry()
    }

    fn compare_web_access_key(&self, provided: &str) -> bool {
        self.config.compare_web_access_key(provided)
    }

    fn deploy(&self, repository: &Repository) -> Result<()> {
        Self::deploy(self, repository)
    }
}

/// Per-repository results of [`Deployer::deploy_all`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Ids deployed successfully, in order.
    pub succeeded: Vec<String>,
    /// Ids that failed, with their errors, in order.
    pub failed: Vec<(String, Error)>,
}

impl BatchReport {
    /// Whether every attempted repository succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

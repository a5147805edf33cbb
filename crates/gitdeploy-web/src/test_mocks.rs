//! Mock deployer for request handling tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use gitdeploy_core::{Deploy, Error, Registry, Repository, Result};

/// Records deployments instead of running them.
pub struct MockDeployer {
    registry: Registry,
    key: &'static str,
    deployed: Mutex<Vec<String>>,
    fail: bool,
}

impl MockDeployer {
    pub fn new() -> Self {
        let mut registry = Registry::new();
        let site = Repository::new(
            "team/site",
            "site",
            "main",
            "/srv/site",
            "git@example.com:team/site.git",
        )
        .unwrap();
        registry.add(site).unwrap();
        Self {
            registry,
            key: "s3cret",
            deployed: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn deployed(&self) -> Vec<String> {
        self.deployed.lock().unwrap().clone()
    }
}

impl Deploy for MockDeployer {
    fn registry(&self) -> &Registry {
        &self.registry
    }

    fn compare_web_access_key(&self, provided: &str) -> bool {
        provided == self.key
    }

    fn deploy(&self, repository: &Repository) -> Result<()> {
        self.deployed.lock().unwrap().push(repository.id().to_string());
        if self.fail {
            return Err(Error::PullFailed {
                command: "git pull".into(),
                output: "    The command returned 1.".into(),
            });
        }
        Ok(())
    }
}

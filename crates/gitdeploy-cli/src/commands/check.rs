//! `gitdeploy check` command - Validate configuration and environment.

use std::path::Path;

use anyhow::{Result, bail};
use colored::Colorize;
use gitdeploy_core::{Config, Repository, Session};
use gitdeploy_exec::{CommandRunner, Invocation, ProcessRunner};

use super::utils::load_config;
use crate::output;

/// Problems found so far.
#[derive(Debug, Default)]
struct Findings {
    errors: usize,
    warnings: usize,
}

impl Findings {
    fn error(&mut self, msg: &str) {
        self.errors += 1;
        output::error(msg);
    }

    fn warn(&mut self, msg: &str) {
        self.warnings += 1;
        output::warn(msg);
    }
}

/// Run the check command.
pub fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    output::success(&format!("Loaded {}", config_path.display()));

    let mut findings = Findings::default();
    check_git(&config, &mut findings);
    check_credentials(&config, &mut findings);

    output::rule();
    for repository in config.registry().all() {
        check_repository(repository, &mut findings);
    }
    output::rule();

    if findings.errors > 0 {
        bail!(
            "{} errors, {} warnings",
            findings.errors,
            findings.warnings
        );
    }
    output::success(&format!(
        "{} repositories ready ({} warnings)",
        config.registry().len(),
        findings.warnings
    ));
    Ok(())
}

fn check_git(config: &Config, findings: &mut Findings) {
    let git = config.credentials().git_binary();
    match ProcessRunner::new().run(&Invocation::new(git).arg("--version")) {
        Ok(result) if result.success() => {
            output::success(&format!("Found {}", result.stdout.trim()));
        }
        Ok(result) => findings.error(&format!("`{}` exited with {}", result.command, result.code)),
        Err(e) => findings.error(&format!("Cannot run {git}: {e}")),
    }
}

fn check_credentials(config: &Config, findings: &mut Findings) {
    let credentials = config.credentials();

    if !config.has_web_access_key() {
        findings.warn("No web-access-key configured; HTTP endpoints will reject every request");
    }
    if !credentials.has_private_key() {
        findings.warn("No private-key configured; SSH remotes will fail to authenticate");
    }
    if credentials.known_hosts().is_empty() {
        findings.warn("No known-hosts configured; SSH host verification will fail");
    }

    match Session::initialize(credentials) {
        Ok(session) => {
            output::success(&format!(
                "Credentials can be provisioned under {}",
                credentials.scratch_dir().display()
            ));
            drop(session);
        }
        Err(e) => findings.error(&e.to_string()),
    }
}

fn check_repository(repository: &Repository, findings: &mut Findings) {
    output::detail(&repository.id().bold().to_string());

    let location = repository.location();
    if !location.exists() {
        output::info(&format!("{} will be cloned on first update", location.display()));
    } else if repository.git_dir().is_dir() {
        output::success(&format!("{} is a checkout", location.display()));
    } else {
        findings.error(&format!(
            "{} exists but is not a git repository",
            location.display()
        ));
    }

    for hook in repository.hooks() {
        match hook.argv(repository) {
            Ok(argv) => output::hook(&argv.join(" ")),
            Err(e) => findings.error(&e.to_string()),
        }
    }
}

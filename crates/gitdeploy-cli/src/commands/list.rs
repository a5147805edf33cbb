//! `gitdeploy list` command - Show configured repositories.

use std::path::Path;

use anyhow::Result;
use gitdeploy_core::Repository;
use serde::Serialize;

use super::utils::load_config;
use crate::output;

/// JSON output for the list command.
#[derive(Debug, Serialize)]
struct RepositoryInfo<'a> {
    id: &'a str,
    name: &'a str,
    branch: &'a str,
    location: String,
    remote: &'a str,
    remote_name: &'a str,
    hooks: Vec<&'a str>,
}

impl<'a> From<&'a Repository> for RepositoryInfo<'a> {
    fn from(repository: &'a Repository) -> Self {
        Self {
            id: repository.id(),
            name: repository.name(),
            branch: repository.branch_name(),
            location: repository.location_text(),
            remote: repository.origin(),
            remote_name: repository.remote_repository(),
            hooks: repository.hooks().iter().map(|h| h.command()).collect(),
        }
    }
}

/// Run the list command.
pub fn run(config_path: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let repositories = config.registry().all();

    if json {
        let infos: Vec<RepositoryInfo<'_>> = repositories.iter().map(RepositoryInfo::from).collect();
        output::essential(&serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    if repositories.is_empty() {
        output::info("No repositories configured.");
        return Ok(());
    }

    for repository in repositories {
        output::essential(&output::repository_line(repository));
        for hook in repository.hooks() {
            output::hook(hook.command());
        }
    }
    Ok(())
}

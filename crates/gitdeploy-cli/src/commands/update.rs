//! `gitdeploy update` command - Deploy repositories from the command line.

use std::path::Path;

use anyhow::{Result, bail};
use gitdeploy_core::{BatchReport, Deployer};
use serde::Serialize;

use super::utils::load_config;
use crate::output;

/// JSON report for the update command.
#[derive(Debug, Serialize)]
struct UpdateOutput {
    succeeded: Vec<String>,
    failed: Vec<FailedRepository>,
}

#[derive(Debug, Serialize)]
struct FailedRepository {
    id: String,
    error: String,
}

impl From<&BatchReport> for UpdateOutput {
    fn from(report: &BatchReport) -> Self {
        Self {
            succeeded: report.succeeded.clone(),
            failed: report
                .failed
                .iter()
                .map(|(id, e)| FailedRepository {
                    id: id.clone(),
                    error: e.to_string(),
                })
                .collect(),
        }
    }
}

/// Run the update command.
pub fn run(config_path: &Path, targets: &[String], fail_fast: bool, json: bool) -> Result<()> {
    let deployer = Deployer::new(load_config(config_path)?);
    let repositories = deployer.config().registry().resolve(targets)?;

    if repositories.is_empty() {
        output::warn("No repositories configured");
        return Ok(());
    }

    output::info(&format!("Updating {} repositories", repositories.len()));
    let report = deployer.deploy_all(&repositories, fail_fast)?;

    if json {
        output::essential(&serde_json::to_string_pretty(&UpdateOutput::from(&report))?);
    } else {
        for id in &report.succeeded {
            output::success(&format!("Updated {id}"));
        }
        for (id, e) in &report.failed {
            output::error(&format!("{id}: {e}"));
            if let Some(details) = e.output().filter(|o| !o.is_empty()) {
                output::problem_detail(details);
            }
        }
    }

    let skipped = repositories.len() - report.succeeded.len() - report.failed.len();
    if skipped > 0 {
        output::warn(&format!("Skipped {skipped} repositories after the first failure"));
    }

    if !report.is_success() {
        bail!("{} of {} repositories failed to update", report.failed.len(), repositories.len());
    }
    Ok(())
}

//! `gitdeploy serve` command - Run the HTTP front end.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use gitdeploy_core::Deployer;

use super::utils::load_config;
use crate::output;

/// Run the serve command until interrupted.
pub fn run(config_path: &Path, listen: SocketAddr) -> Result<()> {
    let config = load_config(config_path)?;
    if !config.has_web_access_key() {
        output::warn("No web-access-key configured; every request will be rejected");
    }

    tracing::info!(
        config = %config_path.display(),
        repositories = config.registry().len(),
        "starting gitdeploy server"
    );
    let deployer = Arc::new(Deployer::new(config));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime
        .block_on(gitdeploy_web::serve(deployer, listen))
        .context("HTTP server error")?;
    Ok(())
}

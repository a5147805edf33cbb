//! Shared helpers for commands.

use std::path::Path;

use anyhow::{Context, Result};
use gitdeploy_core::Config;

/// Load the configuration file, naming it in any error.
pub fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("Failed to load configuration from {}", path.display()))
}

//! Command definitions and dispatch.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

pub mod check;
pub mod completions;
pub mod list;
pub mod serve;
pub mod update;
mod utils;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG: &str = "config/config.json";

/// Default HTTP listen address.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";

/// gitdeploy - keep server working trees in sync with their git remotes.
#[derive(Debug, Parser)]
#[command(name = "gitdeploy", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(
        short,
        long,
        global = true,
        env = "GITDEPLOY_CONFIG",
        default_value = DEFAULT_CONFIG
    )]
    pub config: PathBuf,

    /// Only print errors and essential output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clone or update repositories and run their post-update hooks.
    ///
    /// Pass repository ids, or `*` to update every configured repository.
    #[command(alias = "up")]
    Update {
        /// Repository ids, or `*` for all.
        #[arg(required = true, value_name = "ID")]
        targets: Vec<String>,

        /// Stop at the first repository that fails.
        #[arg(long)]
        fail_fast: bool,

        /// Print a JSON report.
        #[arg(long)]
        json: bool,
    },

    /// List configured repositories.
    #[command(alias = "ls")]
    List {
        /// Print JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration and the local environment.
    Check,

    /// Run the webhook and manual update HTTP server.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "GITDEPLOY_LISTEN", default_value = DEFAULT_LISTEN)]
        listen: SocketAddr,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

//! Error types for gitdeploy-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gitdeploy-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The shared web access key did not match.
    #[error("invalid web access key")]
    Unauthorized,

    /// No repository registered under this id.
    #[error("repository not found: {0}")]
    RepositoryNotFound(String),

    /// A repository id was registered twice.
    #[error("duplicate repository id: {0}")]
    DuplicateRepository(String),

    /// The configuration document is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    ConfigRead {
        /// Path that was read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Credential files could not be created or written.
    #[error("unable to provision credentials: {message}")]
    Provisioning {
        /// What was being provisioned.
        message: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A hook command template cannot be turned into an argument vector.
    #[error("invalid hook command '{command}': {reason}")]
    InvalidHook { command: String, reason: String },

    /// The working tree directory exists but holds no git repository.
    #[error("unexpected state: {} exists but is not a git repository", location.display())]
    InconsistentState { location: PathBuf },

    /// `git clone` exited non-zero.
    #[error("error when cloning: {command}")]
    CloneFailed { command: String, output: String },

    /// `git clean` exited non-zero.
    #[error("error when cleaning repository: {command}")]
    CleanFailed { command: String, output: String },

    /// `git pull` exited non-zero.
    #[error("error when pulling: {command}")]
    PullFailed { command: String, output: String },

    /// A post-update hook exited non-zero.
    #[error("the post-update hook failed with code {code}: {command}")]
    HookFailed {
        command: String,
        code: i32,
        output: String,
    },

    /// Hardening the `.git` directory permissions failed.
    #[error("error when securing repository: {command}")]
    SecureFailed { command: String, output: String },

    /// A command could not be run at all.
    #[error("command error: {0}")]
    Exec(#[from] gitdeploy_exec::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Captured command output attached to this error, if any.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::CloneFailed { output, .. }
            | Self::CleanFailed { output, .. }
            | Self::PullFailed { output, .. }
            | Self::HookFailed { output, .. }
            | Self::SecureFailed { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Display text followed by the captured output block, for logs.
    #[must_use]
    pub fn report(&self) -> String {
        match self.output() {
            Some(output) if !output.is_empty() => format!("{self}\n{output}"),
            _ => self.to_string(),
        }
    }
}

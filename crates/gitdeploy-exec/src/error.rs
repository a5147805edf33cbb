//! Error types for gitdeploy-exec.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running an external program.
///
/// A non-zero exit status is not an error: it is reported through
/// [`crate::CommandResult::code`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The program could not be started.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        /// Program that was requested.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Reading the child's output or waiting on it failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

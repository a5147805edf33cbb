//! Error types for gitdeploy-web.

use std::net::SocketAddr;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The listen address could not be bound.
    #[error("failed to bind HTTP listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an IO error.
    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),

    /// A deployment task panicked or was cancelled.
    #[error("deployment task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

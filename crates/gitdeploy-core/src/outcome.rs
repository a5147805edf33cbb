//! Result contract returned to webhook and manual-update callers.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// `{ "message": ..., "code": 0 | 1 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Human-readable summary.
    pub message: String,
    /// `0` on success, `1` on any failure.
    pub code: u8,
}

impl Outcome {
    /// Success code.
    pub const SUCCESS: u8 = 0;
    /// Failure code.
    pub const FAILURE: u8 = 1;

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Self::SUCCESS,
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Self::FAILURE,
        }
    }

    /// The web access key was missing or wrong.
    #[must_use]
    pub fn invalid_key() -> Self {
        Self::failure("Invalid key")
    }

    /// The request named no repository.
    #[must_use]
    pub fn no_repository() -> Self {
        Self::failure("No repository specified!")
    }

    /// The named repository is not registered.
    #[must_use]
    pub fn repository_not_found() -> Self {
        Self::failure("Unable to find repository!")
    }

    /// The push did not touch the tracked branch.
    #[must_use]
    pub fn invalid_request() -> Self {
        Self::failure("Invalid request!")
    }

    /// The deployment completed.
    #[must_use]
    pub fn finished() -> Self {
        Self::success("Finished update!")
    }

    /// The deployment failed with `error`.
    ///
    /// Only the error summary is included; captured command output stays in
    /// the log.
    #[must_use]
    pub fn exception(error: &Error) -> Self {
        Self::failure(format!("Exception! {error}"))
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == Self::SUCCESS
    }
}

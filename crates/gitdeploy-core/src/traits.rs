//! Trait abstraction for deployment.
//!
//! This module defines the `Deploy` trait which the request front ends call
//! into, enabling dependency injection and testability.

use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::repository::Repository;

/// Trait for deploying registered repositories.
///
/// This trait abstracts the deployer, allowing for:
/// - Webhook and manual-update handlers that don't care how a deployment runs
/// - Recording mock implementations for handler tests
///
/// Implementations are shared across request handlers, so they must be
/// `Send + Sync`.
#[allow(clippy::missing_errors_doc)]
pub trait Deploy: Send + Sync {
    /// Repositories known to this deployer.
    fn registry(&self) -> &Registry;

    /// Check a caller-supplied web access key.
    fn compare_web_access_key(&self, provided: &str) -> bool;

    /// Authorize a request by its optional key.
    ///
    /// A missing key is compared as the empty string, which never matches.
    fn authorize(&self, key: Option<&str>) -> Result<()> {
        if self.compare_web_access_key(key.unwrap_or_default()) {
            Ok(())
        } else {
            Err(Error::Unauthorized)
        }
    }

    /// Run one full deployment of `repository`, credentials included.
    fn deploy(&self, repository: &Repository) -> Result<()>;
}

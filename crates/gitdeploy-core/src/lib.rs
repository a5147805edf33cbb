//! # gitdeploy-core
//!
//! Core library for gitdeploy: keeps server-side working trees in sync with
//! their remote git repositories.
//!
//! A [`Config`] describes the repositories and the SSH credentials used to
//! reach them. A [`Deployer`] opens a [`Session`] (ephemeral credential
//! files), drives the [`SyncEngine`] through clone/clean/pull/hooks/secure
//! for each repository, and always removes the credentials afterwards.

pub mod config;
pub mod deployer;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod registry;
pub mod repository;
pub mod session;
pub mod template;
mod traits;

#[cfg(test)]
mod test_mocks;

pub use config::{Config, Credentials};
pub use deployer::{BatchReport, Deployer};
pub use engine::SyncEngine;
pub use error::{Error, Result};
pub use outcome::Outcome;
pub use registry::Registry;
pub use repository::{Hook, Repository};
pub use session::Session;
pub use traits::Deploy;

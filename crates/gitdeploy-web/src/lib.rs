//! # gitdeploy-web
//!
//! HTTP front end for gitdeploy. Accepts Bitbucket push notifications and
//! manual update requests, authorizes them with the shared web access key,
//! and hands matching repositories to a [`Deploy`](gitdeploy_core::Deploy)
//! implementation.
//!
//! Responses always use the `{ "message": ..., "code": 0 | 1 }` contract
//! with HTTP status 200.

mod error;
mod process;
mod server;
mod types;

#[cfg(test)]
mod test_mocks;

pub use error::{Error, Result};
pub use process::{process_manual_update, process_webhook};
pub use server::{MANUAL_UPDATE_PATH, WEBHOOK_PATH, create_router, serve};
pub use types::{Change, KeyQuery, ManualUpdateQuery, Push, PushPayload, PushRepository, RefState};

//! # gitdeploy-exec
//!
//! Process execution layer for gitdeploy. Spawns programs from an explicit
//! argument vector (never through a shell), captures their combined output
//! and reports the exit code as data.

mod error;
mod invocation;
mod result;
mod runner;
mod traits;

pub use error::{Error, Result};
pub use invocation::Invocation;
pub use result::{CommandResult, indent};
pub use runner::ProcessRunner;
pub use traits::CommandRunner;

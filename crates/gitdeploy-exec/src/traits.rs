//! Trait abstraction for process execution.
//!
//! This module defines the `CommandRunner` trait which abstracts spawning
//! external programs, enabling dependency injection and testability.

use crate::{CommandResult, Invocation, Result};

/// Trait for running external programs.
///
/// This trait abstracts process execution, allowing for:
/// - Dependency injection in the synchronization engine
/// - Recording mock implementations for testing
/// - Alternative implementations (e.g., dry-run mode)
///
/// Implementations must not treat a non-zero exit code as an error.
#[allow(clippy::missing_errors_doc)]
pub trait CommandRunner {
    /// Run the invocation to completion and capture its output.
    fn run(&self, invocation: &Invocation) -> Result<CommandResult>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, invocation: &Invocation) -> Result<CommandResult> {
        (**self).run(invocation)
    }
}

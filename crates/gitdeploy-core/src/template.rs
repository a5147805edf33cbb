//! Hook command templates.
//!
//! Three placeholders are recognized: `[[location]]`, `[[name]]` and
//! `[[branch]]`. Substitution is a single left-to-right pass, so a value that
//! itself contains a placeholder is never expanded again. Anything else in
//! double brackets is left alone.

use crate::error::{Error, Result};
use crate::repository::Repository;

/// Placeholder for the working tree path (with trailing separator).
pub const LOCATION: &str = "[[location]]";
/// Placeholder for the repository display name.
pub const NAME: &str = "[[name]]";
/// Placeholder for the tracked branch.
pub const BRANCH: &str = "[[branch]]";

/// Substitute the repository's fields into `command`.
#[must_use]
pub fn render(command: &str, repository: &Repository) -> String {
    let location = repository.location_text();
    let substitutions = [
        (LOCATION, location.as_str()),
        (NAME, repository.name()),
        (BRANCH, repository.branch_name()),
    ];

    let mut out = String::with_capacity(command.len());
    let mut rest = command;
    while let Some(start) = rest.find("[[") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match substitutions.iter().find(|(p, _)| tail.starts_with(p)) {
            Some((placeholder, value)) => {
                out.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                out.push('[');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Split `command` into words, then substitute inside each word.
///
/// Splitting happens before substitution, so a name or branch containing
/// spaces or quotes stays inside one argument.
///
/// # Errors
/// Returns [`Error::InvalidHook`] for unbalanced quoting or an empty command.
pub fn render_argv(command: &str, repository: &Repository) -> Result<Vec<String>> {
    let words = shell_words::split(command).map_err(|e| Error::InvalidHook {
        command: command.to_string(),
        reason: e.to_string(),
    })?;

    if words.is_empty() {
        return Err(Error::InvalidHook {
            command: command.to_string(),
            reason: "command is empty".into(),
        });
    }

    Ok(words.iter().map(|w| render(w, repository)).collect())
}

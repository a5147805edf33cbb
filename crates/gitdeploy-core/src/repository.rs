//! Deployed repositories and their post-update hooks.

use std::fmt;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use crate::error::{Error, Result};
use crate::template;

/// Default git remote name.
pub const DEFAULT_REMOTE: &str = "origin";

/// A repository tracked by the deployer.
///
/// Built once from configuration and never mutated afterwards. The working
/// tree `location` always ends with exactly one path separator, so hook
/// templates like `[[location]]dist` expand to a path inside the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    id: String,
    name: String,
    branch_name: String,
    location: PathBuf,
    origin: String,
    remote_repository: String,
    hooks: Vec<Hook>,
}

impl Repository {
    /// Create a repository descriptor.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the id is blank or the location is empty
    /// or relative.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        branch_name: impl Into<String>,
        location: impl AsRef<Path>,
        origin: impl Into<String>,
    ) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::Config("repository id cannot be empty".into()));
        }

        let location = normalize_location(location.as_ref())
            .map_err(|reason| Error::Config(format!("repository '{id}': {reason}")))?;

        Ok(Self {
            id,
            name: name.into(),
            branch_name: branch_name.into(),
            location,
            origin: origin.into(),
            remote_repository: DEFAULT_REMOTE.into(),
            hooks: Vec::new(),
        })
    }

    /// Use a remote name other than `origin`.
    #[must_use]
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote_repository = remote.into();
        self
    }

    /// Append a post-update hook.
    #[must_use]
    pub fn with_hook(mut self, hook: Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Registry key.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Branch this deployment tracks.
    #[must_use]
    pub fn branch_name(&self) -> &str {
        &self.branch_name
    }

    /// Working tree path, with a trailing separator.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Remote URL used for the initial clone.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Git remote name.
    #[must_use]
    pub fn remote_repository(&self) -> &str {
        &self.remote_repository
    }

    /// Post-update hooks, in declared order.
    #[must_use]
    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    /// Path of the `.git` directory inside the working tree.
    #[must_use]
    pub fn git_dir(&self) -> PathBuf {
        self.location.join(".git")
    }

    /// Working tree path as text.
    #[must_use]
    pub fn location_text(&self) -> String {
        self.location.to_string_lossy().into_owned()
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} / {} {}] <--> [{}]",
            self.name,
            self.remote_repository,
            self.branch_name,
            self.location.display()
        )
    }
}

/// Strip repeated trailing separators and append exactly one.
fn normalize_location(raw: &Path) -> std::result::Result<PathBuf, String> {
    let text = raw.to_string_lossy();
    if text.trim().is_empty() {
        return Err("location cannot be empty".into());
    }
    if !raw.is_absolute() {
        return Err(format!("location must be an absolute path: {text}"));
    }

    let trimmed = text.trim_end_matches(MAIN_SEPARATOR);
    if trimmed.is_empty() {
        return Ok(PathBuf::from(MAIN_SEPARATOR.to_string()));
    }

    let mut location = String::with_capacity(trimmed.len() + 1);
    location.push_str(trimmed);
    location.push(MAIN_SEPARATOR);
    Ok(PathBuf::from(location))
}

/// A post-update command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    command: String,
}

impl Hook {
    /// Create a hook from its command template.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// The raw template.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The template with placeholders substituted, as text.
    #[must_use]
    pub fn render(&self, repository: &Repository) -> String {
        template::render(&self.command, repository)
    }

    /// The argument vector to execute for `repository`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidHook`] if the template cannot be split.
    pub fn argv(&self, repository: &Repository) -> Result<Vec<String>> {
        template::render_argv(&self.command, repository)
    }
}

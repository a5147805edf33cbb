//! Configuration loading.
//!
//! The deployer reads one JSON document describing every repository and the
//! credentials used to reach their remotes. The document is parsed into an
//! immutable [`Config`] that is handed to the deployer at construction.

use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::repository::{Hook, Repository};

/// Default git executable.
pub const DEFAULT_GIT_BINARY: &str = "git";

/// Directory name used under the system temp dir when no scratch dir is set.
const DEFAULT_SCRATCH_DIR: &str = "gitdeploy";

/// Immutable deployer configuration.
#[derive(Debug)]
pub struct Config {
    registry: Registry,
    credentials: Credentials,
    web_access_key: Option<SecretString>,
}

impl Config {
    /// Assemble a configuration from parts.
    #[must_use]
    pub const fn new(
        registry: Registry,
        credentials: Credentials,
        web_access_key: Option<SecretString>,
    ) -> Self {
        Self {
            registry,
            credentials,
            web_access_key,
        }
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    /// Returns error if the file can't be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse configuration from JSON text.
    ///
    /// # Errors
    /// Returns [`Error::Json`] for malformed JSON and [`Error::Config`] or
    /// [`Error::DuplicateRepository`] for invalid content.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(content)?;
        raw.into_config()
    }

    /// Registered repositories.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Credential material for git sessions.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Whether a web access key is configured.
    #[must_use]
    pub const fn has_web_access_key(&self) -> bool {
        self.web_access_key.is_some()
    }

    /// Check a caller-supplied key against the configured secret.
    ///
    /// Only an exact match passes. Without a configured key nothing passes.
    /// Every byte is compared regardless of where the first mismatch is.
    #[must_use]
    pub fn compare_web_access_key(&self, provided: &str) -> bool {
        let Some(expected) = &self.web_access_key else {
            return false;
        };
        let expected = expected.expose_secret().as_bytes();
        let provided = provided.as_bytes();

        if expected.len() != provided.len() {
            return false;
        }
        expected
            .iter()
            .zip(provided)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

/// Credential material and process settings for git sessions.
#[derive(Debug)]
pub struct Credentials {
    private_key: SecretString,
    known_hosts: Vec<String>,
    home: Option<PathBuf>,
    scratch_dir: PathBuf,
    git_binary: String,
    ssh_wrapper: Option<PathBuf>,
}

impl Credentials {
    /// Credentials with the given key and known hosts, default settings
    /// otherwise.
    #[must_use]
    pub fn new(private_key: SecretString, known_hosts: Vec<String>) -> Self {
        Self {
            private_key,
            known_hosts,
            home: None,
            scratch_dir: default_scratch_dir(),
            git_binary: DEFAULT_GIT_BINARY.into(),
            ssh_wrapper: None,
        }
    }

    /// Override `HOME` for every command.
    #[must_use]
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Root under which per-session directories are created.
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Git executable to run.
    #[must_use]
    pub fn with_git_binary(mut self, git: impl Into<String>) -> Self {
        self.git_binary = git.into();
        self
    }

    /// Use an existing ssh wrapper script instead of the built-in one.
    #[must_use]
    pub fn with_ssh_wrapper(mut self, wrapper: impl Into<PathBuf>) -> Self {
        self.ssh_wrapper = Some(wrapper.into());
        self
    }

    /// Private key material.
    #[must_use]
    pub const fn private_key(&self) -> &SecretString {
        &self.private_key
    }

    /// Whether any private key material is configured.
    #[must_use]
    pub fn has_private_key(&self) -> bool {
        !self.private_key.expose_secret().trim().is_empty()
    }

    /// Known-hosts lines.
    #[must_use]
    pub fn known_hosts(&self) -> &[String] {
        &self.known_hosts
    }

    /// `HOME` override.
    #[must_use]
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Scratch root.
    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Git executable.
    #[must_use]
    pub fn git_binary(&self) -> &str {
        &self.git_binary
    }

    /// Configured ssh wrapper, if any.
    #[must_use]
    pub fn ssh_wrapper(&self) -> Option<&Path> {
        self.ssh_wrapper.as_deref()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(SecretString::from(String::new()), Vec::new())
    }
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_SCRATCH_DIR)
}

// === On-disk format ===

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawConfig {
    #[serde(default)]
    repos: Vec<RawRepository>,
    home: Option<PathBuf>,
    web_access_key: Option<String>,
    #[serde(default)]
    known_hosts: Vec<String>,
    private_key: Option<KeyMaterial>,
    scratch_dir: Option<PathBuf>,
    git_binary: Option<String>,
    ssh_wrapper: Option<PathBuf>,
}

/// Private key given as one string or as a list of lines.
#[derive(Deserialize)]
#[serde(untagged)]
enum KeyMaterial {
    Text(String),
    Lines(Vec<String>),
}

impl KeyMaterial {
    fn into_secret(self) -> SecretString {
        match self {
            Self::Text(text) => SecretString::from(text),
            Self::Lines(lines) => SecretString::from(lines.join("\n")),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawRepository {
    name: String,
    id: String,
    branch: String,
    location: PathBuf,
    remote: String,
    remote_name: Option<String>,
    #[serde(default)]
    hooks: RawHooks,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
struct RawHooks {
    #[serde(default)]
    post_update: Vec<String>,
}

impl RawConfig {
    fn into_config(self) -> Result<Config> {
        let mut registry = Registry::new();
        for raw in self.repos {
            let mut repository =
                Repository::new(raw.id, raw.name, raw.branch, raw.location, raw.remote)?;
            if let Some(remote) = raw.remote_name {
                repository = repository.with_remote(remote);
            }
            for command in raw.hooks.post_update {
                repository = repository.with_hook(Hook::new(command));
            }
            registry.add(repository)?;
        }

        let private_key = self
            .private_key
            .map_or_else(|| SecretString::from(String::new()), KeyMaterial::into_secret);

        let mut credentials = Credentials::new(private_key, self.known_hosts);
        if let Some(home) = self.home {
            credentials = credentials.with_home(home);
        }
        if let Some(dir) = self.scratch_dir {
            credentials = credentials.with_scratch_dir(dir);
        }
        if let Some(git) = self.git_binary {
            if git.trim().is_empty() {
                return Err(Error::Config("git-binary cannot be empty".into()));
            }
            credentials = credentials.with_git_binary(git);
        }
        if let Some(wrapper) = self.ssh_wrapper {
            credentials = credentials.with_ssh_wrapper(wrapper);
        }

        let web_access_key = self
            .web_access_key
            .filter(|key| !key.is_empty())
            .map(SecretString::from);

        Ok(Config::new(registry, credentials, web_access_key))
    }
}

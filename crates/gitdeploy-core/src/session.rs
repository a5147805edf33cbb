//! Deployment sessions and their ephemeral SSH credentials.
//!
//! A [`Session`] owns a randomly named directory under the scratch root that
//! holds the private key, the known-hosts file and (unless one is
//! configured) the ssh wrapper script. Git receives these paths only through
//! environment variables, never on the command line. The files are removed
//! by [`Session::clean_up`], which also runs when the session is dropped, so
//! every exit path of a deployment releases them.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use gitdeploy_exec::Invocation;
use secrecy::ExposeSecret;
use tempfile::TempDir;

use crate::config::Credentials;
use crate::error::{Error, Result};

/// Environment variable git uses to find its ssh program.
pub const ENV_GIT_SSH: &str = "GIT_SSH";
/// Environment variable carrying the private key path to the wrapper.
pub const ENV_PRIVATE_KEY: &str = "TEMP_FILE_PRIVATE_KEY";
/// Environment variable carrying the known-hosts path to the wrapper.
pub const ENV_KNOWN_HOSTS: &str = "TEMP_FILE_KNOWN_HOSTS";
/// Home directory override.
pub const ENV_HOME: &str = "HOME";

/// Built-in ssh wrapper written into each session directory.
pub const SSH_WRAPPER_SCRIPT: &str = r#"#!/bin/sh
exec ssh \
    -i "$TEMP_FILE_PRIVATE_KEY" \
    -o IdentitiesOnly=yes \
    -o UserKnownHostsFile="$TEMP_FILE_KNOWN_HOSTS" \
    -o StrictHostKeyChecking=yes \
    -o BatchMode=yes \
    "$@"
"#;

const SESSION_PREFIX: &str = "gitdeploy-session-";
const PRIVATE_KEY_PREFIX: &str = "gitdeploy-pkey-";
const KNOWN_HOSTS_PREFIX: &str = "gitdeploy-known-hosts-";
const WRAPPER_PREFIX: &str = "gitdeploy-ssh-";

/// Credential files and process settings for one deployment window.
#[derive(Debug)]
pub struct Session {
    dir: TempDir,
    private_key: PathBuf,
    known_hosts: PathBuf,
    ssh_wrapper: PathBuf,
    home: Option<PathBuf>,
    git_binary: String,
}

impl Session {
    /// Provision credential files for a new session.
    ///
    /// # Errors
    /// Returns [`Error::Provisioning`] if the scratch root, the session
    /// directory or any credential file cannot be created or written.
    pub fn initialize(credentials: &Credentials) -> Result<Self> {
        let root = credentials.scratch_dir();
        ensure_private_dir(root).map_err(|source| Error::Provisioning {
            message: format!("unable to create scratch directory {}", root.display()),
            source,
        })?;

        let dir = tempfile::Builder::new()
            .prefix(SESSION_PREFIX)
            .tempdir_in(root)
            .map_err(|source| Error::Provisioning {
                message: "unable to create session directory".into(),
                source,
            })?;
        restrict(dir.path(), 0o700).map_err(|source| Error::Provisioning {
            message: "unable to restrict session directory".into(),
            source,
        })?;

        let mut key = credentials.private_key().expose_secret().to_string();
        if !key.is_empty() && !key.ends_with('\n') {
            key.push('\n');
        }
        let private_key = write_file(dir.path(), PRIVATE_KEY_PREFIX, key.as_bytes(), 0o600)
            .map_err(|source| Error::Provisioning {
                message: "unable to create temp file for private key".into(),
                source,
            })?;

        let mut hosts = credentials.known_hosts().join("\n");
        if !hosts.is_empty() {
            hosts.push('\n');
        }
        let known_hosts = write_file(dir.path(), KNOWN_HOSTS_PREFIX, hosts.as_bytes(), 0o600)
            .map_err(|source| Error::Provisioning {
                message: "unable to create temp file for known hosts".into(),
                source,
            })?;

        let ssh_wrapper = match credentials.ssh_wrapper() {
            Some(path) => path.to_path_buf(),
            None => write_file(
                dir.path(),
                WRAPPER_PREFIX,
                SSH_WRAPPER_SCRIPT.as_bytes(),
                0o700,
            )
            .map_err(|source| Error::Provisioning {
                message: "unable to create ssh wrapper".into(),
                source,
            })?,
        };

        tracing::debug!(dir = %dir.path().display(), "session initialized");

        Ok(Self {
            dir,
            private_key,
            known_hosts,
            ssh_wrapper,
            home: credentials.home().map(Path::to_path_buf),
            git_binary: credentials.git_binary().to_string(),
        })
    }

    /// Session directory holding the credential files.
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.dir.path()
    }

    /// Private key file.
    #[must_use]
    pub fn private_key_path(&self) -> &Path {
        &self.private_key
    }

    /// Known-hosts file.
    #[must_use]
    pub fn known_hosts_path(&self) -> &Path {
        &self.known_hosts
    }

    /// Program git runs as `GIT_SSH`.
    #[must_use]
    pub fn ssh_wrapper_path(&self) -> &Path {
        &self.ssh_wrapper
    }

    /// Git executable for this session.
    #[must_use]
    pub fn git_binary(&self) -> &str {
        &self.git_binary
    }

    /// Environment overrides applied to every command in the session.
    #[must_use]
    pub fn env(&self) -> Vec<(String, String)> {
        let mut env = vec![
            (ENV_GIT_SSH.to_string(), path_text(&self.ssh_wrapper)),
            (ENV_PRIVATE_KEY.to_string(), path_text(&self.private_key)),
            (ENV_KNOWN_HOSTS.to_string(), path_text(&self.known_hosts)),
        ];
        if let Some(home) = &self.home {
            env.push((ENV_HOME.to_string(), path_text(home)));
        }
        env
    }

    /// Start an invocation of `program` carrying the session environment.
    #[must_use]
    pub fn command(&self, program: impl Into<String>) -> Invocation {
        Invocation::new(program).envs(self.env())
    }

    /// Start a git invocation carrying the session environment.
    #[must_use]
    pub fn git(&self) -> Invocation {
        self.command(self.git_binary.as_str())
    }

    /// Remove every regular file in the session directory.
    ///
    /// Safe to call repeatedly; files already gone are not an error.
    ///
    /// # Errors
    /// Returns error if the directory can't be listed or a file can't be
    /// removed.
    pub fn clean_up(&self) -> Result<()> {
        let entries = match fs::read_dir(self.dir.path()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.clean_up() {
            tracing::warn!(dir = %self.dir.path().display(), error = %e, "failed to clean up session");
        }
    }
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Create `dir` (and parents) if missing, owner-only.
fn ensure_private_dir(dir: &Path) -> std::io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

/// Write a uniquely named file in `dir` and keep it on disk.
fn write_file(dir: &Path, prefix: &str, contents: &[u8], mode: u32) -> std::io::Result<PathBuf> {
    let mut file = tempfile::Builder::new().prefix(prefix).tempfile_in(dir)?;
    file.write_all(contents)?;
    file.flush()?;
    let path = file.into_temp_path().keep().map_err(|e| e.error)?;
    restrict(&path, mode)?;
    Ok(path)
}

#[cfg(unix)]
fn restrict(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn restrict(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

//! In-memory repository registry.

use crate::error::{Error, Result};
use crate::repository::Repository;

/// Target that selects every registered repository.
pub const WILDCARD: &str = "*";

/// Repositories keyed by id, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    repositories: Vec<Repository>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            repositories: Vec::new(),
        }
    }

    /// Register a repository.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateRepository`] if the id is already taken.
    pub fn add(&mut self, repository: Repository) -> Result<()> {
        if self.get(repository.id()).is_some() {
            return Err(Error::DuplicateRepository(repository.id().to_string()));
        }
        self.repositories.push(repository);
        Ok(())
    }

    /// Look up a repository by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Repository> {
        self.repositories.iter().find(|r| r.id() == id)
    }

    /// All repositories, in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Repository] {
        &self.repositories
    }

    /// Number of registered repositories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    /// Whether no repositories are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Resolve operator targets to repositories.
    ///
    /// A single `*` selects everything. Otherwise every id must exist; ids
    /// requested twice are returned once, in first-seen order.
    ///
    /// # Errors
    /// Returns [`Error::RepositoryNotFound`] for the first unknown id.
    pub fn resolve<S: AsRef<str>>(&self, targets: &[S]) -> Result<Vec<&Repository>> {
        if matches!(targets, [only] if only.as_ref() == WILDCARD) {
            return Ok(self.repositories.iter().collect());
        }

        let mut selected: Vec<&Repository> = Vec::with_capacity(targets.len());
        for target in targets {
            let id = target.as_ref();
            let repository = self
                .get(id)
                .ok_or_else(|| Error::RepositoryNotFound(id.to_string()))?;
            if !selected.iter().any(|r| r.id() == id) {
                selected.push(repository);
            }
        }
        Ok(selected)
    }
}

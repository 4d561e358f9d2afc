//! Local git repository access.
//!
//! Remotes are discovered with git2; the fetches themselves run through the
//! `git` executable so that the user's own credential helpers and SSH agent
//! apply.

mod fetch;

pub use fetch::{RemoteFetchWarning, RemoteFetcher, fetch_command};

use crate::error::Result;
use git2::Repository;
use std::path::Path;

/// Read-only handle on a local repository.
pub struct GitOps {
    repo: Repository,
}

impl GitOps {
    /// Open an existing repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::open(path.as_ref())?;
        Ok(Self { repo })
    }

    /// List all remotes, by name.
    pub fn list_remotes(&self) -> Result<Vec<String>> {
        let remotes = self.repo.remotes()?;
        Ok(remotes.iter().filter_map(|r| r.map(String::from)).collect())
    }
}

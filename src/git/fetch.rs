//! Concurrent fetching of every configured remote.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::command::{CommandRunner, CommandSpec};
use crate::error::Result;
use crate::git::GitOps;

/// A remote that could not be fetched. Recorded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFetchWarning {
    pub remote: String,
    pub cause: String,
}

impl fmt::Display for RemoteFetchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch of remote '{}' failed: {}", self.remote, self.cause)
    }
}

/// Build the fetch command for one remote: full depth, all tags, submodules
/// included.
///
/// Fetches of sibling remotes run at the same time in one `.git` directory,
/// so none of them writes `FETCH_HEAD`. With `force`, local refs are
/// overwritten even when the update is not a fast-forward.
pub fn fetch_command(repo_path: &Path, remote: &str, force: bool) -> CommandSpec {
    let mut spec = CommandSpec::new("git")
        .args([
            "fetch",
            remote,
            "--tags",
            "--prune",
            "--recurse-submodules",
            "--no-write-fetch-head",
        ])
        .current_dir(repo_path)
        .env("GIT_TERMINAL_PROMPT", "0");
    if force {
        spec = spec.arg("--force");
    }
    spec
}

/// Fetches all remotes of a local repository in parallel.
#[derive(Clone)]
pub struct RemoteFetcher {
    runner: Arc<dyn CommandRunner>,
}

impl RemoteFetcher {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Fetch every remote configured in the repository at `repo_path`.
    ///
    /// Failing to open the repository or to list its remotes is an error.
    /// Individual fetch failures are returned as warnings. Returns only once
    /// every fetch has finished.
    pub async fn fetch_all(&self, repo_path: &Path, force: bool) -> Result<Vec<RemoteFetchWarning>> {
        let remotes = GitOps::open(repo_path)?.list_remotes()?;
        if remotes.is_empty() {
            tracing::debug!(path = %repo_path.display(), "No remotes configured");
            return Ok(Vec::new());
        }

        let mut tasks = JoinSet::new();
        for remote in remotes {
            let runner = Arc::clone(&self.runner);
            let spec = fetch_command(repo_path, &remote, force);
            let path = repo_path.display().to_string();
            tasks.spawn(async move {
                tracing::debug!(remote = %remote, path = %path, "Fetching remote");
                let result = runner.run(&spec).await;
                (remote, result)
            });
        }

        let mut warnings = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let warning = match joined {
                Ok((_, Ok(_))) => continue,
                Ok((remote, Err(e))) => RemoteFetchWarning {
                    remote,
                    cause: e.to_string(),
                },
                Err(join_error) => RemoteFetchWarning {
                    remote: "<unknown>".into(),
                    cause: format!("fetch task panicked: {}", join_error),
                },
            };
            tracing::warn!(
                path = %repo_path.display(),
                remote = %warning.remote,
                cause = %warning.cause,
                "Remote fetch failed"
            );
            warnings.push(warning);
        }

        warnings.sort_by(|a, b| a.remote.cmp(&b.remote));
        Ok(warnings)
    }
}

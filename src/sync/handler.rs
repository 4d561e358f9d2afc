//! Per-repository clone-or-update decision.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use crate::command::CommandRunner;
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::git::{RemoteFetchWarning, RemoteFetcher};
use crate::github::RepositoryDescriptor;
use crate::sync::urls::{clone_command, clone_url, repository_path, update_command};
use crate::sync::{SyncAction, SyncOutcome};

/// Local state of a repository's target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocalState {
    Absent,
    Directory,
}

/// Decides, for one repository, whether to clone, update or skip, and does it.
pub struct RepositoryHandler {
    config: Arc<SyncConfig>,
    runner: Arc<dyn CommandRunner>,
    fetcher: RemoteFetcher,
}

impl RepositoryHandler {
    pub fn new(config: Arc<SyncConfig>, runner: Arc<dyn CommandRunner>) -> Self {
        let fetcher = RemoteFetcher::new(Arc::clone(&runner));
        Self {
            config,
            runner,
            fetcher,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Synchronize one repository. Errors are scoped to the repository name.
    pub async fn handle(&self, repo: RepositoryDescriptor) -> SyncOutcome {
        let path = match repository_path(&self.config.output, &repo.name) {
            Ok(path) => path,
            Err(e) => {
                return SyncOutcome {
                    organization: self.config.organization.clone(),
                    path: self.config.output.join(&repo.name),
                    result: Err(SyncError::for_repo(&repo.name, e)),
                    name: repo.name,
                    warnings: Vec::new(),
                };
            }
        };

        let mut warnings = Vec::new();
        let result = self
            .sync(&repo, &path, &mut warnings)
            .await
            .map_err(|e| SyncError::for_repo(&repo.name, e));

        SyncOutcome {
            organization: self.config.organization.clone(),
            name: repo.name,
            path,
            result,
            warnings,
        }
    }

    async fn sync(
        &self,
        repo: &RepositoryDescriptor,
        path: &Path,
        warnings: &mut Vec<RemoteFetchWarning>,
    ) -> Result<SyncAction> {
        let state = local_state(path).await?;
        let config = &self.config;

        match (state, config.dry_run) {
            (LocalState::Absent, true) => Ok(SyncAction::PlannedClone),
            (LocalState::Directory, true) => Ok(SyncAction::PlannedUpdate),
            (LocalState::Absent, false) => {
                tracing::debug!(repo = %repo.name, path = %path.display(), "Cloning, local folder not found");
                let url = clone_url(config.protocol, &config.host, &config.organization, &repo.name);
                self.runner
                    .run(&clone_command(&url, path, &config.host))
                    .await?;
                Ok(SyncAction::Cloned)
            }
            (LocalState::Directory, false) => {
                tracing::debug!(repo = %repo.name, path = %path.display(), "Updating local clone");
                warnings.extend(self.fetcher.fetch_all(path, config.force).await?);

                if repo.is_empty {
                    tracing::warn!(
                        repo = %repo.name,
                        path = %path.display(),
                        "Skipped syncing empty repository; only remotes have been fetched"
                    );
                    return Ok(SyncAction::SkippedEmpty);
                }

                let spec = update_command(
                    &config.organization,
                    &repo.name,
                    path,
                    &config.host,
                    config.force,
                );
                self.runner.run(&spec).await?;
                Ok(SyncAction::Updated)
            }
        }
    }
}

/// Inspect `path`. Anything other than "not found" is reported as an error.
async fn local_state(path: &Path) -> Result<LocalState> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(LocalState::Directory),
        Ok(_) => Err(SyncError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(LocalState::Absent),
        Err(e) => Err(e.into()),
    }
}

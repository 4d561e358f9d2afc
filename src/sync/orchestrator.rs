//! Fan-out of repository handling with a concurrency cap.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::command::{CancelFlag, CommandRunner};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::github::RepositoryDescriptor;
use crate::sync::urls::repository_path;
use crate::sync::{RepositoryHandler, RunSummary, SyncOutcome};

/// Callback invoked with each outcome as its repository finishes.
pub type ProgressCallback = dyn Fn(&SyncOutcome) + Send + Sync;

/// Runs one task per repository and gathers every outcome.
///
/// A failing repository never cancels its siblings. Cancellation is
/// cooperative: tasks that have not started yet report
/// [`SyncError::Cancelled`], and running tasks stop at their next process
/// launch.
pub struct SyncOrchestrator {
    handler: Arc<RepositoryHandler>,
    cancel: CancelFlag,
}

impl SyncOrchestrator {
    pub fn new(config: SyncConfig, runner: Arc<dyn CommandRunner>, cancel: CancelFlag) -> Self {
        Self {
            handler: Arc::new(RepositoryHandler::new(Arc::new(config), runner)),
            cancel,
        }
    }

    /// Synchronize all `repos` and return the summary, sorted by name.
    pub async fn run(
        &self,
        repos: Vec<RepositoryDescriptor>,
        on_outcome: Option<&ProgressCallback>,
    ) -> RunSummary {
        let start = Instant::now();
        let repos = dedup_by_name(repos);
        if repos.is_empty() {
            return RunSummary::from_outcomes(Vec::new(), start.elapsed());
        }

        let concurrency = self.handler.config().concurrency.clamp(1, repos.len());
        let semaphore = Arc::new(Semaphore::new(concurrency));
        tracing::debug!(repos = repos.len(), concurrency, "Starting repository tasks");

        let mut pending: HashSet<String> = repos.iter().map(|r| r.name.clone()).collect();
        let mut tasks = JoinSet::new();
        for repo in repos {
            let handler = Arc::clone(&self.handler);
            let semaphore = Arc::clone(&semaphore);
            let cancel = self.cancel.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return failed(&handler, repo, SyncError::Cancelled);
                };
                if cancel.is_cancelled() {
                    return failed(&handler, repo, SyncError::Cancelled);
                }
                handler.handle(repo).await
            });
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    pending.remove(&outcome.name);
                    report(&outcome);
                    if let Some(callback) = on_outcome {
                        callback(&outcome);
                    }
                    outcomes.push(outcome);
                }
                Err(join_error) => {
                    tracing::error!(error = %join_error, "Repository task panicked");
                }
            }
        }

        // Tasks that panicked never produced an outcome.
        for name in pending {
            let outcome = failed(
                &self.handler,
                RepositoryDescriptor::new(name, false),
                SyncError::Task("repository task panicked".into()),
            );
            if let Some(callback) = on_outcome {
                callback(&outcome);
            }
            outcomes.push(outcome);
        }

        RunSummary::from_outcomes(outcomes, start.elapsed())
    }
}

fn failed(handler: &RepositoryHandler, repo: RepositoryDescriptor, error: SyncError) -> SyncOutcome {
    let config = handler.config();
    let output = &config.output;
    SyncOutcome {
        organization: config.organization.clone(),
        path: repository_path(output, &repo.name).unwrap_or_else(|_| output.join(&repo.name)),
        result: Err(SyncError::for_repo(&repo.name, error)),
        name: repo.name,
        warnings: Vec::new(),
    }
}

fn report(outcome: &SyncOutcome) {
    match &outcome.result {
        Ok(action) => tracing::debug!(repo = %outcome.name, action = %action, "Repository handled"),
        Err(e) if e.is_cancelled() => tracing::warn!(repo = %outcome.name, "Repository skipped, run cancelled"),
        Err(e) => tracing::error!(repo = %outcome.name, error = %e, "Repository failed"),
    }
}

/// Drop repeated names so two tasks never target the same directory.
fn dedup_by_name(repos: Vec<RepositoryDescriptor>) -> Vec<RepositoryDescriptor> {
    let mut seen = HashSet::with_capacity(repos.len());
    repos
        .into_iter()
        .filter(|repo| {
            let first = seen.insert(repo.name.clone());
            if !first {
                tracing::warn!(repo = %repo.name, "Duplicate repository in listing, ignoring");
            }
            first
        })
        .collect()
}

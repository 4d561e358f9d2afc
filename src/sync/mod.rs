//! Organization-wide synchronization.
//!
//! Each repository is handled by its own task:
//!
//! | Local path      | Dry run          | Real run                                  |
//! |-----------------|------------------|-------------------------------------------|
//! | absent          | `PlannedClone`   | `gh repo clone` → `Cloned`                |
//! | not a directory | error            | error                                     |
//! | directory       | `PlannedUpdate`  | fetch remotes, then `gh repo sync` → `Updated` (or `SkippedEmpty` for empty repositories) |
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use org_repo_sync::prelude::*;
//!
//! # async fn run() -> org_repo_sync::error::Result<()> {
//! let config = SyncConfig::new("my-org").output("./mirror").dry_run();
//! let cancel = CancelFlag::new();
//! let runner = Arc::new(ProcessRunner::new(cancel.clone()));
//!
//! let client = GitHubClient::from_env(&config.host, runner.as_ref()).await?;
//! let repos = enumerate_org_repos(&client, &config.organization, &config.query, config.batch_size).await?;
//! let summary = SyncOrchestrator::new(config, runner, cancel).run(repos, None).await;
//! println!("{}", summary);
//! # Ok(())
//! # }
//! ```

mod handler;
mod orchestrator;
mod types;
pub mod urls;

pub use handler::RepositoryHandler;
pub use orchestrator::{ProgressCallback, SyncOrchestrator};
pub use types::{CloneProtocol, RunSummary, SyncAction, SyncOutcome};

//! # Org Repo Sync
//!
//! Mirror every repository of a GitHub organization into a local directory.
//!
//! Repositories missing locally are cloned, existing ones have all their
//! remotes fetched and are then synced from the organization's copy. Every
//! repository is handled by its own task; one failure never stops the
//! others.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use org_repo_sync::prelude::*;
//!
//! # async fn run() -> org_repo_sync::error::Result<()> {
//! let config = SyncConfig::new("my-org")
//!     .query("language:Rust")
//!     .protocol(CloneProtocol::Ssh)
//!     .output("./mirror")
//!     .concurrency(4);
//! config.validate()?;
//!
//! let cancel = CancelFlag::new();
//! let runner = Arc::new(ProcessRunner::new(cancel.clone()));
//!
//! let client = GitHubClient::from_env(&config.host, runner.as_ref()).await?;
//! let repos = enumerate_org_repos(&client, &config.organization, &config.query, config.batch_size).await?;
//! let summary = SyncOrchestrator::new(config, runner, cancel).run(repos, None).await;
//!
//! for failure in summary.failures() {
//!     eprintln!("{}", failure);
//! }
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod logging;
pub mod sync;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::command::{CancelFlag, CommandOutput, CommandRunner, CommandSpec, ProcessRunner};
    pub use crate::config::SyncConfig;
    pub use crate::error::{Result, SyncError};
    pub use crate::git::{GitOps, RemoteFetchWarning, RemoteFetcher};
    pub use crate::github::{
        GitHubClient, RepositoryDescriptor, SearchPage, SearchPages, SearchQuery,
        enumerate_org_repos,
    };
    pub use crate::sync::{
        CloneProtocol, RepositoryHandler, RunSummary, SyncAction, SyncOrchestrator, SyncOutcome,
    };
}

pub use prelude::*;

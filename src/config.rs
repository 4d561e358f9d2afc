//! Run configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, SyncError};
use crate::github::{DEFAULT_HOST, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::sync::CloneProtocol;

/// Default number of repositories requested per search page.
pub const DEFAULT_BATCH_SIZE: u32 = 50;
/// Default number of repositories synchronized at the same time.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Configuration for one synchronization run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Organization whose repositories are mirrored.
    pub organization: String,
    /// Extra search qualifiers, e.g. `language:Go pushed:>2024-01-01`.
    pub query: String,
    /// Repositories requested per search page, in `[1, 100]`.
    pub batch_size: u32,
    pub protocol: CloneProtocol,
    /// Directory receiving one subdirectory per repository.
    pub output: PathBuf,
    /// Report planned actions without touching the filesystem.
    pub dry_run: bool,
    /// Force-fetch remotes and hard-reset the destination branch on update.
    pub force: bool,
    /// Upper bound on repositories handled at the same time.
    pub concurrency: usize,
    /// Hard limit for each external process, if any.
    pub timeout: Option<Duration>,
    pub host: String,
}

impl SyncConfig {
    /// Creates a configuration for `organization` with default settings.
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            query: String::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            protocol: CloneProtocol::default(),
            output: PathBuf::from("."),
            dry_run: false,
            force: false,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: None,
            host: DEFAULT_HOST.into(),
        }
    }

    /// Sets the search filter.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Sets the search page size.
    pub fn batch_size(mut self, size: u32) -> Self {
        self.batch_size = size;
        self
    }

    /// Sets the clone protocol.
    pub fn protocol(mut self, protocol: CloneProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Sets the output directory.
    pub fn output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output = dir.into();
        self
    }

    /// Enables dry-run mode.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Enables forced fetch and hard-reset update.
    ///
    /// This is destructive: local commits on the destination branch that are
    /// not in the source are discarded.
    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    /// Sets the concurrency cap.
    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    /// Sets the per-process timeout.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the source-control host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Check the configuration before any network or filesystem access.
    pub fn validate(&self) -> Result<()> {
        if self.organization.trim().is_empty() {
            return Err(SyncError::Validation("missing organization".into()));
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.batch_size) {
            return Err(SyncError::Validation(format!(
                "invalid batch size ({}); must be between {} and {}",
                self.batch_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE
            )));
        }
        if self.concurrency == 0 {
            return Err(SyncError::Validation(
                "concurrency must be at least 1".into(),
            ));
        }
        if self.host.trim().is_empty() {
            return Err(SyncError::Validation("host must not be empty".into()));
        }
        Ok(())
    }
}

//! Synchronization data model.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SyncError;
use crate::git::RemoteFetchWarning;

/// How the clone URL of a repository is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CloneProtocol {
    /// `org/name`, leaving the protocol to the `gh` CLI configuration.
    #[default]
    System,
    /// `git@<host>:org/name.git`
    Ssh,
    /// `https://<host>/org/name.git`
    Https,
}

impl fmt::Display for CloneProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CloneProtocol::System => "system",
            CloneProtocol::Ssh => "ssh",
            CloneProtocol::Https => "https",
        })
    }
}

impl FromStr for CloneProtocol {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Ok(CloneProtocol::System),
            "ssh" => Ok(CloneProtocol::Ssh),
            "https" => Ok(CloneProtocol::Https),
            other => Err(SyncError::Validation(format!(
                "unknown protocol for cloning: {}",
                other
            ))),
        }
    }
}

/// What was done (or would be done) for a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Cloned into a new directory.
    Cloned,
    /// Remotes fetched and the default branch synced from the source.
    Updated,
    /// Remotes fetched; the source repository is empty, so nothing to sync.
    SkippedEmpty,
    /// Dry run: would clone.
    PlannedClone,
    /// Dry run: would update.
    PlannedUpdate,
}

impl SyncAction {
    pub fn is_planned(&self) -> bool {
        matches!(self, SyncAction::PlannedClone | SyncAction::PlannedUpdate)
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncAction::Cloned => "cloned",
            SyncAction::Updated => "updated",
            SyncAction::SkippedEmpty => "skipped (empty repository, remotes fetched)",
            SyncAction::PlannedClone => "new clone",
            SyncAction::PlannedUpdate => "update",
        })
    }
}

/// Result for a single repository.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Organization the repository belongs to.
    pub organization: String,
    pub name: String,
    /// Absolute local path of the repository.
    pub path: PathBuf,
    pub result: Result<SyncAction, SyncError>,
    /// Remotes that could not be fetched.
    pub warnings: Vec<RemoteFetchWarning>,
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn action(&self) -> Option<SyncAction> {
        self.result.as_ref().ok().copied()
    }

    pub fn error(&self) -> Option<&SyncError> {
        self.result.as_ref().err()
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(action) if action.is_planned() => {
                write!(
                    f,
                    "=> {}/{}: {} in '{}'",
                    self.organization,
                    self.name,
                    action,
                    self.path.display()
                )
            }
            Ok(action) => write!(f, "{}: {} ({})", self.name, action, self.path.display()),
            Err(e) => write!(f, "{}", e),
        }
    }
}

/// Summary of a synchronization run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Per-repository outcomes, sorted by repository name.
    pub outcomes: Vec<SyncOutcome>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Build a summary, sorting outcomes by name.
    pub fn from_outcomes(mut outcomes: Vec<SyncOutcome>, elapsed: Duration) -> Self {
        outcomes.sort_by(|a, b| a.name.cmp(&b.name));
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            outcomes,
            elapsed,
        }
    }

    /// Outcomes that ended in an error.
    pub fn failures(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Number of outcomes with the given action.
    pub fn count(&self, action: SyncAction) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.action() == Some(action))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "handled {} repositories in {:.2?}: {} succeeded, {} failed",
            self.total, self.elapsed, self.succeeded, self.failed
        )
    }
}

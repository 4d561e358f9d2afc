//! Error types for organization synchronization.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for synchronization operations.
///
/// Errors fall on either side of the per-repository boundary: `Validation`
/// and `Enumeration` stop a run before any repository is touched, while
/// everything a single repository task produces is wrapped in `Repo` so the
/// orchestrator can report it without affecting siblings.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Failed to list organization repositories: {message}")]
    Enumeration { message: String },

    #[error("{name}: {source}")]
    Repo {
        name: String,
        #[source]
        source: Box<SyncError>,
    },

    #[error("expected directory for repository: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Command `{program}` failed: {message}")]
    Command { program: String, message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Task failed: {0}")]
    Task(String),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] octocrab::Error),
}

impl SyncError {
    /// Scope an error to the repository it concerns.
    pub fn for_repo(name: impl Into<String>, cause: SyncError) -> Self {
        match cause {
            already @ SyncError::Repo { .. } => already,
            other => SyncError::Repo {
                name: name.into(),
                source: Box::new(other),
            },
        }
    }

    /// Whether this error (or the cause it wraps) is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            SyncError::Cancelled => true,
            SyncError::Repo { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

/// A specialized Result type for synchronization operations.
pub type Result<T> = std::result::Result<T, SyncError>;

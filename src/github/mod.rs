//! GitHub API integration for organization-wide repository listing.
//!
//! The search endpoint is cursor-paginated; [`enumerate_org_repos`] walks
//! every page and returns the complete, order-preserving list, or fails as a
//! whole.
//!
//! # Example
//!
//! ```rust,no_run
//! use org_repo_sync::command::ProcessRunner;
//! use org_repo_sync::github::{GitHubClient, enumerate_org_repos};
//!
//! # async fn run() -> org_repo_sync::error::Result<()> {
//! let client = GitHubClient::from_env("github.com", &ProcessRunner::default()).await?;
//!
//! // List all non-archived repos in an organization, 50 per page
//! let repos = enumerate_org_repos(&client, "my-org", "archived:false", 50).await?;
//!
//! for repo in repos {
//!     println!("{} (empty: {})", repo.name, repo.is_empty);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod query;
mod repos;

pub use client::{
    DEFAULT_HOST, GitHubClient, TOKEN_ENV_VARS, gh_token_command, resolve_token,
    resolve_token_with,
};
pub use query::SearchQuery;
pub use repos::{
    MAX_PAGE_SIZE, MIN_PAGE_SIZE, RepositoryDescriptor, SearchPage, SearchPages,
    enumerate_org_repos,
};

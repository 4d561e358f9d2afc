//! GitHub API client.

use octocrab::Octocrab;

use crate::command::{CommandRunner, CommandSpec};
use crate::error::{Result, SyncError};

/// Host used for clone URLs and the public API.
pub const DEFAULT_HOST: &str = "github.com";

/// Environment variables consulted for an API token, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

/// Client for interacting with the GitHub API.
#[derive(Clone)]
pub struct GitHubClient {
    pub(crate) octocrab: Octocrab,
}

impl GitHubClient {
    /// Create a new GitHub client with the given token.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let octocrab = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self { octocrab })
    }

    /// Create a client for GitHub Enterprise.
    ///
    /// `host` is the bare hostname (`github.example.com`); the API is expected
    /// under `https://<host>/api/`.
    pub fn with_enterprise(token: impl Into<String>, host: &str) -> Result<Self> {
        // Remove trailing slash if present
        let host = host.strip_suffix('/').unwrap_or(host);
        let octocrab = Octocrab::builder()
            .personal_token(token.into())
            .base_uri(format!("https://{}/api/", host))?
            .build()?;
        Ok(Self { octocrab })
    }

    /// Create a client for `host`, authenticated the way `gh` is.
    ///
    /// See [`resolve_token`] for where the token comes from.
    pub async fn from_env(host: &str, runner: &dyn CommandRunner) -> Result<Self> {
        let token = resolve_token(host, runner).await?;
        if host == DEFAULT_HOST {
            Self::new(token)
        } else {
            Self::with_enterprise(token, host)
        }
    }
}

/// The command printing the token `gh auth login` stored for `host`.
pub fn gh_token_command(host: &str) -> CommandSpec {
    CommandSpec::new("gh").args(["auth", "token", "--hostname", host])
}

/// Find an API token for `host`.
///
/// `GH_TOKEN` takes precedence over `GITHUB_TOKEN`. When neither is set the
/// token stored by `gh auth login` is used.
pub async fn resolve_token(host: &str, runner: &dyn CommandRunner) -> Result<String> {
    resolve_token_with(host, runner, |var| std::env::var(var).ok()).await
}

/// [`resolve_token`] with an explicit environment lookup.
pub async fn resolve_token_with(
    host: &str,
    runner: &dyn CommandRunner,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    if let Some(token) = TOKEN_ENV_VARS
        .iter()
        .find_map(|var| env(var).filter(|t| !t.is_empty()))
    {
        return Ok(token);
    }

    let missing = |detail: String| {
        SyncError::Validation(format!(
            "no API token found for {}; set one of {} or run `gh auth login` ({})",
            host,
            TOKEN_ENV_VARS.join(", "),
            detail
        ))
    };

    tracing::debug!(host, "No token in environment, asking gh");
    let output = runner
        .run(&gh_token_command(host))
        .await
        .map_err(|e| missing(e.to_string()))?;
    let token = output.stdout.trim();
    if token.is_empty() {
        return Err(missing("gh printed no token".into()));
    }
    Ok(token.to_string())
}

//! CLI for the org-repo-sync tool.

use anyhow::{Context, Result};
use clap::Parser;
use org_repo_sync::config::{DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY};
use org_repo_sync::prelude::*;
use org_repo_sync::sync::ProgressCallback;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "org-repo-sync")]
#[command(author, version, about = "Clone or update every repository of a GitHub organization", long_about = None)]
struct Cli {
    /// Organization whose repositories are mirrored
    organization: String,

    /// Display the repositories that would be cloned or updated, without doing it
    #[arg(long)]
    dry_run: bool,

    /// Search qualifiers to filter the organization repositories
    /// (e.g. "language:Go stars:>10 pushed:>2010-11-12")
    #[arg(short, long, default_value = "")]
    query: String,

    /// Number of repositories to retrieve per API call (1 to 100)
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: u32,

    /// Protocol used to clone new repositories
    #[arg(long, value_enum, default_value_t = CloneProtocol::System)]
    protocol: CloneProtocol,

    /// Directory receiving one subdirectory per repository
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Force-fetch remotes and sync existing clones.
    /// Caution: this hard-resets the destination branch to match the source repository
    #[arg(long)]
    force: bool,

    /// Maximum number of repositories handled at the same time
    #[arg(short = 'j', long, env = "ORG_REPO_SYNC_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Kill any git or gh process running longer than this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Source-control host
    #[arg(long, env = "GH_HOST", default_value = "github.com")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored log output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn config(&self) -> SyncConfig {
        let mut config = SyncConfig::new(&self.organization)
            .query(&self.query)
            .batch_size(self.batch_size)
            .protocol(self.protocol)
            .output(&self.output)
            .concurrency(self.concurrency)
            .timeout(self.timeout.map(Duration::from_secs))
            .host(&self.host);
        if self.dry_run {
            config = config.dry_run();
        }
        if self.force {
            config = config.force();
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    org_repo_sync::logging::init(cli.verbose, !cli.no_color && std::io::stderr().is_terminal());

    let config = cli.config();
    config.validate()?;

    let cancel = CancelFlag::new();
    let runner = Arc::new(ProcessRunner::new(cancel.clone()).with_timeout(config.timeout));

    let client = GitHubClient::from_env(&config.host, runner.as_ref()).await?;
    let repos = enumerate_org_repos(&client, &config.organization, &config.query, config.batch_size)
        .await
        .with_context(|| format!("Failed to list repositories of '{}'", config.organization))?;

    tracing::debug!(count = repos.len(), "Found repositories");
    if repos.is_empty() {
        println!("No repositories found for '{}'", config.organization);
        return Ok(ExitCode::SUCCESS);
    }

    setup_shutdown_handler(cancel.clone());
    let orchestrator = SyncOrchestrator::new(config, runner, cancel.clone());

    let print_outcome = |outcome: &SyncOutcome| {
        if outcome.is_success() {
            println!("{}", outcome);
        } else {
            eprintln!("{}", outcome);
        }
        for warning in &outcome.warnings {
            eprintln!("{}: {}", outcome.name, warning);
        }
    };
    let callback: &ProgressCallback = &print_outcome;
    let summary = orchestrator.run(repos, Some(callback)).await;

    println!("\n{}", summary);

    if cancel.is_cancelled() {
        return Ok(ExitCode::from(130));
    }
    if summary.has_failures() {
        eprintln!("Failed repositories:");
        for failure in summary.failures() {
            eprintln!("  {}", failure);
        }
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

/// First Ctrl+C stops launching new processes; a second one exits immediately.
fn setup_shutdown_handler(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("Failed to install Ctrl+C handler");
            return;
        }
        eprintln!("\nShutdown requested, finishing running operations...");
        eprintln!("Press Ctrl+C again to force quit.");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
}

//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use git2::Repository;
use org_repo_sync::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Matcher = Box<dyn Fn(&CommandSpec) -> bool + Send + Sync>;

/// Records every command instead of running it.
///
/// `gh repo clone` creates a git repository with an `origin` remote at the
/// target path, so later runs see the clone.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    fail_when: Option<Matcher>,
    stdout: Option<(Matcher, String)>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every command matching `predicate`.
    pub fn failing_when(mut self, predicate: impl Fn(&CommandSpec) -> bool + Send + Sync + 'static) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    /// Print `stdout` for every command matching `predicate`.
    pub fn with_stdout(
        mut self,
        predicate: impl Fn(&CommandSpec) -> bool + Send + Sync + 'static,
        stdout: impl Into<String>,
    ) -> Self {
        self.stdout = Some((Box::new(predicate), stdout.into()));
        self
    }

    /// Make every command take `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, program: &str, subcommand: &str) -> Vec<CommandSpec> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program && c.args.iter().any(|a| a == subcommand))
            .collect()
    }

    pub fn clones(&self) -> Vec<CommandSpec> {
        self.calls_matching("gh", "clone")
    }

    pub fn syncs(&self) -> Vec<CommandSpec> {
        self.calls_matching("gh", "sync")
    }

    pub fn fetches(&self) -> Vec<CommandSpec> {
        self.calls_matching("git", "fetch")
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_when.as_ref().is_some_and(|f| f(spec)) {
            return Err(SyncError::Command {
                program: spec.program.clone(),
                message: "simulated failure".into(),
            });
        }

        if spec.program == "gh" && spec.args.get(1).map(String::as_str) == Some("clone") {
            let target = PathBuf::from(&spec.args[3]);
            init_repo(&target, &["origin"]);
        }

        let stdout = match &self.stdout {
            Some((matches, out)) if matches(spec) => out.clone(),
            _ => String::new(),
        };
        Ok(CommandOutput {
            stdout,
            stderr: String::new(),
        })
    }
}

/// Serves a fixed list of repositories page by page.
pub struct ScriptedSearch {
    repos: Vec<RepositoryDescriptor>,
    fail_on_page: Option<usize>,
    requests: Mutex<Vec<(String, u32, Option<String>)>>,
}

impl ScriptedSearch {
    pub fn with_names(names: &[&str]) -> Self {
        Self::new(names.iter().map(|n| RepositoryDescriptor::new(*n, false)).collect())
    }

    pub fn with_count(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|i| RepositoryDescriptor::new(format!("repo-{:04}", i), i % 7 == 0))
                .collect(),
        )
    }

    pub fn new(repos: Vec<RepositoryDescriptor>) -> Self {
        Self {
            repos,
            fail_on_page: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail the n-th request (1-based).
    pub fn failing_on_page(mut self, page: usize) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    /// `(query, first, after)` for every request made.
    pub fn requests(&self) -> Vec<(String, u32, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchPages for ScriptedSearch {
    async fn search_page(
        &self,
        query: &SearchQuery,
        first: u32,
        after: Option<&str>,
    ) -> Result<SearchPage> {
        let page_number = {
            let mut requests = self.requests.lock().unwrap();
            requests.push((query.to_string(), first, after.map(String::from)));
            requests.len()
        };
        if self.fail_on_page == Some(page_number) {
            return Err(SyncError::Enumeration {
                message: "502 Bad Gateway".into(),
            });
        }

        let start = match after {
            Some(cursor) => cursor.parse::<usize>().map_err(|_| SyncError::Enumeration {
                message: format!("bad cursor {}", cursor),
            })?,
            None => 0,
        };
        let end = (start + first as usize).min(self.repos.len());
        let end_cursor = if end < self.repos.len() {
            end.to_string()
        } else {
            String::new()
        };

        Ok(SearchPage {
            repository_count: self.repos.len(),
            end_cursor,
            repositories: self.repos[start..end].to_vec(),
        })
    }
}

/// Initialize a git repository at `path` with the given remotes.
pub fn init_repo(path: &Path, remotes: &[&str]) -> Repository {
    let repo = Repository::init(path).unwrap();
    for remote in remotes {
        repo.remote(remote, &format!("https://github.com/{}/placeholder.git", remote))
            .unwrap();
    }
    repo
}

/// Sorted names of the entries directly under `dir`.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

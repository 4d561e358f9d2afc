//! Clone URLs, local paths and `gh` invocations.

use std::path::{Path, PathBuf};

use crate::command::CommandSpec;
use crate::error::Result;
use crate::github::DEFAULT_HOST;
use crate::sync::CloneProtocol;

/// Build the URL handed to `gh repo clone`.
pub fn clone_url(protocol: CloneProtocol, host: &str, organization: &str, name: &str) -> String {
    match protocol {
        CloneProtocol::System => format!("{}/{}", organization, name),
        CloneProtocol::Ssh => format!("git@{}:{}/{}.git", host, organization, name),
        CloneProtocol::Https => format!("https://{}/{}/{}.git", host, organization, name),
    }
}

/// Absolute path of the local copy of `name` under `output_dir`.
pub fn repository_path(output_dir: &Path, name: &str) -> Result<PathBuf> {
    Ok(std::path::absolute(output_dir.join(name))?)
}

/// `gh repo clone <url> <path>`
pub fn clone_command(url: &str, target: &Path, host: &str) -> CommandSpec {
    with_host(
        CommandSpec::new("gh")
            .args(["repo", "clone", url])
            .arg(target.to_string_lossy()),
        host,
    )
}

/// `gh repo sync --source <organization>/<name>`, run inside `repo_path`.
///
/// With `force` the destination branch is hard-reset to the source branch,
/// discarding any local commits that diverge from it.
pub fn update_command(
    organization: &str,
    name: &str,
    repo_path: &Path,
    host: &str,
    force: bool,
) -> CommandSpec {
    let mut spec = CommandSpec::new("gh")
        .args(["repo", "sync", "--source"])
        .arg(format!("{}/{}", organization, name))
        .current_dir(repo_path);
    if force {
        spec = spec.arg("--force");
    }
    with_host(spec, host)
}

fn with_host(spec: CommandSpec, host: &str) -> CommandSpec {
    if host == DEFAULT_HOST {
        spec
    } else {
        spec.env("GH_HOST", host)
    }
}

use super::{null_as_default, GhRunner, PAGE_SIZE};
use crate::error::{DigestError, Result};
use crate::model::{Commits, Window};
use log::Log;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepoListItem {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name_with_owner: String,
}

/// Only the array length matters; an object payload (an API error) still
/// fails to parse as an array.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct CommitItem {
    #[serde(default, deserialize_with = "null_as_default")]
    sha: String,
}

/// Lists the organization's non-archived repositories as `owner/name`.
pub fn fetch_org_repos<R: GhRunner + ?Sized>(runner: &R, org: &str) -> Result<Vec<String>> {
    let args = vec![
        "repo".to_string(),
        "list".to_string(),
        org.to_string(),
        "--limit".to_string(),
        PAGE_SIZE.to_string(),
        "--json".to_string(),
        "name,nameWithOwner".to_string(),
        "--no-archived".to_string(),
    ];
    let stdout = runner.run(&args)?;
    let items: Vec<RepoListItem> =
        serde_json::from_slice(&stdout).map_err(|e| DigestError::parse("gh repo list", e))?;

    Ok(items
        .into_iter()
        .filter(|r| !r.name.is_empty() || !r.name_with_owner.is_empty())
        .map(|r| {
            if r.name_with_owner.is_empty() {
                format!("{org}/{}", r.name)
            } else {
                r.name_with_owner
            }
        })
        .collect())
}

/// Number of commits on the default branch since the window start, capped at
/// one page.
pub fn fetch_repo_commit_count<R: GhRunner + ?Sized>(
    runner: &R,
    repo: &str,
    window: &Window,
) -> Result<u64> {
    let args = vec![
        "api".to_string(),
        format!("repos/{repo}/commits"),
        "--method".to_string(),
        "GET".to_string(),
        "-f".to_string(),
        format!("since={}", window.rfc3339()),
        "-f".to_string(),
        format!("per_page={PAGE_SIZE}"),
    ];
    let stdout = runner.run(&args)?;
    let commits: Vec<CommitItem> =
        serde_json::from_slice(&stdout).map_err(|e| DigestError::parse("commits", e))?;
    Ok(commits.len() as u64)
}

/// Tallies commits across the organization. A repository whose query fails is
/// logged and skipped; only a failed repository listing fails the tally.
pub fn fetch_commits<R: GhRunner + ?Sized>(
    runner: &R,
    logger: &dyn Log,
    org: &str,
    window: &Window,
) -> Result<Commits> {
    let repos = fetch_org_repos(runner, org)?;
    log::debug!(logger: logger, org = org, repos = repos.len(); "listed repositories");

    let mut commits = Commits::default();
    for repo in &repos {
        match fetch_repo_commit_count(runner, repo, window) {
            Ok(count) => commits.record(repo.as_str(), count),
            Err(e) => {
                log::warn!(logger: logger, repo = repo.as_str(), error:% = e; "failed to fetch commits for repo");
            }
        }
    }
    Ok(commits)
}

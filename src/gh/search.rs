use super::{null_as_default, GhRunner, PAGE_SIZE};
use crate::error::{DigestError, Result};
use crate::filter::retain_in_window;
use crate::model::{Issue, PullRequest, Window};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One row of `gh search prs|issues --json ...`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repository: Repository,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Repository {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name_with_owner: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Author {
    #[serde(default, deserialize_with = "null_as_default")]
    pub login: String,
}

impl SearchItem {
    fn author_login(&self) -> Option<String> {
        self.author
            .as_ref()
            .map(|a| a.login.clone())
            .filter(|login| !login.is_empty())
    }

    fn into_pull_request(self) -> PullRequest {
        let author = self.author_login();
        PullRequest {
            repo: self.repository.name_with_owner,
            number: self.number,
            title: self.title,
            url: self.url,
            author,
        }
    }

    fn into_issue(self) -> Issue {
        let author = self.author_login();
        Issue {
            repo: self.repository.name_with_owner,
            number: self.number,
            title: self.title,
            url: self.url,
            author,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subject {
    Prs,
    Issues,
}

impl Subject {
    fn as_str(self) -> &'static str {
        match self {
            Subject::Prs => "prs",
            Subject::Issues => "issues",
        }
    }
}

fn search_args(
    subject: Subject,
    org: &str,
    qualifiers: &[(&str, String)],
    stamp_field: &str,
) -> Vec<String> {
    let mut args = vec![
        "search".to_string(),
        subject.as_str().to_string(),
        "--org".to_string(),
        org.to_string(),
    ];
    for (flag, value) in qualifiers {
        args.push((*flag).to_string());
        args.push(value.clone());
    }
    args.push("--sort".to_string());
    args.push("updated".to_string());
    args.push("--order".to_string());
    args.push("desc".to_string());
    args.push("--limit".to_string());
    args.push(PAGE_SIZE.to_string());
    args.push("--json".to_string());
    args.push(format!("url,number,title,repository,author,{stamp_field}"));
    args
}

fn run_search<R: GhRunner + ?Sized>(runner: &R, args: &[String]) -> Result<Vec<SearchItem>> {
    let stdout = runner.run(args)?;
    serde_json::from_slice(&stdout).map_err(|e| DigestError::parse("gh search", e))
}

pub fn fetch_merged_prs<R: GhRunner + ?Sized>(
    runner: &R,
    org: &str,
    window: &Window,
) -> Result<Vec<PullRequest>> {
    let since = format!(">={}", window.search_date());
    let args = search_args(Subject::Prs, org, &[("--merged", since)], "mergedAt");
    let items = run_search(runner, &args)?;
    Ok(retain_in_window(items, window, |i| i.merged_at.as_ref())
        .into_iter()
        .map(SearchItem::into_pull_request)
        .collect())
}

pub fn fetch_opened_prs<R: GhRunner + ?Sized>(
    runner: &R,
    org: &str,
    window: &Window,
) -> Result<Vec<PullRequest>> {
    let since = format!(">={}", window.search_date());
    let args = search_args(
        Subject::Prs,
        org,
        &[("--state", "open".to_string()), ("--created", since)],
        "createdAt",
    );
    let items = run_search(runner, &args)?;
    Ok(retain_in_window(items, window, |i| i.created_at.as_ref())
        .into_iter()
        .map(SearchItem::into_pull_request)
        .collect())
}

pub fn fetch_closed_issues<R: GhRunner + ?Sized>(
    runner: &R,
    org: &str,
    window: &Window,
) -> Result<Vec<Issue>> {
    let since = format!(">={}", window.search_date());
    let args = search_args(
        Subject::Issues,
        org,
        &[("--state", "closed".to_string()), ("--closed", since)],
        "closedAt",
    );
    let items = run_search(runner, &args)?;
    Ok(retain_in_window(items, window, |i| i.closed_at.as_ref())
        .into_iter()
        .map(SearchItem::into_issue)
        .collect())
}

pub fn fetch_opened_issues<R: GhRunner + ?Sized>(
    runner: &R,
    org: &str,
    window: &Window,
) -> Result<Vec<Issue>> {
    let since = format!(">={}", window.search_date());
    let args = search_args(
        Subject::Issues,
        org,
        &[("--state", "open".to_string()), ("--created", since)],
        "createdAt",
    );
    let items = run_search(runner, &args)?;
    Ok(retain_in_window(items, window, |i| i.created_at.as_ref())
        .into_iter()
        .map(SearchItem::into_issue)
        .collect())
}

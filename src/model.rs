use chrono::{DateTime, SecondsFormat, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_HOURS: i32 = 24;

/// The `[since, now)` interval a digest covers.
///
/// Non-positive hour counts are accepted as-is and put `since` at or after
/// `now`, which simply yields an empty digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub hours: i32,
    pub since: DateTime<Utc>,
}

impl Window {
    pub fn starting_now(hours: i32) -> Self {
        Self::ending_at(Utc::now(), hours)
    }

    pub fn ending_at(now: DateTime<Utc>, hours: i32) -> Self {
        let since = now
            .trunc_subsecs(0)
            .checked_sub_signed(TimeDelta::hours(i64::from(hours)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { hours, since }
    }

    /// Day-granularity bound used by `gh search` qualifiers.
    pub fn search_date(&self) -> String {
        self.since.format("%Y-%m-%d").to_string()
    }

    pub fn rfc3339(&self) -> String {
        self.since.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn period(&self) -> Period {
        Period {
            hours: self.hours,
            since: self.since,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub repo: String,
    pub number: u64,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub repo: String,
    pub number: u64,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commits {
    pub total: u64,
    pub by_repo: BTreeMap<String, u64>,
}

impl Commits {
    /// Records a repository's count. Zero counts leave the tally untouched so
    /// `by_repo` only ever names repositories with activity.
    pub fn record(&mut self, repo: impl Into<String>, count: u64) {
        if count == 0 {
            return;
        }
        self.total += count;
        *self.by_repo.entry(repo.into()).or_insert(0) += count;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHub {
    #[serde(default)]
    pub prs_merged: Vec<PullRequest>,
    #[serde(default)]
    pub prs_opened: Vec<PullRequest>,
    #[serde(default)]
    pub issues_closed: Vec<Issue>,
    #[serde(default)]
    pub issues_opened: Vec<Issue>,
    #[serde(default)]
    pub commits: Commits,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(rename = "totalPRsMerged")]
    pub total_prs_merged: u64,
    pub total_issues_closed: u64,
    pub total_commits: u64,
    #[serde(default)]
    pub active_repos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub hours: i32,
    pub since: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub period: Period,
    pub github: GitHub,
    pub summary: Summary,
}

impl Report {
    pub fn new(generated_at: DateTime<Utc>, window: &Window, github: GitHub) -> Self {
        let summary = crate::summary::compute_summary(&github);
        Self {
            generated_at: generated_at.trunc_subsecs(0),
            period: window.period(),
            github,
            summary,
        }
    }
}

/// Emitted instead of a [`Report`] when the run cannot start at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub generated_at: DateTime<Utc>,
    pub error: String,
}

impl FailureReport {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            generated_at: Utc::now().trunc_subsecs(0),
            error: error.into(),
        }
    }
}

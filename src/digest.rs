use crate::error::Result;
use crate::gh::{self, GhRunner};
use crate::model::{Commits, GitHub, Report, Window};
use chrono::Utc;
use log::Log;
use std::time::Duration;

/// One digest run against a single organization.
///
/// Each category is queried once, in order. A failing category is logged and
/// left empty; nothing after the organization check can abort the run.
pub struct Digest<'a, R: GhRunner + ?Sized> {
    runner: &'a R,
    logger: &'a dyn Log,
    org: &'a str,
    window: Window,
}

impl<'a, R: GhRunner + ?Sized> Digest<'a, R> {
    pub fn new(runner: &'a R, logger: &'a dyn Log, org: &'a str, window: Window) -> Self {
        Self {
            runner,
            logger,
            org,
            window,
        }
    }

    pub fn collect(&self) -> Report {
        let logger = self.logger;
        if self.window.hours > 0 {
            let span = Duration::from_secs(u64::from(self.window.hours.unsigned_abs()) * 3600);
            log::info!(logger: logger,
                org = self.org,
                hours = self.window.hours,
                since = self.window.rfc3339().as_str(),
                window:% = humantime::format_duration(span);
                "starting digest fetch");
        } else {
            log::info!(logger: logger,
                org = self.org,
                hours = self.window.hours,
                since = self.window.rfc3339().as_str();
                "starting digest fetch");
        }

        let github = GitHub {
            prs_merged: self.category("merged PRs", gh::fetch_merged_prs, Vec::len),
            prs_opened: self.category("opened PRs", gh::fetch_opened_prs, Vec::len),
            issues_closed: self.category("closed issues", gh::fetch_closed_issues, Vec::len),
            issues_opened: self.category("opened issues", gh::fetch_opened_issues, Vec::len),
            commits: self.commits(),
        };

        let report = Report::new(Utc::now(), &self.window, github);
        log::info!(logger: logger,
            prs_merged = report.github.prs_merged.len(),
            prs_opened = report.github.prs_opened.len(),
            issues_closed = report.github.issues_closed.len(),
            issues_opened = report.github.issues_opened.len(),
            commits = report.github.commits.total,
            active_repos = report.summary.active_repos.len();
            "digest complete");
        report
    }

    fn category<T: Default>(
        &self,
        label: &str,
        fetch: fn(&R, &str, &Window) -> Result<T>,
        count: fn(&T) -> usize,
    ) -> T {
        let logger = self.logger;
        log::info!(logger: logger, org = self.org; "fetching {label}");
        match fetch(self.runner, self.org, &self.window) {
            Ok(records) => {
                log::info!(logger: logger, count = count(&records); "fetched {label}");
                records
            }
            Err(e) => {
                log::warn!(logger: logger, error:% = e; "failed to fetch {label}");
                T::default()
            }
        }
    }

    fn commits(&self) -> Commits {
        let logger = self.logger;
        log::info!(logger: logger, org = self.org; "fetching commits");
        match gh::fetch_commits(self.runner, logger, self.org, &self.window) {
            Ok(commits) => {
                log::info!(logger: logger,
                    total = commits.total,
                    repos_with_activity = commits.by_repo.len();
                    "fetched commits");
                commits
            }
            Err(e) => {
                log::warn!(logger: logger, error:% = e; "failed to fetch commits");
                Commits::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gh::fake::FakeGh;
    use crate::logging::capture::CaptureLog;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    const ORG: &str = "misty-step";
    const SEARCH_TAIL: &str = "--sort updated --order desc --limit 100 --json url,number,title,repository,author";

    fn window() -> Window {
        Window::ending_at(Utc.with_ymd_and_hms(2026, 2, 18, 14, 0, 0).unwrap(), 24)
    }

    fn merged() -> String {
        format!("search prs --org {ORG} --merged >=2026-02-17 {SEARCH_TAIL},mergedAt")
    }

    fn opened_prs() -> String {
        format!("search prs --org {ORG} --state open --created >=2026-02-17 {SEARCH_TAIL},createdAt")
    }

    fn closed_issues() -> String {
        format!("search issues --org {ORG} --state closed --closed >=2026-02-17 {SEARCH_TAIL},closedAt")
    }

    fn opened_issues() -> String {
        format!("search issues --org {ORG} --state open --created >=2026-02-17 {SEARCH_TAIL},createdAt")
    }

    fn repo_list() -> String {
        format!("repo list {ORG} --limit 100 --json name,nameWithOwner --no-archived")
    }

    fn commits(repo: &str) -> String {
        format!("api repos/{repo}/commits --method GET -f since=2026-02-17T14:00:00Z -f per_page=100")
    }

    fn full_fake() -> FakeGh {
        FakeGh::new()
            .ok(
                &merged(),
                r#"[{"url":"https://github.com/misty-step/factory/pull/42","number":42,"title":"Add daily digest","repository":{"nameWithOwner":"misty-step/factory"},"author":{"login":"kaylee"},"mergedAt":"2026-02-18T10:00:00Z"}]"#,
            )
            .ok(
                &opened_prs(),
                r#"[{"url":"https://github.com/misty-step/cerberus/pull/10","number":10,"title":"Fix auth","repository":{"nameWithOwner":"misty-step/cerberus"},"author":{"login":"phaedrus"},"createdAt":"2026-02-18T09:00:00Z"}]"#,
            )
            .ok(
                &closed_issues(),
                r#"[{"url":"https://github.com/misty-step/factory/issues/100","number":100,"title":"Bug report","repository":{"nameWithOwner":"misty-step/factory"},"author":{"login":"user"},"closedAt":"2026-02-18T08:00:00Z"}]"#,
            )
            .ok(
                &opened_issues(),
                r#"[{"url":"https://github.com/misty-step/utils/issues/5","number":5,"title":"Feature request","repository":{"nameWithOwner":"misty-step/utils"},"author":{"login":"contributor"},"createdAt":"2026-02-18T07:00:00Z"}]"#,
            )
            .ok(
                &repo_list(),
                r#"[{"name":"factory","nameWithOwner":"misty-step/factory"},{"name":"docs","nameWithOwner":"misty-step/docs"}]"#,
            )
            .ok(&commits("misty-step/factory"), r#"[{"sha":"a"},{"sha":"b"}]"#)
            .ok(&commits("misty-step/docs"), r#"[{"sha":"c"}]"#)
    }

    #[test]
    fn collects_every_category() {
        let gh = full_fake();
        let log = CaptureLog::new();
        let report = Digest::new(&gh, &log, ORG, window()).collect();

        assert_eq!(report.github.prs_merged.len(), 1);
        assert_eq!(report.github.prs_opened.len(), 1);
        assert_eq!(report.github.issues_closed.len(), 1);
        assert_eq!(report.github.issues_opened.len(), 1);
        assert_eq!(report.github.commits.total, 3);
        assert_eq!(report.summary.total_prs_merged, 1);
        assert_eq!(report.summary.total_issues_closed, 1);
        assert_eq!(report.summary.total_commits, 3);
        assert_eq!(
            report.summary.active_repos,
            vec![
                "misty-step/cerberus",
                "misty-step/docs",
                "misty-step/factory",
                "misty-step/utils"
            ]
        );
        assert_eq!(report.period.hours, 24);
        assert!(log.warnings().is_empty());
    }

    #[test]
    fn queries_run_in_order_once_each() {
        let gh = full_fake();
        let log = CaptureLog::new();
        Digest::new(&gh, &log, ORG, window()).collect();

        assert_eq!(
            *gh.calls.borrow(),
            vec![
                merged(),
                opened_prs(),
                closed_issues(),
                opened_issues(),
                repo_list(),
                commits("misty-step/factory"),
                commits("misty-step/docs"),
            ]
        );
    }

    #[test]
    fn failing_category_degrades_to_empty() {
        let gh = full_fake().fail(&merged(), "HTTP 502: Bad Gateway");
        let log = CaptureLog::new();
        let report = Digest::new(&gh, &log, ORG, window()).collect();

        assert!(report.github.prs_merged.is_empty());
        assert_eq!(report.summary.total_prs_merged, 0);
        assert_eq!(report.github.prs_opened.len(), 1);
        assert_eq!(report.github.issues_closed.len(), 1);
        assert_eq!(report.github.issues_opened.len(), 1);
        assert_eq!(report.github.commits.total, 3);

        let warnings = log.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("failed to fetch merged PRs"));
        assert!(warnings[0].contains("HTTP 502: Bad Gateway"));
    }

    #[test]
    fn malformed_output_degrades_to_empty() {
        let gh = full_fake().ok(&closed_issues(), "<html>rate limited</html>");
        let log = CaptureLog::new();
        let report = Digest::new(&gh, &log, ORG, window()).collect();

        assert!(report.github.issues_closed.is_empty());
        assert_eq!(report.github.prs_merged.len(), 1);
        let warnings = log.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("parse gh search json"));
    }

    #[test]
    fn everything_failing_still_yields_a_report() {
        let gh = FakeGh::new();
        let log = CaptureLog::new();
        let report = Digest::new(&gh, &log, ORG, window()).collect();

        assert_eq!(report.github, GitHub::default());
        assert_eq!(report.summary.total_commits, 0);
        assert!(report.summary.active_repos.is_empty());
        assert_eq!(log.warnings().len(), 5);
    }

    #[test]
    fn non_positive_hours_log_no_span() {
        let gh = FakeGh::new();
        let log = CaptureLog::new();
        let now = Utc.with_ymd_and_hms(2026, 2, 18, 14, 0, 0).unwrap();
        Digest::new(&gh, &log, ORG, Window::ending_at(now, -6)).collect();

        let first = log.lines().into_iter().next().map(|(_, l)| l).unwrap();
        assert!(first.starts_with("starting digest fetch"));
        assert!(first.contains("hours=-6"));
        assert!(!first.contains("window="));
    }

    #[test]
    fn logs_start_and_completion() {
        let gh = full_fake();
        let log = CaptureLog::new();
        Digest::new(&gh, &log, ORG, window()).collect();

        let lines: Vec<String> = log.lines().into_iter().map(|(_, l)| l).collect();
        assert!(lines[0].starts_with("starting digest fetch"));
        assert!(lines[0].contains("org=misty-step"));
        assert!(lines[0].contains("window=1day"));
        let last = lines.last().unwrap();
        assert!(last.starts_with("digest complete"));
        assert!(last.contains("active_repos=4"));
    }
}

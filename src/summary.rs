use crate::model::{GitHub, Summary};
use std::collections::BTreeSet;

/// Folds the collected categories into totals and the set of repositories
/// that saw any activity in the window. Rows whose repository `gh` could not
/// resolve still count toward the totals but name no repository.
pub fn compute_summary(github: &GitHub) -> Summary {
    let mut active: BTreeSet<&str> = BTreeSet::new();
    active.extend(github.prs_merged.iter().map(|pr| pr.repo.as_str()));
    active.extend(github.prs_opened.iter().map(|pr| pr.repo.as_str()));
    active.extend(github.issues_closed.iter().map(|i| i.repo.as_str()));
    active.extend(github.issues_opened.iter().map(|i| i.repo.as_str()));
    active.extend(
        github
            .commits
            .by_repo
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(repo, _)| repo.as_str()),
    );

    active.remove("");

    Summary {
        total_prs_merged: github.prs_merged.len() as u64,
        total_issues_closed: github.issues_closed.len() as u64,
        total_commits: github.commits.total,
        active_repos: active.into_iter().map(str::to_owned).collect(),
    }
}

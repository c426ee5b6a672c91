pub mod commits;
pub mod runner;
pub mod search;

use serde::Deserialize;

pub use commits::{fetch_commits, fetch_org_repos, fetch_repo_commit_count};
pub use runner::{GhCli, GhRunner};
pub use search::{fetch_closed_issues, fetch_merged_prs, fetch_opened_issues, fetch_opened_prs};

/// Page size for every query; nothing beyond the first page is fetched.
pub const PAGE_SIZE: u32 = 100;

/// `gh` emits `null` for fields it could not resolve (deleted repositories,
/// ghost users). Those read as the type's default instead of failing the row.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

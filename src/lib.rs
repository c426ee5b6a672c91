pub mod cli;
pub mod digest;
pub mod error;
pub mod filter;
pub mod gh;
pub mod logging;
pub mod model;
pub mod output;
pub mod summary;

pub use digest::Digest;
pub use error::{DigestError, Result};
pub use gh::{GhCli, GhRunner};
pub use model::{Commits, FailureReport, GitHub, Issue, Period, PullRequest, Report, Summary, Window};

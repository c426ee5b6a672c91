use crate::digest::Digest;
use crate::gh::GhCli;
use crate::logging::{build_logger, LogFormat};
use crate::model::{FailureReport, Window, DEFAULT_HOURS};
use crate::output::emit_json;
use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, Log};
use std::path::PathBuf;
use std::process::ExitCode;

pub const MISSING_ORG: &str = "org flag is required";

#[derive(Parser)]
#[command(name = "daily-digest")]
#[command(about = "Summarize a GitHub organization's recent PRs, issues and commits as JSON")]
#[command(version)]
pub struct Cli {
    #[arg(long, env = "DIGEST_ORG", help = "GitHub organization to query (required)")]
    pub org: Option<String>,

    #[arg(
        long,
        default_value_t = DEFAULT_HOURS,
        allow_negative_numbers = true,
        help = "Time window in hours"
    )]
    pub hours: i32,

    #[arg(long, help = "Emit diagnostics as JSON lines on stderr instead of text")]
    pub json_logs: bool,

    #[arg(long, env = "DIGEST_LOG", default_value = "info", help = "Diagnostic log level")]
    pub log_level: LevelFilter,

    #[arg(long, env = "DIGEST_GH_BIN", default_value = "gh", help = "Path to the gh executable")]
    pub gh: PathBuf,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn log_format(&self) -> LogFormat {
        if self.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }

    /// The organization to query, if one was given. Blank counts as missing.
    pub fn organization(&self) -> Option<&str> {
        self.org.as_deref().map(str::trim).filter(|org| !org.is_empty())
    }

    pub fn execute(self) -> Result<ExitCode> {
        let logger = build_logger(self.log_format(), self.log_level);

        let Some(org) = self.organization() else {
            log::error!(logger: &logger, error = MISSING_ORG; "fatal error");
            logger.flush();
            emit_json(&FailureReport::new(MISSING_ORG)).context("Failed to write error report")?;
            return Ok(ExitCode::FAILURE);
        };

        let runner = GhCli::new(self.gh.clone());
        let report = Digest::new(&runner, &logger, org, Window::starting_now(self.hours)).collect();
        logger.flush();
        emit_json(&report).context("Failed to write report")?;
        Ok(ExitCode::SUCCESS)
    }
}

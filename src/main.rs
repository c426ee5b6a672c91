use anyhow::Result;
use daily_digest::cli::Cli;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    cli.execute()
}

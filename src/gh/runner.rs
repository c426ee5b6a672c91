use crate::error::{DigestError, Result};
use std::path::PathBuf;
use std::process::Command;

/// Source of raw query output: given an argument list for the `gh` tool,
/// return its stdout or the reason it failed.
pub trait GhRunner {
    fn run(&self, args: &[String]) -> Result<Vec<u8>>;
}

/// Runs the real `gh` executable, inheriting the environment so its own
/// authentication applies.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: PathBuf,
}

impl GhCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn describe(&self, args: &[String]) -> String {
        let mut command = self.program.to_string_lossy().into_owned();
        for arg in args {
            command.push(' ');
            command.push_str(arg);
        }
        command
    }
}

impl GhRunner for GhCli {
    fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| DigestError::Command {
                command: self.describe(args),
                message: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(output.stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let message = [stderr.trim(), stdout.trim()]
            .into_iter()
            .find(|m| !m.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| output.status.to_string());

        Err(DigestError::Command {
            command: self.describe(args),
            message,
        })
    }
}

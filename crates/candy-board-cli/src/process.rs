//! External process execution.
//!
//! The dispatcher only talks to `systemctl` and the link control script
//! through [`ProcessRunner`], so tests can swap in a fake.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// Exit code; `-1` when the process was killed by a signal.
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// stdout and stderr joined, for error reports.
    pub fn combined(&self) -> String {
        [self.stdout.trim(), self.stderr.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args` to completion.
    async fn run(&self, program: &str, args: &[&str]) -> std::io::Result<ProcessOutput>;
}

/// Runs real processes with `tokio::process`.
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str]) -> std::io::Result<ProcessOutput> {
        tracing::debug!(program, ?args, "Running process");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;

        let result = ProcessOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        };
        tracing::debug!(program, code = result.code, "Process finished");
        Ok(result)
    }
}

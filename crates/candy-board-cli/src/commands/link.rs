//! Link control script: `<script> suspend|resume -q`.

use std::path::Path;

use crate::error::{CliError, Result};
use crate::process::{ProcessOutput, ProcessRunner};

/// What the script reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// The link changed state (`0`).
    Changed,
    /// Nothing to do (`1`): already suspended or already running.
    Unchanged,
    /// The script gave up waiting (`2..=4`).
    TimedOut(i32),
}

pub struct LinkScript<'a> {
    path: &'a Path,
    runner: &'a dyn ProcessRunner,
}

impl<'a> LinkScript<'a> {
    pub fn new(path: &'a Path, runner: &'a dyn ProcessRunner) -> Self {
        Self { path, runner }
    }

    pub async fn suspend(&self) -> Result<ScriptOutcome> {
        self.invoke("suspend").await
    }

    pub async fn resume(&self) -> Result<ScriptOutcome> {
        self.invoke("resume").await
    }

    async fn invoke(&self, verb: &str) -> Result<ScriptOutcome> {
        let program = self.path.to_string_lossy();
        let command = format!("{} {} -q", program, verb);

        let output = self
            .runner
            .run(&program, &[verb, "-q"])
            .await
            .map_err(|e| CliError::SubprocessFailure {
                command: command.clone(),
                code: None,
                output: e.to_string(),
            })?;

        tracing::debug!(%command, code = output.code, "Link script finished");
        classify(command, output)
    }
}

fn classify(command: String, output: ProcessOutput) -> Result<ScriptOutcome> {
    match output.code {
        0 => Ok(ScriptOutcome::Changed),
        1 => Ok(ScriptOutcome::Unchanged),
        code @ 2..=4 => Ok(ScriptOutcome::TimedOut(code)),
        code => Err(CliError::SubprocessFailure {
            command,
            code: Some(code),
            output: output.combined(),
        }),
    }
}

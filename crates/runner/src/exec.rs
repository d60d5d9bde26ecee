//! One-shot command execution.

use std::process::Stdio;

use tokio::process::Command;

use crate::{CommandLine, RunnerError};

/// Captured result of [`execute`].
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

fn spawn_error(command: &CommandLine) -> impl FnOnce(std::io::Error) -> RunnerError + '_ {
    move |source| RunnerError::Spawn {
        program: command.program().to_string(),
        source,
    }
}

/// Runs `command` to completion and captures its output.
pub async fn execute(command: &CommandLine) -> Result<ExecOutput, RunnerError> {
    let output = Command::new(command.program())
        .args(command.args())
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(spawn_error(command))?;

    Ok(ExecOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Runs `command` without capturing output.
///
/// When `interactive` the child inherits the terminal; otherwise its stdio
/// is discarded. `verbose` logs the command and its exit code.
pub async fn execute_interactive(
    command: &CommandLine,
    interactive: bool,
    verbose: bool,
) -> Result<Option<i32>, RunnerError> {
    if verbose {
        tracing::info!(%command, "executing");
    }

    let mut cmd = Command::new(command.program());
    cmd.args(command.args());
    if !interactive {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
    }

    let status = cmd.status().await.map_err(spawn_error(command))?;

    if verbose {
        tracing::info!(%command, code = ?status.code(), "command finished");
    }
    Ok(status.code())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn execute_captures_both_streams() {
        let cmd = CommandLine::new("sh", ["-c", "echo hello; echo oops 1>&2; exit 2"]);
        let out = execute(&cmd).await.unwrap();
        assert_eq!(out.code, Some(2));
        assert!(!out.success());
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn execute_reports_spawn_failure() {
        let cmd = CommandLine::new("/nonexistent/tool", Vec::<String>::new());
        assert!(matches!(
            execute(&cmd).await,
            Err(RunnerError::Spawn { .. })
        ));
    }

    #[tokio::test]
    async fn execute_interactive_returns_code() {
        let cmd = CommandLine::new("sh", ["-c", "exit 0"]);
        assert_eq!(execute_interactive(&cmd, false, true).await.unwrap(), Some(0));
    }
}

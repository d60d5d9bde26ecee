//! Command execution for the migasfree indicator.
//!
//! Launches the client upgrade command with stdout and stderr merged into a
//! single pipe and streams its output line by line, with the client's color
//! escapes removed. Also provides the one-shot execution helpers used for
//! tool probes, the identification label and reboot commands.

mod ansi;
mod command;
mod exec;
mod runner;

pub use ansi::clean_line;
pub use command::CommandLine;
pub use exec::{ExecOutput, execute, execute_interactive};
pub use runner::{Launcher, ProcessRunner, RunHandle};

/// Errors for command execution.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("empty command line")]
    EmptyCommand,

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

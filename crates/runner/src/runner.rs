//! Background process runner with merged output streaming.

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};

use tokio::sync::{mpsc, oneshot};

use crate::{CommandLine, RunnerError, clean_line};

/// Lines buffered between the reader thread and the consumer.
const LINE_BUFFER: usize = 256;

/// Starts commands and hands back their output stream.
///
/// [`ProcessRunner`] is the real implementation; the seam exists so callers
/// can be exercised without spawning processes.
pub trait Launcher: Send + Sync + 'static {
    fn launch(&self, command: &CommandLine) -> Result<RunHandle, RunnerError>;
}

/// An in-flight run: a finite stream of cleaned output lines followed by
/// the exit code.
///
/// The exit code is `None` when the process was killed by a signal or its
/// status could not be collected.
pub struct RunHandle {
    lines: mpsc::Receiver<String>,
    exit: oneshot::Receiver<Option<i32>>,
}

impl RunHandle {
    pub fn new(lines: mpsc::Receiver<String>, exit: oneshot::Receiver<Option<i32>>) -> Self {
        Self { lines, exit }
    }

    /// Next output line, or `None` once the output stream is closed.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    /// Waits for the process to exit.
    ///
    /// Lines not yet consumed are discarded.
    pub async fn exit_code(self) -> Option<i32> {
        drop(self.lines);
        self.exit.await.ok().flatten()
    }
}

/// Spawns the command with stdout and stderr sharing one pipe and drains it
/// on a dedicated thread.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Launcher for ProcessRunner {
    fn launch(&self, command: &CommandLine) -> Result<RunHandle, RunnerError> {
        let (reader, writer) = std::io::pipe()?;

        // The Command keeps its copies of the write end alive; it must be
        // dropped before reading or the pipe never reports EOF.
        let mut child = {
            let mut cmd = Command::new(command.program());
            cmd.args(command.args())
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            cmd.spawn().map_err(|source| RunnerError::Spawn {
                program: command.program().to_string(),
                source,
            })?
        };

        tracing::debug!(pid = child.id(), %command, "process spawned");

        let (line_tx, line_rx) = mpsc::channel(LINE_BUFFER);
        let (exit_tx, exit_rx) = oneshot::channel();

        std::thread::Builder::new()
            .name("upgrade-output".into())
            .spawn(move || {
                let mut reader = BufReader::new(reader);
                let mut buf = Vec::new();
                loop {
                    buf.clear();
                    match reader.read_until(b'\n', &mut buf) {
                        Ok(0) => break,
                        Ok(_) => {
                            let text = String::from_utf8_lossy(&buf);
                            let line = clean_line(text.trim_end_matches(['\n', '\r']));
                            // Keep draining after the consumer goes away so
                            // the child never blocks on a full pipe.
                            let _ = line_tx.blocking_send(line);
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "output read failed, treating as end of output");
                            break;
                        }
                    }
                }
                drop(line_tx);

                let code = match child.wait() {
                    Ok(status) => status.code(),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to collect exit status");
                        None
                    }
                };
                let _ = exit_tx.send(code);
            })?;

        Ok(RunHandle::new(line_rx, exit_rx))
    }
}

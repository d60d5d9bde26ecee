//! Reboot-required detection and reboot command selection.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use migasfree_runner::{CommandLine, RunnerError, execute, execute_interactive};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::controller::{RebootCheck, UpgradeController};

/// Interval between reboot marker checks.
pub const REBOOT_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Created by the package manager when a restart is required.
pub const REBOOT_REQUIRED_MARKER: &str = "/var/run/reboot-required";

/// External signal that the OS needs a restart.
pub trait RebootMarker: Send + Sync {
    fn is_pending(&self) -> bool;
}

/// Marker signalled by the existence of a file.
#[derive(Debug, Clone)]
pub struct FileMarker {
    path: PathBuf,
}

impl FileMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileMarker {
    fn default() -> Self {
        Self::new(REBOOT_REQUIRED_MARKER)
    }
}

impl RebootMarker for FileMarker {
    fn is_pending(&self) -> bool {
        self.path.is_file()
    }
}

/// Periodically checks the reboot marker through the controller.
///
/// One-shot: once the marker trips the watcher stops for good.
pub struct RebootWatcher {
    marker: Arc<dyn RebootMarker>,
    interval: Duration,
}

impl RebootWatcher {
    pub fn new(marker: Arc<dyn RebootMarker>) -> Self {
        Self {
            marker,
            interval: REBOOT_CHECK_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawns the watch loop. The first check happens one interval after
    /// the call.
    pub fn spawn(self, controller: UpgradeController, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip the first immediate tick.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if controller.check_reboot(self.marker.as_ref()).await == RebootCheck::Tripped {
                            tracing::debug!("reboot watcher stopped");
                            break;
                        }
                    }
                }
            }
        })
    }
}

/// Boxed future returned by [`RebootCommandProvider`].
pub type RebootFuture<'a> = Pin<Box<dyn Future<Output = CommandLine> + Send + 'a>>;

/// Chooses the command that restarts the machine.
pub trait RebootCommandProvider: Send + Sync {
    fn reboot_command(&self) -> RebootFuture<'_>;
}

/// Always the same command.
#[derive(Debug, Clone)]
pub struct FixedRebootCommand(pub CommandLine);

impl RebootCommandProvider for FixedRebootCommand {
    fn reboot_command(&self) -> RebootFuture<'_> {
        Box::pin(async move { self.0.clone() })
    }
}

/// Asks ConsoleKit when its tools are installed, logind otherwise.
#[derive(Debug, Clone, Default)]
pub struct SessionManagerProbe;

impl SessionManagerProbe {
    pub fn consolekit() -> CommandLine {
        CommandLine::new(
            "dbus-send",
            [
                "--system",
                "--print-reply",
                "--dest=org.freedesktop.ConsoleKit",
                "/org/freedesktop/ConsoleKit/Manager",
                "org.freedesktop.ConsoleKit.Manager.Restart",
            ],
        )
    }

    pub fn logind() -> CommandLine {
        CommandLine::new(
            "dbus-send",
            [
                "--system",
                "--print-reply",
                "--dest=org.freedesktop.login1",
                "/org/freedesktop/login1",
                "org.freedesktop.login1.Manager.Reboot",
                "boolean:true",
            ],
        )
    }
}

impl RebootCommandProvider for SessionManagerProbe {
    fn reboot_command(&self) -> RebootFuture<'_> {
        Box::pin(async {
            let probe = CommandLine::new("which", ["ck-list-sessions"]);
            match execute(&probe).await {
                Ok(out) if out.success() => Self::consolekit(),
                _ => Self::logind(),
            }
        })
    }
}

/// Runs the provider's reboot command attached to the terminal.
pub async fn reboot(provider: &dyn RebootCommandProvider) -> Result<Option<i32>, RunnerError> {
    let command = provider.reboot_command().await;
    execute_interactive(&command, true, true).await
}

//! Upgrade run scheduling and state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use migasfree_runner::{CommandLine, Launcher};
use migasfree_tray::{MenuId, MenuItem, Presenter};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::ControllerConfig;
use crate::reboot::RebootMarker;
use crate::status::{REBOOT_ICON, StatusTag, UPGRADING_ICON, classify};

/// Where a run request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The interval timer; uses the forced command only if configured so.
    Scheduled,
    /// The "Force Upgrade" menu item; always uses the forced command.
    Forced,
}

/// Outcome of one reboot-marker check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootCheck {
    /// A run is in flight; the marker was not looked at.
    Skipped,
    /// No reboot required.
    Clear,
    /// Reboot is pending (now or from an earlier check).
    Tripped,
}

/// Owns the run state and drives the presentation layer.
///
/// At most one run is in flight. A trigger while running, or after a
/// reboot became pending, is a no-op. State transitions happen under one
/// lock, so run completion and the reboot check never interleave.
#[derive(Clone)]
pub struct UpgradeController {
    inner: Arc<Inner>,
}

struct Inner {
    config: ControllerConfig,
    launcher: Arc<dyn Launcher>,
    presenter: Arc<dyn Presenter>,
    running: AtomicBool,
    show_console: AtomicBool,
    state: Mutex<ControllerState>,
}

#[derive(Default)]
struct ControllerState {
    status: StatusTag,
    reboot_pending: bool,
}

impl UpgradeController {
    pub fn new(
        config: ControllerConfig,
        launcher: Arc<dyn Launcher>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        let show_console = AtomicBool::new(config.show_console);
        Self {
            inner: Arc::new(Inner {
                config,
                launcher,
                presenter,
                running: AtomicBool::new(false),
                show_console,
                state: Mutex::new(ControllerState::default()),
            }),
        }
    }

    /// Returns `true` while a run is in flight.
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    pub async fn status(&self) -> StatusTag {
        self.inner.state.lock().await.status
    }

    pub async fn reboot_pending(&self) -> bool {
        self.inner.state.lock().await.reboot_pending
    }

    /// Whether every run brings the console to the front.
    pub fn show_console(&self) -> bool {
        self.inner.show_console.load(Ordering::SeqCst)
    }

    pub fn set_show_console(&self, show: bool) {
        self.inner.show_console.store(show, Ordering::SeqCst);
    }

    /// Starts a run unless one is in flight or a reboot is pending.
    ///
    /// Returns the handle of the spawned run, resolving to its status.
    pub async fn trigger(&self, trigger: Trigger) -> Option<JoinHandle<StatusTag>> {
        let mut state = self.inner.state.lock().await;

        if state.reboot_pending {
            tracing::debug!(?trigger, "reboot pending, trigger ignored");
            return None;
        }
        if self.inner.running.swap(true, Ordering::SeqCst) {
            tracing::debug!(?trigger, "run in flight, trigger ignored");
            return None;
        }

        let forced = match trigger {
            Trigger::Forced => true,
            Trigger::Scheduled => self.inner.config.force_upgrade,
        };
        let command = self.inner.config.commands.select(forced).clone();

        state.status = StatusTag::Upgrading;
        let presenter = &self.inner.presenter;
        presenter.set_menu_item_enabled(MenuId::ForceUpgrade, false);
        presenter.clear();
        if self.show_console() {
            presenter.show();
        }
        presenter.set_progress_pulsing(true);
        presenter.set_icon(UPGRADING_ICON);
        drop(state);

        let inner = Arc::clone(&self.inner);
        Some(tokio::spawn(async move { inner.run(command).await }))
    }

    /// Triggers a scheduled run now and then every configured interval.
    pub fn start(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let controller = self.clone();
        let interval = self.inner.config.interval;

        tracing::info!(interval_secs = interval.as_secs(), "upgrade scheduler started");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        controller.trigger(Trigger::Scheduled).await;
                    }
                }
            }
            tracing::debug!("upgrade scheduler stopped");
        })
    }

    /// Checks the reboot marker unless a run is in flight.
    ///
    /// The first time the marker is seen the indicator switches to restart
    /// mode: warning icon, a reboot menu entry, and "Force Upgrade"
    /// disabled. Pending never reverts.
    pub async fn check_reboot(&self, marker: &dyn RebootMarker) -> RebootCheck {
        let mut state = self.inner.state.lock().await;

        if state.reboot_pending {
            return RebootCheck::Tripped;
        }
        if self.is_running() {
            return RebootCheck::Skipped;
        }
        if !marker.is_pending() {
            return RebootCheck::Clear;
        }

        state.reboot_pending = true;
        let presenter = &self.inner.presenter;
        presenter.set_icon(REBOOT_ICON);
        presenter.add_menu_item(MenuItem::reboot());
        presenter.set_menu_item_enabled(MenuId::ForceUpgrade, false);

        tracing::info!("reboot required, upgrades disabled until restart");
        RebootCheck::Tripped
    }
}

impl Inner {
    async fn run(&self, command: CommandLine) -> StatusTag {
        tracing::info!(%command, "upgrade run started");

        let exit_code = match self.launcher.launch(&command) {
            Ok(mut run) => {
                while let Some(line) = run.next_line().await {
                    self.presenter.append(line);
                }
                run.exit_code().await
            }
            Err(e) => {
                tracing::error!(%command, error = %e, "failed to launch upgrade");
                self.presenter.append(e.to_string());
                None
            }
        };

        let status = classify(exit_code);
        tracing::info!(?exit_code, ?status, "upgrade run finished");
        self.finish(status).await;
        status
    }

    async fn finish(&self, status: StatusTag) {
        let mut state = self.state.lock().await;
        state.status = status;

        self.presenter.set_progress_pulsing(false);
        self.presenter.set_icon(&status.icon_name(self.config.theme));
        if !state.reboot_pending {
            self.presenter.set_menu_item_enabled(MenuId::ForceUpgrade, true);
        }
        self.running.store(false, Ordering::SeqCst);
    }
}

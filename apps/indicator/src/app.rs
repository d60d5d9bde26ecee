//! Application orchestrator: wires the indicator components together.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use migasfree_runner::{CommandLine, ProcessRunner, execute_interactive};
use migasfree_tray::{
    AboutInfo, MenuId, MenuOptions, TrayConfig, TrayEvent, TrayHandle, TrayModel,
};
use migasfree_upgrade::{
    FileMarker, RebootWatcher, SessionManagerProbe, StatusTag, Trigger, UpgradeController, reboot,
};
use tokio_util::sync::CancellationToken;

use crate::config::{Config, Settings, settings_path};
use crate::headless;

/// How often the core drains tray events.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the indicator until quit is requested.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let settings_path = settings_path();
    let settings = Settings::load_or_default(&settings_path);
    let first_run = config.first_run_marker.is_file();

    // -- Tray --
    let (tray, event_tx, update_rx, event_rx) = TrayHandle::new();
    let tray_config = TrayConfig {
        initial_icon: StatusTag::Idle.icon_name(config.icon_theme),
        menu: MenuOptions {
            support: !config.support.is_empty(),
            show_console: settings.show_console,
        },
        console_visible: first_run,
        ..TrayConfig::default()
    };
    let presentation = headless::spawn(TrayModel::new(tray_config), update_rx)?;
    headless::spawn_input(event_tx)?;

    // -- Upgrade controller --
    let controller = UpgradeController::new(
        config.controller_config(settings.show_console)?,
        Arc::new(ProcessRunner::new()),
        Arc::new(tray.clone()),
    );
    let scheduler = controller.start(cancel.clone());

    // -- Reboot watcher --
    let watcher = RebootWatcher::new(Arc::new(FileMarker::new(config.reboot_marker.clone())))
        .spawn(controller.clone(), cancel.clone());

    tracing::info!("indicator ready");

    let mut menu = MenuHandler {
        label_command: config.label_command()?,
        support: config.support.clone(),
        controller,
        tray: tray.clone(),
        settings,
        settings_path,
    };

    // -- Main loop: wait for quit --
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    'main: loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("SIGINT received, shutting down");
                break;
            }
            _ = tokio::time::sleep(EVENT_POLL_INTERVAL) => {
                while let Ok(TrayEvent::Activated(id)) = event_rx.try_recv() {
                    if !menu.activate(id).await {
                        tracing::info!("quit requested via tray");
                        break 'main;
                    }
                }
            }
        }
    }

    // -- Shutdown --
    // An in-flight run is abandoned with the process.
    cancel.cancel();
    let _ = scheduler.await;
    let _ = watcher.await;
    tray.shutdown();
    let _ = tokio::task::spawn_blocking(move || presentation.join()).await;

    Ok(())
}

/// Reacts to menu activations.
struct MenuHandler {
    controller: UpgradeController,
    tray: TrayHandle,
    label_command: CommandLine,
    support: String,
    settings: Settings,
    settings_path: PathBuf,
}

impl MenuHandler {
    /// Returns `false` when the user asked to quit.
    async fn activate(&mut self, id: MenuId) -> bool {
        tracing::debug!(?id, "menu activated");

        match id {
            MenuId::ForceUpgrade => {
                self.controller.trigger(Trigger::Forced).await;
            }
            MenuId::Console => self.tray.toggle_console(),
            MenuId::ShowConsoleAlways => self.toggle_show_console(),
            MenuId::Label => spawn_command(self.label_command.clone()),
            MenuId::Support => {
                if !self.support.is_empty() {
                    spawn_command(CommandLine::new("xdg-open", [self.support.as_str()]));
                }
            }
            MenuId::About => self.tray.show_about(about_info()),
            MenuId::Reboot => {
                tokio::spawn(async {
                    if let Err(e) = reboot(&SessionManagerProbe).await {
                        tracing::error!(error = %e, "reboot failed");
                    }
                });
            }
            MenuId::Quit => return false,
        }
        true
    }

    fn toggle_show_console(&mut self) {
        let show = !self.settings.show_console;
        self.settings.show_console = show;
        self.controller.set_show_console(show);
        self.tray.set_menu_item_checked(MenuId::ShowConsoleAlways, show);

        if let Err(e) = self.settings.save(&self.settings_path) {
            tracing::warn!(error = %e, "failed to save settings");
        }
    }
}

fn spawn_command(command: CommandLine) {
    tokio::spawn(async move {
        if let Err(e) = execute_interactive(&command, true, true).await {
            tracing::warn!(error = %e, "menu command failed");
        }
    });
}

fn about_info() -> AboutInfo {
    AboutInfo {
        program_name: "Migasfree Indicator".into(),
        comments: "Indicator to view and control migasfree client actions".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        website: "http://migasfree.org/".into(),
    }
}

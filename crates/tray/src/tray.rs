//! Tray handle, events, update types and the presentation-side model.
//!
//! The actual indicator widget depends on a platform toolkit. This module
//! defines the channel-based interface the upgrade core uses to drive it,
//! independent of the GUI backend.

use std::sync::mpsc;

use crate::console::ConsoleBuffer;
use crate::menu::{MenuId, MenuItem, MenuOptions, MenuState};

/// Configuration for the tray indicator.
#[derive(Debug, Clone)]
pub struct TrayConfig {
    /// Indicator id registered with the status notifier host.
    pub indicator_id: String,
    /// Icon shown before the first run finishes.
    pub initial_icon: String,
    pub menu: MenuOptions,
    /// Console starts visible.
    pub console_visible: bool,
    /// Console line capacity.
    pub console_capacity: usize,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            indicator_id: "migasfree-indicator".into(),
            initial_icon: "migasfree-idle-dark".into(),
            menu: MenuOptions::default(),
            console_visible: false,
            console_capacity: crate::DEFAULT_CONSOLE_CAPACITY,
        }
    }
}

/// Contents of the About dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AboutInfo {
    pub program_name: String,
    pub comments: String,
    pub version: String,
    pub website: String,
}

/// Events emitted by the tray to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayEvent {
    /// User activated a menu item.
    Activated(MenuId),
}

/// Updates sent from the core to the tray.
#[derive(Debug, Clone, PartialEq)]
pub enum TrayUpdate {
    SetIcon(String),
    SetMenuItemEnabled(MenuId, bool),
    SetMenuItemChecked(MenuId, bool),
    AddMenuItem(MenuItem),
    ConsoleClear,
    ConsoleAppend(String),
    ConsoleProgress(bool),
    /// Show the console window.
    ConsoleShow,
    /// Flip console window visibility.
    ConsoleToggle,
    ShowAbout(AboutInfo),
    /// Request presentation loop shutdown.
    Shutdown,
}

/// Console window operations.
pub trait DisplaySink {
    fn clear(&self);
    fn append(&self, line: String);
    fn set_progress_pulsing(&self, pulsing: bool);
    fn show(&self);
}

/// Tray icon and menu operations.
///
/// Activation of an added item comes back as [`TrayEvent::Activated`] with
/// the item's id.
pub trait TrayPresenter {
    fn set_icon(&self, name: &str);
    fn set_menu_item_enabled(&self, id: MenuId, enabled: bool);
    fn add_menu_item(&self, item: MenuItem);
}

/// Everything the upgrade core needs from the presentation layer.
pub trait Presenter: DisplaySink + TrayPresenter + Send + Sync + 'static {}

impl<T> Presenter for T where T: DisplaySink + TrayPresenter + Send + Sync + 'static {}

/// Core-side handle for posting updates to the tray.
///
/// Cheap to clone; every clone posts to the same presentation loop, which
/// applies updates in the order they were sent. Sends after the loop has
/// gone away are dropped.
#[derive(Debug, Clone)]
pub struct TrayHandle {
    update_tx: mpsc::Sender<TrayUpdate>,
}

impl TrayHandle {
    /// Creates a new tray handle with its channel pair.
    ///
    /// Returns `(handle, event_sender, update_receiver, event_receiver)`.
    /// The event sender and update receiver belong to the presentation
    /// loop; the event receiver stays with the core.
    pub fn new() -> (
        Self,
        mpsc::Sender<TrayEvent>,
        mpsc::Receiver<TrayUpdate>,
        mpsc::Receiver<TrayEvent>,
    ) {
        let (update_tx, update_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        (Self { update_tx }, event_tx, update_rx, event_rx)
    }

    pub fn post(&self, update: TrayUpdate) {
        if self.update_tx.send(update).is_err() {
            tracing::trace!("tray update dropped, presentation loop gone");
        }
    }

    pub fn set_menu_item_checked(&self, id: MenuId, checked: bool) {
        self.post(TrayUpdate::SetMenuItemChecked(id, checked));
    }

    pub fn toggle_console(&self) {
        self.post(TrayUpdate::ConsoleToggle);
    }

    pub fn show_about(&self, info: AboutInfo) {
        self.post(TrayUpdate::ShowAbout(info));
    }

    /// Requests the presentation loop to shut down.
    pub fn shutdown(&self) {
        self.post(TrayUpdate::Shutdown);
    }
}

impl DisplaySink for TrayHandle {
    fn clear(&self) {
        self.post(TrayUpdate::ConsoleClear);
    }

    fn append(&self, line: String) {
        self.post(TrayUpdate::ConsoleAppend(line));
    }

    fn set_progress_pulsing(&self, pulsing: bool) {
        self.post(TrayUpdate::ConsoleProgress(pulsing));
    }

    fn show(&self) {
        self.post(TrayUpdate::ConsoleShow);
    }
}

impl TrayPresenter for TrayHandle {
    fn set_icon(&self, name: &str) {
        self.post(TrayUpdate::SetIcon(name.to_string()));
    }

    fn set_menu_item_enabled(&self, id: MenuId, enabled: bool) {
        self.post(TrayUpdate::SetMenuItemEnabled(id, enabled));
    }

    fn add_menu_item(&self, item: MenuItem) {
        self.post(TrayUpdate::AddMenuItem(item));
    }
}

/// Presentation-side state: what the indicator and console currently show.
#[derive(Debug, Clone)]
pub struct TrayModel {
    indicator_id: String,
    icon: String,
    menu: MenuState,
    console: ConsoleBuffer,
    about: Option<AboutInfo>,
}

impl TrayModel {
    pub fn new(config: TrayConfig) -> Self {
        let mut console = ConsoleBuffer::new(config.console_capacity);
        console.set_visible(config.console_visible);
        Self {
            indicator_id: config.indicator_id,
            icon: config.initial_icon,
            menu: MenuState::build(&config.menu),
            console,
            about: None,
        }
    }

    /// Applies one update. Returns `false` on [`TrayUpdate::Shutdown`].
    pub fn apply(&mut self, update: TrayUpdate) -> bool {
        match update {
            TrayUpdate::SetIcon(name) => self.icon = name,
            TrayUpdate::SetMenuItemEnabled(id, enabled) => {
                if !self.menu.set_enabled(id, enabled) {
                    tracing::debug!(?id, "enable for unknown menu item ignored");
                }
            }
            TrayUpdate::SetMenuItemChecked(id, checked) => {
                self.menu.set_checked(id, checked);
            }
            TrayUpdate::AddMenuItem(item) => self.menu.add(item),
            TrayUpdate::ConsoleClear => self.console.clear(),
            TrayUpdate::ConsoleAppend(line) => self.console.append(line),
            TrayUpdate::ConsoleProgress(pulsing) => self.console.set_pulsing(pulsing),
            TrayUpdate::ConsoleShow => self.console.set_visible(true),
            TrayUpdate::ConsoleToggle => {
                let visible = self.console.visible();
                self.console.set_visible(!visible);
            }
            TrayUpdate::ShowAbout(info) => self.about = Some(info),
            TrayUpdate::Shutdown => return false,
        }
        true
    }

    pub fn indicator_id(&self) -> &str {
        &self.indicator_id
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    pub fn console(&self) -> &ConsoleBuffer {
        &self.console
    }

    /// Last About dialog requested, if any.
    pub fn about(&self) -> Option<&AboutInfo> {
        self.about.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mpsc::Receiver<TrayUpdate>) -> Vec<TrayUpdate> {
        let mut updates = Vec::new();
        while let Ok(u) = rx.try_recv() {
            updates.push(u);
        }
        updates
    }

    #[test]
    fn handle_posts_in_order() {
        let (handle, _event_tx, update_rx, _event_rx) = TrayHandle::new();

        handle.clear();
        handle.append("a".into());
        handle.set_icon("migasfree");
        handle.set_menu_item_enabled(MenuId::ForceUpgrade, false);

        assert_eq!(
            drain(&update_rx),
            vec![
                TrayUpdate::ConsoleClear,
                TrayUpdate::ConsoleAppend("a".into()),
                TrayUpdate::SetIcon("migasfree".into()),
                TrayUpdate::SetMenuItemEnabled(MenuId::ForceUpgrade, false),
            ]
        );
    }

    #[test]
    fn clones_share_the_channel() {
        let (handle, _event_tx, update_rx, _event_rx) = TrayHandle::new();
        let other = handle.clone();
        other.shutdown();
        assert!(matches!(update_rx.recv().unwrap(), TrayUpdate::Shutdown));
    }

    #[test]
    fn post_after_receiver_dropped_does_not_panic() {
        let (handle, _event_tx, update_rx, _event_rx) = TrayHandle::new();
        drop(update_rx);
        handle.append("lost".into());
    }

    #[test]
    fn events_reach_the_core() {
        let (_handle, event_tx, _update_rx, event_rx) = TrayHandle::new();
        assert!(event_rx.try_recv().is_err());

        event_tx.send(TrayEvent::Activated(MenuId::Quit)).unwrap();
        assert_eq!(
            event_rx.try_recv().unwrap(),
            TrayEvent::Activated(MenuId::Quit)
        );
    }

    #[test]
    fn model_applies_console_updates() {
        let mut model = TrayModel::new(TrayConfig::default());
        assert!(!model.console().visible());

        model.apply(TrayUpdate::ConsoleAppend("old".into()));
        model.apply(TrayUpdate::ConsoleClear);
        model.apply(TrayUpdate::ConsoleShow);
        model.apply(TrayUpdate::ConsoleProgress(true));
        model.apply(TrayUpdate::ConsoleAppend("new".into()));

        assert_eq!(model.console().text(), "new");
        assert!(model.console().visible());
        assert!(model.console().pulsing());

        model.apply(TrayUpdate::ConsoleToggle);
        assert!(!model.console().visible());
    }

    #[test]
    fn model_applies_tray_updates() {
        let mut model = TrayModel::new(TrayConfig::default());
        assert_eq!(model.icon(), "migasfree-idle-dark");

        model.apply(TrayUpdate::SetIcon("dialog-warning".into()));
        model.apply(TrayUpdate::SetMenuItemEnabled(MenuId::ForceUpgrade, false));
        model.apply(TrayUpdate::AddMenuItem(MenuItem::reboot()));
        model.apply(TrayUpdate::SetMenuItemChecked(MenuId::ShowConsoleAlways, true));

        assert_eq!(model.icon(), "dialog-warning");
        assert!(!model.menu().get(MenuId::ForceUpgrade).unwrap().enabled);
        assert!(model.menu().get(MenuId::Reboot).is_some());
        assert_eq!(
            model.menu().get(MenuId::ShowConsoleAlways).unwrap().checked,
            Some(true)
        );
    }

    #[test]
    fn model_stops_on_shutdown() {
        let mut model = TrayModel::new(TrayConfig::default());
        assert!(model.apply(TrayUpdate::ConsoleClear));
        assert!(!model.apply(TrayUpdate::Shutdown));
    }

    #[test]
    fn model_records_about() {
        let mut model = TrayModel::new(TrayConfig::default());
        let info = AboutInfo {
            program_name: "Migasfree Indicator".into(),
            comments: "test".into(),
            version: "1.0".into(),
            website: "http://migasfree.org/".into(),
        };
        model.apply(TrayUpdate::ShowAbout(info.clone()));
        assert_eq!(model.about(), Some(&info));
    }

    #[test]
    fn tray_config_default() {
        let config = TrayConfig::default();
        assert_eq!(config.indicator_id, "migasfree-indicator");
        assert!(!config.console_visible);
        assert!(!config.menu.support);
    }
}

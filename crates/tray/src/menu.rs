//! Context menu model for the tray indicator.

/// Identifies a menu entry. Activations are reported back as
/// [`TrayEvent::Activated`](crate::TrayEvent::Activated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuId {
    ForceUpgrade,
    /// Toggle console window visibility.
    Console,
    /// Check item: show the console on every run.
    ShowConsoleAlways,
    Label,
    Support,
    About,
    /// Added once a reboot is pending.
    Reboot,
    Quit,
}

/// A single menu item. Items without an id are separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: Option<MenuId>,
    /// Display text.
    pub label: String,
    /// Themed icon name.
    pub icon: Option<String>,
    /// Whether the item is enabled (clickable).
    pub enabled: bool,
    /// `Some` for check items.
    pub checked: Option<bool>,
}

impl MenuItem {
    pub fn new(id: MenuId, label: impl Into<String>, icon: Option<&str>) -> Self {
        Self {
            id: Some(id),
            label: label.into(),
            icon: icon.map(str::to_owned),
            enabled: true,
            checked: None,
        }
    }

    pub fn check(id: MenuId, label: impl Into<String>, checked: bool) -> Self {
        Self {
            checked: Some(checked),
            ..Self::new(id, label, None)
        }
    }

    pub fn separator() -> Self {
        Self {
            id: None,
            label: String::new(),
            icon: None,
            enabled: false,
            checked: None,
        }
    }

    /// The persistent "restart required" entry.
    pub fn reboot() -> Self {
        Self::new(
            MenuId::Reboot,
            "Restart your computer to finish updating the system",
            Some("dialog-warning"),
        )
    }

    pub fn is_separator(&self) -> bool {
        self.id.is_none()
    }
}

/// What the initial menu depends on.
#[derive(Debug, Clone, Default)]
pub struct MenuOptions {
    /// A support URL is configured.
    pub support: bool,
    /// Initial state of "Show console always".
    pub show_console: bool,
}

/// Current menu contents.
#[derive(Debug, Clone, Default)]
pub struct MenuState {
    items: Vec<MenuItem>,
}

impl MenuState {
    /// Builds the initial menu.
    pub fn build(options: &MenuOptions) -> Self {
        let mut items = vec![
            MenuItem::new(
                MenuId::ForceUpgrade,
                "Force Upgrade",
                Some("migasfree-force-upgrade"),
            ),
            MenuItem::separator(),
            MenuItem::new(MenuId::Console, "Console", Some("migasfree-console")),
            MenuItem::check(
                MenuId::ShowConsoleAlways,
                "Show console always",
                options.show_console,
            ),
            MenuItem::separator(),
            MenuItem::new(
                MenuId::Label,
                "Identification label",
                Some("migasfree-label"),
            ),
        ];

        if options.support {
            items.push(MenuItem::new(
                MenuId::Support,
                "Support",
                Some("migasfree-support"),
            ));
        }

        items.push(MenuItem::separator());
        items.push(MenuItem::new(MenuId::About, "About", Some("help-about")));
        items.push(MenuItem::new(MenuId::Quit, "Quit", Some("application-exit")));

        Self { items }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn get(&self, id: MenuId) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.id == Some(id))
    }

    /// Returns `false` if no item has this id.
    pub fn set_enabled(&mut self, id: MenuId, enabled: bool) -> bool {
        match self.items.iter_mut().find(|i| i.id == Some(id)) {
            Some(item) => {
                item.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn set_checked(&mut self, id: MenuId, checked: bool) -> bool {
        match self.items.iter_mut().find(|i| i.id == Some(id)) {
            Some(item) if item.checked.is_some() => {
                item.checked = Some(checked);
                true
            }
            _ => false,
        }
    }

    /// Appends `item`. An item whose id is already present is ignored.
    pub fn add(&mut self, item: MenuItem) {
        if let Some(id) = item.id
            && self.get(id).is_some()
        {
            return;
        }
        self.items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_menu_without_support() {
        let menu = MenuState::build(&MenuOptions::default());
        assert!(menu.get(MenuId::Support).is_none());
        assert!(menu.get(MenuId::ForceUpgrade).unwrap().enabled);
        assert_eq!(menu.items().first().unwrap().id, Some(MenuId::ForceUpgrade));
        assert_eq!(menu.items().last().unwrap().id, Some(MenuId::Quit));
    }

    #[test]
    fn build_menu_with_support() {
        let menu = MenuState::build(&MenuOptions {
            support: true,
            show_console: false,
        });
        assert!(menu.get(MenuId::Support).is_some());
    }

    #[test]
    fn show_console_check_reflects_option() {
        let menu = MenuState::build(&MenuOptions {
            support: false,
            show_console: true,
        });
        assert_eq!(
            menu.get(MenuId::ShowConsoleAlways).unwrap().checked,
            Some(true)
        );
    }

    #[test]
    fn set_enabled_unknown_item() {
        let mut menu = MenuState::build(&MenuOptions::default());
        assert!(!menu.set_enabled(MenuId::Reboot, false));
        assert!(menu.set_enabled(MenuId::ForceUpgrade, false));
        assert!(!menu.get(MenuId::ForceUpgrade).unwrap().enabled);
    }

    #[test]
    fn set_checked_only_on_check_items() {
        let mut menu = MenuState::build(&MenuOptions::default());
        assert!(!menu.set_checked(MenuId::Console, true));
        assert!(menu.set_checked(MenuId::ShowConsoleAlways, true));
    }

    #[test]
    fn add_reboot_once() {
        let mut menu = MenuState::build(&MenuOptions::default());
        let len = menu.items().len();
        menu.add(MenuItem::reboot());
        menu.add(MenuItem::reboot());
        assert_eq!(menu.items().len(), len + 1);
        assert_eq!(
            menu.get(MenuId::Reboot).unwrap().icon.as_deref(),
            Some("dialog-warning")
        );
    }

    #[test]
    fn separators_have_no_id() {
        let menu = MenuState::build(&MenuOptions::default());
        assert!(menu.items().iter().any(MenuItem::is_separator));
    }
}

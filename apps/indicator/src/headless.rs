//! Terminal front end for the tray model.
//!
//! Without a toolkit the indicator state is applied to a [`TrayModel`] on a
//! dedicated thread and reported through the log; console text goes to
//! stdout while the console is visible. Menu entries are activated by
//! typing their command name on stdin.

use std::io::{BufRead, Write};
use std::sync::mpsc;
use std::thread::JoinHandle;

use migasfree_tray::{MenuId, TrayEvent, TrayModel, TrayUpdate};

/// Runs the presentation loop until [`TrayUpdate::Shutdown`] or until every
/// sender is gone. Returns the final model.
pub fn spawn(
    mut model: TrayModel,
    updates: mpsc::Receiver<TrayUpdate>,
) -> std::io::Result<JoinHandle<TrayModel>> {
    std::thread::Builder::new()
        .name("tray".into())
        .spawn(move || {
            tracing::info!(
                id = model.indicator_id(),
                icon = model.icon(),
                "indicator active"
            );
            while let Ok(update) = updates.recv() {
                report(&model, &update);
                if !model.apply(update) {
                    break;
                }
            }
            model
        })
}

fn report(model: &TrayModel, update: &TrayUpdate) {
    match update {
        TrayUpdate::SetIcon(icon) => tracing::info!(%icon, "tray icon"),
        TrayUpdate::SetMenuItemEnabled(id, enabled) => {
            tracing::debug!(?id, enabled, "menu item")
        }
        TrayUpdate::AddMenuItem(item) => tracing::info!(label = %item.label, "menu item added"),
        TrayUpdate::ConsoleAppend(line) if model.console().visible() => {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{line}");
        }
        TrayUpdate::ConsoleShow if !model.console().visible() => {
            // Replay what the window would show on opening.
            let mut out = std::io::stdout().lock();
            for line in model.console().lines() {
                let _ = writeln!(out, "{line}");
            }
        }
        TrayUpdate::ShowAbout(about) => {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(
                out,
                "{} {}\n{}\n{}",
                about.program_name, about.version, about.comments, about.website
            );
        }
        _ => {}
    }
}

/// Maps a typed command to the menu entry it activates.
pub fn parse_command(input: &str) -> Option<MenuId> {
    match input.trim().to_ascii_lowercase().as_str() {
        "force-upgrade" | "upgrade" => Some(MenuId::ForceUpgrade),
        "console" => Some(MenuId::Console),
        "show-console-always" => Some(MenuId::ShowConsoleAlways),
        "label" => Some(MenuId::Label),
        "support" => Some(MenuId::Support),
        "about" => Some(MenuId::About),
        "reboot" | "restart" => Some(MenuId::Reboot),
        "quit" | "exit" => Some(MenuId::Quit),
        _ => None,
    }
}

/// Reads menu commands from stdin until EOF. The thread is detached: a
/// blocked read cannot be interrupted.
pub fn spawn_input(events: mpsc::Sender<TrayEvent>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("tray-input".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(id) => {
                        if events.send(TrayEvent::Activated(id)).is_err() {
                            break;
                        }
                    }
                    None => tracing::warn!(command = %line.trim(), "unknown menu command"),
                }
            }
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use migasfree_tray::{MenuItem, TrayConfig};

    use super::*;

    #[test]
    fn parse_known_commands() {
        assert_eq!(parse_command("force-upgrade"), Some(MenuId::ForceUpgrade));
        assert_eq!(parse_command("  Quit \n"), Some(MenuId::Quit));
        assert_eq!(parse_command("reboot"), Some(MenuId::Reboot));
        assert_eq!(parse_command("show-console-always"), Some(MenuId::ShowConsoleAlways));
    }

    #[test]
    fn parse_unknown_command() {
        assert_eq!(parse_command("dance"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn loop_applies_updates_until_shutdown() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn(TrayModel::new(TrayConfig::default()), rx).unwrap();

        tx.send(TrayUpdate::ConsoleAppend("a".into())).unwrap();
        tx.send(TrayUpdate::SetIcon("migasfree".into())).unwrap();
        tx.send(TrayUpdate::AddMenuItem(MenuItem::reboot())).unwrap();
        tx.send(TrayUpdate::Shutdown).unwrap();
        tx.send(TrayUpdate::SetIcon("ignored".into())).unwrap();

        let model = handle.join().unwrap();
        assert_eq!(model.icon(), "migasfree");
        assert_eq!(model.console().text(), "a");
        assert!(model.menu().get(MenuId::Reboot).is_some());
    }

    #[test]
    fn loop_ends_when_senders_drop() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn(TrayModel::new(TrayConfig::default()), rx).unwrap();
        tx.send(TrayUpdate::ConsoleShow).unwrap();
        drop(tx);
        assert!(handle.join().unwrap().console().visible());
    }
}

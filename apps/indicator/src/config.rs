//! Indicator configuration.
//!
//! System configuration is TOML under an `[indicator]` table:
//! - `/etc/migasfree-indicator.toml` (override with `--config`)
//!
//! Per-user settings are stored as TOML:
//! - `~/.config/migasfree-indicator/settings.toml`

use std::path::{Path, PathBuf};

use anyhow::Context;
use migasfree_runner::CommandLine;
use migasfree_upgrade::{
    ControllerConfig, DEFAULT_INTERVAL_HOURS, IconTheme, REBOOT_REQUIRED_MARKER, UpgradeCommands,
    interval_from_hours,
};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/migasfree-indicator.toml";

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    indicator: Config,
}

/// System configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Scheduled runs use the forced upgrade command.
    #[serde(default)]
    pub force_upgrade: bool,

    /// Hours between scheduled runs.
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Support URL; the Support menu entry only appears when set.
    #[serde(default)]
    pub support: String,

    /// Foreground variant of the status icons.
    #[serde(default)]
    pub icon_theme: IconTheme,

    #[serde(default = "default_upgrade_command")]
    pub upgrade_command: String,

    #[serde(default = "default_force_upgrade_command")]
    pub force_upgrade_command: String,

    /// Shows the machine identification label.
    #[serde(default = "default_label_command")]
    pub label_command: String,

    #[serde(default = "default_reboot_marker")]
    pub reboot_marker: PathBuf,

    /// Present until the client's first registration completes; the
    /// console starts visible while it exists.
    #[serde(default = "default_first_run_marker")]
    pub first_run_marker: PathBuf,
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_HOURS
}

fn default_upgrade_command() -> String {
    "sudo migasfree-launcher".into()
}

fn default_force_upgrade_command() -> String {
    "sudo migasfree-launcher force-upgrade".into()
}

fn default_label_command() -> String {
    "migasfree-label".into()
}

fn default_reboot_marker() -> PathBuf {
    PathBuf::from(REBOOT_REQUIRED_MARKER)
}

fn default_first_run_marker() -> PathBuf {
    PathBuf::from("/var/tmp/migasfree/first-tags.conf")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            force_upgrade: false,
            interval: default_interval(),
            support: String::new(),
            icon_theme: IconTheme::default(),
            upgrade_command: default_upgrade_command(),
            force_upgrade_command: default_force_upgrade_command(),
            label_command: default_label_command(),
            reboot_marker: default_reboot_marker(),
            first_run_marker: default_first_run_marker(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or the defaults if it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.indicator)
    }

    /// Applies command-line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.force_upgrade {
            self.force_upgrade = true;
        }
        if let Some(interval) = cli.interval {
            self.interval = interval;
        }
        if let Some(support) = &cli.support {
            self.support = support.clone();
        }
    }

    pub fn label_command(&self) -> anyhow::Result<CommandLine> {
        CommandLine::parse(&self.label_command).context("label_command")
    }

    /// Builds the controller configuration.
    pub fn controller_config(&self, show_console: bool) -> anyhow::Result<ControllerConfig> {
        let commands = UpgradeCommands {
            standard: CommandLine::parse(&self.upgrade_command).context("upgrade_command")?,
            forced: CommandLine::parse(&self.force_upgrade_command)
                .context("force_upgrade_command")?,
        };

        Ok(ControllerConfig {
            commands,
            force_upgrade: self.force_upgrade,
            interval: interval_from_hours(self.interval),
            theme: self.icon_theme,
            show_console,
        })
    }
}

/// Per-user settings changed from the menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Bring up the console on every run.
    #[serde(default)]
    pub show_console: bool,
}

impl Settings {
    /// Loads settings from `path`; a missing or unreadable file yields the
    /// defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring user settings");
                Self::default()
            }
        }
    }

    fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // Restrict permissions on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }
}

/// Returns the per-user settings file path.
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home)
        .join(".config")
        .join("migasfree-indicator")
        .join("settings.toml")
}

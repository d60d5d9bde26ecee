//! Controller configuration.

use std::time::Duration;

use migasfree_runner::CommandLine;

use crate::status::IconTheme;

/// Hours between scheduled runs when none is configured.
pub const DEFAULT_INTERVAL_HOURS: u64 = 24;

/// Converts a configured interval in hours; `0` means the default.
///
/// Values too large to express in seconds saturate.
pub fn interval_from_hours(hours: u64) -> Duration {
    let hours = match hours {
        0 => DEFAULT_INTERVAL_HOURS,
        h => h,
    };
    Duration::from_secs(hours.saturating_mul(3600))
}

/// The two upgrade command variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeCommands {
    pub standard: CommandLine,
    pub forced: CommandLine,
}

impl UpgradeCommands {
    pub fn select(&self, forced: bool) -> &CommandLine {
        if forced { &self.forced } else { &self.standard }
    }
}

impl Default for UpgradeCommands {
    fn default() -> Self {
        Self {
            standard: CommandLine::new("sudo", ["migasfree-launcher"]),
            forced: CommandLine::new("sudo", ["migasfree-launcher", "force-upgrade"]),
        }
    }
}

/// Everything the controller needs, fixed at construction.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub commands: UpgradeCommands,
    /// Scheduled runs use the forced command.
    pub force_upgrade: bool,
    /// Time between scheduled runs.
    pub interval: Duration,
    pub theme: IconTheme,
    /// Initial state of "show console always".
    pub show_console: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            commands: UpgradeCommands::default(),
            force_upgrade: false,
            interval: interval_from_hours(DEFAULT_INTERVAL_HOURS),
            theme: IconTheme::default(),
            show_console: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_conversion() {
        assert_eq!(interval_from_hours(1), Duration::from_millis(3_600_000));
        assert_eq!(interval_from_hours(0), Duration::from_secs(24 * 3600));
    }

    #[test]
    fn huge_interval_saturates() {
        assert_eq!(interval_from_hours(u64::MAX / 1000), Duration::from_secs(u64::MAX));
        assert_eq!(interval_from_hours(u64::MAX), Duration::from_secs(u64::MAX));
        assert_eq!(
            interval_from_hours(1_000_000_000_000),
            Duration::from_secs(3_600_000_000_000_000)
        );
    }

    #[test]
    fn select_variant() {
        let commands = UpgradeCommands::default();
        assert_eq!(commands.select(false).to_string(), "sudo migasfree-launcher");
        assert_eq!(
            commands.select(true).to_string(),
            "sudo migasfree-launcher force-upgrade"
        );
    }

    #[test]
    fn default_config() {
        let config = ControllerConfig::default();
        assert!(!config.force_upgrade);
        assert_eq!(config.interval, Duration::from_secs(86_400));
        assert!(!config.show_console);
    }
}

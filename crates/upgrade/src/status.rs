//! Exit code classification and status icons.

use serde::{Deserialize, Serialize};

/// Icon shown while a run is in flight.
pub const UPGRADING_ICON: &str = "migasfree";

/// Icon shown once a reboot is pending.
pub const REBOOT_ICON: &str = "dialog-warning";

/// Status derived from the last run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTag {
    /// Last run succeeded (or none has run yet).
    #[default]
    Idle,
    Upgrading,
    /// Last run failed.
    Warning,
    /// Last run could not reach the server.
    Error,
}

/// Maps a run's exit code to its status.
///
/// `None` (killed by a signal, status unavailable) counts as a generic
/// failure.
pub fn classify(exit_code: Option<i32>) -> StatusTag {
    match exit_code {
        Some(0) => StatusTag::Idle,
        Some(libc::ECONNREFUSED) => StatusTag::Error,
        _ => StatusTag::Warning,
    }
}

/// Foreground variant of the status icons, matching the panel background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconTheme {
    /// Dark icons for light panels.
    #[default]
    Dark,
    Light,
}

impl IconTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl StatusTag {
    pub fn icon_name(&self, theme: IconTheme) -> String {
        match self {
            Self::Idle => format!("migasfree-idle-{}", theme.as_str()),
            Self::Upgrading => UPGRADING_ICON.to_string(),
            Self::Warning => format!("migasfree-warning-{}", theme.as_str()),
            Self::Error => format!("migasfree-error-{}", theme.as_str()),
        }
    }
}

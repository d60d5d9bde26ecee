//! Upgrade control loop for the migasfree indicator.
//!
//! - [`UpgradeController`] runs the client upgrade command on a timer or on
//!   demand, one run at a time, streaming its output to the console.
//! - [`classify`] turns the exit code into a [`StatusTag`] shown as the
//!   tray icon.
//! - [`RebootWatcher`] polls the reboot-required marker and, once it trips,
//!   switches the indicator into restart-required mode for good.
//! - [`NetworkGate`] holds startup until a default gateway exists.

mod config;
mod controller;
mod network;
mod reboot;
mod status;

pub use config::{ControllerConfig, DEFAULT_INTERVAL_HOURS, UpgradeCommands, interval_from_hours};
pub use controller::{RebootCheck, Trigger, UpgradeController};
pub use network::{
    GATEWAY_POLL_INTERVAL, GateError, GatewayProbe, NetworkGate, ProcNetRoute, WAIT_GATEWAY_TIMEOUT,
    parse_default_gateway,
};
pub use reboot::{
    FileMarker, FixedRebootCommand, REBOOT_CHECK_INTERVAL, REBOOT_REQUIRED_MARKER,
    RebootCommandProvider, RebootFuture, RebootMarker, RebootWatcher, SessionManagerProbe, reboot,
};
pub use status::{IconTheme, REBOOT_ICON, StatusTag, UPGRADING_ICON, classify};

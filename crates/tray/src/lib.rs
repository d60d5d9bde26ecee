//! Tray indicator and console presentation interface.
//!
//! The upgrade core never touches widgets. It talks to the presentation
//! layer through channels:
//! - [`TrayUpdate`]: commands from the core to the presentation loop (set
//!   icon, enable a menu item, append console text, ...)
//! - [`TrayEvent`]: menu activations from the presentation loop to the core
//!
//! [`TrayHandle`] is the core-side sender and implements [`DisplaySink`] and
//! [`TrayPresenter`]. [`TrayModel`] is the presentation-side state the
//! updates are applied to, in the order they were posted.
//!
//! # Platform notes
//! - Updates may be posted from any thread; they are applied only by the
//!   thread that owns the receiver.

mod console;
mod menu;
mod tray;

pub use console::{ConsoleBuffer, DEFAULT_CONSOLE_CAPACITY};
pub use menu::{MenuId, MenuItem, MenuOptions, MenuState};
pub use tray::{
    AboutInfo, DisplaySink, Presenter, TrayConfig, TrayEvent, TrayHandle, TrayModel, TrayPresenter,
    TrayUpdate,
};

//! A manual tiling overlay for EWMH-compliant X11 window managers.
//!
//! This crate owns no window manager itself: it mirrors the display's
//! desktops, viewports, screens and windows into an in-memory
//! [WorldModel](world::WorldModel), tiles them with one of five
//! [Tiler](layout::Tiler) strategies, and drives both from hotkeys and
//! from an IPC socket. `pytyled` wires these pieces into a running
//! daemon; `pytylectl` is the one-shot client that talks to its socket.
//!
//! The library itself never installs a `tracing` subscriber — only the
//! `pytyled` binary does, so embedding this crate elsewhere does not
//! hijack the host's logging setup.
pub mod actions;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod display;
pub mod error;
pub mod event;
pub mod geometry;
pub mod ids;
pub mod ipc;
pub mod layout;
pub mod scheduler;
pub mod storage;
pub mod tile_state;
pub mod world;

pub use config::Config;
pub use dispatcher::{dispatch_action, dispatch_key, Keymap};
pub use display::{DisplayPort, DisplayPortExt, MockDisplay, X11rbDisplay};
pub use error::{Error, Result};
pub use ids::{DesktopId, ScreenId, ViewportId, WindowId};
pub use layout::Tiler;
pub use scheduler::Scheduler;
pub use world::{ScreenHandle, WorldModel};

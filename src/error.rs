//! The error taxonomy shared by every component (see §7 of the design
//! notes: local-window errors are swallowed at the call site and never
//! make it this far; only transport and config errors are expected to
//! propagate out of the [Scheduler][crate::scheduler::Scheduler] loop).
use crate::ids::WindowId;
use crate::world::ScreenHandle;

/// Crate wide result alias, matching the convention used throughout the
/// rest of this codebase.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong talking to the display, parsing
/// configuration, or walking the world model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The connection to the display server was lost or a request to it
    /// failed outright. Recovered by polling for the window manager to
    /// come back and re-running bootstrap (§7 policy).
    #[error("the display connection failed: {0}")]
    Transport(String),

    /// A keypress was received for a (keycode, modmask) pair that is not
    /// registered in the current bindings. Logged and ignored.
    #[error("no binding registered for keycode {keycode} with modmask {modmask:#x}")]
    UnknownBinding {
        /// The raw keycode that was pressed.
        keycode: u8,
        /// The normalized modifier mask that was held.
        modmask: u16,
    },

    /// A configured action name does not resolve to a known [Tiler]
    /// command. Reported at config load time and skipped.
    ///
    /// [Tiler]: crate::layout::Tiler
    #[error("'{0}' is not a known action")]
    UnknownAction(String),

    /// A property query was made against a window that no longer exists.
    /// The window is deleted from the world on the next reconciliation
    /// sweep.
    #[error("window {0:?} no longer exists")]
    StaleWindow(WindowId),

    /// The configuration file could not be parsed. The caller falls back
    /// to `Config::default()`.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    /// An operation referenced a screen that is not part of the current
    /// world model.
    #[error("{0:?} is not a known screen")]
    UnknownScreen(ScreenHandle),

    /// An operation referenced a window that is not part of the current
    /// world model.
    #[error("{0:?} is not a known window")]
    UnknownWindow(WindowId),

    /// The display reported zero screens: there is nowhere to tile.
    #[error("the display reported no screens")]
    NoScreens,

    /// A client/daemon IPC call failed at the transport layer.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

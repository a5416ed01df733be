//! Display Port (§2, §6): the thin abstraction over the X11 server that
//! keeps every X type out of the rest of the crate. Grounded on the
//! teacher's `x::XConn`/`x::XConnExt` split — a narrow trait of
//! required primitives plus default-provided convenience methods.
pub(crate) mod mock;
mod x11rb_backend;

pub use mock::MockDisplay;
pub use x11rb_backend::X11rbDisplay;

use bitflags::bitflags;

use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::ids::{DesktopId, WindowId};
use crate::world::window::Decorations;

bitflags! {
    /// Normalized modifier mask (§4.2): the raw event state is filtered
    /// down to these four bits; if none are set the binding is
    /// registered under [ModMask::ANY] instead.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModMask: u16 {
        const SHIFT = 0b0001;
        const CONTROL = 0b0010;
        const MOD1 = 0b0100;
        const MOD4 = 0b1000;
        const ANY = 0b1_0000;
    }
}

/// A hotkey binding as registered with the Display Port: the Dispatcher
/// resolves `(keycode, modmask)` pairs from incoming KeyPress events
/// against its own registry, but grabbing happens in terms of keysyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub keysym: u32,
    pub modmask: ModMask,
}

/// One physical monitor rectangle as reported by the Display Port,
/// either via Xinerama or as a single synthesized screen equal to
/// `_NET_DESKTOP_GEOMETRY` (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub rect: Rect,
}

/// Everything the World Model needs to know about one reported desktop
/// (§4.1, §6).
#[derive(Debug, Clone)]
pub struct DesktopInfo {
    pub id: DesktopId,
    pub name: String,
    pub workarea: Rect,
    pub resolution: (i32, i32),
    /// Compiz-style viewport origin within this desktop; `(0, 0)` for
    /// non-viewport managers, one entry per viewport otherwise.
    pub viewport_origins: Vec<Point>,
}

/// Attributes of a single window as read from the display (§3).
#[derive(Debug, Clone)]
pub struct WindowAttrs {
    pub desktop: DesktopId,
    pub rect: Rect,
    pub decorations: Decorations,
    pub title: String,
    pub class: (String, String),
    pub static_gravity: bool,
    pub popup: bool,
    pub hidden: bool,
}

/// An event as read off the wire, before classification (§4.2). Mirrors
/// exactly the raw inputs the Event Classifier table is keyed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEvent {
    /// `window` is the id the property changed on, or the root window
    /// for root properties (the Event Classifier only reports a window
    /// id back to callers for non-root notifications).
    PropertyNotify {
        is_root: bool,
        atom: String,
        window: WindowId,
    },
    FocusInNormal,
    KeyPress { keycode: u8, modmask: ModMask },
    ConfigureNotify { window: WindowId, is_root: bool },
    CreateNotify { window: WindowId },
    DestroyNotify { window: WindowId },
}

/// Which client message to send to unmaximize/maximize a window before
/// a configure request, or on `max_all`/`restore_all` (§4.4, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmStateRequest {
    Maximize,
    Unmaximize,
}

/// Thin abstraction over the X11 server. All X types are confined to
/// implementations of this trait; the rest of the crate only ever sees
/// [WindowId], [Rect], [Point] and the structs above.
pub trait DisplayPort {
    fn root(&self) -> WindowId;

    /// Whether a compliant window manager is currently running
    /// (`_NET_SUPPORTING_WM_CHECK`).
    fn is_wm_running(&self) -> bool;

    /// Physical monitor rectangles, via Xinerama if present, else a
    /// single screen equal to `_NET_DESKTOP_GEOMETRY`.
    fn screens(&self) -> Result<Vec<ScreenGeometry>>;

    fn desktops(&self) -> Result<Vec<DesktopInfo>>;

    fn current_desktop(&self) -> Result<DesktopId>;

    /// Whether the window manager exposes Compiz-style viewports larger
    /// than one screen (§4.1).
    fn uses_viewports(&self) -> bool;

    fn client_list(&self) -> Result<Vec<WindowId>>;

    fn active_window(&self) -> Result<Option<WindowId>>;

    fn window_attrs(&self, id: WindowId) -> Result<WindowAttrs>;

    /// Translate window-relative geometry to root-window coordinates.
    /// Only meaningful for non-Compiz managers (§4.1); Compiz-managed
    /// geometry is already desktop-relative and the viewport origin is
    /// added instead.
    fn translate_to_root(&self, id: WindowId, p: Point) -> Result<Point>;

    /// Grab every binding and return each one paired with the keycode it
    /// resolved to, so the caller can build its own keycode -> action table
    /// for interpreting later `RawEvent::KeyPress`. Bindings whose keysym
    /// doesn't exist on the current keyboard mapping are silently dropped.
    fn grab_keys(&self, bindings: &[KeyBinding]) -> Result<Vec<(KeyBinding, u8)>>;

    fn ungrab_keys(&self) -> Result<()>;

    /// Block for up to `timeout_ms` for the next event. `None` means the
    /// wait timed out with nothing to report (§4.7 step 3).
    fn next_event(&mut self, timeout_ms: u64) -> Result<Option<RawEvent>>;

    fn configure_window(&self, id: WindowId, rect: Rect) -> Result<()>;

    fn activate_window(&self, id: WindowId) -> Result<()>;

    fn close_window(&self, id: WindowId) -> Result<()>;

    /// Reset `win_gravity` to `NorthWest` (§4.4 geometry helper step a).
    fn reset_static_gravity(&self, id: WindowId) -> Result<()>;

    fn send_wm_state(&self, id: WindowId, request: WmStateRequest) -> Result<()>;

    /// Toggle the Openbox `_OB_WM_STATE_UNDECORATED` hint, used by
    /// `untile` to restore original decoration state when configured
    /// to do so (§6, `original_decor`).
    fn set_undecorated(&self, id: WindowId, undecorated: bool) -> Result<()>;
}

/// Convenience/derived operations built on the primitives above.
/// Grounded on the teacher's `XConnExt` blanket-impl pattern: a default
/// method set implemented once in terms of the minimal required trait.
pub trait DisplayPortExt: DisplayPort {
    /// The shared geometry helper (§4.4): reset gravity to NorthWest if
    /// the window requested `StaticGravity`, subtract decoration extents
    /// (or a 2px inset if decorations are disabled), unmaximize, then
    /// configure.
    fn apply_tile_geometry(
        &self,
        id: WindowId,
        target: Rect,
        static_gravity: bool,
        decorations: Option<Decorations>,
    ) -> Result<()> {
        if static_gravity {
            self.reset_static_gravity(id)?;
        }
        self.send_wm_state(id, WmStateRequest::Unmaximize)?;

        let shrunk = match decorations {
            Some(d) => Rect::new(
                target.x,
                target.y,
                (target.w - d.horizontal()).max(0),
                (target.h - d.vertical()).max(0),
            ),
            None => target.shrink(2),
        };

        self.configure_window(id, shrunk)
    }
}

impl<T: DisplayPort + ?Sized> DisplayPortExt for T {}

//! A physical monitor rectangle, and the tiling state attached to it.
use std::collections::HashMap;
use std::fmt;

use crate::geometry::Rect;
use crate::ids::{DesktopId, ScreenId, ViewportId, WindowId};
use crate::layout::Tiler;
use crate::world::window::Window;

/// A path uniquely identifying one [Screen] within the world model.
///
/// A bare [ScreenId] is only unique within its [Viewport][crate::world::Viewport]
/// (it is the xinerama head index), so anything that needs to refer to a
/// screen from outside that viewport — the tiling queue, the dispatcher's
/// "which screen is this keypress for" lookup, `screen_put` — carries the
/// full path instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ScreenHandle {
    pub desktop: DesktopId,
    pub viewport: ViewportId,
    pub screen: ScreenId,
}

impl ScreenHandle {
    pub fn new(desktop: DesktopId, viewport: ViewportId, screen: ScreenId) -> Self {
        Self {
            desktop,
            viewport,
            screen,
        }
    }
}

impl fmt::Display for ScreenHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "desktop {} / viewport {} / screen {}",
            self.desktop.0, self.viewport.0, self.screen.0
        )
    }
}

/// A single physical monitor, scoped to one desktop/viewport combination.
///
/// Per (I5) every field here except `tiler` participates in the active
/// path `desktop -> viewport -> screen -> window`; `active` is the
/// bottom of that chain and may be `None` only when `windows` is empty.
#[derive(Debug)]
pub struct Screen {
    pub id: ScreenId,
    /// Rectangle relative to the viewport's origin, after translation
    /// (§4.1).
    pub rect: Rect,
    pub windows: HashMap<WindowId, Window>,
    pub active: Option<WindowId>,
    pub tiling_enabled: bool,
    pub is_tiled: bool,
    pub tiler: Tiler,
}

impl Screen {
    pub fn new(id: ScreenId, rect: Rect, tiler: Tiler) -> Self {
        Self {
            id,
            rect,
            windows: HashMap::new(),
            active: None,
            tiling_enabled: false,
            is_tiled: false,
            tiler,
        }
    }

    /// (I5): a geometry-change triggered rebuild gets a fresh, untiled
    /// screen at the same index with a freshly reset tiler (§3 Lifecycles).
    pub fn rebuild_in_place(&mut self, rect: Rect, tiler: Tiler) {
        self.rect = rect;
        self.windows.clear();
        self.active = None;
        self.tiling_enabled = false;
        self.is_tiled = false;
        self.tiler = tiler;
    }

    /// Half-open containment test against this screen's rectangle
    /// (§4.1 placement rule 2 of 2, after the viewport test).
    pub fn contains(&self, p: crate::geometry::Point) -> bool {
        self.rect.contains_point(p)
    }

    /// Non-hidden, non-popup windows currently believed to be on this
    /// screen — the universe Tile Storage draws from on reload (§4.3).
    pub fn tileable_windows(&self) -> impl Iterator<Item = &Window> {
        self.windows.values().filter(|w| !w.hidden && !w.popup)
    }
}

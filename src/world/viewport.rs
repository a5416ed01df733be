//! A Compiz-style pan region inside a desktop, or the trivial 1:1
//! viewport that non-Compiz managers expose.
use std::collections::HashMap;

use crate::geometry::{Point, Rect};
use crate::ids::ScreenId;
use crate::world::screen::Screen;

/// Owns the set of physical screens visible while this viewport is the
/// one being panned to (§3).
#[derive(Debug)]
pub struct Viewport {
    pub id: crate::ids::ViewportId,
    pub origin: Point,
    pub extent: (i32, i32),
    pub screens: HashMap<ScreenId, Screen>,
}

impl Viewport {
    pub fn new(id: crate::ids::ViewportId, origin: Point, extent: (i32, i32)) -> Self {
        Self {
            id,
            origin,
            extent,
            screens: HashMap::new(),
        }
    }

    /// The pan region's rectangle in desktop coordinates.
    pub fn rect(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.extent.0, self.extent.1)
    }

    /// Half-open containment test, the first of the two tests used to
    /// place a window by raw (desktop, x, y) (§4.1).
    pub fn contains(&self, p: Point) -> bool {
        self.rect().contains_point(p)
    }
}

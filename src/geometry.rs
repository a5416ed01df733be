//! Geometry primitives shared by the world model, tile storage and
//! layout algorithms.
//!
//! Grounded on the teacher's `pure::geometry` module, but widened to
//! signed coordinates: §4.1 requires that windows with negative (x, y)
//! be treated as residing at the viewport/screen origin, which an
//! unsigned `Rect` cannot represent.
use serde::{Deserialize, Serialize};

/// An (x, y) coordinate pair, relative to whatever origin the caller has
/// in mind (root window, viewport, or screen).
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A rectangle: top-left corner plus extent. Used for desktops,
/// viewports, screens and windows alike.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// The top-left corner as a [Point].
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Half-open containment test: `[x, x+w)` x `[y, y+h)`. Used for the
    /// viewport/screen placement tests in §4.1.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    /// Shrink every edge inward by `n` pixels (used to inset a decoration
    /// allowance when real decoration extents are unavailable, §4.4).
    pub fn shrink(&self, n: i32) -> Self {
        Self {
            x: self.x + n,
            y: self.y + n,
            w: (self.w - 2 * n).max(0),
            h: (self.h - 2 * n).max(0),
        }
    }

    /// Translate this rect by the given offset.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Split this rect into `n` evenly sized rows (top to bottom). A
    /// request for zero rows returns an empty vec; one row returns `self`
    /// unchanged.
    pub fn as_rows(&self, n: u32) -> Vec<Rect> {
        if n == 0 {
            return vec![];
        }
        if n == 1 {
            return vec![*self];
        }
        let h = self.h / n as i32;
        (0..n as i32)
            .map(|i| {
                if i == n as i32 - 1 {
                    Rect::new(self.x, self.y + i * h, self.w, self.h - i * h)
                } else {
                    Rect::new(self.x, self.y + i * h, self.w, h)
                }
            })
            .collect()
    }

    /// Split this rect into `n` evenly sized columns (left to right).
    pub fn as_columns(&self, n: u32) -> Vec<Rect> {
        if n == 0 {
            return vec![];
        }
        if n == 1 {
            return vec![*self];
        }
        let w = self.w / n as i32;
        (0..n as i32)
            .map(|i| {
                if i == n as i32 - 1 {
                    Rect::new(self.x + i * w, self.y, self.w - i * w, self.h)
                } else {
                    Rect::new(self.x + i * w, self.y, w, self.h)
                }
            })
            .collect()
    }

    /// Split into two columns: the first of width `left_w`, the second
    /// taking the remainder.
    pub fn split_at_width(&self, left_w: i32) -> (Rect, Rect) {
        let left_w = left_w.clamp(0, self.w);
        (
            Rect::new(self.x, self.y, left_w, self.h),
            Rect::new(self.x + left_w, self.y, self.w - left_w, self.h),
        )
    }

    /// Split into two rows: the first of height `top_h`, the second
    /// taking the remainder.
    pub fn split_at_height(&self, top_h: i32) -> (Rect, Rect) {
        let top_h = top_h.clamp(0, self.h);
        (
            Rect::new(self.x, self.y, self.w, top_h),
            Rect::new(self.x, self.y + top_h, self.w, self.h - top_h),
        )
    }
}

/// Per-screen dock-inset override for the `[workarea]` config section
/// (§6): `{top, bottom, left, right}`, applied on top of the detected
/// workarea when more than one Xinerama head is present.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insets {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl Insets {
    pub fn apply(&self, r: Rect) -> Rect {
        Rect::new(
            r.x + self.left,
            r.y + self.top,
            (r.w - self.left - self.right).max(0),
            (r.h - self.top - self.bottom).max(0),
        )
    }
}

//! A single client window as tracked by the world model.
use crate::geometry::Rect;
use crate::ids::{DesktopId, WindowId};

/// Decoration extents on each edge of a window's frame, in pixels. Used
/// by the layout geometry helper (§4.4) to shrink a tile placement down
/// to the client area.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Decorations {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Decorations {
    pub fn new(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

/// A client window and the attributes the world model cares about.
///
/// `original` is only ever populated by [Window::save_geometry], which
/// every [Tiler::tile][crate::layout::Tiler::tile] call makes before
/// taking over a window that was not already under tiling control (§4.4):
/// it is the rectangle `untile` restores.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub id: WindowId,
    pub desktop: DesktopId,
    pub rect: Rect,
    pub decorations: Decorations,
    pub title: String,
    pub class: (String, String),
    pub static_gravity: bool,
    pub popup: bool,
    pub hidden: bool,
    pub original: Option<Rect>,
}

impl Window {
    pub fn new(id: WindowId, desktop: DesktopId, rect: Rect) -> Self {
        Self {
            id,
            desktop,
            rect,
            decorations: Decorations::default(),
            title: String::new(),
            class: (String::new(), String::new()),
            static_gravity: false,
            popup: false,
            hidden: false,
            original: None,
        }
    }

    /// Capture the current rectangle as the one to restore to on
    /// `untile`, per the Tiler `tile` command (§4.4).
    pub fn save_geometry(&mut self) {
        self.original = Some(self.rect);
    }

    /// Whether `needle` case-insensitively appears as a substring of
    /// either class name. Grounded on §9's Open Question: title is
    /// explicitly *not* matched, mirroring the original's disabled
    /// title-match branch.
    pub fn class_matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.class.0.to_lowercase().contains(&needle) || self.class.1.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_match_is_case_insensitive_and_checks_both_slots() {
        let mut w = Window::new(WindowId(1), DesktopId(0), Rect::default());
        w.class = ("Dunst".into(), "dunst".into());
        assert!(w.class_matches("DUNST"));
        assert!(!w.class_matches("firefox"));
    }

    #[test]
    fn save_geometry_captures_current_rect_only_when_called() {
        let mut w = Window::new(WindowId(1), DesktopId(0), Rect::new(0, 0, 100, 100));
        assert_eq!(w.original, None);
        w.save_geometry();
        assert_eq!(w.original, Some(Rect::new(0, 0, 100, 100)));
    }
}

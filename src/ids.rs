//! Small integer handles for every node in the world model.
//!
//! The Python original threaded `window -> screen -> viewport -> desktop`
//! back-references directly through the objects, which forms reference
//! cycles that only a garbage collector can hide. Per the redesign
//! guidance this is rebuilt as handles into owning collections: a
//! [Window] only ever knows its [WindowId]; everything else is looked up
//! through the [WorldModel][crate::world::WorldModel] by handle, so
//! there is nothing here for the borrow checker to fight over.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a [Desktop][crate::world::Desktop] within the world model.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DesktopId(pub usize);

/// Index of a [Viewport][crate::world::Viewport] within its [Desktop][crate::world::Desktop].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewportId(pub usize);

/// Index of a [Screen][crate::world::Screen] within its [Viewport][crate::world::Viewport].
/// This is the xinerama head index, or `0` when xinerama is unavailable.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScreenId(pub usize);

/// A hex-normalized X11 window id. Globally unique for the lifetime of
/// the window, which makes it usable directly as the key of the flat
/// index in [WorldModel][crate::world::WorldModel] as well as the id
/// carried inside [Screen::windows][crate::world::Screen].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u32);

impl WindowId {
    /// Parse a window id from a hex string as reported by the display
    /// port (e.g. `"0x3400007"`), normalizing away any `0x` prefix.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches("0x").trim_start_matches("0X");
        u32::from_str_radix(s, 16).ok().map(WindowId)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u32> for WindowId {
    fn from(id: u32) -> Self {
        WindowId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_strips_prefix() {
        assert_eq!(WindowId::from_hex("0x3400007"), Some(WindowId(0x3400007)));
        assert_eq!(WindowId::from_hex("3400007"), Some(WindowId(0x3400007)));
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert_eq!(WindowId::from_hex("not-hex"), None);
    }
}

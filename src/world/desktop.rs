//! A virtual workspace index exposed by the window manager.
use std::collections::HashMap;

use crate::geometry::Rect;
use crate::ids::ViewportId;
use crate::world::viewport::Viewport;

#[derive(Debug)]
pub struct Desktop {
    pub id: crate::ids::DesktopId,
    /// The desktop's workarea: full desktop geometry minus struts (§GLOSSARY).
    pub workarea: Rect,
    /// The full, un-strutted desktop resolution.
    pub resolution: (i32, i32),
    pub name: String,
    pub viewports: HashMap<ViewportId, Viewport>,
}

impl Desktop {
    pub fn new(
        id: crate::ids::DesktopId,
        workarea: Rect,
        resolution: (i32, i32),
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            workarea,
            resolution,
            name: name.into(),
            viewports: HashMap::new(),
        }
    }
}

//! §4.4.5: one stack. The bottom-of-stack window takes the full
//! workarea; each window above inserts itself by receding from one
//! edge pair, `decoration_height` pixels vertically and `push_over`
//! pixels horizontally per step.
use crate::geometry::Rect;
use crate::ids::WindowId;
use crate::storage::TileStorage;
use crate::tile_state::TileState;

use super::{find_next_flat, find_previous_flat};

const DEFAULT_DECORATION_HEIGHT: f64 = 25.0;
const DEFAULT_PUSH_OVER: f64 = 10.0;

/// Cascade disables master add/remove entirely (§4.4.5) — the whole
/// stack lives in Tile Storage's slave list, ordered top of stack first
/// (index 0), which is also what [TileStorage::reload_top] maintains.
#[derive(Debug, Clone, Default)]
pub struct Cascade {
    pub(crate) storage: TileStorage,
    pub(crate) state: TileState,
}

impl Cascade {
    pub fn new(state: TileState) -> Self {
        let mut storage = TileStorage::new();
        storage.dec_master_count(); // capacity 0: everything lands in slaves
        Self { storage, state }
    }

    fn decoration_height(&self) -> f64 {
        let height_factor = self.state.get_f64_or("height_factor", 1.0);
        self.state.get_f64_or("decoration_height", DEFAULT_DECORATION_HEIGHT) * height_factor
    }

    fn push_over(&self) -> f64 {
        let width_factor = self.state.get_f64_or("width_factor", 1.0);
        self.state.get_f64_or("push_over", DEFAULT_PUSH_OVER) * width_factor
    }

    fn horz_align_right(&self) -> bool {
        self.state.get_str("horz_align") == Some("right")
    }

    /// The stack, ordered bottom of stack first — the reverse of
    /// storage order, which keeps the top of the stack at index 0.
    fn stack_bottom_up(&self) -> Vec<WindowId> {
        let mut stack = self.storage.slaves().to_vec();
        stack.reverse();
        stack
    }

    pub fn layout(&mut self, workarea: Rect) -> Vec<(WindowId, Rect)> {
        let stack = self.stack_bottom_up();
        let n = stack.len();
        if n == 0 {
            return Vec::new();
        }

        let dh = self.decoration_height();
        let push_over = self.push_over();
        let align_right = self.horz_align_right();

        stack
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let steps_from_top = (n - 1 - i) as f64;
                let y = (dh * steps_from_top).round() as i32;
                let h = (workarea.h - y).max(0);

                let (x, w) = if align_right {
                    (workarea.x, (workarea.w - (push_over * i as f64).round() as i32).max(0))
                } else {
                    let inset = (push_over * i as f64).round() as i32;
                    (workarea.x + inset, (workarea.w - inset).max(0))
                };

                (id, Rect::new(x, workarea.y + y, w, h))
            })
            .collect()
    }

    pub fn find_next(&self, active: WindowId) -> Option<WindowId> {
        find_next_flat(&self.storage, active)
    }

    pub fn find_previous(&self, active: WindowId) -> Option<WindowId> {
        find_previous_flat(&self.storage, active)
    }
}

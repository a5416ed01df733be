//! §4.4.3: like Horizontal, but slaves fill multiple rows of width
//! `row_size` (default 2) instead of a single bottom row.
use crate::geometry::Rect;
use crate::ids::WindowId;
use crate::storage::TileStorage;
use crate::tile_state::TileState;

use super::{find_next_reversed_masters_then_slaves, find_previous_reversed_masters_then_slaves};

const DEFAULT_ROW_SIZE: f64 = 2.0;
const DEFAULT_HEIGHT_STEP: f64 = 25.0;

#[derive(Debug, Clone, Default)]
pub struct HorizontalRows {
    pub(crate) storage: TileStorage,
    pub(crate) state: TileState,
    master_height_delta: i32,
}

impl HorizontalRows {
    pub fn new(state: TileState) -> Self {
        Self {
            storage: TileStorage::new(),
            state,
            master_height_delta: 0,
        }
    }

    fn row_size(&self) -> usize {
        (self.state.get_f64_or("row_size", DEFAULT_ROW_SIZE).max(1.0)) as usize
    }

    fn row_count(&self) -> usize {
        let slaves = self.storage.slaves().len();
        if slaves == 0 {
            0
        } else {
            slaves.div_ceil(self.row_size())
        }
    }

    pub fn layout(&mut self, workarea: Rect) -> Vec<(WindowId, Rect)> {
        let masters = self.storage.masters().to_vec();
        let slaves = self.storage.slaves().to_vec();
        let row_size = self.row_size();
        let rows = self.row_count();

        let base = if slaves.is_empty() { workarea.h } else { workarea.h / 2 };
        let master_height = (base + self.master_height_delta).clamp(0, workarea.h);
        let (master_row, slave_area) = workarea.split_at_height(master_height);

        let mut out = Vec::with_capacity(masters.len() + slaves.len());
        out.extend(
            masters
                .iter()
                .copied()
                .zip(master_row.as_columns(masters.len() as u32)),
        );

        if rows > 0 {
            for (row_rect, chunk) in slave_area
                .as_rows(rows as u32)
                .into_iter()
                .zip(slaves.chunks(row_size))
            {
                out.extend(chunk.iter().copied().zip(row_rect.as_columns(chunk.len() as u32)));
            }
        }

        out
    }

    pub fn master_increase(&mut self) {
        self.master_height_delta += self.step();
    }

    pub fn master_decrease(&mut self) {
        self.master_height_delta -= self.step();
    }

    /// `height_factor` configures the raw pixel step, rounded down to a
    /// multiple of the current row count so every row shrinks/grows by a
    /// whole number of pixels (§4.4.3).
    fn step(&self) -> i32 {
        let raw = self.state.get_f64_or("height_factor", DEFAULT_HEIGHT_STEP) as i32;
        let rows = self.row_count().max(1) as i32;
        raw - (raw % rows)
    }

    /// §4.6: same masters-then-slaves ordering as Vertical/Horizontal,
    /// but with the master list walked in reverse.
    pub fn find_next(&self, active: WindowId) -> Option<WindowId> {
        find_next_reversed_masters_then_slaves(&self.storage, active)
    }

    pub fn find_previous(&self, active: WindowId) -> Option<WindowId> {
        find_previous_reversed_masters_then_slaves(&self.storage, active)
    }
}

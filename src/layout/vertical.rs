//! §4.4.1: one master column on the left, slaves stacked on the right.
use crate::geometry::Rect;
use crate::ids::WindowId;
use crate::storage::TileStorage;
use crate::tile_state::TileState;

use super::{cycle_master_with_indexed_slave, find_next_master_then_slaves, find_previous_master_then_slaves, Swap};

const DEFAULT_WIDTH_FACTOR: f64 = 0.5;
const STEP: f64 = 0.05;

#[derive(Debug, Clone, Default)]
pub struct Vertical {
    pub(crate) storage: TileStorage,
    pub(crate) state: TileState,
    cycle_index: usize,
}

impl Vertical {
    pub fn new(state: TileState) -> Self {
        Self {
            storage: TileStorage::new(),
            state,
            cycle_index: 0,
        }
    }

    fn width_factor(&self) -> f64 {
        self.state.get_f64_or("width_factor", DEFAULT_WIDTH_FACTOR)
    }

    pub fn layout(&mut self, workarea: Rect) -> Vec<(WindowId, Rect)> {
        let masters = self.storage.masters();
        let slaves = self.storage.slaves();

        let master_width = if slaves.is_empty() {
            workarea.w
        } else {
            (workarea.w as f64 * self.width_factor()).round() as i32
        };

        let (master_col, slave_col) = workarea.split_at_width(master_width);

        let mut out = Vec::with_capacity(masters.len() + slaves.len());
        out.extend(masters.iter().copied().zip(master_col.as_rows(masters.len() as u32)));
        out.extend(slaves.iter().copied().zip(slave_col.as_rows(slaves.len() as u32)));
        out
    }

    /// The cycle algorithm (§4.5), shared with Horizontal.
    pub fn cycle(&mut self) -> Option<Swap> {
        cycle_master_with_indexed_slave(&mut self.storage, &mut self.cycle_index)
    }

    pub fn master_increase(&mut self) {
        let next = (self.width_factor() + STEP).min(1.0);
        self.state.set("width_factor", next);
    }

    pub fn master_decrease(&mut self) {
        let next = (self.width_factor() - STEP).max(0.0);
        self.state.set("width_factor", next);
    }

    pub fn find_next(&self, active: WindowId) -> Option<WindowId> {
        find_next_master_then_slaves(&self.storage, active)
    }

    pub fn find_previous(&self, active: WindowId) -> Option<WindowId> {
        find_previous_master_then_slaves(&self.storage, active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::WindowId;

    fn w(n: u32) -> WindowId {
        WindowId(n)
    }

    #[test]
    fn scenario_1_three_windows_one_master() {
        let mut v = Vertical::new(TileState::default());
        v.storage.add(w(1), false); // A: master
        v.storage.add(w(2), false); // B: slave
        v.storage.add(w(3), false); // C: slave

        let placements = v.layout(Rect::new(0, 0, 1000, 800));
        assert_eq!(placements[0], (w(1), Rect::new(0, 0, 500, 800)));
        assert_eq!(placements[1], (w(2), Rect::new(500, 0, 500, 400)));
        assert_eq!(placements[2], (w(3), Rect::new(500, 400, 500, 400)));
    }

    #[test]
    fn scenario_2_cycle_promotes_first_slave() {
        let mut v = Vertical::new(TileState::default());
        v.storage.add(w(1), false);
        v.storage.add(w(2), false);
        v.storage.add(w(3), false);

        let swap = v.cycle();
        assert_eq!(swap, Some((w(1), w(2))));
        assert_eq!(v.storage.masters(), &[w(2)]);
        assert_eq!(v.storage.slaves(), &[w(1), w(3)]);

        let placements = v.layout(Rect::new(0, 0, 1000, 800));
        assert_eq!(placements[0], (w(2), Rect::new(0, 0, 500, 800)));
        assert_eq!(placements[1], (w(1), Rect::new(500, 0, 500, 400)));
        assert_eq!(placements[2], (w(3), Rect::new(500, 400, 500, 400)));
    }

    #[test]
    fn master_increase_then_decrease_restores_width_factor() {
        let mut v = Vertical::new(TileState::default());
        let before = v.width_factor();
        v.master_increase();
        v.master_decrease();
        assert!((v.width_factor() - before).abs() < 1e-9);
    }

    #[test]
    fn cycle_is_noop_without_both_masters_and_slaves() {
        let mut v = Vertical::new(TileState::default());
        v.storage.add(w(1), false);
        assert_eq!(v.cycle(), None);
    }
}

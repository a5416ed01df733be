//! §4.4.2: Vertical rotated 90 degrees — masters occupy the top
//! half-row, slaves the bottom.
use crate::geometry::Rect;
use crate::ids::WindowId;
use crate::storage::TileStorage;
use crate::tile_state::TileState;

use super::{cycle_master_with_indexed_slave, find_next_master_then_slaves, find_previous_master_then_slaves, Swap};

const STEP_PX: i32 = 25;

#[derive(Debug, Clone, Default)]
pub struct Horizontal {
    pub(crate) storage: TileStorage,
    pub(crate) state: TileState,
    /// Offset applied to the default 50/50 master/slave row split, in
    /// pixels. Unlike Vertical's `width_factor` this is never persisted
    /// through [TileState] — §4.4.2 explicitly calls it "no stored
    /// factor".
    split_delta: i32,
    cycle_index: usize,
}

impl Horizontal {
    pub fn new(state: TileState) -> Self {
        Self {
            storage: TileStorage::new(),
            state,
            split_delta: 0,
            cycle_index: 0,
        }
    }

    pub fn layout(&mut self, workarea: Rect) -> Vec<(WindowId, Rect)> {
        let masters = self.storage.masters();
        let slaves = self.storage.slaves();

        let base = if slaves.is_empty() { workarea.h } else { workarea.h / 2 };
        let master_height = (base + self.split_delta).clamp(0, workarea.h);
        let (master_row, slave_row) = workarea.split_at_height(master_height);

        let mut out = Vec::with_capacity(masters.len() + slaves.len());
        out.extend(
            masters
                .iter()
                .copied()
                .zip(master_row.as_columns(masters.len() as u32)),
        );
        out.extend(
            slaves
                .iter()
                .copied()
                .zip(slave_row.as_columns(slaves.len() as u32)),
        );
        out
    }

    /// The cycle algorithm (§4.5), shared with Vertical.
    pub fn cycle(&mut self) -> Option<Swap> {
        cycle_master_with_indexed_slave(&mut self.storage, &mut self.cycle_index)
    }

    pub fn master_increase(&mut self) {
        self.split_delta += STEP_PX;
    }

    pub fn master_decrease(&mut self) {
        self.split_delta -= STEP_PX;
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
    fn scenario_3_two_masters_one_slave() {
        let mut h = Horizontal::new(TileState::default());
        h.storage = {
            let mut s = TileStorage::new();
            s.inc_master_count(); // capacity 2
            s.add(w(1), false); // A: master
            s.add(w(2), false); // B: master
            s.add(w(3), false); // C: slave
            s
        };

        let placements = h.layout(Rect::new(0, 0, 1200, 600));
        assert_eq!(placements[0], (w(1), Rect::new(0, 0, 600, 300)));
        assert_eq!(placements[1], (w(2), Rect::new(600, 0, 600, 300)));
        assert_eq!(placements[2], (w(3), Rect::new(0, 300, 1200, 300)));
    }

    #[test]
    fn master_increase_then_decrease_cancels_out() {
        let mut h = Horizontal::new(TileState::default());
        h.master_increase();
        h.master_decrease();
        assert_eq!(h.split_delta, 0);
    }

    // (P5) cycle after |slaves| invocations returns masters[0] to its
    // original identity when |masters| == 1.
    #[test]
    fn cycle_through_every_slave_returns_master_to_its_original_identity() {
        let mut h = Horizontal::new(TileState::default());
        h.storage.add(w(1), false); // master
        h.storage.add(w(2), false); // slave
        h.storage.add(w(3), false); // slave
        h.storage.add(w(4), false); // slave

        for _ in 0..h.storage.slaves().len() {
            h.cycle();
        }
        assert_eq!(h.storage.masters(), &[w(1)]);
    }
}

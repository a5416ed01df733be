//! §4.4.4: every window resized to the full workarea. Cycling and most
//! movement commands are no-ops; only screen_focus, screen_put,
//! win_previous and win_next remain meaningful.
use crate::geometry::Rect;
use crate::ids::WindowId;
use crate::storage::TileStorage;
use crate::tile_state::TileState;

use super::{find_next_flat, find_previous_flat};

#[derive(Debug, Clone, Default)]
pub struct Maximal {
    pub(crate) storage: TileStorage,
    pub(crate) state: TileState,
}

impl Maximal {
    pub fn new(state: TileState) -> Self {
        Self {
            storage: TileStorage::new(),
            state,
        }
    }

    pub fn layout(&mut self, workarea: Rect) -> Vec<(WindowId, Rect)> {
        self.storage
            .masters()
            .iter()
            .chain(self.storage.slaves().iter())
            .map(|&id| (id, workarea))
            .collect()
    }

    pub fn find_next(&self, active: WindowId) -> Option<WindowId> {
        find_next_flat(&self.storage, active)
    }

    pub fn find_previous(&self, active: WindowId) -> Option<WindowId> {
        find_previous_flat(&self.storage, active)
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
    fn every_window_gets_the_full_workarea() {
        let mut m = Maximal::new(TileState::default());
        m.storage.add(w(1), false);
        m.storage.add(w(2), false);

        let workarea = Rect::new(0, 0, 1920, 1080);
        let placements = m.layout(workarea);
        assert!(placements.iter().all(|(_, r)| *r == workarea));
    }

    #[test]
    fn find_next_wraps_across_the_flat_list() {
        let mut m = Maximal::new(TileState::default());
        m.storage.add(w(1), false);
        m.storage.add(w(2), false);
        m.storage.add(w(3), false);
        assert_eq!(m.find_next(w(3)), Some(w(1)));
        assert_eq!(m.find_previous(w(1)), Some(w(3)));
    }
}

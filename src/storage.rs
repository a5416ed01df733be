//! Tile Storage (§4.3): the ordered master/slave containers that are the
//! single source of truth for what a [Tiler][crate::layout::Tiler] sees
//! when it computes positions.
use crate::ids::WindowId;

/// Per-screen ordered containers of "master" and "slave" windows, plus
/// a master-capacity counter.
///
/// Invariant (I4): master slots are filled greedily — adding a window
/// promotes it to master iff `masters.len() < master_capacity` at the
/// time of insertion. Changing the capacity does not retroactively
/// reclassify existing windows; that only happens on the next
/// add/remove or during [TileStorage::reload].
#[derive(Debug, Clone, Default)]
pub struct TileStorage {
    masters: Vec<WindowId>,
    slaves: Vec<WindowId>,
    master_capacity: usize,
}

impl TileStorage {
    /// A fresh, empty storage with the default master capacity of 1.
    pub fn new() -> Self {
        Self {
            masters: Vec::new(),
            slaves: Vec::new(),
            master_capacity: 1,
        }
    }

    pub fn masters(&self) -> &[WindowId] {
        &self.masters
    }

    pub fn slaves(&self) -> &[WindowId] {
        &self.slaves
    }

    pub fn master_capacity(&self) -> usize {
        self.master_capacity
    }

    pub fn is_empty(&self) -> bool {
        self.masters.is_empty() && self.slaves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.masters.len() + self.slaves.len()
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.masters.contains(&id) || self.slaves.contains(&id)
    }

    pub fn is_master(&self, id: WindowId) -> bool {
        self.masters.contains(&id)
    }

    pub fn is_slave(&self, id: WindowId) -> bool {
        self.slaves.contains(&id)
    }

    fn insert(list: &mut Vec<WindowId>, id: WindowId, at_top: bool) {
        if at_top {
            list.insert(0, id);
        } else {
            list.push(id);
        }
    }

    /// Shared implementation of `add`/`add_top`/`add_bottom` (§4.3).
    fn add_at(&mut self, id: WindowId, hidden: bool, at_top: bool) -> bool {
        if hidden {
            return false;
        }

        if self.slaves.contains(&id) && self.masters.len() < self.master_capacity {
            self.slaves.retain(|&w| w != id);
            Self::insert(&mut self.masters, id, at_top);
            return true;
        }

        if self.contains(id) {
            return true;
        }

        if self.masters.len() < self.master_capacity {
            Self::insert(&mut self.masters, id, at_top);
        } else {
            Self::insert(&mut self.slaves, id, at_top);
        }

        true
    }

    /// Add a window, rejecting hidden ones. Promotes an existing slave
    /// to master when room exists; otherwise appends to masters (if
    /// room) or slaves.
    pub fn add(&mut self, id: WindowId, hidden: bool) -> bool {
        self.add_at(id, hidden, false)
    }

    /// As [TileStorage::add], but inserts at the head of whichever list
    /// it lands in.
    pub fn add_top(&mut self, id: WindowId, hidden: bool) -> bool {
        self.add_at(id, hidden, true)
    }

    /// As [TileStorage::add]: appends to the tail of whichever list it
    /// lands in.
    pub fn add_bottom(&mut self, id: WindowId, hidden: bool) -> bool {
        self.add_at(id, hidden, false)
    }

    /// Remove `id` from whichever list currently holds it.
    pub fn remove(&mut self, id: WindowId) -> bool {
        let before = self.len();
        self.masters.retain(|&w| w != id);
        self.slaves.retain(|&w| w != id);
        self.len() != before
    }

    /// Swap the entries with ids `a` and `b` in place, without changing
    /// which slots belong to which list — this is how master/slave
    /// classification is preserved across a swap (§4.3, used by the
    /// cycle algorithm and `switch_previous`/`switch_next`).
    pub fn switch(&mut self, a: WindowId, b: WindowId) {
        if a == b {
            return;
        }

        if let Some(pa) = self.masters.iter().position(|&w| w == a) {
            if let Some(pb) = self.masters.iter().position(|&w| w == b) {
                self.masters.swap(pa, pb);
                return;
            }
            if let Some(pb) = self.slaves.iter().position(|&w| w == b) {
                self.masters[pa] = b;
                self.slaves[pb] = a;
                return;
            }
        } else if let Some(pa) = self.slaves.iter().position(|&w| w == a) {
            if let Some(pb) = self.slaves.iter().position(|&w| w == b) {
                self.slaves.swap(pa, pb);
                return;
            }
            if let Some(pb) = self.masters.iter().position(|&w| w == b) {
                self.slaves[pa] = b;
                self.masters[pb] = a;
            }
        }
    }

    /// Promote `id` from slave to master if there is room. Returns
    /// whether a promotion happened.
    pub fn try_to_promote(&mut self, id: WindowId) -> bool {
        if self.masters.len() >= self.master_capacity {
            return false;
        }
        if let Some(p) = self.slaves.iter().position(|&w| w == id) {
            self.slaves.remove(p);
            self.masters.push(id);
            return true;
        }
        false
    }

    /// Grow master capacity by one. Does not itself reclassify windows.
    pub fn inc_master_count(&mut self) {
        self.master_capacity += 1;
    }

    /// Shrink master capacity by one, floored at 0. Does not itself
    /// reclassify windows.
    pub fn dec_master_count(&mut self) {
        self.master_capacity = self.master_capacity.saturating_sub(1);
    }

    /// The Reload protocol (§4.3): called by a tiler before every tile
    /// pass when `is_tiled == false`. Genuinely new windows are folded in
    /// via [TileStorage::add_bottom].
    ///
    /// `screen_windows` must be the non-hidden, non-popup windows
    /// currently believed to be on the screen, in a stable order — the
    /// order in which genuinely new windows are folded in determines
    /// which of them end up as masters when capacity is tight, and the
    /// spec does not constrain that order, so callers are expected to
    /// pass a deterministic one (e.g. sorted by [WindowId]).
    pub fn reload(&mut self, screen_windows: &[WindowId], active: Option<WindowId>) {
        self.reload_with(screen_windows, active, false)
    }

    /// As [TileStorage::reload], but folds in new windows via
    /// [TileStorage::add_top] — Cascade's variant, so that the most
    /// recently discovered window lands at the top of the stack (§4.4.5).
    pub fn reload_top(&mut self, screen_windows: &[WindowId], active: Option<WindowId>) {
        self.reload_with(screen_windows, active, true)
    }

    fn reload_with(&mut self, screen_windows: &[WindowId], active: Option<WindowId>, at_top: bool) {
        let present = |id: &WindowId| screen_windows.contains(id);
        self.masters.retain(present);
        self.slaves.retain(present);

        if let Some(active) = active {
            if screen_windows.contains(&active) {
                self.try_to_promote(active);
            }
        }

        for &id in screen_windows {
            if self.contains(id) {
                self.try_to_promote(id);
            } else if at_top {
                self.add_top(id, false);
            } else {
                self.add_bottom(id, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    fn w(n: u32) -> WindowId {
        WindowId(n)
    }

    #[test]
    fn add_promotes_while_master_room_exists() {
        let mut s = TileStorage::new();
        assert!(s.add(w(1), false));
        assert_eq!(s.masters(), &[w(1)]);

        assert!(s.add(w(2), false));
        assert_eq!(s.masters(), &[w(1)]);
        assert_eq!(s.slaves(), &[w(2)]);
    }

    #[test]
    fn add_rejects_hidden_windows() {
        let mut s = TileStorage::new();
        assert!(!s.add(w(1), true));
        assert!(s.is_empty());
    }

    #[test]
    fn add_promotes_existing_slave_when_room_opens_up() {
        let mut s = TileStorage::new();
        s.add(w(1), false); // master
        s.add(w(2), false); // slave
        s.remove(w(1));
        assert!(s.add(w(2), false)); // now room exists; should be promoted
        assert_eq!(s.masters(), &[w(2)]);
        assert!(s.slaves().is_empty());
    }

    #[test]
    fn add_top_inserts_at_head_of_chosen_list() {
        let mut s = TileStorage::new();
        s.add(w(1), false);
        s.add(w(2), false); // slave
        s.add_top(w(3), false); // slave, head
        assert_eq!(s.slaves(), &[w(3), w(2)]);
    }

    #[test]
    fn switch_preserves_master_slave_classification() {
        let mut s = TileStorage::new();
        s.add(w(1), false); // master
        s.add(w(2), false); // slave
        s.add(w(3), false); // slave
        s.switch(w(1), w(3));
        assert_eq!(s.masters(), &[w(3)]);
        assert_eq!(s.slaves(), &[w(2), w(1)]);
    }

    #[test]
    fn dec_master_count_floors_at_zero() {
        let mut s = TileStorage::new();
        s.dec_master_count();
        assert_eq!(s.master_capacity(), 0);
        s.dec_master_count();
        assert_eq!(s.master_capacity(), 0);
    }

    #[test]
    fn reload_is_monotone_when_world_is_unchanged() {
        let mut s = TileStorage::new();
        s.add(w(1), false);
        s.add(w(2), false);
        s.add(w(3), false);

        let windows = [w(1), w(2), w(3)];
        let before = (s.masters().to_vec(), s.slaves().to_vec());
        s.reload(&windows, Some(w(1)));
        s.reload(&windows, Some(w(1)));
        let after = (s.masters().to_vec(), s.slaves().to_vec());

        assert_eq!(before, after);
    }

    #[test]
    fn reload_prunes_departed_windows() {
        let mut s = TileStorage::new();
        s.add(w(1), false);
        s.add(w(2), false);
        s.reload(&[w(1)], None);
        assert_eq!(s.masters(), &[w(1)]);
        assert!(s.slaves().is_empty());
    }

    // (P1) |masters| <= master_capacity and |masters| + |slaves| equals
    // the number of distinct windows added and not removed.
    #[quickcheck]
    fn p1_master_cap_and_total_count(ops: Vec<(bool, u8, bool)>, capacity: u8) -> TestResult {
        let mut s = TileStorage::new();
        s.master_capacity = capacity as usize;

        let mut present = std::collections::HashSet::new();
        for (is_add, id, hidden) in ops {
            let id = w(id as u32);
            if is_add {
                if s.add(id, hidden) && !hidden {
                    present.insert(id);
                }
            } else {
                s.remove(id);
                present.remove(&id);
            }
        }

        TestResult::from_bool(
            s.masters().len() <= s.master_capacity()
                && s.masters().len() + s.slaves().len() == present.len(),
        )
    }
}

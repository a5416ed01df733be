//! The Tiler protocol (§4.4): a closed set of layout strategies bound to
//! a screen.
//!
//! Per the redesign guidance this is a tagged variant, not an open
//! `dyn Layout` hierarchy: only six commands actually vary per layout
//! (tile, cycle, master_increase, master_decrease, find_next,
//! find_previous), so those are the only ones given per-variant
//! dispatch here. Everything else ("universal commands") is
//! implemented once, generically, in [crate::commands].
mod cascade;
mod horizontal;
mod horizontal_rows;
mod maximal;
mod vertical;

pub use cascade::Cascade;
pub use horizontal::Horizontal;
pub use horizontal_rows::HorizontalRows;
pub use maximal::Maximal;
pub use vertical::Vertical;

use crate::geometry::Rect;
use crate::ids::WindowId;
use crate::storage::TileStorage;
use crate::tile_state::TileState;

/// The result of a successful [Tiler::cycle] or [Tiler::make_active_master]-style
/// swap: the pair of windows whose on-screen positions must be swapped
/// to match the new storage order.
pub type Swap = (WindowId, WindowId);

#[derive(Debug, Clone)]
pub enum Tiler {
    Vertical(Vertical),
    Horizontal(Horizontal),
    HorizontalRows(HorizontalRows),
    Maximal(Maximal),
    Cascade(Cascade),
}

impl Default for Tiler {
    fn default() -> Self {
        Tiler::Vertical(Vertical::new(TileState::default()))
    }
}

impl Tiler {
    /// Layout names as they appear in `[layout.<Name>]` config sections
    /// and in `tile.<layout>` action names — case-insensitively matched.
    pub fn named(name: &str, state: TileState) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "vertical" => Some(Tiler::Vertical(Vertical::new(state))),
            "horizontal" => Some(Tiler::Horizontal(Horizontal::new(state))),
            "horizontalrows" => Some(Tiler::HorizontalRows(HorizontalRows::new(state))),
            "maximal" => Some(Tiler::Maximal(Maximal::new(state))),
            "cascade" => Some(Tiler::Cascade(Cascade::new(state))),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tiler::Vertical(_) => "Vertical",
            Tiler::Horizontal(_) => "Horizontal",
            Tiler::HorizontalRows(_) => "HorizontalRows",
            Tiler::Maximal(_) => "Maximal",
            Tiler::Cascade(_) => "Cascade",
        }
    }

    pub fn storage(&self) -> &TileStorage {
        match self {
            Tiler::Vertical(t) => &t.storage,
            Tiler::Horizontal(t) => &t.storage,
            Tiler::HorizontalRows(t) => &t.storage,
            Tiler::Maximal(t) => &t.storage,
            Tiler::Cascade(t) => &t.storage,
        }
    }

    pub fn storage_mut(&mut self) -> &mut TileStorage {
        match self {
            Tiler::Vertical(t) => &mut t.storage,
            Tiler::Horizontal(t) => &mut t.storage,
            Tiler::HorizontalRows(t) => &mut t.storage,
            Tiler::Maximal(t) => &mut t.storage,
            Tiler::Cascade(t) => &mut t.storage,
        }
    }

    pub fn state(&self) -> &TileState {
        match self {
            Tiler::Vertical(t) => &t.state,
            Tiler::Horizontal(t) => &t.state,
            Tiler::HorizontalRows(t) => &t.state,
            Tiler::Maximal(t) => &t.state,
            Tiler::Cascade(t) => &t.state,
        }
    }

    /// Reset this tiler, per `reset` (§4.4): fresh storage, fresh state,
    /// cleared cycle index.
    pub fn reset(&mut self, state: TileState) {
        *self = Tiler::named(self.name(), state).expect("name() always round-trips through named()");
    }

    /// Whether `add_master`/`remove_master` do anything for this layout.
    /// Maximal and Cascade override them as no-ops (§4.4.4, §4.4.5).
    pub fn supports_master_adjust(&self) -> bool {
        !matches!(self, Tiler::Maximal(_) | Tiler::Cascade(_))
    }

    /// Whether `max_all`/`restore_all` do anything for this layout.
    /// Maximal is already full-workarea-sized, so both are no-ops
    /// (§4.4.4); Cascade has no such override and behaves like the
    /// default layouts.
    pub fn supports_max_all(&self) -> bool {
        !matches!(self, Tiler::Maximal(_))
    }

    /// Reload new windows into storage in this layout's preferred order
    /// — every layout but Cascade folds new windows in at the bottom of
    /// the slave list; Cascade folds them in at the top of the stack.
    pub fn reload(&mut self, screen_windows: &[WindowId], active: Option<WindowId>) {
        match self {
            Tiler::Cascade(_) => self.storage_mut().reload_top(screen_windows, active),
            _ => self.storage_mut().reload(screen_windows, active),
        }
    }

    /// Compute the target rectangle for every stored window, given the
    /// screen's workarea. This is the per-layout "hot" `tile` command
    /// (§4.4.1-§4.4.5); decoration subtraction, gravity reset and the
    /// unmaximize request happen afterwards in the shared geometry
    /// helper (`DisplayPortExt::apply_tile_geometry`), invoked from
    /// `crate::commands::tile`.
    pub fn layout(&mut self, workarea: Rect) -> Vec<(WindowId, Rect)> {
        match self {
            Tiler::Vertical(t) => t.layout(workarea),
            Tiler::Horizontal(t) => t.layout(workarea),
            Tiler::HorizontalRows(t) => t.layout(workarea),
            Tiler::Maximal(t) => t.layout(workarea),
            Tiler::Cascade(t) => t.layout(workarea),
        }
    }

    /// The cycle algorithm (§4.5): only Vertical/Horizontal implement
    /// it; every other layout is a no-op.
    pub fn cycle(&mut self) -> Option<Swap> {
        match self {
            Tiler::Vertical(t) => t.cycle(),
            Tiler::Horizontal(t) => t.cycle(),
            _ => None,
        }
    }

    pub fn master_increase(&mut self) {
        match self {
            Tiler::Vertical(t) => t.master_increase(),
            Tiler::Horizontal(t) => t.master_increase(),
            Tiler::HorizontalRows(t) => t.master_increase(),
            Tiler::Maximal(_) | Tiler::Cascade(_) => {}
        }
    }

    pub fn master_decrease(&mut self) {
        match self {
            Tiler::Vertical(t) => t.master_decrease(),
            Tiler::Horizontal(t) => t.master_decrease(),
            Tiler::HorizontalRows(t) => t.master_decrease(),
            Tiler::Maximal(_) | Tiler::Cascade(_) => {}
        }
    }

    /// find_next (§4.6): ordering is layout-specific. Vertical/Horizontal
    /// walk masters forward then slaves; HorizontalRows walks the master
    /// list in reverse before falling into the same slave order;
    /// Maximal/Cascade walk the flat masters-then-slaves list.
    pub fn find_next(&self, active: WindowId) -> Option<WindowId> {
        match self {
            Tiler::Vertical(t) => t.find_next(active),
            Tiler::Horizontal(t) => t.find_next(active),
            Tiler::HorizontalRows(t) => t.find_next(active),
            Tiler::Maximal(t) => t.find_next(active),
            Tiler::Cascade(t) => t.find_next(active),
        }
    }

    pub fn find_previous(&self, active: WindowId) -> Option<WindowId> {
        match self {
            Tiler::Vertical(t) => t.find_previous(active),
            Tiler::Horizontal(t) => t.find_previous(active),
            Tiler::HorizontalRows(t) => t.find_previous(active),
            Tiler::Maximal(t) => t.find_previous(active),
            Tiler::Cascade(t) => t.find_previous(active),
        }
    }
}

/// Shared ordering used by Vertical/Horizontal (§4.6): walk down the
/// masters then down the slaves, with wraparound.
pub(crate) fn find_next_master_then_slaves(
    storage: &TileStorage,
    active: WindowId,
) -> Option<WindowId> {
    let masters = storage.masters();
    let slaves = storage.slaves();

    if let Some(pos) = masters.iter().position(|&w| w == active) {
        return if pos + 1 < masters.len() {
            Some(masters[pos + 1])
        } else {
            slaves.first().copied().or_else(|| masters.first().copied())
        };
    }

    if let Some(pos) = slaves.iter().position(|&w| w == active) {
        return if pos + 1 < slaves.len() {
            Some(slaves[pos + 1])
        } else {
            masters.first().copied().or_else(|| slaves.first().copied())
        };
    }

    None
}

pub(crate) fn find_previous_master_then_slaves(
    storage: &TileStorage,
    active: WindowId,
) -> Option<WindowId> {
    let masters = storage.masters();
    let slaves = storage.slaves();

    if let Some(pos) = masters.iter().position(|&w| w == active) {
        return if pos > 0 {
            Some(masters[pos - 1])
        } else {
            slaves.last().copied().or_else(|| masters.last().copied())
        };
    }

    if let Some(pos) = slaves.iter().position(|&w| w == active) {
        return if pos > 0 {
            Some(slaves[pos - 1])
        } else {
            masters.last().copied().or_else(|| slaves.last().copied())
        };
    }

    None
}

/// The ordering used by HorizontalRows (§4.4.3, §4.6): same as
/// [find_next_master_then_slaves] but with the master list walked in
/// reverse, to match the master row sitting visually above the slave
/// rows rather than beside them.
pub(crate) fn find_next_reversed_masters_then_slaves(
    storage: &TileStorage,
    active: WindowId,
) -> Option<WindowId> {
    let masters: Vec<WindowId> = storage.masters().iter().rev().copied().collect();
    let slaves = storage.slaves();

    if let Some(pos) = masters.iter().position(|&w| w == active) {
        return if pos + 1 < masters.len() {
            Some(masters[pos + 1])
        } else {
            slaves.first().copied().or_else(|| masters.first().copied())
        };
    }

    if let Some(pos) = slaves.iter().position(|&w| w == active) {
        return if pos + 1 < slaves.len() {
            Some(slaves[pos + 1])
        } else {
            masters.first().copied().or_else(|| slaves.first().copied())
        };
    }

    None
}

pub(crate) fn find_previous_reversed_masters_then_slaves(
    storage: &TileStorage,
    active: WindowId,
) -> Option<WindowId> {
    let masters: Vec<WindowId> = storage.masters().iter().rev().copied().collect();
    let slaves = storage.slaves();

    if let Some(pos) = masters.iter().position(|&w| w == active) {
        return if pos > 0 {
            Some(masters[pos - 1])
        } else {
            slaves.last().copied().or_else(|| masters.last().copied())
        };
    }

    if let Some(pos) = slaves.iter().position(|&w| w == active) {
        return if pos > 0 {
            Some(slaves[pos - 1])
        } else {
            masters.last().copied().or_else(|| slaves.last().copied())
        };
    }

    None
}

/// The cycle algorithm (§4.5), shared by Vertical and Horizontal: swap
/// `masters[0]` with `slaves[cycleIndex]`, then advance the index modulo
/// the (post-swap) slave count. A no-op when either list is empty.
pub(crate) fn cycle_master_with_indexed_slave(
    storage: &mut TileStorage,
    cycle_index: &mut usize,
) -> Option<Swap> {
    let masters = storage.masters();
    let slaves = storage.slaves();
    if masters.is_empty() || slaves.is_empty() {
        return None;
    }

    *cycle_index %= slaves.len();
    let master = masters[0];
    let slave = slaves[*cycle_index];
    storage.switch(master, slave);
    *cycle_index = (*cycle_index + 1) % storage.slaves().len().max(1);
    Some((master, slave))
}

/// The flat ordering used by Maximal (§4.4.4): masters, then slaves.
pub(crate) fn find_next_flat(storage: &TileStorage, active: WindowId) -> Option<WindowId> {
    let flat: Vec<WindowId> = storage
        .masters()
        .iter()
        .chain(storage.slaves().iter())
        .copied()
        .collect();
    let pos = flat.iter().position(|&w| w == active)?;
    Some(flat[(pos + 1) % flat.len()])
}

pub(crate) fn find_previous_flat(storage: &TileStorage, active: WindowId) -> Option<WindowId> {
    let flat: Vec<WindowId> = storage
        .masters()
        .iter()
        .chain(storage.slaves().iter())
        .copied()
        .collect();
    let pos = flat.iter().position(|&w| w == active)?;
    Some(flat[(pos + flat.len() - 1) % flat.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_round_trips_through_name() {
        for n in ["Vertical", "Horizontal", "HorizontalRows", "Maximal", "Cascade"] {
            let t = Tiler::named(n, TileState::default()).unwrap();
            assert_eq!(t.name(), n);
        }
    }

    #[test]
    fn unknown_layout_name_is_rejected() {
        assert!(Tiler::named("bspwm", TileState::default()).is_none());
    }

    #[test]
    fn maximal_and_cascade_do_not_support_master_adjust() {
        assert!(!Tiler::named("Maximal", TileState::default())
            .unwrap()
            .supports_master_adjust());
        assert!(!Tiler::named("Cascade", TileState::default())
            .unwrap()
            .supports_master_adjust());
        assert!(Tiler::named("Vertical", TileState::default())
            .unwrap()
            .supports_master_adjust());
    }
}

//! Dispatcher (§4.7, §2): maps an [Action] to a [Tiler]/[commands] call
//! and invokes it, gated by the per-screen tiling-enabled flag.
//!
//! There are two distinct entry points because the gating rule differs
//! between them (§4.7): a hotkey press is free to *start* tiling (any
//! `tile`/`tile.<layout>` binding works on an untiled screen), but an
//! explicit, programmatic action call (from IPC or a mouse callback)
//! only runs against a screen that is already tiling — even a `tile.*`
//! action is refused there.
use crate::actions::Action;
use crate::commands;
use crate::config::Config;
use crate::display::{DisplayPort, ModMask};
use crate::error::{Error, Result};
use crate::ids::ScreenId;
use crate::layout::Tiler;
use crate::world::{ScreenHandle, WorldModel};

/// The keycode/modmask -> action table built from [Config::bindings]
/// once at startup (and again on every config reload).
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: Vec<(u8, ModMask, Action)>,
}

impl Keymap {
    /// Pair each configured binding with the keycode the Display Port
    /// resolved its keysym to, dropping any the keyboard mapping
    /// doesn't have a keycode for.
    pub fn build(display: &dyn DisplayPort, config: &Config) -> Result<Self> {
        let configured = config.bindings();
        let key_bindings: Vec<_> = configured.iter().map(|(binding, _)| *binding).collect();
        let resolved = display.grab_keys(&key_bindings)?;

        let mut bindings = Vec::with_capacity(resolved.len());
        for (binding, keycode) in resolved {
            if let Some((_, action)) = configured.iter().find(|(b, _)| *b == binding) {
                bindings.push((keycode, binding.modmask, action.clone()));
            }
        }
        Ok(Self { bindings })
    }

    fn lookup(&self, keycode: u8, modmask: ModMask) -> Option<&Action> {
        self.bindings
            .iter()
            .find(|(kc, mm, _)| *kc == keycode && (*mm == modmask || mm.contains(ModMask::ANY)))
            .map(|(_, _, action)| action)
    }
}

/// Resolve a raw keypress to a binding and run it, gated by "the screen
/// may start tiling from here" (§4.7): if tiling is currently disabled
/// on the focused screen, only `tile`/`tile.<layout>` actions are
/// allowed through.
pub fn dispatch_key(
    world: &mut WorldModel,
    display: &dyn DisplayPort,
    config: &Config,
    keymap: &Keymap,
    keycode: u8,
    modmask: ModMask,
) -> Result<()> {
    let Some(action) = keymap.lookup(keycode, modmask).cloned() else {
        return Err(Error::UnknownBinding { keycode, modmask: modmask.bits() });
    };
    let Some(handle) = world.active_path() else {
        return Ok(());
    };
    let tiling_enabled = world.screen(handle).map(|s| s.tiling_enabled).unwrap_or(false);
    if !tiling_enabled && !starts_tiling(&action) {
        return Ok(());
    }
    run_action(world, display, config, handle, action)
}

/// Run an action requested explicitly (IPC call or mouse callback)
/// rather than via a hotkey. Per §4.7, these never implicitly start
/// tiling: the target screen must already be tiling, with no exception
/// for `tile.*`.
pub fn dispatch_action(
    world: &mut WorldModel,
    display: &dyn DisplayPort,
    config: &Config,
    name: &str,
) -> Result<()> {
    let action = Action::parse(name)?;
    let Some(handle) = world.active_path() else {
        return Ok(());
    };
    let tiling_enabled = world.screen(handle).map(|s| s.tiling_enabled).unwrap_or(false);
    if !tiling_enabled {
        return Ok(());
    }
    run_action(world, display, config, handle, action)
}

fn starts_tiling(action: &Action) -> bool {
    matches!(action, Action::Tile | Action::TileLayout(_))
}

fn run_action(
    world: &mut WorldModel,
    display: &dyn DisplayPort,
    config: &Config,
    handle: ScreenHandle,
    action: Action,
) -> Result<()> {
    match action {
        Action::Tile => commands::tile(world, display, config, handle),
        Action::TileLayout(layout) => commands::tile_with_layout(world, display, config, handle, &layout),
        Action::Untile => commands::untile(world, display, config, handle),
        Action::CycleTiler => commands::cycle_tiler(world, config, handle),
        Action::Reset => commands::reset(world, config, handle),
        Action::Cycle => run_cycle(world, display, handle),
        Action::MasterIncrease => run_master_adjust(world, handle, Tiler::master_increase),
        Action::MasterDecrease => run_master_adjust(world, handle, Tiler::master_decrease),
        Action::AddMaster => commands::add_master(world, handle),
        Action::RemoveMaster => commands::remove_master(world, handle),
        Action::MakeActiveMaster => commands::make_active_master(world, display, handle),
        Action::WinMaster => commands::win_master(world, display, handle),
        Action::WinPrevious => commands::win_previous(world, display, handle),
        Action::WinNext => commands::win_next(world, display, handle),
        Action::SwitchPrevious => commands::switch_previous(world, display, handle),
        Action::SwitchNext => commands::switch_next(world, display, handle),
        Action::MaxAll => commands::max_all(world, display, handle),
        Action::RestoreAll => commands::restore_all(world, display, handle),
        Action::ScreenFocus(n) => commands::screen_focus(world, display, handle, ScreenId(n)),
        Action::ScreenPut(n) => commands::screen_put(world, display, handle, ScreenId(n)),
    }
}

/// `cycle` (§4.5): run the layout's own cycle algorithm, then swap the
/// pair it returns on screen exactly like [commands::switch_previous]
/// does for its pair.
fn run_cycle(world: &mut WorldModel, display: &dyn DisplayPort, handle: ScreenHandle) -> Result<()> {
    let Some(screen) = world.screen_mut(handle) else {
        return Err(Error::UnknownScreen(handle));
    };
    let Some((a, b)) = screen.tiler.cycle() else {
        return Ok(());
    };
    let (Some(rect_a), Some(rect_b)) = (
        screen.windows.get(&a).map(|w| w.rect),
        screen.windows.get(&b).map(|w| w.rect),
    ) else {
        return Ok(());
    };
    if let Some(w) = screen.windows.get_mut(&a) {
        w.rect = rect_b;
    }
    if let Some(w) = screen.windows.get_mut(&b) {
        w.rect = rect_a;
    }
    display.configure_window(a, rect_b)?;
    display.configure_window(b, rect_a)?;
    Ok(())
}

fn run_master_adjust(world: &mut WorldModel, handle: ScreenHandle, adjust: impl Fn(&mut Tiler)) -> Result<()> {
    let screen = world.screen_mut(handle).ok_or(Error::UnknownScreen(handle))?;
    adjust(&mut screen.tiler);
    world.queue_for_tiling(handle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MockDisplay;
    use crate::geometry::Rect;
    use crate::ids::{DesktopId, ViewportId};
    use crate::world::WorldModel;

    fn one_screen_world(display: &MockDisplay) -> WorldModel {
        let mut world = WorldModel::new();
        world.load_all(display, Tiler::default, &std::collections::HashMap::new()).unwrap();
        world
    }

    #[test]
    fn untiled_screen_allows_tile_actions_but_rejects_others() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        let id = display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        display.set_active_window(Some(id));
        let mut world = one_screen_world(&display);
        world.resolve_active(&display, true).unwrap();
        let config = Config::default();

        // An explicit call is refused outright while untiled, even
        // though cycle_tiler carries no "start tiling" semantics either way.
        dispatch_action(&mut world, &display, &config, "cycle_tiler").unwrap();
        let handle = ScreenHandle::new(DesktopId(0), ViewportId(0), ScreenId(0));
        assert!(!world.screen(handle).unwrap().tiling_enabled);
    }

    #[test]
    fn unknown_binding_is_reported() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        let mut world = one_screen_world(&display);
        let config = Config::default();
        let keymap = Keymap::default();

        let err = dispatch_key(&mut world, &display, &config, &keymap, 38, ModMask::empty()).unwrap_err();
        assert!(matches!(err, Error::UnknownBinding { .. }));
    }

    #[test]
    fn dispatch_action_refuses_to_run_against_an_untiled_screen() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        let id = display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        display.set_active_window(Some(id));
        let mut world = one_screen_world(&display);
        world.resolve_active(&display, true).unwrap();
        let config = Config::default();

        dispatch_action(&mut world, &display, &config, "tile").unwrap();
        let handle = ScreenHandle::new(DesktopId(0), ViewportId(0), ScreenId(0));
        assert!(!world.screen(handle).unwrap().tiling_enabled);
    }
}

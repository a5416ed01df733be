//! Universal commands (§4.4): every Tiler command except the six "hot"
//! per-layout ones (tile, cycle, master_increase, master_decrease,
//! find_next, find_previous), which are dispatched straight through
//! [Tiler] instead. Implemented once, generically, against the World
//! Model and Display Port rather than once per layout.
use crate::config::Config;
use crate::display::{DisplayPort, DisplayPortExt, WmStateRequest};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::ids::{ScreenId, WindowId};
use crate::layout::Tiler;
use crate::tile_state::TileState;
use crate::world::{Screen, ScreenHandle, WorldModel};

/// `tile` (§4.4): save geometry on first entry, reload storage if
/// stale, mark the screen tiling/tiled, then apply the layout's
/// computed positions through the shared geometry helper.
pub fn tile(world: &mut WorldModel, display: &dyn DisplayPort, config: &Config, handle: ScreenHandle) -> Result<()> {
    let screen = world.screen_mut(handle).ok_or(Error::UnknownScreen(handle))?;

    if !screen.tiling_enabled {
        for window in screen.windows.values_mut() {
            window.save_geometry();
        }
    }

    if !screen.is_tiled {
        let filter = config.filter();
        let mut ids: Vec<WindowId> = screen
            .tileable_windows()
            .filter(|w| !filter.iter().any(|needle| w.class_matches(needle)))
            .map(|w| w.id)
            .collect();
        ids.sort();
        let active = screen.active;
        screen.tiler.reload(&ids, active);
    }

    screen.tiling_enabled = true;
    screen.is_tiled = true;

    let rect = screen.rect;
    let placements = screen.tiler.layout(rect);
    let decorations_enabled = config.misc.decorations;
    for (id, target) in placements {
        let decorations = decorations_enabled
            .then(|| screen.windows.get(&id).map(|w| w.decorations))
            .flatten();
        let static_gravity = screen.windows.get(&id).map(|w| w.static_gravity).unwrap_or(false);
        display.apply_tile_geometry(id, target, static_gravity, decorations)?;
    }
    Ok(())
}

/// `tile.<layout>` (§6 KEYMAP): switch to `layout` first if the screen
/// isn't already running it, then `tile`. `"default"` means "keep
/// whatever layout is already active".
pub fn tile_with_layout(
    world: &mut WorldModel,
    display: &dyn DisplayPort,
    config: &Config,
    handle: ScreenHandle,
    layout: &str,
) -> Result<()> {
    if !layout.eq_ignore_ascii_case("default") {
        let screen = world.screen_mut(handle).ok_or(Error::UnknownScreen(handle))?;
        if !screen.tiler.name().eq_ignore_ascii_case(layout) {
            if let Some(next) = config.tiler_named(layout) {
                screen.tiler = next;
                screen.is_tiled = false;
            }
        }
    }
    tile(world, display, config, handle)
}

/// `untile` (§4.4): restore every window's saved geometry, optionally
/// its original decoration state, and clear tiling-enabled.
pub fn untile(world: &mut WorldModel, display: &dyn DisplayPort, config: &Config, handle: ScreenHandle) -> Result<()> {
    let screen = world.screen_mut(handle).ok_or(Error::UnknownScreen(handle))?;

    for window in screen.windows.values() {
        if let Some(original) = window.original {
            display.configure_window(window.id, original)?;
        }
    }
    if config.misc.original_decor {
        for window in screen.windows.values() {
            display.set_undecorated(window.id, false)?;
        }
    }
    screen.tiling_enabled = false;
    Ok(())
}

/// `cycle_tiler` (§4.4): advance to the next entry in `[misc].tilers`
/// (wrapping) and instantiate it fresh for the screen.
pub fn cycle_tiler(world: &mut WorldModel, config: &Config, handle: ScreenHandle) -> Result<()> {
    let screen = world.screen_mut(handle).ok_or(Error::UnknownScreen(handle))?;
    if config.misc.tilers.is_empty() {
        return Ok(());
    }
    let current = screen.tiler.name();
    let pos = config
        .misc
        .tilers
        .iter()
        .position(|n| n.eq_ignore_ascii_case(current))
        .unwrap_or(0);
    let next_name = &config.misc.tilers[(pos + 1) % config.misc.tilers.len()];
    if let Some(next) = config.tiler_named(next_name) {
        screen.tiler = next;
    }
    world.queue_for_tiling(handle);
    Ok(())
}

/// `reset` (§4.4): fresh storage, fresh tile state, same layout.
pub fn reset(world: &mut WorldModel, config: &Config, handle: ScreenHandle) -> Result<()> {
    let screen = world.screen_mut(handle).ok_or(Error::UnknownScreen(handle))?;
    let defaults = config.layout_defaults(screen.tiler.name());
    screen.tiler.reset(TileState::new(defaults));
    world.queue_for_tiling(handle);
    Ok(())
}

/// `screen_focus(n)` (§4.4): no-op on the current screen; otherwise
/// activate the target screen's active window, if it has one.
pub fn screen_focus(world: &WorldModel, display: &dyn DisplayPort, handle: ScreenHandle, target: ScreenId) -> Result<()> {
    if target == handle.screen {
        return Ok(());
    }
    let target_handle = ScreenHandle::new(handle.desktop, handle.viewport, target);
    let screen = world.screen(target_handle).ok_or(Error::UnknownScreen(target_handle))?;
    if let Some(active) = screen.active {
        display.activate_window(active)?;
    }
    Ok(())
}

/// `screen_put(n)` (§4.4, §8 P6): move the current screen's active
/// window into the target screen's storage. If the target isn't
/// tiling, the window is placed at the target's origin rather than
/// laid out. Both screens are enqueued for retile; the source screen's
/// new active window (if any) is activated afterwards, mirroring
/// XMonad rather than re-activating the window that just moved (§9
/// Open Question).
pub fn screen_put(
    world: &mut WorldModel,
    display: &dyn DisplayPort,
    handle: ScreenHandle,
    target: ScreenId,
) -> Result<()> {
    if target == handle.screen {
        return Ok(());
    }
    let target_handle = ScreenHandle::new(handle.desktop, handle.viewport, target);

    let source = world.screen_mut(handle).ok_or(Error::UnknownScreen(handle))?;
    let Some(active) = source.active else {
        return Ok(());
    };
    let Some(mut window) = source.windows.remove(&active) else {
        return Ok(());
    };
    source.tiler.storage_mut().remove(active);
    source.active = source.tileable_windows().map(|w| w.id).next();

    let target_screen = world.screen_mut(target_handle).ok_or(Error::UnknownScreen(target_handle))?;
    if !target_screen.tiling_enabled {
        window.rect = Rect::new(target_screen.rect.x, target_screen.rect.y, window.rect.w, window.rect.h);
        display.configure_window(active, window.rect)?;
    }
    target_screen.tiler.storage_mut().add_bottom(active, window.hidden);
    target_screen.active = Some(active);
    target_screen.windows.insert(active, window);

    world.queue_for_tiling(handle);
    world.queue_for_tiling(target_handle);

    if let Some(new_active) = world.screen(handle).and_then(|s| s.active) {
        display.activate_window(new_active)?;
    }
    Ok(())
}

/// `add_master` (§4.4): grow master capacity by one and promote the
/// first slave into the freed slot, if any. No-op on Maximal/Cascade.
pub fn add_master(world: &mut WorldModel, handle: ScreenHandle) -> Result<()> {
    let screen = world.screen_mut(handle).ok_or(Error::UnknownScreen(handle))?;
    if !screen.tiler.supports_master_adjust() {
        return Ok(());
    }
    let storage = screen.tiler.storage_mut();
    storage.inc_master_count();
    if let Some(&promote) = storage.slaves().first() {
        storage.try_to_promote(promote);
    }
    world.queue_for_tiling(handle);
    Ok(())
}

/// `remove_master` (§4.4): shrink master capacity by one, demoting the
/// lowest master back to the head of the slave list if capacity no
/// longer covers it. No-op on Maximal/Cascade.
pub fn remove_master(world: &mut WorldModel, handle: ScreenHandle) -> Result<()> {
    let screen = world.screen_mut(handle).ok_or(Error::UnknownScreen(handle))?;
    if !screen.tiler.supports_master_adjust() {
        return Ok(());
    }
    let storage = screen.tiler.storage_mut();
    storage.dec_master_count();
    if storage.masters().len() > storage.master_capacity() {
        if let Some(&overflow) = storage.masters().last() {
            storage.remove(overflow);
            storage.add_bottom(overflow, false);
        }
    }
    world.queue_for_tiling(handle);
    Ok(())
}

/// `make_active_master` (§4.4): swap the active window with
/// `masters[0]` in storage and on screen.
pub fn make_active_master(world: &mut WorldModel, display: &dyn DisplayPort, handle: ScreenHandle) -> Result<()> {
    let screen = world.screen_mut(handle).ok_or(Error::UnknownScreen(handle))?;
    let Some(active) = screen.active else {
        return Ok(());
    };
    let Some(&master) = screen.tiler.storage().masters().first() else {
        return Ok(());
    };
    if active == master {
        return Ok(());
    }
    screen.tiler.storage_mut().switch(active, master);
    swap_rects(screen, display, active, master)
}

/// `win_master` (§4.4): activate `masters[0]`.
pub fn win_master(world: &WorldModel, display: &dyn DisplayPort, handle: ScreenHandle) -> Result<()> {
    let screen = world.screen(handle).ok_or(Error::UnknownScreen(handle))?;
    if let Some(&id) = screen.tiler.storage().masters().first() {
        display.activate_window(id)?;
    }
    Ok(())
}

/// `win_previous` (§4.4): activate `find_previous()` of the active window.
pub fn win_previous(world: &WorldModel, display: &dyn DisplayPort, handle: ScreenHandle) -> Result<()> {
    activate_relative(world, display, handle, Tiler::find_previous)
}

/// `win_next` (§4.4): activate `find_next()` of the active window.
pub fn win_next(world: &WorldModel, display: &dyn DisplayPort, handle: ScreenHandle) -> Result<()> {
    activate_relative(world, display, handle, Tiler::find_next)
}

/// `switch_previous` (§4.4): swap the active window with
/// `find_previous()`, in storage and on screen.
pub fn switch_previous(world: &mut WorldModel, display: &dyn DisplayPort, handle: ScreenHandle) -> Result<()> {
    switch_with(world, display, handle, Tiler::find_previous)
}

/// `switch_next` (§4.4): swap the active window with `find_next()`, in
/// storage and on screen.
pub fn switch_next(world: &mut WorldModel, display: &dyn DisplayPort, handle: ScreenHandle) -> Result<()> {
    switch_with(world, display, handle, Tiler::find_next)
}

/// `max_all` (§4.4): request every stored window maximize. No-op on
/// Maximal, which is already full-workarea-sized.
pub fn max_all(world: &WorldModel, display: &dyn DisplayPort, handle: ScreenHandle) -> Result<()> {
    send_wm_state_to_all(world, display, handle, WmStateRequest::Maximize)
}

/// `restore_all` (§4.4): the inverse of [max_all].
pub fn restore_all(world: &WorldModel, display: &dyn DisplayPort, handle: ScreenHandle) -> Result<()> {
    send_wm_state_to_all(world, display, handle, WmStateRequest::Unmaximize)
}

fn send_wm_state_to_all(
    world: &WorldModel,
    display: &dyn DisplayPort,
    handle: ScreenHandle,
    request: WmStateRequest,
) -> Result<()> {
    let screen = world.screen(handle).ok_or(Error::UnknownScreen(handle))?;
    if !screen.tiler.supports_max_all() {
        return Ok(());
    }
    let storage = screen.tiler.storage();
    for &id in storage.masters().iter().chain(storage.slaves()) {
        display.send_wm_state(id, request)?;
    }
    Ok(())
}

fn activate_relative(
    world: &WorldModel,
    display: &dyn DisplayPort,
    handle: ScreenHandle,
    find: impl Fn(&Tiler, WindowId) -> Option<WindowId>,
) -> Result<()> {
    let screen = world.screen(handle).ok_or(Error::UnknownScreen(handle))?;
    let Some(active) = screen.active else {
        return Ok(());
    };
    if let Some(target) = find(&screen.tiler, active) {
        display.activate_window(target)?;
    }
    Ok(())
}

fn switch_with(
    world: &mut WorldModel,
    display: &dyn DisplayPort,
    handle: ScreenHandle,
    find: impl Fn(&Tiler, WindowId) -> Option<WindowId>,
) -> Result<()> {
    let screen = world.screen_mut(handle).ok_or(Error::UnknownScreen(handle))?;
    let Some(active) = screen.active else {
        return Ok(());
    };
    let Some(other) = find(&screen.tiler, active) else {
        return Ok(());
    };
    if other == active {
        return Ok(());
    }
    screen.tiler.storage_mut().switch(active, other);
    swap_rects(screen, display, active, other)
}

/// Swap two windows' on-screen rectangles immediately, without waiting
/// for the next retile, then mirror the swap into each [Window]'s
/// cached rect so a following `untile` restores the right geometry.
fn swap_rects(screen: &mut Screen, display: &dyn DisplayPort, a: WindowId, b: WindowId) -> Result<()> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::mock::Call;
    use crate::display::MockDisplay;
    use crate::ids::{DesktopId, ViewportId};
    use crate::world::WorldModel;

    fn one_screen_world(display: &MockDisplay) -> WorldModel {
        let mut world = WorldModel::new();
        world.load_all(display, Tiler::default, &std::collections::HashMap::new()).unwrap();
        world
    }

    #[test]
    fn tile_marks_the_screen_tiling_and_positions_every_window() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        let a = display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        let b = display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        let mut world = one_screen_world(&display);
        let handle = ScreenHandle::new(DesktopId(0), ViewportId(0), ScreenId(0));
        world.screen_mut(handle).unwrap().active = Some(a);

        let config = Config::default();
        tile(&mut world, &display, &config, handle).unwrap();

        let screen = world.screen(handle).unwrap();
        assert!(screen.tiling_enabled);
        assert!(screen.is_tiled);
        assert!(screen.tiler.storage().contains(a));
        assert!(screen.tiler.storage().contains(b));
        display.drain_calls();
    }

    #[test]
    fn tile_excludes_windows_matching_the_configured_filter() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        let a = display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        let b = display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        let mut world = one_screen_world(&display);
        let handle = ScreenHandle::new(DesktopId(0), ViewportId(0), ScreenId(0));
        {
            let screen = world.screen_mut(handle).unwrap();
            screen.windows.get_mut(&b).unwrap().class = ("Dunst".into(), "dunst".into());
            screen.active = Some(a);
        }

        let mut config = Config::default();
        config.filter = vec!["dunst".to_string()];
        tile(&mut world, &display, &config, handle).unwrap();

        let screen = world.screen(handle).unwrap();
        assert!(screen.tiler.storage().contains(a));
        assert!(!screen.tiler.storage().contains(b));
    }

    #[test]
    fn untile_restores_saved_geometry() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        let a = display.insert_window(DesktopId(0), Rect::new(10, 10, 200, 200));
        let mut world = one_screen_world(&display);
        let handle = ScreenHandle::new(DesktopId(0), ViewportId(0), ScreenId(0));
        world.screen_mut(handle).unwrap().active = Some(a);

        let config = Config::default();
        tile(&mut world, &display, &config, handle).unwrap();
        display.drain_calls();

        untile(&mut world, &display, &config, handle).unwrap();
        assert!(!world.screen(handle).unwrap().tiling_enabled);
        assert!(display
            .drain_calls()
            .contains(&Call::Configure(a, Rect::new(10, 10, 200, 200))));
    }

    #[test]
    fn screen_put_moves_the_active_window_between_storages() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        display.screens.push(crate::display::ScreenGeometry { rect: Rect::new(1000, 0, 1000, 800) });
        let a = display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        let mut world = one_screen_world(&display);

        let source = ScreenHandle::new(DesktopId(0), ViewportId(0), ScreenId(0));
        let target = ScreenHandle::new(DesktopId(0), ViewportId(0), ScreenId(1));
        {
            let screen = world.screen_mut(source).unwrap();
            screen.tiler.storage_mut().add(a, false);
            screen.active = Some(a);
        }

        screen_put(&mut world, &display, source, ScreenId(1)).unwrap();

        assert!(!world.screen(source).unwrap().tiler.storage().contains(a));
        assert!(world.screen(target).unwrap().tiler.storage().contains(a));
        assert_eq!(world.screen(target).unwrap().active, Some(a));
    }

    #[test]
    fn add_master_promotes_the_first_slave() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        let a = display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        let b = display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        let mut world = one_screen_world(&display);
        let handle = ScreenHandle::new(DesktopId(0), ViewportId(0), ScreenId(0));
        {
            let screen = world.screen_mut(handle).unwrap();
            screen.tiler.storage_mut().add(a, false);
            screen.tiler.storage_mut().add(b, false);
        }
        assert!(world.screen(handle).unwrap().tiler.storage().is_slave(b));

        add_master(&mut world, handle).unwrap();
        assert!(world.screen(handle).unwrap().tiler.storage().is_master(b));
    }

    #[test]
    fn remove_master_demotes_the_overflow_master() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        let a = display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        let mut world = one_screen_world(&display);
        let handle = ScreenHandle::new(DesktopId(0), ViewportId(0), ScreenId(0));
        {
            let screen = world.screen_mut(handle).unwrap();
            screen.tiler.storage_mut().inc_master_count();
            screen.tiler.storage_mut().add(a, false);
        }
        assert!(world.screen(handle).unwrap().tiler.storage().is_master(a));

        remove_master(&mut world, handle).unwrap();
        remove_master(&mut world, handle).unwrap();
        assert!(world.screen(handle).unwrap().tiler.storage().is_slave(a));
    }

    #[test]
    fn make_active_master_swaps_storage_and_geometry() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        let a = display.insert_window(DesktopId(0), Rect::new(0, 0, 500, 800));
        let b = display.insert_window(DesktopId(0), Rect::new(500, 0, 500, 800));
        let mut world = one_screen_world(&display);
        let handle = ScreenHandle::new(DesktopId(0), ViewportId(0), ScreenId(0));
        {
            let screen = world.screen_mut(handle).unwrap();
            screen.tiler.storage_mut().add(a, false); // master
            screen.tiler.storage_mut().add(b, false); // slave
            screen.active = Some(b);
        }

        make_active_master(&mut world, &display, handle).unwrap();

        let screen = world.screen(handle).unwrap();
        assert!(screen.tiler.storage().is_master(b));
        assert!(screen.tiler.storage().is_slave(a));
        assert_eq!(screen.windows.get(&a).unwrap().rect, Rect::new(500, 0, 500, 800));
        assert_eq!(screen.windows.get(&b).unwrap().rect, Rect::new(0, 0, 500, 800));
    }
}

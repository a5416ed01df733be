//! Scheduler (§4.7, §5): the single cooperative event loop. Owns the
//! current [Config] and [Keymap], and is the only thing in the crate
//! allowed to call [DisplayPort::next_event] — the loop's one
//! suspension point.
use std::path::{Path, PathBuf};

use crate::commands;
use crate::config::Config;
use crate::dispatcher::{self, Keymap};
use crate::display::DisplayPort;
use crate::error::{Error, Result};
use crate::event::{self, Event};
use crate::ipc::{self, Listener};
use crate::world::WorldModel;

/// The cooperative main loop described in §4.7. Single-threaded by
/// construction: every method here takes `&mut self`/`&mut WorldModel`,
/// there is no interior mutability anywhere in the path.
pub struct Scheduler {
    config: Config,
    keymap: Keymap,
    config_path: Option<PathBuf>,
    ipc: Option<Listener>,
}

impl Scheduler {
    pub fn new(config: Config, keymap: Keymap, config_path: Option<PathBuf>) -> Self {
        Self { config, keymap, config_path, ipc: None }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start accepting `pytylectl` connections at `path`. Optional: a
    /// daemon that fails to bind the socket still runs, just without
    /// IPC (the caller decides whether that's fatal).
    pub fn listen_ipc(&mut self, path: &Path) -> Result<()> {
        self.ipc = Some(ipc::Listener::bind(path)?);
        Ok(())
    }

    /// Populate a freshly wiped world model and seed every screen's
    /// tiler from `[tiling]`, enabling tiling outright where
    /// `global_tiling` is set (§6 MISC). Used both at startup and after
    /// every full reload.
    pub fn seed_world(&self, world: &mut WorldModel, display: &dyn DisplayPort) -> Result<()> {
        world.load_all(display, || self.config.default_tiler(), &self.config.workarea_overrides())?;
        self.apply_initial_tilers(world);
        world.resolve_active(display, true)
    }

    fn apply_initial_tilers(&self, world: &mut WorldModel) {
        for desktop in world.desktops.values_mut() {
            for viewport in desktop.viewports.values_mut() {
                for screen in viewport.screens.values_mut() {
                    screen.tiler = self.config.initial_tiler_for(screen.id, viewport.id);
                    if self.config.misc.global_tiling {
                        screen.tiling_enabled = true;
                    }
                }
            }
        }
    }

    /// Run the loop forever. Only returns on a [Transport][crate::error::Error::Transport]
    /// or [NoScreens][crate::error::Error::NoScreens] error; the process
    /// is expected to exit on SIGTERM rather than on this returning (§5).
    pub fn run(&mut self, world: &mut WorldModel, display: &mut dyn DisplayPort) -> Result<()> {
        loop {
            self.step(world, display)?;
        }
    }

    /// One iteration of the four numbered steps in §4.7.
    pub fn step(&mut self, world: &mut WorldModel, display: &mut dyn DisplayPort) -> Result<()> {
        if world.config_reload_requested {
            self.reload(world, display)?;
            world.config_reload_requested = false;
        }

        if let Some(ipc) = &self.ipc {
            for action in ipc.drain() {
                if let Err(e) = dispatcher::dispatch_action(world, display, &self.config, &action) {
                    tracing::warn!(%action, error = %e, "ipc action failed");
                }
            }
        }

        while let Some(handle) = world.drain_tiling_queue() {
            let tiling_enabled = world.screen(handle).map(|s| s.tiling_enabled).unwrap_or(false);
            if tiling_enabled {
                commands::tile(world, display, &self.config, handle)?;
            }
        }

        let timeout_ms = self.config.timeout_ms();
        if let Some(raw) = display.next_event(timeout_ms)? {
            if let Some(ev) = event::classify(raw) {
                self.apply(world, display, ev)?;
            }
        }
        Ok(())
    }

    fn reload(&mut self, world: &mut WorldModel, display: &mut dyn DisplayPort) -> Result<()> {
        if let Some(path) = &self.config_path {
            self.config = Config::load_or_default(path);
        }
        display.ungrab_keys()?;
        self.keymap = Keymap::build(display, &self.config)?;
        world.wipe();
        self.seed_world(world, display)
    }

    fn apply(&mut self, world: &mut WorldModel, display: &mut dyn DisplayPort, event: Event) -> Result<()> {
        match event {
            Event::ActiveChanged | Event::FocusIn => world.resolve_active(display, false),
            Event::DesktopChanged | Event::ScreenLayoutChanged => {
                world.wipe();
                self.seed_world(world, display)
            }
            Event::KeyPressed { keycode, modmask } => {
                // Only a transport failure or a display with no screens
                // left may terminate the loop here (§7): an unknown
                // binding, an unknown action, a stale active screen, etc.
                // are all local to this one keypress.
                match dispatcher::dispatch_key(world, display, &self.config, &self.keymap, keycode, modmask) {
                    Err(e @ (Error::Transport(_) | Error::NoScreens)) => Err(e),
                    Err(e) => {
                        tracing::warn!(keycode, ?modmask, error = %e, "key dispatch failed");
                        Ok(())
                    }
                    Ok(()) => Ok(()),
                }
            }
            Event::WindowStateChanged { .. } | Event::WindowChanged { .. } => world.reload(display),
            Event::WindowListChanged | Event::WindowCreated { .. } | Event::WindowDestroyed { .. } => {
                world.reconcile_client_list(display)
            }
            Event::WorkareaChanged => world.refresh_workareas(display, &self.config.workarea_overrides()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MockDisplay;
    use crate::geometry::Rect;
    use crate::ids::DesktopId;

    #[test]
    fn step_drains_the_tiling_queue_only_for_tiling_enabled_screens() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        let config = Config::default();
        let keymap = Keymap::default();
        let mut scheduler = Scheduler::new(config, keymap, None);
        let mut world = WorldModel::new();
        scheduler.seed_world(&mut world, &display).unwrap();

        // Nothing is tiling-enabled yet: draining the queue must not
        // call into the display at all.
        scheduler.step(&mut world, &mut display).unwrap();
        assert!(display.drain_calls().is_empty());
    }

    #[test]
    fn global_tiling_seeds_every_screen_as_already_tiling() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        let mut config = Config::default();
        config.misc.global_tiling = true;
        let keymap = Keymap::default();
        let scheduler = Scheduler::new(config, keymap, None);
        let mut world = WorldModel::new();
        scheduler.seed_world(&mut world, &display).unwrap();

        let handle = world.active_path().unwrap();
        assert!(world.screen(handle).unwrap().tiling_enabled);
    }

    #[test]
    fn reload_rebuilds_the_world_and_clears_the_request_flag() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        let config = Config::default();
        let keymap = Keymap::default();
        let mut scheduler = Scheduler::new(config, keymap, None);
        let mut world = WorldModel::new();
        scheduler.seed_world(&mut world, &display).unwrap();
        world.config_reload_requested = true;

        scheduler.step(&mut world, &mut display).unwrap();
        assert!(!world.config_reload_requested);
        assert!(world.active_path().is_some());
    }

    #[test]
    fn key_press_event_is_routed_through_the_dispatcher() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        let id = display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        display.set_active_window(Some(id));
        let mut config = Config::default();
        config.keymap.insert("Mod4-t".to_string(), "tile".to_string());
        let mut world = WorldModel::new();
        let keymap = Keymap::build(&display, &config).unwrap();
        let mut scheduler = Scheduler::new(config, keymap, None);
        scheduler.seed_world(&mut world, &display).unwrap();
        world.resolve_active(&display, true).unwrap();

        // `MockDisplay::grab_keys` resolves the single configured
        // binding to keycode 8 (see its `grab_keys` impl).
        display.push_event(crate::display::RawEvent::KeyPress {
            keycode: 8,
            modmask: crate::display::ModMask::MOD4,
        });

        scheduler.step(&mut world, &mut display).unwrap();
        let handle = world.active_path().unwrap();
        assert!(world.screen(handle).unwrap().tiling_enabled);
    }

    #[test]
    fn key_press_for_an_unregistered_binding_is_logged_and_does_not_end_the_loop() {
        let mut display = MockDisplay::new();
        display.add_screen(Rect::new(0, 0, 1000, 800));
        let config = Config::default();
        let keymap = Keymap::default();
        let mut scheduler = Scheduler::new(config, keymap, None);
        let mut world = WorldModel::new();
        scheduler.seed_world(&mut world, &display).unwrap();

        // No binding is configured, so every keypress is unknown — this
        // must not propagate out of `step` (§7).
        display.push_event(crate::display::RawEvent::KeyPress {
            keycode: 38,
            modmask: crate::display::ModMask::empty(),
        });

        scheduler.step(&mut world, &mut display).unwrap();
    }
}

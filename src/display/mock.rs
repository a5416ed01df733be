//! An in-memory [DisplayPort] for dispatcher/scheduler tests. Grounded
//! on the teacher's `x/mock.rs`: a fixed script of events to replay plus
//! a log of every window-affecting call made against it, so a test can
//! assert on what the core *asked the display to do* without a real X
//! connection.
use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::ids::{DesktopId, WindowId};
use crate::world::window::Decorations;

use super::{
    DesktopInfo, DisplayPort, KeyBinding, RawEvent, ScreenGeometry, WindowAttrs, WmStateRequest,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Configure(WindowId, Rect),
    Activate(WindowId),
    Close(WindowId),
    ResetGravity(WindowId),
    WmState(WindowId, WmStateRequest),
    Undecorated(WindowId, bool),
    GrabKeys(usize),
    UngrabKeys,
}

/// A scripted, introspectable display backend for tests.
#[derive(Debug, Default)]
pub struct MockDisplay {
    pub screens: Vec<ScreenGeometry>,
    pub desktops: Vec<DesktopInfo>,
    pub current_desktop: DesktopId,
    pub uses_viewports: bool,
    pub client_list: Vec<WindowId>,
    pub active_window: Option<WindowId>,
    pub attrs: std::collections::HashMap<WindowId, WindowAttrs>,
    pub wm_running: bool,
    events: VecDeque<RawEvent>,
    calls: RefCell<Vec<Call>>,
    next_window_id: u32,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self {
            wm_running: true,
            next_window_id: 1,
            ..Default::default()
        }
    }

    pub fn push_event(&mut self, event: RawEvent) {
        self.events.push_back(event);
    }

    /// Register a window with fully specified attributes, keyed by an
    /// id the caller already has in hand.
    pub fn insert_window_with_attrs(&mut self, id: WindowId, attrs: WindowAttrs) {
        self.client_list.push(id);
        self.attrs.insert(id, attrs);
    }

    /// Register a window at `rect` on `desktop`, generating a fresh id.
    /// Convenience wrapper over [MockDisplay::insert_window_with_attrs]
    /// for tests that don't care about decorations, title or class.
    pub fn insert_window(&mut self, desktop: DesktopId, rect: Rect) -> WindowId {
        let id = WindowId(self.next_window_id);
        self.next_window_id += 1;
        let attrs = WindowAttrs {
            desktop,
            rect,
            decorations: Decorations::default(),
            title: String::new(),
            class: (String::new(), String::new()),
            static_gravity: false,
            popup: false,
            hidden: false,
        };
        self.insert_window_with_attrs(id, attrs);
        id
    }

    pub fn remove_window(&mut self, id: WindowId) {
        self.client_list.retain(|w| *w != id);
        self.attrs.remove(&id);
    }

    pub fn set_active_window(&mut self, id: Option<WindowId>) {
        self.active_window = id;
    }

    /// Add a physical monitor and, the first time this is called, a
    /// matching single desktop spanning it (most tests only need one).
    pub fn add_screen(&mut self, rect: Rect) {
        if self.desktops.is_empty() {
            self.desktops.push(DesktopInfo {
                id: DesktopId(0),
                name: "0".to_string(),
                workarea: rect,
                resolution: (rect.w, rect.h),
                viewport_origins: vec![Point::default()],
            });
        }
        self.screens.push(ScreenGeometry { rect });
    }
}

impl DisplayPort for MockDisplay {
    fn root(&self) -> WindowId {
        WindowId(0)
    }

    fn is_wm_running(&self) -> bool {
        self.wm_running
    }

    fn screens(&self) -> Result<Vec<ScreenGeometry>> {
        Ok(self.screens.clone())
    }

    fn desktops(&self) -> Result<Vec<DesktopInfo>> {
        Ok(self.desktops.clone())
    }

    fn current_desktop(&self) -> Result<DesktopId> {
        Ok(self.current_desktop)
    }

    fn uses_viewports(&self) -> bool {
        self.uses_viewports
    }

    fn client_list(&self) -> Result<Vec<WindowId>> {
        Ok(self.client_list.clone())
    }

    fn active_window(&self) -> Result<Option<WindowId>> {
        Ok(self.active_window)
    }

    fn window_attrs(&self, id: WindowId) -> Result<WindowAttrs> {
        self.attrs
            .get(&id)
            .cloned()
            .ok_or(crate::error::Error::StaleWindow(id))
    }

    fn translate_to_root(&self, _id: WindowId, p: Point) -> Result<Point> {
        Ok(p)
    }

    fn grab_keys(&self, bindings: &[KeyBinding]) -> Result<Vec<(KeyBinding, u8)>> {
        self.log(Call::GrabKeys(bindings.len()));
        Ok(bindings
            .iter()
            .enumerate()
            .map(|(i, b)| (*b, 8 + i as u8))
            .collect())
    }

    fn ungrab_keys(&self) -> Result<()> {
        self.log(Call::UngrabKeys);
        Ok(())
    }

    fn next_event(&mut self, _timeout_ms: u64) -> Result<Option<RawEvent>> {
        Ok(self.events.pop_front())
    }

    fn configure_window(&self, id: WindowId, rect: Rect) -> Result<()> {
        self.log(Call::Configure(id, rect));
        Ok(())
    }

    fn activate_window(&self, id: WindowId) -> Result<()> {
        self.log(Call::Activate(id));
        Ok(())
    }

    fn close_window(&self, id: WindowId) -> Result<()> {
        self.log(Call::Close(id));
        Ok(())
    }

    fn reset_static_gravity(&self, id: WindowId) -> Result<()> {
        self.log(Call::ResetGravity(id));
        Ok(())
    }

    fn send_wm_state(&self, id: WindowId, request: WmStateRequest) -> Result<()> {
        self.log(Call::WmState(id, request));
        Ok(())
    }

    fn set_undecorated(&self, id: WindowId, undecorated: bool) -> Result<()> {
        self.log(Call::Undecorated(id, undecorated));
        Ok(())
    }
}

impl MockDisplay {
    /// Every [DisplayPort] method that mutates display state takes
    /// `&self` (a real X connection needs no `&mut` to issue a
    /// request), so the call log is kept behind a `RefCell`.
    fn log(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    pub fn drain_calls(&mut self) -> Vec<Call> {
        std::mem::take(self.calls.get_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_window_is_logged() {
        let mut display = MockDisplay::new();
        display.configure_window(WindowId(1), Rect::new(0, 0, 100, 100)).unwrap();
        assert_eq!(
            display.drain_calls(),
            vec![Call::Configure(WindowId(1), Rect::new(0, 0, 100, 100))]
        );
    }

    #[test]
    fn insert_window_places_it_in_the_client_list() {
        let mut display = MockDisplay::new();
        let id = display.insert_window(DesktopId(0), Rect::new(0, 0, 100, 100));
        assert_eq!(display.client_list, vec![id]);
        display.remove_window(id);
        assert!(display.client_list.is_empty());
    }

    #[test]
    fn next_event_drains_the_scripted_queue() {
        let mut display = MockDisplay::new();
        display.push_event(RawEvent::FocusInNormal);
        assert_eq!(display.next_event(0).unwrap(), Some(RawEvent::FocusInNormal));
        assert_eq!(display.next_event(0).unwrap(), None);
    }
}

//! A real [DisplayPort] backed by `x11rb`. Grounded on the teacher's
//! (now superseded) `x11rb::xconn::X11rbConnection` and `x11rb::atom`
//! modules: atoms are interned in one batched round trip at connect
//! time via `strum::IntoEnumIterator`, then looked up by a closed enum
//! rather than by string everywhere else.
use std::collections::HashMap;
use std::time::Duration;

use strum::{AsRefStr, EnumIter, IntoEnumIterator};
use x11rb::connection::Connection;
use x11rb::protocol::xinerama::ConnectionExt as _;
use x11rb::protocol::xproto::{
    AtomEnum, ChangeWindowAttributesAux, ClientMessageData, ClientMessageEvent,
    ConfigureWindowAux, ConnectionExt as _, EventMask, InputFocus, PropMode, StackMode, Window,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::ids::{DesktopId, WindowId};
use crate::world::window::Decorations;

use super::{
    DesktopInfo, DisplayPort, KeyBinding, ModMask, RawEvent, ScreenGeometry, WindowAttrs,
    WmStateRequest,
};

/// Every root/client-window property and client-message atom this crate
/// cares about (§6), interned once at connect time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
#[allow(non_camel_case_types)]
enum Atom {
    #[strum(serialize = "_NET_NUMBER_OF_DESKTOPS")]
    NetNumberOfDesktops,
    #[strum(serialize = "_NET_CURRENT_DESKTOP")]
    NetCurrentDesktop,
    #[strum(serialize = "_NET_DESKTOP_NAMES")]
    NetDesktopNames,
    #[strum(serialize = "_NET_DESKTOP_GEOMETRY")]
    NetDesktopGeometry,
    #[strum(serialize = "_NET_DESKTOP_VIEWPORT")]
    NetDesktopViewport,
    #[strum(serialize = "_NET_WORKAREA")]
    NetWorkarea,
    #[strum(serialize = "_NET_CLIENT_LIST")]
    NetClientList,
    #[strum(serialize = "_NET_ACTIVE_WINDOW")]
    NetActiveWindow,
    #[strum(serialize = "_NET_WM_DESKTOP")]
    NetWmDesktop,
    #[strum(serialize = "_NET_WM_STATE")]
    NetWmState,
    #[strum(serialize = "_NET_WM_STATE_MAXIMIZED_VERT")]
    NetWmStateMaximizedVert,
    #[strum(serialize = "_NET_WM_STATE_MAXIMIZED_HORZ")]
    NetWmStateMaximizedHorz,
    #[strum(serialize = "_NET_WM_STATE_HIDDEN")]
    NetWmStateHidden,
    #[strum(serialize = "_NET_WM_STATE_SKIP_TASKBAR")]
    NetWmStateSkipTaskbar,
    #[strum(serialize = "_NET_WM_STATE_SKIP_PAGER")]
    NetWmStateSkipPager,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE")]
    NetWmWindowType,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DOCK")]
    NetWmWindowTypeDock,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_TOOLBAR")]
    NetWmWindowTypeToolbar,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_MENU")]
    NetWmWindowTypeMenu,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_SPLASH")]
    NetWmWindowTypeSplash,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DIALOG")]
    NetWmWindowTypeDialog,
    #[strum(serialize = "_NET_FRAME_EXTENTS")]
    NetFrameExtents,
    #[strum(serialize = "_NET_WM_NAME")]
    NetWmName,
    #[strum(serialize = "_NET_CLOSE_WINDOW")]
    NetCloseWindow,
    #[strum(serialize = "_NET_SUPPORTING_WM_CHECK")]
    NetSupportingWmCheck,
    #[strum(serialize = "WM_STATE")]
    WmState,
    #[strum(serialize = "WM_TRANSIENT_FOR")]
    WmTransientFor,
    #[strum(serialize = "WM_CLASS")]
    WmClass,
    #[strum(serialize = "WM_NORMAL_HINTS")]
    WmNormalHints,
    #[strum(serialize = "_NET_WM_STATE_MODAL")]
    NetWmStateModal,
    #[strum(serialize = "_OB_WM_STATE_UNDECORATED")]
    ObWmStateUndecorated,
}

/// X11rb-backed [DisplayPort]. Owns the connection and the interned
/// atom table; every other method is a thin, fallible wrapper around
/// the corresponding `x11rb` request.
pub struct X11rbDisplay {
    conn: RustConnection,
    root: Window,
    atoms: HashMap<Atom, u32>,
    has_xinerama: bool,
    /// keysym -> keycode, built once from `GetKeyboardMapping` at connect
    /// time. The mapping is per-session (it would change on a runtime
    /// layout switch, which this crate doesn't watch for).
    keysym_table: HashMap<u32, u8>,
}

impl X11rbDisplay {
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) =
            x11rb::connect(None).map_err(|e| Error::Transport(e.to_string()))?;
        let root = conn.setup().roots[screen_num].root;

        let requests: Vec<_> = Atom::iter()
            .map(|atom| {
                conn.intern_atom(false, atom.as_ref().as_bytes())
                    .map(|cookie| (atom, cookie))
            })
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Transport(e.to_string()))?;

        let mut atoms = HashMap::new();
        for (atom, cookie) in requests {
            let reply = cookie.reply().map_err(|e| Error::Transport(e.to_string()))?;
            atoms.insert(atom, reply.atom);
        }

        let has_xinerama = conn
            .xinerama_query_version(1, 1)
            .and_then(|c| c.reply())
            .is_ok();

        conn.change_window_attributes(
            root,
            &ChangeWindowAttributesAux::new().event_mask(
                EventMask::KEY_PRESS
                    | EventMask::SUBSTRUCTURE_NOTIFY
                    | EventMask::PROPERTY_CHANGE,
            ),
        )
        .map_err(|e| Error::Transport(e.to_string()))?;

        let keysym_table = build_keysym_table(&conn)?;

        Ok(Self {
            conn,
            root,
            atoms,
            has_xinerama,
            keysym_table,
        })
    }

    fn atom(&self, a: Atom) -> u32 {
        *self.atoms.get(&a).expect("every Atom variant is interned at connect")
    }

    fn get_property_u32s(&self, window: Window, atom: Atom) -> Result<Vec<u32>> {
        let reply = self
            .conn
            .get_property(false, window, self.atom(atom), AtomEnum::ANY, 0, u32::MAX)
            .map_err(|e| Error::Transport(e.to_string()))?
            .reply()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(reply.value32().map(|it| it.collect()).unwrap_or_default())
    }

    fn get_property_string(&self, window: Window, atom: Atom) -> Result<String> {
        let reply = self
            .conn
            .get_property(false, window, self.atom(atom), AtomEnum::ANY, 0, u32::MAX)
            .map_err(|e| Error::Transport(e.to_string()))?
            .reply()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(String::from_utf8_lossy(&reply.value).into_owned())
    }

    fn send_client_message(&self, window: Window, atom: Atom, data: [u32; 5]) -> Result<()> {
        let event = ClientMessageEvent::new(32, window, self.atom(atom), ClientMessageData::from(data));
        self.conn
            .send_event(
                false,
                self.root,
                EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT,
                event,
            )
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(())
    }
}

impl DisplayPort for X11rbDisplay {
    fn root(&self) -> WindowId {
        WindowId(self.root)
    }

    fn is_wm_running(&self) -> bool {
        self.get_property_u32s(self.root, Atom::NetSupportingWmCheck)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    fn screens(&self) -> Result<Vec<ScreenGeometry>> {
        if self.has_xinerama {
            let reply = self
                .conn
                .xinerama_query_screens()
                .map_err(|e| Error::Transport(e.to_string()))?
                .reply()
                .map_err(|e| Error::Transport(e.to_string()))?;
            if !reply.screen_info.is_empty() {
                return Ok(reply
                    .screen_info
                    .iter()
                    .map(|s| ScreenGeometry {
                        rect: Rect::new(s.x_org as i32, s.y_org as i32, s.width as i32, s.height as i32),
                    })
                    .collect());
            }
        }

        let geometry = self.get_property_u32s(self.root, Atom::NetDesktopGeometry)?;
        let (w, h) = match geometry.as_slice() {
            [w, h, ..] => (*w as i32, *h as i32),
            _ => (self.conn.setup().roots[0].width_in_pixels as i32, self.conn.setup().roots[0].height_in_pixels as i32),
        };
        Ok(vec![ScreenGeometry { rect: Rect::new(0, 0, w, h) }])
    }

    fn desktops(&self) -> Result<Vec<DesktopInfo>> {
        let count = self
            .get_property_u32s(self.root, Atom::NetNumberOfDesktops)?
            .first()
            .copied()
            .unwrap_or(1) as usize;
        let workareas = self.get_property_u32s(self.root, Atom::NetWorkarea)?;
        let viewports = self.get_property_u32s(self.root, Atom::NetDesktopViewport)?;
        let names = self
            .get_property_string(self.root, Atom::NetDesktopNames)
            .unwrap_or_default();
        let names: Vec<&str> = names.split('\0').filter(|s| !s.is_empty()).collect();

        Ok((0..count)
            .map(|i| {
                let wa = workareas.chunks(4).nth(i);
                let workarea = wa
                    .map(|c| Rect::new(c[0] as i32, c[1] as i32, c[2] as i32, c[3] as i32))
                    .unwrap_or_default();
                let origin = viewports
                    .chunks(2)
                    .nth(i)
                    .map(|c| Point::new(c[0] as i32, c[1] as i32))
                    .unwrap_or_default();
                DesktopInfo {
                    id: DesktopId(i),
                    name: names.get(i).map(|s| s.to_string()).unwrap_or_default(),
                    workarea,
                    resolution: (workarea.w, workarea.h),
                    viewport_origins: vec![origin],
                }
            })
            .collect())
    }

    fn current_desktop(&self) -> Result<DesktopId> {
        Ok(DesktopId(
            self.get_property_u32s(self.root, Atom::NetCurrentDesktop)?
                .first()
                .copied()
                .unwrap_or(0) as usize,
        ))
    }

    fn uses_viewports(&self) -> bool {
        self.get_property_u32s(self.root, Atom::NetDesktopViewport)
            .map(|v| v.iter().any(|&x| x != 0))
            .unwrap_or(false)
    }

    fn client_list(&self) -> Result<Vec<WindowId>> {
        Ok(self
            .get_property_u32s(self.root, Atom::NetClientList)?
            .into_iter()
            .map(WindowId)
            .collect())
    }

    fn active_window(&self) -> Result<Option<WindowId>> {
        Ok(self
            .get_property_u32s(self.root, Atom::NetActiveWindow)?
            .first()
            .copied()
            .filter(|&id| id != 0)
            .map(WindowId))
    }

    fn window_attrs(&self, id: WindowId) -> Result<WindowAttrs> {
        let window = id.0;
        let geom = self
            .conn
            .get_geometry(window)
            .map_err(|_| Error::StaleWindow(id))?
            .reply()
            .map_err(|_| Error::StaleWindow(id))?;
        let desktop = self
            .get_property_u32s(window, Atom::NetWmDesktop)?
            .first()
            .copied()
            .unwrap_or(0) as usize;
        let extents = self.get_property_u32s(window, Atom::NetFrameExtents)?;
        let decorations = match extents.as_slice() {
            [l, r, t, b, ..] => Decorations::new(*l as i32, *r as i32, *t as i32, *b as i32),
            _ => Decorations::default(),
        };
        let title = self
            .get_property_string(window, Atom::NetWmName)
            .unwrap_or_default();
        // WM_CLASS is two null-separated strings: instance then class.
        let class_blob = self.get_property_string(window, Atom::WmClass).unwrap_or_default();
        let mut class_parts = class_blob.split('\0').filter(|s| !s.is_empty());
        let class = (
            class_parts.next().unwrap_or_default().to_string(),
            class_parts.next().unwrap_or_default().to_string(),
        );
        let is_transient = !self.get_property_u32s(window, Atom::WmTransientFor)?.is_empty();
        let state = self.get_property_u32s(window, Atom::NetWmState)?;
        let window_type = self.get_property_u32s(window, Atom::NetWmWindowType)?;
        let hidden_states = [
            self.atom(Atom::NetWmStateHidden),
            self.atom(Atom::NetWmStateSkipTaskbar),
            self.atom(Atom::NetWmStateSkipPager),
        ];
        let hidden_types = [
            self.atom(Atom::NetWmWindowTypeDock),
            self.atom(Atom::NetWmWindowTypeToolbar),
            self.atom(Atom::NetWmWindowTypeMenu),
            self.atom(Atom::NetWmWindowTypeSplash),
            self.atom(Atom::NetWmWindowTypeDialog),
        ];
        let hidden = state.iter().any(|s| hidden_states.contains(s))
            || window_type.iter().any(|t| hidden_types.contains(t));

        Ok(WindowAttrs {
            desktop: DesktopId(desktop),
            rect: Rect::new(
                geom.x as i32,
                geom.y as i32,
                geom.width as i32,
                geom.height as i32,
            ),
            decorations,
            title,
            class,
            static_gravity: false,
            popup: is_transient,
            hidden,
        })
    }

    fn translate_to_root(&self, id: WindowId, p: Point) -> Result<Point> {
        let reply = self
            .conn
            .translate_coordinates(id.0, self.root, p.x as i16, p.y as i16)
            .map_err(|_| Error::StaleWindow(id))?
            .reply()
            .map_err(|_| Error::StaleWindow(id))?;
        Ok(Point::new(reply.dst_x as i32, reply.dst_y as i32))
    }

    fn grab_keys(&self, bindings: &[KeyBinding]) -> Result<Vec<(KeyBinding, u8)>> {
        use x11rb::protocol::xproto::{GrabMode, ModMask as XModMask};

        // Four grab variants per binding neutralize CapsLock (LockMask)
        // and NumLock (Mod2Mask) (§4.2).
        let neutralizers = [
            XModMask::from(0u16),
            XModMask::LOCK,
            XModMask::M2,
            XModMask::LOCK | XModMask::M2,
        ];

        let mut resolved = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let Some(keycode) = self.keysym_to_keycode(binding.keysym) else {
                continue;
            };
            let mods = x_modmask(binding.modmask);
            for extra in neutralizers {
                self.conn
                    .grab_key(
                        true,
                        self.root,
                        mods | extra,
                        keycode,
                        GrabMode::ASYNC,
                        GrabMode::ASYNC,
                    )
                    .map_err(|e| Error::Transport(e.to_string()))?;
            }
            resolved.push((*binding, keycode));
        }
        Ok(resolved)
    }

    fn ungrab_keys(&self) -> Result<()> {
        self.conn
            .ungrab_key(x11rb::protocol::xproto::Grab::ANY as u8, self.root, x11rb::protocol::xproto::ModMask::ANY)
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(())
    }

    fn next_event(&mut self, timeout_ms: u64) -> Result<Option<RawEvent>> {
        use std::os::unix::io::AsRawFd;

        self.conn.flush().map_err(|e| Error::Transport(e.to_string()))?;

        let fd = self.conn.stream().as_raw_fd();
        if !poll_readable(fd, Duration::from_millis(timeout_ms)) {
            return Ok(None);
        }

        let event = self
            .conn
            .poll_for_event()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(event.and_then(|e| self.classify_raw(e)))
    }

    fn configure_window(&self, id: WindowId, rect: Rect) -> Result<()> {
        self.conn
            .configure_window(
                id.0,
                &ConfigureWindowAux::new()
                    .x(rect.x)
                    .y(rect.y)
                    .width(rect.w as u32)
                    .height(rect.h as u32),
            )
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(())
    }

    fn activate_window(&self, id: WindowId) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::PARENT, id.0, x11rb::CURRENT_TIME)
            .map_err(|e| Error::Transport(e.to_string()))?;
        self.conn
            .configure_window(id.0, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))
            .map_err(|e| Error::Transport(e.to_string()))?;
        let net_active = self.atom(Atom::NetActiveWindow);
        self.conn
            .change_property32(PropMode::REPLACE, self.root, net_active, AtomEnum::WINDOW, &[id.0])
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(())
    }

    fn close_window(&self, id: WindowId) -> Result<()> {
        self.send_client_message(id.0, Atom::NetCloseWindow, [0, 0, 0, 0, 0])
    }

    fn reset_static_gravity(&self, id: WindowId) -> Result<()> {
        // win_gravity lives in WM_NORMAL_HINTS (ICCCM XSizeHints), not
        // the window attribute set; flip it to NorthWest so a resize
        // during tiling doesn't get reinterpreted under StaticGravity.
        const P_WIN_GRAVITY: u32 = 1 << 9;
        const NORTH_WEST: u32 = 1;

        let mut raw = self.get_property_u32s(id.0, Atom::WmNormalHints)?;
        raw.resize(18, 0);
        raw[0] |= P_WIN_GRAVITY;
        raw[17] = NORTH_WEST;

        self.conn
            .change_property32(
                PropMode::REPLACE,
                id.0,
                self.atom(Atom::WmNormalHints),
                AtomEnum::WM_SIZE_HINTS,
                &raw,
            )
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(())
    }

    fn send_wm_state(&self, id: WindowId, request: WmStateRequest) -> Result<()> {
        const _NET_WM_STATE_REMOVE: u32 = 0;
        const _NET_WM_STATE_ADD: u32 = 1;

        let action = match request {
            WmStateRequest::Maximize => _NET_WM_STATE_ADD,
            WmStateRequest::Unmaximize => _NET_WM_STATE_REMOVE,
        };
        let vert = self.atom(Atom::NetWmStateMaximizedVert);
        let horz = self.atom(Atom::NetWmStateMaximizedHorz);
        self.send_client_message(id.0, Atom::NetWmState, [action, vert, horz, 0, 0])
    }

    fn set_undecorated(&self, id: WindowId, undecorated: bool) -> Result<()> {
        const _NET_WM_STATE_REMOVE: u32 = 0;
        const _NET_WM_STATE_ADD: u32 = 1;
        let action = if undecorated { _NET_WM_STATE_ADD } else { _NET_WM_STATE_REMOVE };
        self.send_client_message(id.0, Atom::NetWmState, [action, self.atom(Atom::ObWmStateUndecorated), 0, 0, 0])
    }
}

impl X11rbDisplay {
    fn keysym_to_keycode(&self, keysym: u32) -> Option<u8> {
        self.keysym_table.get(&keysym).copied()
    }

    fn classify_raw(&self, event: Event) -> Option<RawEvent> {
        match event {
            Event::KeyPress(e) => Some(RawEvent::KeyPress {
                keycode: e.detail,
                modmask: normalize_modmask(u16::from(e.state)),
            }),
            Event::ConfigureNotify(e) => Some(RawEvent::ConfigureNotify {
                window: WindowId(e.window),
                is_root: e.window == self.root,
            }),
            Event::CreateNotify(e) => Some(RawEvent::CreateNotify { window: WindowId(e.window) }),
            Event::DestroyNotify(e) => Some(RawEvent::DestroyNotify { window: WindowId(e.window) }),
            Event::FocusIn(e) => {
                (e.mode == x11rb::protocol::xproto::NotifyMode::NORMAL).then_some(RawEvent::FocusInNormal)
            }
            Event::PropertyNotify(e) => {
                let is_root = e.window == self.root;
                let name = self.atom_name(e.atom)?;
                Some(RawEvent::PropertyNotify {
                    is_root,
                    atom: name,
                    window: WindowId(e.window),
                })
            }
            _ => None,
        }
    }

    fn atom_name(&self, atom: u32) -> Option<String> {
        self.atoms
            .iter()
            .find(|(_, v)| **v == atom)
            .map(|(k, _)| k.as_ref().to_string())
    }
}

/// Filter the raw state bitmask down to {Shift, Control, Mod1, Mod4};
/// if none are set, the binding is AnyModifier (§4.2).
fn normalize_modmask(raw: u16) -> ModMask {
    use x11rb::protocol::xproto::KeyButMask;
    let raw = KeyButMask::from(raw);
    let mut out = ModMask::empty();
    if raw.contains(KeyButMask::SHIFT) {
        out |= ModMask::SHIFT;
    }
    if raw.contains(KeyButMask::CONTROL) {
        out |= ModMask::CONTROL;
    }
    if raw.contains(KeyButMask::MOD1) {
        out |= ModMask::MOD1;
    }
    if raw.contains(KeyButMask::MOD4) {
        out |= ModMask::MOD4;
    }
    if out.is_empty() {
        out = ModMask::ANY;
    }
    out
}

fn x_modmask(m: ModMask) -> x11rb::protocol::xproto::ModMask {
    use x11rb::protocol::xproto::ModMask as XModMask;
    let mut out = XModMask::from(0u16);
    if m.contains(ModMask::SHIFT) {
        out |= XModMask::SHIFT;
    }
    if m.contains(ModMask::CONTROL) {
        out |= XModMask::CONTROL;
    }
    if m.contains(ModMask::MOD1) {
        out |= XModMask::M1;
    }
    if m.contains(ModMask::MOD4) {
        out |= XModMask::M4;
    }
    if m.contains(ModMask::ANY) {
        out = XModMask::ANY;
    }
    out
}

/// Walk `GetKeyboardMapping` for the server's full keycode range and
/// invert it into keysym -> keycode, taking the first keycode found for
/// a given keysym (group/level 0 of each row, i.e. the unshifted key).
fn build_keysym_table(conn: &RustConnection) -> Result<HashMap<u32, u8>> {
    let setup = conn.setup();
    let min_kc = setup.min_keycode;
    let max_kc = setup.max_keycode;
    let count = max_kc.saturating_sub(min_kc).saturating_add(1);

    let reply = conn
        .get_keyboard_mapping(min_kc, count)
        .map_err(|e| Error::Transport(e.to_string()))?
        .reply()
        .map_err(|e| Error::Transport(e.to_string()))?;

    let per = (reply.keysyms_per_keycode as usize).max(1);
    let mut table = HashMap::new();
    for (i, chunk) in reply.keysyms.chunks(per).enumerate() {
        if let Some(&keysym) = chunk.first() {
            table.entry(keysym).or_insert(min_kc + i as u8);
        }
    }
    Ok(table)
}

/// Block until the connection's file descriptor is readable or the
/// timeout elapses, so `next_event` never blocks indefinitely (§5).
fn poll_readable(fd: std::os::unix::io::RawFd, timeout: Duration) -> bool {
    use nix::poll::{poll, PollFd, PollFlags};

    let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
    matches!(poll(&mut fds, timeout.as_millis() as i32), Ok(n) if n > 0)
}

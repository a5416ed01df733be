//! Event Classifier (§4.2): turns the raw wire-level events the Display
//! Port hands back into the small, closed set of semantic events the
//! Scheduler applies to the World Model.
use crate::display::{ModMask, RawEvent};
use crate::ids::WindowId;

/// The closed set of semantic events this crate reacts to. Every
/// variant corresponds to exactly one row of the §4.2 table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ActiveChanged,
    DesktopChanged,
    FocusIn,
    KeyPressed { keycode: u8, modmask: ModMask },
    ScreenLayoutChanged,
    WindowStateChanged { window: WindowId },
    WindowListChanged,
    WindowChanged { window: WindowId },
    WindowCreated { window: WindowId },
    WindowDestroyed { window: WindowId },
    WorkareaChanged,
}

/// Classify one raw event. Returns `None` for events the table does not
/// name (e.g. a PropertyNotify on an atom nobody cares about) — the
/// caller simply moves on to the next wait-for-event call.
pub fn classify(raw: RawEvent) -> Option<Event> {
    match raw {
        RawEvent::FocusInNormal => Some(Event::FocusIn),
        RawEvent::KeyPress { keycode, modmask } => Some(Event::KeyPressed { keycode, modmask }),
        RawEvent::CreateNotify { window } => Some(Event::WindowCreated { window }),
        RawEvent::DestroyNotify { window } => Some(Event::WindowDestroyed { window }),
        RawEvent::ConfigureNotify { window, is_root } => {
            if is_root {
                Some(Event::ScreenLayoutChanged)
            } else {
                Some(Event::WindowChanged { window })
            }
        }
        RawEvent::PropertyNotify { is_root, atom, window } => {
            if is_root {
                match atom.as_str() {
                    "_NET_ACTIVE_WINDOW" => Some(Event::ActiveChanged),
                    "_NET_CURRENT_DESKTOP" | "_NET_DESKTOP_VIEWPORT" => Some(Event::DesktopChanged),
                    "_NET_DESKTOP_GEOMETRY" | "_NET_NUMBER_OF_DESKTOPS" => {
                        Some(Event::ScreenLayoutChanged)
                    }
                    "_NET_CLIENT_LIST" => Some(Event::WindowListChanged),
                    "_NET_WORKAREA" => Some(Event::WorkareaChanged),
                    _ => None,
                }
            } else {
                match atom.as_str() {
                    "WM_STATE" => Some(Event::WindowStateChanged { window }),
                    "_NET_WM_DESKTOP" => Some(Event::WindowChanged { window }),
                    _ => None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_active_window_property_becomes_active_changed() {
        let raw = RawEvent::PropertyNotify {
            is_root: true,
            atom: "_NET_ACTIVE_WINDOW".to_string(),
            window: WindowId(0),
        };
        assert_eq!(classify(raw), Some(Event::ActiveChanged));
    }

    #[test]
    fn wm_state_on_a_client_window_carries_its_id() {
        let raw = RawEvent::PropertyNotify {
            is_root: false,
            atom: "WM_STATE".to_string(),
            window: WindowId(7),
        };
        assert_eq!(classify(raw), Some(Event::WindowStateChanged { window: WindowId(7) }));
    }

    #[test]
    fn unrecognized_property_atoms_are_dropped() {
        let raw = RawEvent::PropertyNotify {
            is_root: true,
            atom: "_NET_WM_ICON".to_string(),
            window: WindowId(0),
        };
        assert_eq!(classify(raw), None);
    }

    #[test]
    fn root_configure_notify_is_a_screen_layout_change() {
        let raw = RawEvent::ConfigureNotify { window: WindowId(0), is_root: true };
        assert_eq!(classify(raw), Some(Event::ScreenLayoutChanged));
    }
}

//! X keysym name table for resolving the trailing key name in a KEYMAP
//! binding string (e.g. the `j` in `"Mod4-Shift-j"`) to a raw X11 keysym
//! value.
//!
//! This is a hand-trimmed subset of `X11/keysymdef.h`: letters, digits,
//! function keys and the navigation/editing keys that a tiling overlay's
//! bindings realistically use. It is not a full keysym table.
use strum::*;

/// A named X11 keysym.
#[allow(non_camel_case_types)]
#[derive(AsRefStr, EnumString, EnumIter, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum XKeySym {
    /// XK_BackSpace
    #[strum(serialize = "BackSpace")]
    XK_BackSpace,
    /// XK_Tab
    #[strum(serialize = "Tab")]
    XK_Tab,
    /// XK_Return
    #[strum(serialize = "Return")]
    XK_Return,
    /// XK_Escape
    #[strum(serialize = "Escape")]
    XK_Escape,
    /// XK_Delete
    #[strum(serialize = "Delete")]
    XK_Delete,
    /// XK_Home
    #[strum(serialize = "Home")]
    XK_Home,
    /// XK_Left
    #[strum(serialize = "Left")]
    XK_Left,
    /// XK_Up
    #[strum(serialize = "Up")]
    XK_Up,
    /// XK_Right
    #[strum(serialize = "Right")]
    XK_Right,
    /// XK_Down
    #[strum(serialize = "Down")]
    XK_Down,
    /// XK_Page_Up
    #[strum(serialize = "Page_Up")]
    XK_Page_Up,
    /// XK_Page_Down
    #[strum(serialize = "Page_Down")]
    XK_Page_Down,
    /// XK_End
    #[strum(serialize = "End")]
    XK_End,
    /// XK_space
    #[strum(serialize = "space")]
    XK_space,

    /// XK_0
    #[strum(serialize = "0")]
    XK_0,
    /// XK_1
    #[strum(serialize = "1")]
    XK_1,
    /// XK_2
    #[strum(serialize = "2")]
    XK_2,
    /// XK_3
    #[strum(serialize = "3")]
    XK_3,
    /// XK_4
    #[strum(serialize = "4")]
    XK_4,
    /// XK_5
    #[strum(serialize = "5")]
    XK_5,
    /// XK_6
    #[strum(serialize = "6")]
    XK_6,
    /// XK_7
    #[strum(serialize = "7")]
    XK_7,
    /// XK_8
    #[strum(serialize = "8")]
    XK_8,
    /// XK_9
    #[strum(serialize = "9")]
    XK_9,

    /// XK_a
    #[strum(serialize = "a")]
    XK_a,
    /// XK_b
    #[strum(serialize = "b")]
    XK_b,
    /// XK_c
    #[strum(serialize = "c")]
    XK_c,
    /// XK_d
    #[strum(serialize = "d")]
    XK_d,
    /// XK_e
    #[strum(serialize = "e")]
    XK_e,
    /// XK_f
    #[strum(serialize = "f")]
    XK_f,
    /// XK_g
    #[strum(serialize = "g")]
    XK_g,
    /// XK_h
    #[strum(serialize = "h")]
    XK_h,
    /// XK_i
    #[strum(serialize = "i")]
    XK_i,
    /// XK_j
    #[strum(serialize = "j")]
    XK_j,
    /// XK_k
    #[strum(serialize = "k")]
    XK_k,
    /// XK_l
    #[strum(serialize = "l")]
    XK_l,
    /// XK_m
    #[strum(serialize = "m")]
    XK_m,
    /// XK_n
    #[strum(serialize = "n")]
    XK_n,
    /// XK_o
    #[strum(serialize = "o")]
    XK_o,
    /// XK_p
    #[strum(serialize = "p")]
    XK_p,
    /// XK_q
    #[strum(serialize = "q")]
    XK_q,
    /// XK_r
    #[strum(serialize = "r")]
    XK_r,
    /// XK_s
    #[strum(serialize = "s")]
    XK_s,
    /// XK_t
    #[strum(serialize = "t")]
    XK_t,
    /// XK_u
    #[strum(serialize = "u")]
    XK_u,
    /// XK_v
    #[strum(serialize = "v")]
    XK_v,
    /// XK_w
    #[strum(serialize = "w")]
    XK_w,
    /// XK_x
    #[strum(serialize = "x")]
    XK_x,
    /// XK_y
    #[strum(serialize = "y")]
    XK_y,
    /// XK_z
    #[strum(serialize = "z")]
    XK_z,

    /// XK_F1
    #[strum(serialize = "F1")]
    XK_F1,
    /// XK_F2
    #[strum(serialize = "F2")]
    XK_F2,
    /// XK_F3
    #[strum(serialize = "F3")]
    XK_F3,
    /// XK_F4
    #[strum(serialize = "F4")]
    XK_F4,
    /// XK_F5
    #[strum(serialize = "F5")]
    XK_F5,
    /// XK_F6
    #[strum(serialize = "F6")]
    XK_F6,
    /// XK_F7
    #[strum(serialize = "F7")]
    XK_F7,
    /// XK_F8
    #[strum(serialize = "F8")]
    XK_F8,
    /// XK_F9
    #[strum(serialize = "F9")]
    XK_F9,
    /// XK_F10
    #[strum(serialize = "F10")]
    XK_F10,
    /// XK_F11
    #[strum(serialize = "F11")]
    XK_F11,
    /// XK_F12
    #[strum(serialize = "F12")]
    XK_F12,

    /// XK_comma
    #[strum(serialize = "comma")]
    XK_comma,
    /// XK_period
    #[strum(serialize = "period")]
    XK_period,
    /// XK_semicolon
    #[strum(serialize = "semicolon")]
    XK_semicolon,
    /// XK_slash
    #[strum(serialize = "slash")]
    XK_slash,
    /// XK_minus
    #[strum(serialize = "minus")]
    XK_minus,
    /// XK_equal
    #[strum(serialize = "equal")]
    XK_equal,
    /// XK_bracketleft
    #[strum(serialize = "bracketleft")]
    XK_bracketleft,
    /// XK_bracketright
    #[strum(serialize = "bracketright")]
    XK_bracketright,
}

impl XKeySym {
    /// The raw X11 keysym value for this key name, as defined in
    /// `X11/keysymdef.h`.
    pub fn as_u32(&self) -> u32 {
        use XKeySym::*;

        match self {
            XK_BackSpace => 0xff08,
            XK_Tab => 0xff09,
            XK_Return => 0xff0d,
            XK_Escape => 0xff1b,
            XK_Delete => 0xffff,
            XK_Home => 0xff50,
            XK_Left => 0xff51,
            XK_Up => 0xff52,
            XK_Right => 0xff53,
            XK_Down => 0xff54,
            XK_Page_Up => 0xff55,
            XK_Page_Down => 0xff56,
            XK_End => 0xff57,
            XK_space => 0x0020,

            XK_0 => 0x0030,
            XK_1 => 0x0031,
            XK_2 => 0x0032,
            XK_3 => 0x0033,
            XK_4 => 0x0034,
            XK_5 => 0x0035,
            XK_6 => 0x0036,
            XK_7 => 0x0037,
            XK_8 => 0x0038,
            XK_9 => 0x0039,

            XK_a => 0x0061,
            XK_b => 0x0062,
            XK_c => 0x0063,
            XK_d => 0x0064,
            XK_e => 0x0065,
            XK_f => 0x0066,
            XK_g => 0x0067,
            XK_h => 0x0068,
            XK_i => 0x0069,
            XK_j => 0x006a,
            XK_k => 0x006b,
            XK_l => 0x006c,
            XK_m => 0x006d,
            XK_n => 0x006e,
            XK_o => 0x006f,
            XK_p => 0x0070,
            XK_q => 0x0071,
            XK_r => 0x0072,
            XK_s => 0x0073,
            XK_t => 0x0074,
            XK_u => 0x0075,
            XK_v => 0x0076,
            XK_w => 0x0077,
            XK_x => 0x0078,
            XK_y => 0x0079,
            XK_z => 0x007a,

            XK_F1 => 0xffbe,
            XK_F2 => 0xffbf,
            XK_F3 => 0xffc0,
            XK_F4 => 0xffc1,
            XK_F5 => 0xffc2,
            XK_F6 => 0xffc3,
            XK_F7 => 0xffc4,
            XK_F8 => 0xffc5,
            XK_F9 => 0xffc6,
            XK_F10 => 0xffc7,
            XK_F11 => 0xffc8,
            XK_F12 => 0xffc9,

            XK_comma => 0x002c,
            XK_period => 0x002e,
            XK_semicolon => 0x003b,
            XK_slash => 0x002f,
            XK_minus => 0x002d,
            XK_equal => 0x003d,
            XK_bracketleft => 0x005b,
            XK_bracketright => 0x005d,
        }
    }
}

impl From<XKeySym> for u32 {
    fn from(k: XKeySym) -> u32 {
        k.as_u32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn round_trips_by_name() {
        let k = XKeySym::from_str("j").unwrap();
        assert_eq!(k, XKeySym::XK_j);
        assert_eq!(k.as_u32(), 0x006a);
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(XKeySym::from_str("not_a_key").is_err());
    }

    #[test]
    fn every_variant_round_trips_through_as_ref() {
        for k in XKeySym::iter() {
            let name = k.as_ref();
            assert_eq!(XKeySym::from_str(name).unwrap(), k);
        }
    }
}

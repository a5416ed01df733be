//! The closed action vocabulary a keybinding or an IPC call resolves to
//! (§4.4, §4.7, §6 KEYMAP/CALLBACKS).
//!
//! The original evaluates an action's name as a bare Python method call
//! looked up by string at dispatch time; per the redesign guidance this
//! crate parses the string once, at config load, into this enum instead,
//! so an unrecognized action is caught at load time rather than on the
//! first keypress that happens to trigger it.
use crate::error::{Error, Result};

/// One entry in the Dispatcher's action vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Tile,
    Untile,
    CycleTiler,
    Reset,
    Cycle,
    MasterIncrease,
    MasterDecrease,
    AddMaster,
    RemoveMaster,
    MakeActiveMaster,
    WinMaster,
    WinPrevious,
    WinNext,
    SwitchPrevious,
    SwitchNext,
    MaxAll,
    RestoreAll,
    /// `screen_focus.<n>`.
    ScreenFocus(usize),
    /// `screen_put.<n>`.
    ScreenPut(usize),
    /// `tile.<layout>`; `layout` is `"default"` when the action just
    /// means "tile with whatever layout is already active" (§4.7).
    TileLayout(String),
}

impl Action {
    /// Parse a configured action name. Case-sensitive: the vocabulary is
    /// closed and lower_snake_case throughout configuration.
    pub fn parse(name: &str) -> Result<Self> {
        if let Some(layout) = name.strip_prefix("tile.") {
            if layout.is_empty() {
                return Err(Error::UnknownAction(name.to_string()));
            }
            return Ok(Action::TileLayout(layout.to_string()));
        }
        if let Some(n) = name.strip_prefix("screen_focus.") {
            return n
                .parse()
                .map(Action::ScreenFocus)
                .map_err(|_| Error::UnknownAction(name.to_string()));
        }
        if let Some(n) = name.strip_prefix("screen_put.") {
            return n
                .parse()
                .map(Action::ScreenPut)
                .map_err(|_| Error::UnknownAction(name.to_string()));
        }

        match name {
            "tile" => Ok(Action::Tile),
            "untile" => Ok(Action::Untile),
            "cycle_tiler" => Ok(Action::CycleTiler),
            "reset" => Ok(Action::Reset),
            "cycle" => Ok(Action::Cycle),
            "master_increase" => Ok(Action::MasterIncrease),
            "master_decrease" => Ok(Action::MasterDecrease),
            "add_master" => Ok(Action::AddMaster),
            "remove_master" => Ok(Action::RemoveMaster),
            "make_active_master" => Ok(Action::MakeActiveMaster),
            "win_master" => Ok(Action::WinMaster),
            "win_previous" => Ok(Action::WinPrevious),
            "win_next" => Ok(Action::WinNext),
            "switch_previous" => Ok(Action::SwitchPrevious),
            "switch_next" => Ok(Action::SwitchNext),
            "max_all" => Ok(Action::MaxAll),
            "restore_all" => Ok(Action::RestoreAll),
            _ => Err(Error::UnknownAction(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_commands_round_trip() {
        assert_eq!(Action::parse("tile").unwrap(), Action::Tile);
        assert_eq!(Action::parse("cycle").unwrap(), Action::Cycle);
        assert_eq!(Action::parse("max_all").unwrap(), Action::MaxAll);
    }

    #[test]
    fn tile_dot_layout_carries_the_layout_name() {
        assert_eq!(
            Action::parse("tile.Vertical").unwrap(),
            Action::TileLayout("Vertical".to_string())
        );
        assert_eq!(
            Action::parse("tile.default").unwrap(),
            Action::TileLayout("default".to_string())
        );
    }

    #[test]
    fn screen_focus_and_put_carry_their_index() {
        assert_eq!(Action::parse("screen_focus.1").unwrap(), Action::ScreenFocus(1));
        assert_eq!(Action::parse("screen_put.0").unwrap(), Action::ScreenPut(0));
        assert!(Action::parse("screen_focus.x").is_err());
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(matches!(
            Action::parse("defenestrate"),
            Err(Error::UnknownAction(_))
        ));
        assert!(matches!(Action::parse("tile."), Err(Error::UnknownAction(_))));
    }
}

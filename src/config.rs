//! Configuration (§6): a TOML file read at startup and on reload,
//! supplying the keymap, per-layout defaults, per-screen workarea
//! insets, the floating-window filter, initial tilers and (optional)
//! mouse callbacks.
//!
//! A parse failure never aborts startup (§7 policy): the caller falls
//! back to [Config::default], and each unresolvable keymap/callback
//! entry is logged and skipped independently rather than failing the
//! whole file.
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::actions::Action;
use crate::display::{KeyBinding, ModMask};
use crate::error::{Error, Result};
use crate::geometry::Insets;
use crate::ids::{ScreenId, ViewportId};
use crate::layout::Tiler;
use crate::tile_state::{TileState, TileValue};
use pytyle_keysyms::XKeySym;

/// `[misc]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Misc {
    /// Layout names cycled through by `cycle_tiler`, in order.
    pub tilers: Vec<String>,
    /// Whether newly discovered screens start with tiling enabled,
    /// rather than waiting for an explicit `tile`.
    pub global_tiling: bool,
    /// Event loop poll timeout, in seconds.
    pub timeout: f64,
    pub decorations: bool,
    pub original_decor: bool,
}

impl Default for Misc {
    fn default() -> Self {
        Self {
            tilers: vec![
                "Vertical".to_string(),
                "Horizontal".to_string(),
                "HorizontalRows".to_string(),
                "Maximal".to_string(),
                "Cascade".to_string(),
            ],
            global_tiling: false,
            timeout: 0.1,
            decorations: true,
            original_decor: false,
        }
    }
}

/// The full configuration surface (§6), one struct per TOML table.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub misc: Misc,
    /// `[keymap]`: `"Mod-Mod-Key" = "action_name"`.
    pub keymap: HashMap<String, String>,
    /// `[workarea]`: screen id (as a string) → dock insets.
    pub workarea: HashMap<String, Insets>,
    /// `[filter]`: case-insensitive class-name substrings to exclude
    /// from tile storage.
    pub filter: Vec<String>,
    /// `[layout.<Name>]`: per-layout parameter tables.
    pub layout: HashMap<String, HashMap<String, toml::Value>>,
    /// `[tiling]`: initial tiler keyed by `"<screen>"` or
    /// `"<screen>.<viewport>"`, with a `"default"` fallback.
    pub tiling: HashMap<String, String>,
    /// `[callbacks]`: mouse-button spec → action name. Parsed for
    /// completeness but not wired to anything — the Display Port has no
    /// button-grab primitive to back it with (§6 notes this table as
    /// optional).
    pub callbacks: HashMap<String, String>,
}

impl Config {
    /// Parse a configuration file. Returns [Error::ConfigParse] on any
    /// malformed TOML; callers fall back to [Config::default] per §7.
    pub fn load(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// As [Config::load], but swallows the error and logs it rather
    /// than propagating — the form the daemon actually calls it in.
    pub fn load_or_default(path: &Path) -> Config {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "using default configuration");
                Config::default()
            }
        }
    }

    /// Every keymap entry that resolved to a valid binding and a known
    /// action. Entries that don't are logged and dropped (§7
    /// UnknownBinding/UnknownAction).
    pub fn bindings(&self) -> Vec<(KeyBinding, Action)> {
        let mut out = Vec::new();
        for (spec, action_name) in &self.keymap {
            let binding = match parse_binding(spec) {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!(%spec, error = %e, "skipping unresolvable key binding");
                    continue;
                }
            };
            match Action::parse(action_name) {
                Ok(action) => out.push((binding, action)),
                Err(e) => {
                    tracing::warn!(%spec, action = %action_name, error = %e, "skipping binding with unknown action")
                }
            }
        }
        out
    }

    /// As [Config::bindings], for the `[callbacks]` table.
    pub fn callback_actions(&self) -> Vec<(String, Action)> {
        let mut out = Vec::new();
        for (spec, action_name) in &self.callbacks {
            match Action::parse(action_name) {
                Ok(action) => out.push((spec.clone(), action)),
                Err(e) => {
                    tracing::warn!(%spec, action = %action_name, error = %e, "skipping callback with unknown action")
                }
            }
        }
        out
    }

    /// Per-screen dock insets, keyed by the numeric screen id. Entries
    /// with a non-numeric key are logged and skipped.
    pub fn workarea_overrides(&self) -> HashMap<ScreenId, Insets> {
        let mut out = HashMap::new();
        for (key, insets) in &self.workarea {
            match key.parse::<usize>() {
                Ok(n) => {
                    out.insert(ScreenId(n), *insets);
                }
                Err(_) => tracing::warn!(%key, "skipping workarea override with non-numeric screen id"),
            }
        }
        out
    }

    /// Case-insensitive class-name substrings matched against new
    /// windows to exclude them from tiling (§4.4 filter).
    pub fn filter(&self) -> &[String] {
        &self.filter
    }

    /// The configured `[layout.<name>]` table, matched case-insensitively,
    /// converted to [TileValue]s. A parameter whose TOML value is
    /// neither a number nor a string is logged and dropped.
    pub fn layout_defaults(&self, name: &str) -> HashMap<String, TileValue> {
        let mut out = HashMap::new();
        let Some((_, table)) = self.layout.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)) else {
            return out;
        };
        for (key, value) in table {
            match toml_to_tile_value(value) {
                Some(tv) => {
                    out.insert(key.clone(), tv);
                }
                None => tracing::warn!(layout = name, key, "unsupported layout parameter type"),
            }
        }
        out
    }

    /// Build a fresh [Tiler] for `name`, seeded with its configured
    /// `[layout.<name>]` defaults. `None` if `name` isn't one of the
    /// five known layouts.
    pub fn tiler_named(&self, name: &str) -> Option<Tiler> {
        Tiler::named(name, TileState::new(self.layout_defaults(name)))
    }

    /// The tiler a screen freshly entering the world model should
    /// start with: `cycle_tiler`'s first entry unless `[tiling]`
    /// names something else for this screen.
    pub fn default_tiler(&self) -> Tiler {
        self.misc
            .tilers
            .first()
            .and_then(|name| self.tiler_named(name))
            .unwrap_or_default()
    }

    /// Resolve `[tiling]` for one screen: `"<screen>.<viewport>"`, else
    /// `"<screen>"`, else `"default"`, else [Config::default_tiler].
    pub fn initial_tiler_for(&self, screen: ScreenId, viewport: ViewportId) -> Tiler {
        let composite = format!("{}.{}", screen.0, viewport.0);
        let name = self
            .tiling
            .get(&composite)
            .or_else(|| self.tiling.get(&screen.0.to_string()))
            .or_else(|| self.tiling.get("default"));

        name.and_then(|n| self.tiler_named(n)).unwrap_or_else(|| self.default_tiler())
    }

    /// The event loop's poll timeout, in milliseconds (`[misc].timeout`
    /// is specified in fractional seconds).
    pub fn timeout_ms(&self) -> u64 {
        (self.misc.timeout.max(0.0) * 1000.0) as u64
    }
}

fn toml_to_tile_value(v: &toml::Value) -> Option<TileValue> {
    match v {
        toml::Value::Integer(n) => Some(TileValue::Number(*n as f64)),
        toml::Value::Float(n) => Some(TileValue::Number(*n)),
        toml::Value::String(s) => Some(TileValue::Text(s.clone())),
        _ => None,
    }
}

/// Parse a `"Mod-Mod-Key"` binding spec: every token but the last is a
/// modifier name, the last is a key name resolved through
/// [pytyle_keysyms::XKeySym]. A binding with no modifier tokens grabs
/// under [ModMask::ANY].
fn parse_binding(spec: &str) -> Result<KeyBinding> {
    let mut tokens: Vec<&str> = spec.split('-').collect();
    let key_name = tokens
        .pop()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::ConfigParse(format!("empty key binding '{spec}'")))?;

    let keysym = XKeySym::from_str(key_name)
        .map_err(|_| Error::ConfigParse(format!("unknown key name '{key_name}' in binding '{spec}'")))?
        .as_u32();

    let mut modmask = ModMask::empty();
    for token in tokens {
        let bit = match token {
            "Shift" => ModMask::SHIFT,
            "Control" | "Ctrl" => ModMask::CONTROL,
            "Mod1" | "Alt" => ModMask::MOD1,
            "Mod4" | "Super" => ModMask::MOD4,
            other => return Err(Error::ConfigParse(format!("unknown modifier '{other}' in binding '{spec}'"))),
        };
        modmask |= bit;
    }
    if modmask.is_empty() {
        modmask = ModMask::ANY;
    }

    Ok(KeyBinding { keysym, modmask })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        filter = ["mplayer"]

        [misc]
        tilers = ["Vertical", "Maximal"]
        global_tiling = true
        timeout = 0.2

        [keymap]
        "Mod4-j" = "cycle"
        "Mod4-Shift-t" = "tile.Vertical"
        "Mod4-bogus" = "tile.Vertical"
        "Mod4-k" = "defenestrate"

        [workarea]
        "0" = { top = 20, bottom = 0, left = 0, right = 0 }

        [layout.Vertical]
        width_factor = 0.6

        [tiling]
        default = "Maximal"
        "0" = "Horizontal"
    "#;

    #[test]
    fn parses_a_full_file() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.misc.tilers, vec!["Vertical", "Maximal"]);
        assert!(config.misc.global_tiling);
        assert_eq!(config.timeout_ms(), 200);
    }

    #[test]
    fn filter_is_read_as_a_flat_list() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.filter(), &["mplayer".to_string()]);
    }

    #[test]
    fn bindings_skip_unresolvable_entries_without_failing() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let bindings = config.bindings();
        // "Mod4-bogus" (no such key) and "Mod4-k" -> "defenestrate" (no
        // such action) are both dropped; the other two survive.
        assert_eq!(bindings.len(), 2);
    }

    #[test]
    fn workarea_overrides_parse_numeric_screen_ids() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let overrides = config.workarea_overrides();
        assert_eq!(overrides.get(&ScreenId(0)), Some(&Insets { top: 20, bottom: 0, left: 0, right: 0 }));
    }

    #[test]
    fn layout_defaults_are_matched_case_insensitively() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let defaults = config.layout_defaults("vertical");
        assert_eq!(defaults.get("width_factor").and_then(TileValue::as_f64), Some(0.6));
    }

    #[test]
    fn initial_tiler_for_falls_back_through_screen_then_default() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.initial_tiler_for(ScreenId(0), ViewportId(0)).name(), "Horizontal");
        assert_eq!(config.initial_tiler_for(ScreenId(9), ViewportId(0)).name(), "Maximal");
    }

    #[test]
    fn malformed_toml_is_reported_as_config_parse() {
        let err = toml::from_str::<Config>("not = [valid").unwrap_err();
        assert!(Error::ConfigParse(err.to_string()).to_string().contains("failed to parse"));
    }

    #[test]
    fn default_config_has_no_bindings_and_the_standard_tiler_order() {
        let config = Config::default();
        assert!(config.bindings().is_empty());
        assert_eq!(config.misc.tilers[0], "Vertical");
    }
}

//! Tile State (§3/§4.3): per-tiler scratchpad for layout-local parameters
//! such as `width_factor` or `decoration_height`, falling back to the
//! configured `[layout.<Name>]` defaults when no local override has been
//! set.
use std::collections::HashMap;

/// A value stored against a layout parameter key. Layout parameters are
/// either numeric (`width_factor`, `decoration_height`, `row_size`) or
/// textual (`horz_align`).
#[derive(Debug, Clone, PartialEq)]
pub enum TileValue {
    Number(f64),
    Text(String),
}

impl TileValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TileValue::Number(n) => Some(*n),
            TileValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TileValue::Text(s) => Some(s),
            TileValue::Number(_) => None,
        }
    }
}

impl From<f64> for TileValue {
    fn from(n: f64) -> Self {
        TileValue::Number(n)
    }
}

impl From<&str> for TileValue {
    fn from(s: &str) -> Self {
        TileValue::Text(s.to_string())
    }
}

impl From<String> for TileValue {
    fn from(s: String) -> Self {
        TileValue::Text(s)
    }
}

/// Per-tiler key-value store. `defaults` comes from the matching
/// `[layout.<Name>]` table in configuration; `overrides` are set at
/// runtime (e.g. by `master_increase` persisting a new `width_factor`).
///
/// A lookup with neither an override nor a configured default resolves
/// to `None` — the `LayoutParameterMissing` case of §7, which the layout
/// must tolerate rather than treat as an error.
#[derive(Debug, Clone, Default)]
pub struct TileState {
    defaults: HashMap<String, TileValue>,
    overrides: HashMap<String, TileValue>,
}

impl TileState {
    pub fn new(defaults: HashMap<String, TileValue>) -> Self {
        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&TileValue> {
        self.overrides.get(key).or_else(|| self.defaults.get(key))
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(TileValue::as_f64)
    }

    pub fn get_f64_or(&self, key: &str, fallback: f64) -> f64 {
        self.get_f64(key).unwrap_or(fallback)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(TileValue::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<TileValue>) {
        self.overrides.insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_shadows_default() {
        let mut defaults = HashMap::new();
        defaults.insert("width_factor".to_string(), TileValue::Number(0.5));
        let mut state = TileState::new(defaults);
        assert_eq!(state.get_f64("width_factor"), Some(0.5));

        state.set("width_factor", 0.6);
        assert_eq!(state.get_f64("width_factor"), Some(0.6));
    }

    #[test]
    fn missing_parameter_resolves_to_none() {
        let state = TileState::default();
        assert_eq!(state.get_f64("width_factor"), None);
    }

    #[test]
    fn text_values_round_trip() {
        let mut state = TileState::default();
        state.set("horz_align", "right");
        assert_eq!(state.get_str("horz_align"), Some("right"));
    }
}

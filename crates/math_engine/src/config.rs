//! Engine configuration
//!
//! Layout constants and colour overrides, read from JSON. A file that cannot
//! be parsed is reported and replaced by the defaults.

use crate::color::ColorTable;
use crate::error::MathResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Configuration for layout and drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pixel size of the text font in display and text style
    pub font_size: i32,
    /// Size factor applied in script style
    pub script_scale: f32,
    /// Size factor applied in scriptscript style
    pub scriptscript_scale: f32,
    /// Padding around relation symbols, as a fraction of the width of `M`
    pub rel_padding: f32,
    /// Padding around binary operators, as a fraction of the width of `M`
    pub bin_padding: f32,
    /// Share of that padding placed left of the symbol, the rest goes right
    pub padding_left_share: f32,
    /// Gap between a fraction rule and numerator/denominator
    pub frac_gap: i32,
    /// Thickness of fraction rules and frames
    pub rule_thickness: i32,
    /// Height reserved for an over/under decoration glyph
    pub decoration_height: i32,
    /// Width of a non-wide decoration glyph
    pub decoration_width: i32,
    /// Horizontal gap between grid columns
    pub grid_col_sep: i32,
    /// Vertical gap between grid rows
    pub grid_row_sep: i32,
    /// Available width for display formulas
    pub text_width: i32,
    /// Draw frames for empty cells
    pub show_placeholders: bool,
    /// `#rrggbb` overrides keyed by LaTeX colour name or role name
    pub colors: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            font_size: 16,
            script_scale: 0.7,
            scriptscript_scale: 0.5,
            rel_padding: 0.5,
            bin_padding: 0.33,
            padding_left_share: 0.4,
            frac_gap: 2,
            rule_thickness: 1,
            decoration_height: 6,
            decoration_width: 6,
            grid_col_sep: 10,
            grid_row_sep: 4,
            text_width: 600,
            show_placeholders: true,
            colors: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> MathResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file, falling back to defaults when it is absent or malformed
    pub fn load(path: &Path) -> MathResult<Self> {
        if !path.exists() {
            tracing::debug!("no engine config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        match Self::from_json_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("Failed to parse engine config, using defaults: {}", e);
                Ok(Self::default())
            }
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> MathResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Colour table with this configuration's overrides applied
    pub fn color_table(&self) -> MathResult<ColorTable> {
        ColorTable::with_overrides(&self.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, ColorRole};

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.font_size, 16);
        assert!(config.script_scale < 1.0);
        assert!(config.scriptscript_scale < config.script_scale);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{"font_size": 20, "rel_padding": 0.25}"#)
            .unwrap();
        assert_eq!(config.font_size, 20);
        assert_eq!(config.rel_padding, 0.25);
        assert_eq!(config.frac_gap, EngineConfig::default().frac_gap);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = EngineConfig::default();
        config.colors.insert("error".into(), "#123456".into());
        let json = config.to_json().unwrap();
        let back = EngineConfig::from_json_str(&json).unwrap();
        assert_eq!(config, back);
        let table = back.color_table().unwrap();
        assert_eq!(table.role(ColorRole::Error), Color::rgb(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = std::env::temp_dir().join(format!("math_engine_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = EngineConfig::load(&dir.join("absent.json")).unwrap();
        assert_eq!(missing, EngineConfig::default());

        let bad = dir.join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert_eq!(EngineConfig::load(&bad).unwrap(), EngineConfig::default());

        let good = dir.join("good.json");
        std::fs::write(&good, r#"{"grid_col_sep": 3}"#).unwrap();
        assert_eq!(EngineConfig::load(&good).unwrap().grid_col_sep, 3);

        std::fs::remove_dir_all(&dir).ok();
    }
}

//! Colours - named LaTeX colours and the colours the engine paints with
//!
//! The table is built once from defaults plus configuration overrides and is
//! then passed into the rendering context; nothing here is global.

use crate::error::{MathError, MathResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A color in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    /// Parse `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> MathResult<Self> {
        let digits = hex.trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(MathError::Config(format!("invalid colour '{}'", hex)));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| MathError::Config(format!("invalid colour '{}': {}", hex, e)))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `#rrggbb` form used by MathML and CSS output
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Colours the engine uses for its own purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    /// Ordinary math content
    Math,
    /// Unknown commands and other degraded output
    Error,
    /// `#1`-style macro arguments
    MacroArg,
    /// `%` comments
    Comment,
    /// Frame around empty cells
    Placeholder,
    /// Box frames, fraction rules and other strokes
    Frame,
}

/// Package a named colour needs in the LaTeX preamble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorPackage {
    /// One of the eight colours known to the `color` package
    Color,
    /// A colour only `xcolor` defines
    Xcolor,
}

impl ColorPackage {
    pub fn name(&self) -> &'static str {
        match self {
            ColorPackage::Color => "color",
            ColorPackage::Xcolor => "xcolor",
        }
    }
}

const BASE_COLORS: &[(&str, Color)] = &[
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 255, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
];

const XCOLOR_COLORS: &[(&str, Color)] = &[
    ("brown", Color::rgb(191, 128, 64)),
    ("darkgray", Color::rgb(64, 64, 64)),
    ("gray", Color::rgb(128, 128, 128)),
    ("lightgray", Color::rgb(191, 191, 191)),
    ("lime", Color::rgb(191, 255, 0)),
    ("olive", Color::rgb(128, 128, 0)),
    ("orange", Color::rgb(255, 128, 0)),
    ("pink", Color::rgb(255, 191, 191)),
    ("purple", Color::rgb(191, 0, 64)),
    ("teal", Color::rgb(0, 128, 128)),
    ("violet", Color::rgb(128, 0, 128)),
];

/// Package needed for a LaTeX colour name, `None` for names neither package defines
pub fn color_package(name: &str) -> Option<ColorPackage> {
    if BASE_COLORS.iter().any(|(n, _)| *n == name) {
        Some(ColorPackage::Color)
    } else if XCOLOR_COLORS.iter().any(|(n, _)| *n == name) {
        Some(ColorPackage::Xcolor)
    } else {
        None
    }
}

/// Immutable lookup table of named and role colours
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    named: BTreeMap<String, Color>,
    roles: BTreeMap<String, Color>,
}

impl Default for ColorTable {
    fn default() -> Self {
        let named = BASE_COLORS
            .iter()
            .chain(XCOLOR_COLORS.iter())
            .map(|(n, c)| (n.to_string(), *c))
            .collect();
        let roles = [
            (ColorRole::Math, Color::BLACK),
            (ColorRole::Error, Color::rgb(178, 34, 34)),
            (ColorRole::MacroArg, Color::rgb(0, 100, 0)),
            (ColorRole::Comment, Color::rgb(128, 128, 128)),
            (ColorRole::Placeholder, Color::BLUE),
            (ColorRole::Frame, Color::BLACK),
        ]
        .into_iter()
        .map(|(r, c)| (role_key(r).to_string(), c))
        .collect();
        Self { named, roles }
    }
}

fn role_key(role: ColorRole) -> &'static str {
    match role {
        ColorRole::Math => "math",
        ColorRole::Error => "error",
        ColorRole::MacroArg => "macro_arg",
        ColorRole::Comment => "comment",
        ColorRole::Placeholder => "placeholder",
        ColorRole::Frame => "frame",
    }
}

impl ColorTable {
    /// Build the table from defaults, replacing entries named in `overrides`.
    ///
    /// Keys are either LaTeX colour names or role names (`math`, `error`, ...);
    /// values are `#rrggbb` strings.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> MathResult<Self> {
        let mut table = Self::default();
        for (key, value) in overrides {
            let color = Color::from_hex(value)?;
            if table.roles.contains_key(key.as_str()) {
                table.roles.insert(key.clone(), color);
            } else {
                table.named.insert(key.clone(), color);
            }
        }
        Ok(table)
    }

    /// Look up a LaTeX colour name
    pub fn named(&self, name: &str) -> Option<Color> {
        self.named.get(name).copied()
    }

    /// Colour used for a drawing role
    pub fn role(&self, role: ColorRole) -> Color {
        self.roles
            .get(role_key(role))
            .copied()
            .unwrap_or(Color::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_creation() {
        let c = Color::rgb(255, 128, 64);
        assert_eq!(c.r, 255);
        assert_eq!(c.g, 128);
        assert_eq!(c.b, 64);
        assert_eq!(c.a, 255);
    }

    #[test]
    fn test_hex_round_trip() {
        let c = Color::from_hex("#bf8040").unwrap();
        assert_eq!(c, Color::rgb(191, 128, 64));
        assert_eq!(c.to_hex(), "#bf8040");
        assert!(Color::from_hex("#12").is_err());
        assert!(Color::from_hex("zzzzzz").is_err());
    }

    #[test]
    fn test_color_package() {
        assert_eq!(color_package("red"), Some(ColorPackage::Color));
        assert_eq!(color_package("brown"), Some(ColorPackage::Xcolor));
        assert_eq!(color_package("chartreuse"), None);
        assert_eq!(ColorPackage::Xcolor.name(), "xcolor");
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("error".to_string(), "#00ff00".to_string());
        overrides.insert("mint".to_string(), "#98ff98".to_string());
        let table = ColorTable::with_overrides(&overrides).unwrap();
        assert_eq!(table.role(ColorRole::Error), Color::rgb(0, 255, 0));
        assert_eq!(table.named("mint"), Some(Color::rgb(152, 255, 152)));
        assert_eq!(table.named("red"), Some(Color::RED));
    }
}

//! Fonts and font metrics
//!
//! The engine never talks to a real font system. It asks a [`FontMetrics`]
//! provider for glyph sizes; [`FixedFontMetrics`] is a deterministic provider
//! with typical proportions of a math font.

use crate::color::Color;
use crate::dimension::Dimension;
use serde::{Deserialize, Serialize};

/// Math font family variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FontFamily {
    /// Default math font: letters italic, everything else upright
    #[default]
    Math,
    /// Bold variant of the default math font (`\boldsymbol`, `\bm`)
    BoldMath,
    /// Normal upright text
    Roman,
    /// Italic
    Italic,
    /// Bold
    Bold,
    /// Sans-serif
    SansSerif,
    /// Monospace
    Typewriter,
    /// Script (calligraphic)
    Calligraphic,
    /// Double-struck (blackboard bold)
    Blackboard,
    /// Fraktur (German blackletter)
    Fraktur,
}

impl FontFamily {
    /// Check if this family draws `c` slanted
    pub fn is_italic_for(&self, c: char) -> bool {
        match self {
            FontFamily::Math | FontFamily::BoldMath => c.is_alphabetic(),
            FontFamily::Italic => true,
            _ => false,
        }
    }

    /// Check if this family is bold
    pub fn is_bold(&self) -> bool {
        matches!(self, FontFamily::BoldMath | FontFamily::Bold)
    }
}

/// The font state threaded through layout and drawing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontInfo {
    pub family: FontFamily,
    /// Pixel size
    pub size: i32,
    pub color: Color,
}

impl FontInfo {
    pub fn new(family: FontFamily, size: i32, color: Color) -> Self {
        Self {
            family,
            size,
            color,
        }
    }

    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.family = family;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Upright variant for non-letters drawn in the default math font
    pub fn for_char(self, c: char) -> Self {
        if self.family == FontFamily::Math && !c.is_alphabetic() {
            self.with_family(FontFamily::Roman)
        } else {
            self
        }
    }
}

/// Font metrics provider consumed by the layout pass
pub trait FontMetrics {
    /// Advance width of `c`
    fn char_width(&self, font: &FontInfo, c: char) -> i32;
    /// Height of `c` above the baseline
    fn char_ascent(&self, font: &FontInfo, c: char) -> i32;
    /// Depth of `c` below the baseline
    fn char_descent(&self, font: &FontInfo, c: char) -> i32;

    fn string_width(&self, font: &FontInfo, s: &str) -> i32 {
        s.chars().map(|c| self.char_width(font, c)).sum()
    }

    fn char_dim(&self, font: &FontInfo, c: char) -> Dimension {
        Dimension::new(
            self.char_width(font, c),
            self.char_ascent(font, c),
            self.char_descent(font, c),
        )
    }

    fn string_dim(&self, font: &FontInfo, s: &str) -> Dimension {
        let mut dim = Dimension::default();
        for c in s.chars() {
            dim.append(&self.char_dim(font, c));
        }
        dim
    }

    /// Height of a lowercase `x`
    fn x_height(&self, font: &FontInfo) -> i32 {
        self.char_ascent(font, 'x')
    }

    /// Width of `M`, the reference for symbol padding
    fn em_width(&self, font: &FontInfo) -> i32 {
        self.char_width(font, 'M')
    }
}

/// Deterministic metrics with proportions of a typical math font
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedFontMetrics;

impl FixedFontMetrics {
    pub fn new() -> Self {
        Self
    }

    fn width_factor(c: char) -> f32 {
        match c {
            'M' | 'W' | 'm' | 'w' => 0.9,
            'i' | 'l' | 'j' | 'I' | '.' | ',' | ';' | ':' | '!' | '|' | '\'' | '`' => 0.3,
            '0'..='9' => 0.5,
            ' ' => 0.33,
            '(' | ')' | '[' | ']' | '{' | '}' => 0.35,
            '=' | '+' | '-' | '<' | '>' | '*' => 0.75,
            c if c.is_ascii_uppercase() => 0.7,
            c if c.is_ascii() => 0.55,
            _ => 0.75,
        }
    }

    fn family_factor(family: FontFamily) -> f32 {
        match family {
            FontFamily::Bold | FontFamily::BoldMath => 1.1,
            FontFamily::Calligraphic | FontFamily::Blackboard | FontFamily::Fraktur => 1.05,
            _ => 1.0,
        }
    }

    fn scaled(size: i32, factor: f32) -> i32 {
        (size as f32 * factor).round() as i32
    }
}

impl FontMetrics for FixedFontMetrics {
    fn char_width(&self, font: &FontInfo, c: char) -> i32 {
        let factor = if font.family == FontFamily::Typewriter {
            0.6
        } else {
            Self::width_factor(c) * Self::family_factor(font.family)
        };
        Self::scaled(font.size, factor).max(1)
    }

    fn char_ascent(&self, font: &FontInfo, c: char) -> i32 {
        let factor = match c {
            '.' | ',' | '_' => 0.1,
            '-' | '=' | '+' | '<' | '>' | '*' | ':' | ';' => 0.5,
            'b' | 'd' | 'f' | 'h' | 'k' | 'l' | 't' | 'i' | 'j' => 0.72,
            '(' | ')' | '[' | ']' | '{' | '}' | '|' | '/' | '\'' | '!' | '?' => 0.75,
            c if c.is_ascii_uppercase() || c.is_ascii_digit() => 0.72,
            c if c.is_ascii_lowercase() => 0.45,
            ' ' => 0.0,
            _ => 0.72,
        };
        Self::scaled(font.size, factor)
    }

    fn char_descent(&self, font: &FontInfo, c: char) -> i32 {
        let factor = match c {
            'g' | 'j' | 'p' | 'q' | 'y' | ',' | ';' => 0.22,
            '(' | ')' | '[' | ']' | '{' | '}' | '|' | '/' => 0.25,
            c if c.is_ascii() => 0.0,
            _ => 0.1,
        };
        Self::scaled(font.size, factor)
    }
}

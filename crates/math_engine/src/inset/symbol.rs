//! Named symbols: operators, relations, Greek letters, function names

use crate::context::{MathStyle, MetricsBase, MetricsInfo, PainterInfo};
use crate::dimension::Dimension;
use crate::features::LatexFeatures;
use crate::font::{FontFamily, FontInfo};
use crate::symbols::{self, SymbolClass, SymbolInfo};
use serde::{Deserialize, Serialize};

/// Large operators grow by this factor in display style
const DISPLAY_OP_SCALE: f32 = 1.4;

/// A symbol from the symbol table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInset {
    name: String,
}

impl SymbolInset {
    /// Symbol for a command name or operator character; `None` if unknown
    pub fn new(name: &str) -> Option<Self> {
        symbols::lookup(name).map(|_| Self {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> Option<&'static SymbolInfo> {
        symbols::lookup(&self.name)
    }

    /// Text drawn for the symbol
    pub fn glyph(&self) -> &str {
        self.info().map(|i| i.unicode).unwrap_or(self.name.as_str())
    }

    pub fn is_relation(&self) -> bool {
        self.info().is_some_and(|i| i.is_relation())
    }

    pub fn is_binary(&self) -> bool {
        self.info().is_some_and(|i| i.is_binary())
    }

    fn class(&self) -> SymbolClass {
        self.info().map(|i| i.class).unwrap_or(SymbolClass::Ord)
    }

    fn font(&self, base: &MetricsBase<'_>) -> FontInfo {
        let upright = match base.font.family {
            FontFamily::BoldMath => FontFamily::Bold,
            FontFamily::Math => FontFamily::Roman,
            other => other,
        };
        match self.class() {
            SymbolClass::Func { .. } => base.font.with_family(upright),
            SymbolClass::BigOp { .. } => {
                let mut font = base.font.with_family(upright);
                if base.style == MathStyle::Display {
                    font.size = (font.size as f32 * DISPLAY_OP_SCALE).round() as i32;
                }
                font
            }
            _ => match self.glyph().chars().next() {
                Some(c) => base.font.for_char(c),
                None => base.font,
            },
        }
    }

    /// Left and right padding of relations and binary operators
    pub(crate) fn padding(&self, base: &MetricsBase<'_>) -> (i32, i32) {
        if !base.style.is_spaced() {
            return (0, 0);
        }
        let factor = match self.class() {
            SymbolClass::Rel => base.config.rel_padding,
            SymbolClass::Bin => base.config.bin_padding,
            _ => return (0, 0),
        };
        let total = (factor * base.em() as f32).round() as i32;
        let share = base.config.padding_left_share.clamp(0.0, 1.0);
        let left = (total as f32 * share).round() as i32;
        (left, total - left)
    }

    pub fn metrics(&self, mi: &MetricsInfo<'_>) -> Dimension {
        let font = self.font(&mi.base);
        let mut dim = mi.base.fm.string_dim(&font, self.glyph());
        let (left, right) = self.padding(&mi.base);
        dim.wid += left + right;
        dim
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) {
        let font = self.font(&pi.base);
        let (left, _) = self.padding(&pi.base);
        pi.pain.text(x + left, y, self.glyph(), &font);
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        if let Some(package) = self.info().and_then(|i| i.package) {
            features.require(package);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorTable;
    use crate::config::EngineConfig;
    use crate::font::{FixedFontMetrics, FontMetrics};
    use crate::painter::RecordingPainter;

    #[test]
    fn test_unknown_name() {
        assert!(SymbolInset::new("nosuchsymbol").is_none());
        assert_eq!(SymbolInset::new("alpha").unwrap().glyph(), "α");
    }

    #[test]
    fn test_relation_padding() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let eq = SymbolInset::new("=").unwrap();
        let glyph = fm.char_width(&mi.base.font.with_family(FontFamily::Roman), '=');
        let pad = (config.rel_padding * mi.base.em() as f32).round() as i32;
        assert!(pad > 0);
        assert_eq!(eq.metrics(&mi).wid, glyph + pad);

        let script = MetricsInfo::new(&fm, &config, &colors, MathStyle::Script);
        let glyph = fm.char_width(&script.base.font.with_family(FontFamily::Roman), '=');
        assert_eq!(eq.metrics(&script).wid, glyph);
    }

    #[test]
    fn test_draw_offsets_by_left_padding() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let plus = SymbolInset::new("+").unwrap();
        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        let (left, _) = plus.padding(&pi.base);
        plus.draw(&mut pi, 10, 20);
        assert_eq!(painter.text_position("+"), Some((10 + left, 20)));
    }

    #[test]
    fn test_padding_sides_follow_left_share() {
        let fm = FixedFontMetrics::new();
        let colors = ColorTable::default();
        let eq = SymbolInset::new("=").unwrap();

        let config = EngineConfig::default();
        let mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let (left, right) = eq.padding(&mi.base);
        let total = (config.rel_padding * mi.base.em() as f32).round() as i32;
        assert_eq!(left + right, total);
        assert!(left < right, "{} {}", left, right);

        let config = EngineConfig {
            padding_left_share: 1.0,
            ..EngineConfig::default()
        };
        let mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        assert_eq!(eq.padding(&mi.base), (total, 0));
    }

    #[test]
    fn test_big_operator_grows_in_display() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let sum = SymbolInset::new("sum").unwrap();
        let text = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let display = MetricsInfo::new(&fm, &config, &colors, MathStyle::Display);
        assert!(sum.metrics(&display).asc > sum.metrics(&text).asc);
    }

    #[test]
    fn test_package_requirement() {
        let mut f = LatexFeatures::new();
        SymbolInset::new("leqslant").unwrap().validate(&mut f);
        assert!(f.is_required("amssymb"));
    }
}

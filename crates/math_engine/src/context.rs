//! Style context threaded through the metrics and draw passes
//!
//! [`MetricsInfo`] and [`PainterInfo`] carry the current font, style level and
//! available width. Children get a changed context through the closure based
//! changers of [`StyleContext`]; the previous state is restored when the
//! closure returns, so nothing leaks back to the caller.

use crate::color::{Color, ColorRole, ColorTable};
use crate::config::EngineConfig;
use crate::font::{FontFamily, FontInfo, FontMetrics};
use crate::painter::Painter;
use serde::{Deserialize, Serialize};

// =============================================================================
// Style levels
// =============================================================================

/// TeX style level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MathStyle {
    Display,
    #[default]
    Text,
    Script,
    ScriptScript,
}

impl MathStyle {
    /// Style of a superscript or subscript attached to a nucleus in this style
    pub fn script(self) -> Self {
        match self {
            MathStyle::Display | MathStyle::Text => MathStyle::Script,
            MathStyle::Script | MathStyle::ScriptScript => MathStyle::ScriptScript,
        }
    }

    /// Style of a fraction numerator or denominator
    pub fn fraction(self) -> Self {
        match self {
            MathStyle::Display => MathStyle::Text,
            MathStyle::Text => MathStyle::Script,
            MathStyle::Script | MathStyle::ScriptScript => MathStyle::ScriptScript,
        }
    }

    /// Style of a grid cell: display content is set in text style
    pub fn cell(self) -> Self {
        match self {
            MathStyle::Display => MathStyle::Text,
            other => other,
        }
    }

    pub fn is_display(self) -> bool {
        self == MathStyle::Display
    }

    /// Whether symbol padding applies (scripts are set tight)
    pub fn is_spaced(self) -> bool {
        matches!(self, MathStyle::Display | MathStyle::Text)
    }

    /// Size factor relative to the configured font size
    pub fn size_factor(self, config: &EngineConfig) -> f32 {
        match self {
            MathStyle::Display | MathStyle::Text => 1.0,
            MathStyle::Script => config.script_scale,
            MathStyle::ScriptScript => config.scriptscript_scale,
        }
    }
}

// =============================================================================
// Contexts
// =============================================================================

/// State shared by the metrics and the draw pass
#[derive(Clone, Copy)]
pub struct MetricsBase<'a> {
    pub font: FontInfo,
    pub style: MathStyle,
    /// Width available to the formula
    pub text_width: i32,
    pub fm: &'a dyn FontMetrics,
    pub config: &'a EngineConfig,
    pub colors: &'a ColorTable,
}

impl<'a> MetricsBase<'a> {
    pub fn new(
        fm: &'a dyn FontMetrics,
        config: &'a EngineConfig,
        colors: &'a ColorTable,
        style: MathStyle,
    ) -> Self {
        let font = FontInfo::new(
            FontFamily::Math,
            font_size_for(config, style),
            colors.role(ColorRole::Math),
        );
        Self {
            font,
            style,
            text_width: config.text_width,
            fm,
            config,
            colors,
        }
    }

    /// Pixel size of the font for `style`
    pub fn font_size(&self, style: MathStyle) -> i32 {
        font_size_for(self.config, style)
    }

    /// Width of `M` in the current font, the unit for symbol padding
    pub fn em(&self) -> i32 {
        self.fm.em_width(&self.font)
    }

    /// Height of the math axis above the baseline
    pub fn axis(&self) -> i32 {
        self.fm.x_height(&self.font) / 2
    }

    pub fn role(&self, role: ColorRole) -> Color {
        self.colors.role(role)
    }
}

fn font_size_for(config: &EngineConfig, style: MathStyle) -> i32 {
    ((config.font_size as f32) * style.size_factor(config))
        .round()
        .max(1.0) as i32
}

/// Context of the metrics pass
#[derive(Clone, Copy)]
pub struct MetricsInfo<'a> {
    pub base: MetricsBase<'a>,
}

impl<'a> MetricsInfo<'a> {
    pub fn new(
        fm: &'a dyn FontMetrics,
        config: &'a EngineConfig,
        colors: &'a ColorTable,
        style: MathStyle,
    ) -> Self {
        Self {
            base: MetricsBase::new(fm, config, colors, style),
        }
    }
}

/// Context of the draw pass: the metrics state plus a painter
pub struct PainterInfo<'a> {
    pub base: MetricsBase<'a>,
    pub pain: &'a mut dyn Painter,
}

impl<'a> PainterInfo<'a> {
    pub fn new(
        pain: &'a mut dyn Painter,
        fm: &'a dyn FontMetrics,
        config: &'a EngineConfig,
        colors: &'a ColorTable,
        style: MathStyle,
    ) -> Self {
        Self {
            base: MetricsBase::new(fm, config, colors, style),
            pain,
        }
    }
}

// =============================================================================
// Scoped changers
// =============================================================================

/// Scoped changes of style, font and colour.
///
/// Every changer runs `f` with the modified context and restores the old
/// style and font before returning.
pub trait StyleContext {
    fn base(&self) -> &MetricsBase<'_>;
    fn set_state(&mut self, style: MathStyle, font: FontInfo);

    fn with_state<R>(
        &mut self,
        style: MathStyle,
        font: FontInfo,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R
    where
        Self: Sized,
    {
        let old_style = self.base().style;
        let old_font = self.base().font;
        self.set_state(style, font);
        let result = f(self);
        self.set_state(old_style, old_font);
        result
    }

    /// Switch style level; the font size follows the style
    fn with_style<R>(&mut self, style: MathStyle, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let mut font = self.base().font;
        font.size = self.base().font_size(style);
        self.with_state(style, font, f)
    }

    /// Style of sub- and superscripts
    fn with_script_style<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let style = self.base().style.script();
        self.with_style(style, f)
    }

    /// Style of fraction parts
    fn with_fraction_style<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let style = self.base().style.fraction();
        self.with_style(style, f)
    }

    /// Style of grid cells
    fn with_cell_style<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let style = self.base().style.cell();
        self.with_style(style, f)
    }

    fn with_font_family<R>(&mut self, family: FontFamily, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let style = self.base().style;
        let font = self.base().font.with_family(family);
        self.with_state(style, font, f)
    }

    fn with_color<R>(&mut self, color: Color, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let style = self.base().style;
        let font = self.base().font.with_color(color);
        self.with_state(style, font, f)
    }
}

impl StyleContext for MetricsInfo<'_> {
    fn base(&self) -> &MetricsBase<'_> {
        &self.base
    }

    fn set_state(&mut self, style: MathStyle, font: FontInfo) {
        self.base.style = style;
        self.base.font = font;
    }
}

impl StyleContext for PainterInfo<'_> {
    fn base(&self) -> &MetricsBase<'_> {
        &self.base
    }

    fn set_state(&mut self, style: MathStyle, font: FontInfo) {
        self.base.style = style;
        self.base.font = font;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FixedFontMetrics;

    #[test]
    fn test_style_demotion() {
        assert_eq!(MathStyle::Display.script(), MathStyle::Script);
        assert_eq!(MathStyle::Script.script(), MathStyle::ScriptScript);
        assert_eq!(MathStyle::Display.fraction(), MathStyle::Text);
        assert_eq!(MathStyle::Text.fraction(), MathStyle::Script);
        assert_eq!(MathStyle::ScriptScript.fraction(), MathStyle::ScriptScript);
        assert_eq!(MathStyle::Display.cell(), MathStyle::Text);
        assert!(!MathStyle::Script.is_spaced());
    }

    #[test]
    fn test_changers_restore_state() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Display);
        let size = mi.base.font.size;

        let inner = mi.with_script_style(|mi| {
            mi.with_font_family(FontFamily::Bold, |mi| {
                assert_eq!(mi.base.font.family, FontFamily::Bold);
                (mi.base.style, mi.base.font.size)
            })
        });
        assert_eq!(inner.0, MathStyle::Script);
        assert!(inner.1 < size);

        assert_eq!(mi.base.style, MathStyle::Display);
        assert_eq!(mi.base.font.size, size);
        assert_eq!(mi.base.font.family, FontFamily::Math);
    }

    #[test]
    fn test_early_return_restores() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);

        let result: Result<(), &str> = mi.with_color(Color::RED, |mi| {
            if mi.base.font.color == Color::RED {
                return Err("stop");
            }
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(mi.base.font.color, Color::BLACK);
    }

    #[test]
    fn test_font_size_follows_style() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::ScriptScript);
        assert_eq!(mi.base.font.size, 8);
        assert_eq!(mi.base.font_size(MathStyle::Script), 11);
        assert_eq!(mi.base.em(), 7);
    }
}

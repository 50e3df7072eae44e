//! Fraction family: `\frac`, `\dfrac`, `\tfrac`, `\over`, `\atop`, `\choose`, `\binom`

use crate::context::{MathStyle, MetricsBase, MetricsInfo, PainterInfo, StyleContext};
use crate::data::MathData;
use crate::deco;
use crate::dimension::Dimension;
use crate::error::MathResult;
use crate::features::LatexFeatures;
use serde::{Deserialize, Serialize};

/// Horizontal space between the fraction rule end and the wider part
const MARGIN: i32 = 2;

/// Fraction flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FracKind {
    Frac,
    /// Display-style parts
    DFrac,
    /// Text-style parts
    TFrac,
    /// Plain TeX infix `a \over b`
    Over,
    /// Infix without rule
    Atop,
    /// Infix binomial
    Choose,
    Binom,
    DBinom,
    TBinom,
}

impl FracKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "frac" => FracKind::Frac,
            "dfrac" => FracKind::DFrac,
            "tfrac" => FracKind::TFrac,
            "over" => FracKind::Over,
            "atop" => FracKind::Atop,
            "choose" => FracKind::Choose,
            "binom" => FracKind::Binom,
            "dbinom" => FracKind::DBinom,
            "tbinom" => FracKind::TBinom,
            _ => return None,
        })
    }

    /// Command name without backslash
    pub fn name(&self) -> &'static str {
        match self {
            FracKind::Frac => "frac",
            FracKind::DFrac => "dfrac",
            FracKind::TFrac => "tfrac",
            FracKind::Over => "over",
            FracKind::Atop => "atop",
            FracKind::Choose => "choose",
            FracKind::Binom => "binom",
            FracKind::DBinom => "dbinom",
            FracKind::TBinom => "tbinom",
        }
    }

    /// Written between its parts rather than before them
    pub fn is_infix(&self) -> bool {
        matches!(self, FracKind::Over | FracKind::Atop | FracKind::Choose)
    }

    pub fn has_rule(&self) -> bool {
        matches!(
            self,
            FracKind::Frac | FracKind::DFrac | FracKind::TFrac | FracKind::Over
        )
    }

    pub fn is_binomial(&self) -> bool {
        matches!(
            self,
            FracKind::Choose | FracKind::Binom | FracKind::DBinom | FracKind::TBinom
        )
    }

    fn package(&self) -> Option<&'static str> {
        match self {
            FracKind::DFrac
            | FracKind::TFrac
            | FracKind::Binom
            | FracKind::DBinom
            | FracKind::TBinom => Some("amsmath"),
            _ => None,
        }
    }

    /// Style of numerator and denominator for a fraction set in `style`
    fn part_style(&self, style: MathStyle) -> MathStyle {
        match self {
            FracKind::DFrac | FracKind::DBinom => MathStyle::Display.fraction(),
            FracKind::TFrac | FracKind::TBinom => MathStyle::Text.fraction(),
            _ => style.fraction(),
        }
    }
}

struct FracGeometry {
    /// Numerator baseline above the fraction baseline
    num_shift: i32,
    /// Denominator baseline below the fraction baseline
    den_shift: i32,
    /// Top of the rule above the baseline
    rule_top: i32,
    thickness: i32,
    inner: i32,
    paren: i32,
    dim: Dimension,
}

/// Two-cell fraction node: numerator and denominator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FracInset {
    pub kind: FracKind,
    cells: [MathData; 2],
}

impl FracInset {
    pub fn new(num: MathData, den: MathData) -> Self {
        Self::with_kind(FracKind::Frac, num, den)
    }

    pub fn with_kind(kind: FracKind, num: MathData, den: MathData) -> Self {
        Self {
            kind,
            cells: [num, den],
        }
    }

    pub fn num(&self) -> &MathData {
        &self.cells[0]
    }

    pub fn den(&self) -> &MathData {
        &self.cells[1]
    }

    pub fn num_mut(&mut self) -> &mut MathData {
        &mut self.cells[0]
    }

    pub fn den_mut(&mut self) -> &mut MathData {
        &mut self.cells[1]
    }

    pub fn cells(&self) -> &[MathData; 2] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [MathData; 2] {
        &mut self.cells
    }

    fn geometry(&self, base: &MetricsBase<'_>, num: Dimension, den: Dimension) -> FracGeometry {
        let axis = base.axis();
        let thickness = if self.kind.has_rule() {
            base.config.rule_thickness
        } else {
            0
        };
        let gap = base.config.frac_gap;
        let rule_top = axis + thickness / 2;
        let num_shift = rule_top + gap + num.des;
        let den_shift = thickness - rule_top + gap + den.asc;
        let inner = num.wid.max(den.wid) + 2 * MARGIN;
        let asc = num_shift + num.asc;
        let des = (den_shift + den.des).max(0);
        let paren = if self.kind.is_binomial() {
            ((asc + des) / 6).max(4)
        } else {
            0
        };
        FracGeometry {
            num_shift,
            den_shift,
            rule_top,
            thickness,
            inner,
            paren,
            dim: Dimension::new(inner + 2 * paren, asc, des),
        }
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let style = self.kind.part_style(mi.base.style);
        let [num, den] = &mut self.cells;
        let (dn, dd) = mi.with_style(style, |mi| (num.metrics(mi), den.metrics(mi)));
        self.geometry(&mi.base, dn, dd).dim
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        let dn = self.cells[0].dimension()?;
        let dd = self.cells[1].dimension()?;
        let g = self.geometry(&pi.base, dn, dd);
        let inner_x = x + g.paren;
        let style = self.kind.part_style(pi.base.style);

        pi.with_style(style, |pi| -> MathResult<()> {
            self.cells[0].draw(pi, inner_x + (g.inner - dn.wid) / 2, y - g.num_shift)?;
            self.cells[1].draw(pi, inner_x + (g.inner - dd.wid) / 2, y + g.den_shift)
        })?;

        let color = pi.base.font.color;
        if g.thickness > 0 {
            pi.pain.fill_rectangle(
                inner_x + 1,
                y - g.rule_top,
                g.inner - 2,
                g.thickness,
                color,
            );
        }
        if g.paren > 0 {
            let top = y - g.dim.asc;
            let h = g.dim.height();
            if let Some(shape) = deco::delimiter_shape("(") {
                deco::draw_shape(pi.pain, shape, x, top, g.paren, h, false, color);
            }
            if let Some(shape) = deco::delimiter_shape(")") {
                let right = x + g.dim.wid - g.paren;
                deco::draw_shape(pi.pain, shape, right, top, g.paren, h, false, color);
            }
        }
        Ok(())
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        if let Some(package) = self.kind.package() {
            features.require(package);
        }
        features.add_css(if self.kind.is_binomial() { "binom" } else { "frac" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorTable;
    use crate::config::EngineConfig;
    use crate::font::FixedFontMetrics;
    use crate::inset::InsetMath;
    use crate::painter::{PaintOp, RecordingPainter};

    fn cell(s: &str) -> MathData {
        s.chars().map(InsetMath::Char).collect()
    }

    #[test]
    fn test_width_covers_wider_part() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Display);
        let mut frac = FracInset::new(cell("abc"), cell("x"));
        let dim = frac.metrics(&mut mi);
        let num = frac.num().dimension().unwrap();
        let den = frac.den().dimension().unwrap();
        assert!(dim.wid >= num.wid.max(den.wid));
        assert!(dim.asc > num.height());
        assert!(dim.des >= 0);
    }

    #[test]
    fn test_tfrac_is_smaller_than_dfrac() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let mut t = FracInset::with_kind(FracKind::TFrac, cell("ab"), cell("cd"));
        let mut d = FracInset::with_kind(FracKind::DFrac, cell("ab"), cell("cd"));
        assert!(t.metrics(&mut mi).wid < d.metrics(&mut mi).wid);
        assert_eq!(mi.base.style, MathStyle::Text);
    }

    #[test]
    fn test_draw_rule_and_parts() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut frac = FracInset::new(cell("a"), cell("b"));
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        frac.metrics(&mut mi);

        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        frac.draw(&mut pi, 0, 50).unwrap();
        let (_, ya) = painter.text_position("a").unwrap();
        let (_, yb) = painter.text_position("b").unwrap();
        assert!(ya < 50 && yb > ya);
        assert!(painter
            .ops()
            .iter()
            .any(|op| matches!(op, PaintOp::FillRectangle { .. })));
    }

    #[test]
    fn test_binom_has_parens_and_no_rule() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut binom = FracInset::with_kind(FracKind::Binom, cell("n"), cell("k"));
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        binom.metrics(&mut mi);
        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        binom.draw(&mut pi, 0, 50).unwrap();
        let ops = painter.ops();
        assert!(!ops.iter().any(|op| matches!(op, PaintOp::FillRectangle { .. })));
        assert_eq!(
            ops.iter()
                .filter(|op| matches!(op, PaintOp::Lines { .. }))
                .count(),
            2
        );

        let mut f = LatexFeatures::new();
        binom.validate(&mut f);
        assert!(f.is_required("amsmath"));
    }
}

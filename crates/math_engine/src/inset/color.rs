//! `{\color{name} ...}` and `\textcolor{name}{...}`

use crate::color::{color_package, ColorPackage};
use crate::context::{MetricsInfo, PainterInfo, StyleContext};
use crate::data::MathData;
use crate::dimension::Dimension;
use crate::error::MathResult;
use crate::features::LatexFeatures;
use serde::{Deserialize, Serialize};

/// Cell drawn in a named colour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorInset {
    pub color: String,
    /// Written as `{\color{c}...}` rather than `\textcolor{c}{...}`
    pub old_style: bool,
    cell: MathData,
}

impl ColorInset {
    pub fn new(color: impl Into<String>, old_style: bool, cell: MathData) -> Self {
        Self {
            color: color.into(),
            old_style,
            cell,
        }
    }

    pub fn cell(&self) -> &MathData {
        &self.cell
    }

    pub fn cell_mut(&mut self) -> &mut MathData {
        &mut self.cell
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        self.cell.metrics(mi)
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        match pi.base.colors.named(&self.color) {
            Some(color) => pi.with_color(color, |pi| self.cell.draw(pi, x, y)),
            None => {
                tracing::warn!(color = %self.color, "unknown colour, drawing in current colour");
                self.cell.draw(pi, x, y)
            }
        }
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        let package = color_package(&self.color).unwrap_or(ColorPackage::Xcolor);
        features.require(package.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, ColorTable};
    use crate::config::EngineConfig;
    use crate::context::MathStyle;
    use crate::font::FixedFontMetrics;
    use crate::inset::InsetMath;
    use crate::painter::{PaintOp, RecordingPainter};

    fn draw_colored(name: &str) -> Color {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut inset = ColorInset::new(name, true, [InsetMath::Char('x')].into_iter().collect());
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        inset.metrics(&mut mi);
        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        inset.draw(&mut pi, 0, 10).unwrap();
        assert_eq!(pi.base.font.color, Color::BLACK);
        match painter.ops() {
            [PaintOp::Text { font, .. }] => font.color,
            other => panic!("unexpected ops {:?}", other),
        }
    }

    #[test]
    fn test_draws_in_named_colour() {
        assert_eq!(draw_colored("red"), Color::RED);
    }

    #[test]
    fn test_unknown_colour_keeps_current() {
        assert_eq!(draw_colored("nosuchcolour"), Color::BLACK);
    }

    #[test]
    fn test_package_by_colour() {
        let mut f = LatexFeatures::new();
        ColorInset::new("red", true, MathData::new()).validate(&mut f);
        assert!(f.is_required("color"));
        assert!(!f.is_required("xcolor"));

        let mut f = LatexFeatures::new();
        ColorInset::new("brown", false, MathData::new()).validate(&mut f);
        assert!(f.is_required("xcolor"));
    }
}

//! Braces, macro arguments, unknown commands and comments

use crate::color::ColorRole;
use crate::context::{MetricsInfo, PainterInfo};
use crate::data::MathData;
use crate::dimension::Dimension;
use crate::error::MathResult;
use crate::font::FontFamily;
use serde::{Deserialize, Serialize};

/// A `{...}` group kept in the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BraceInset {
    cell: MathData,
}

impl BraceInset {
    pub fn new(cell: MathData) -> Self {
        Self { cell }
    }

    pub fn cell(&self) -> &MathData {
        &self.cell
    }

    pub fn cell_mut(&mut self) -> &mut MathData {
        &mut self.cell
    }

    pub fn into_cell(self) -> MathData {
        self.cell
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        self.cell.metrics(mi)
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        self.cell.draw(pi, x, y)
    }
}

/// Upright label for nodes shown by their source text
pub(crate) fn label_metrics(label: &str, mi: &MetricsInfo<'_>) -> Dimension {
    let font = mi.base.font.with_family(FontFamily::Roman);
    mi.base.fm.string_dim(&font, label)
}

pub(crate) fn label_draw(label: &str, role: ColorRole, pi: &mut PainterInfo<'_>, x: i32, y: i32) {
    let font = pi
        .base
        .font
        .with_family(FontFamily::Roman)
        .with_color(pi.base.role(role));
    pi.pain.text(x, y, label, &font);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorTable;
    use crate::config::EngineConfig;
    use crate::context::MathStyle;
    use crate::font::FixedFontMetrics;
    use crate::painter::{PaintOp, RecordingPainter};

    #[test]
    fn test_label_uses_role_colour() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        assert!(label_metrics("\\foo", &mi).wid > 0);

        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        label_draw("\\foo", ColorRole::Error, &mut pi, 0, 10);
        match painter.ops() {
            [PaintOp::Text { font, text, .. }] => {
                assert_eq!(text, "\\foo");
                assert_eq!(font.color, colors.role(ColorRole::Error));
            }
            other => panic!("unexpected ops {:?}", other),
        }
    }
}

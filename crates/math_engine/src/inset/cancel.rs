//! Strike-outs from the cancel package

use crate::context::{MetricsInfo, PainterInfo, StyleContext};
use crate::data::MathData;
use crate::dimension::Dimension;
use crate::error::MathResult;
use crate::features::LatexFeatures;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CancelKind {
    /// `\cancel`, rising stroke
    Cancel,
    /// `\bcancel`, falling stroke
    BCancel,
    /// `\xcancel`, both strokes
    XCancel,
}

impl CancelKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cancel" => Some(CancelKind::Cancel),
            "bcancel" => Some(CancelKind::BCancel),
            "xcancel" => Some(CancelKind::XCancel),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CancelKind::Cancel => "cancel",
            CancelKind::BCancel => "bcancel",
            CancelKind::XCancel => "xcancel",
        }
    }
}

/// Cell struck through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelInset {
    pub kind: CancelKind,
    cell: MathData,
}

impl CancelInset {
    pub fn new(kind: CancelKind, cell: MathData) -> Self {
        Self { kind, cell }
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
        let dim = self.cell.dimension()?;
        self.cell.draw(pi, x, y)?;
        let color = pi.base.font.color;
        let (left, right) = (x + 2, x + dim.wid - 2);
        let (top, bottom) = (y - dim.asc, y + dim.des);
        if matches!(self.kind, CancelKind::Cancel | CancelKind::XCancel) {
            pi.pain.line(left, bottom, right, top, color);
        }
        if matches!(self.kind, CancelKind::BCancel | CancelKind::XCancel) {
            pi.pain.line(left, top, right, bottom, color);
        }
        Ok(())
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        features.require("cancel");
        features.add_css("cancel");
    }
}

/// `\cancelto{target}{expr}`: expression struck through with an arrow to a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelToInset {
    cells: [MathData; 2],
}

impl CancelToInset {
    pub fn new(expr: MathData, target: MathData) -> Self {
        Self {
            cells: [expr, target],
        }
    }

    pub fn expr(&self) -> &MathData {
        &self.cells[0]
    }

    pub fn target(&self) -> &MathData {
        &self.cells[1]
    }

    pub fn cells(&self) -> &[MathData; 2] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [MathData; 2] {
        &mut self.cells
    }

    fn dimension(expr: Dimension, target: Dimension) -> Dimension {
        Dimension::new(
            expr.wid + target.wid + 2,
            expr.asc + target.height() + 2,
            expr.des,
        )
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let [expr, target] = &mut self.cells;
        let de = expr.metrics(mi);
        let dt = mi.with_script_style(|mi| target.metrics(mi));
        Self::dimension(de, dt)
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        let de = self.cells[0].dimension()?;
        let dt = self.cells[1].dimension()?;
        self.cells[0].draw(pi, x, y)?;
        let tip = (x + de.wid + 1, y - de.asc - 1);
        pi.with_script_style(|pi| self.cells[1].draw(pi, tip.0 + 1, tip.1 - dt.des))?;

        let color = pi.base.font.color;
        pi.pain.line(x + 1, y + de.des, tip.0, tip.1, color);
        pi.pain
            .lines(&[(tip.0 - 4, tip.1), tip, (tip.0, tip.1 + 4)], color);
        Ok(())
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        features.require("cancel");
        features.add_css("cancel");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorTable;
    use crate::config::EngineConfig;
    use crate::context::MathStyle;
    use crate::font::FixedFontMetrics;
    use crate::inset::InsetMath;
    use crate::painter::{PaintOp, RecordingPainter};

    fn cell(s: &str) -> MathData {
        s.chars().map(InsetMath::Char).collect()
    }

    #[test]
    fn test_xcancel_draws_two_strokes() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let mut inset = CancelInset::new(CancelKind::XCancel, cell("ab"));
        assert_eq!(inset.metrics(&mut mi), inset.cell().dimension().unwrap());

        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        inset.draw(&mut pi, 0, 20).unwrap();
        let strokes = painter
            .ops()
            .iter()
            .filter(|op| matches!(op, PaintOp::Line { .. }))
            .count();
        assert_eq!(strokes, 2);
    }

    #[test]
    fn test_cancelto_target_above_right() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let mut inset = CancelToInset::new(cell("x"), cell("0"));
        let dim = inset.metrics(&mut mi);
        assert!(dim.asc > inset.expr().dimension().unwrap().asc);

        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        inset.draw(&mut pi, 0, 20).unwrap();
        let (xx, xy) = painter.text_position("x").unwrap();
        let (tx, ty) = painter.text_position("0").unwrap();
        assert!(tx > xx && ty < xy);

        let mut f = LatexFeatures::new();
        inset.validate(&mut f);
        assert!(f.is_required("cancel"));
    }
}

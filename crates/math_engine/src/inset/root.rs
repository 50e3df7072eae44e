//! Radicals: `\sqrt{x}` and `\sqrt[n]{x}`

use crate::context::{MathStyle, MetricsInfo, PainterInfo, StyleContext};
use crate::data::MathData;
use crate::dimension::Dimension;
use crate::error::MathResult;
use crate::features::LatexFeatures;
use serde::{Deserialize, Serialize};

/// Square root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqrtInset {
    cell: MathData,
}

impl SqrtInset {
    pub fn new(cell: MathData) -> Self {
        Self { cell }
    }

    pub fn cell(&self) -> &MathData {
        &self.cell
    }

    pub fn cell_mut(&mut self) -> &mut MathData {
        &mut self.cell
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let dim = self.cell.metrics(mi);
        Dimension::new(dim.wid + 12, dim.asc + 4, dim.des + 2)
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        let cell = self.cell.dimension()?;
        self.cell.draw(pi, x + 10, y)?;
        let w = cell.wid + 12;
        let a = cell.asc + 4;
        let d = cell.des + 2;
        let points = [
            (x + w, y - a + 1),
            (x + 8, y - a + 1),
            (x + 5, y + d - 1),
            (x, y + (d - a) / 2),
        ];
        let color = pi.base.font.color;
        pi.pain.lines(&points, color);
        Ok(())
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        features.add_css("sqrt");
    }
}

/// Root with an index, `\sqrt[index]{radicand}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootInset {
    cells: [MathData; 2],
}

impl RootInset {
    pub fn new(index: MathData, radicand: MathData) -> Self {
        Self {
            cells: [index, radicand],
        }
    }

    pub fn index(&self) -> &MathData {
        &self.cells[0]
    }

    pub fn radicand(&self) -> &MathData {
        &self.cells[1]
    }

    pub fn index_mut(&mut self) -> &mut MathData {
        &mut self.cells[0]
    }

    pub fn radicand_mut(&mut self) -> &mut MathData {
        &mut self.cells[1]
    }

    pub fn cells(&self) -> &[MathData; 2] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [MathData; 2] {
        &mut self.cells
    }

    fn dimension(index: Dimension, radicand: Dimension) -> Dimension {
        Dimension::new(
            index.wid + radicand.wid + 10,
            (index.asc + 5).max(radicand.asc) + 2,
            (index.des - 5).max(radicand.des) + 2,
        )
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let [index, radicand] = &mut self.cells;
        let di = mi.with_style(MathStyle::ScriptScript, |mi| index.metrics(mi));
        let dr = radicand.metrics(mi);
        Self::dimension(di, dr)
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        let di = self.cells[0].dimension()?;
        let dr = self.cells[1].dimension()?;
        let dim = Self::dimension(di, dr);
        let w = di.wid;
        let a = dim.asc;
        let d = dim.des;

        pi.with_style(MathStyle::ScriptScript, |pi| {
            self.cells[0].draw(pi, x, y - 5 - di.des)
        })?;
        self.cells[1].draw(pi, x + w + 8, y)?;

        let points = [
            (x + dim.wid, y - a + 1),
            (x + w + 4, y - a + 1),
            (x + w, y + d),
            (x + w - 2, y + (d - a) / 2 + 2),
            (x, y + (d - a) / 2 + 2),
        ];
        let color = pi.base.font.color;
        pi.pain.lines(&points, color);
        Ok(())
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        features.add_css("root");
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
    fn test_sqrt_encloses_radicand() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let mut sqrt = SqrtInset::new(cell("x"));
        let dim = sqrt.metrics(&mut mi);
        let inner = sqrt.cell().dimension().unwrap();
        assert_eq!(dim.wid, inner.wid + 12);
        assert_eq!(dim.asc, inner.asc + 4);

        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        sqrt.draw(&mut pi, 0, 30).unwrap();
        assert_eq!(painter.text_position("x"), Some((10, 30)));
        match painter.ops().last() {
            Some(PaintOp::Lines { points, .. }) => {
                assert_eq!(points.len(), 4);
                assert_eq!(points[0], (dim.wid, 30 - dim.asc + 1));
            }
            other => panic!("expected radical polyline, got {:?}", other),
        }
    }

    #[test]
    fn test_root_index_is_smaller() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let mut root = RootInset::new(cell("n"), cell("n"));
        let dim = root.metrics(&mut mi);
        let di = root.index().dimension().unwrap();
        let dr = root.radicand().dimension().unwrap();
        assert!(di.wid < dr.wid);
        assert_eq!(dim.wid, di.wid + dr.wid + 10);
        assert!(dim.asc >= dr.asc && dim.des >= dr.des);
        assert_eq!(mi.base.style, MathStyle::Text);
    }

    #[test]
    fn test_root_draw_places_index_left_of_radicand() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let mut root = RootInset::new(cell("3"), cell("x"));
        root.metrics(&mut mi);
        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        root.draw(&mut pi, 0, 40).unwrap();
        let (ix, iy) = painter.text_position("3").unwrap();
        let (rx, ry) = painter.text_position("x").unwrap();
        assert!(ix < rx);
        assert!(iy < ry);
    }
}

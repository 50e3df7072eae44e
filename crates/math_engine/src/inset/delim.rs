//! Stretchy delimiters: `\left( ... \right)`

use crate::context::{MetricsBase, MetricsInfo, PainterInfo};
use crate::data::MathData;
use crate::deco;
use crate::dimension::Dimension;
use crate::error::MathResult;
use crate::features::LatexFeatures;
use serde::{Deserialize, Serialize};

struct DelimGeometry {
    left: i32,
    right: i32,
    dim: Dimension,
}

/// Cell between a `\left` and a `\right` delimiter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelimInset {
    /// Delimiter as written after `\left`, e.g. `(` or `\langle`
    pub left: String,
    pub right: String,
    cell: MathData,
}

impl DelimInset {
    pub fn new(left: impl Into<String>, right: impl Into<String>, cell: MathData) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            cell,
        }
    }

    pub fn cell(&self) -> &MathData {
        &self.cell
    }

    pub fn cell_mut(&mut self) -> &mut MathData {
        &mut self.cell
    }

    /// Whether `delim` may follow `\left` or `\right`
    pub fn is_delimiter(delim: &str) -> bool {
        deco::delimiter_shape(delim).is_some()
    }

    fn geometry(base: &MetricsBase<'_>, left: &str, right: &str, cell: Dimension) -> DelimGeometry {
        let axis = base.axis();
        let half = (cell.asc - axis).max(cell.des + axis) + 2;
        let dw = ((2 * half) / 6).max(4);
        let width = |delim: &str| if delim == "." { 0 } else { dw + 1 };
        let (l, r) = (width(left), width(right));
        DelimGeometry {
            left: l,
            right: r,
            dim: Dimension::new(l + cell.wid + r, axis + half, (half - axis).max(0)),
        }
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let cell = self.cell.metrics(mi);
        Self::geometry(&mi.base, &self.left, &self.right, cell).dim
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        let cell = self.cell.dimension()?;
        let g = Self::geometry(&pi.base, &self.left, &self.right, cell);
        self.cell.draw(pi, x + g.left, y)?;

        let color = pi.base.font.color;
        let top = y - g.dim.asc;
        let h = g.dim.height();
        if let Some(shape) = deco::delimiter_shape(&self.left) {
            deco::draw_shape(pi.pain, shape, x, top, g.left - 1, h, false, color);
        }
        if let Some(shape) = deco::delimiter_shape(&self.right) {
            let rx = x + g.left + cell.wid + 1;
            deco::draw_shape(pi.pain, shape, rx, top, g.right - 1, h, false, color);
        }
        Ok(())
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        let ams = ["\\lvert", "\\rvert", "\\lVert", "\\rVert"];
        if ams.contains(&self.left.as_str()) || ams.contains(&self.right.as_str()) {
            features.require("amsmath");
        }
        features.add_css("delim");
    }
}

//! Accents, over/under lines, arrows and braces attached to one cell

use crate::context::{MetricsBase, MetricsInfo, PainterInfo};
use crate::data::MathData;
use crate::deco::{self, DecorationInfo};
use crate::dimension::Dimension;
use crate::error::{MathError, MathResult};
use crate::features::LatexFeatures;
use serde::{Deserialize, Serialize};

/// A decoration command applied to a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorationInset {
    name: String,
    cell: MathData,
}

impl DecorationInset {
    /// Decoration `name` (without backslash); `None` if it is not a decoration
    pub fn new(name: &str, cell: MathData) -> Option<Self> {
        deco::decoration(name).map(|_| Self {
            name: name.to_string(),
            cell,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> MathResult<&'static DecorationInfo> {
        deco::decoration(&self.name)
            .ok_or_else(|| MathError::InvalidStructure(format!("unknown decoration {}", self.name)))
    }

    pub fn is_upper(&self) -> bool {
        self.info().map(|i| i.upper).unwrap_or(true)
    }

    pub fn cell(&self) -> &MathData {
        &self.cell
    }

    pub fn cell_mut(&mut self) -> &mut MathData {
        &mut self.cell
    }

    fn extent(base: &MetricsBase<'_>) -> (i32, i32) {
        (base.config.decoration_height, base.config.decoration_width)
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let mut dim = self.cell.metrics(mi);
        let (dh, dw) = Self::extent(&mi.base);
        if self.is_upper() {
            dim.asc += dh + 1;
        } else {
            dim.des += dh + 2;
        }
        dim.wid = dim.wid.max(dw);
        dim
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        let info = self.info()?;
        let cell = self.cell.dimension()?;
        let (dh, dw) = Self::extent(&pi.base);
        let wid = cell.wid.max(dw);
        self.cell.draw(pi, x + (wid - cell.wid) / 2, y)?;

        let dy = if info.upper {
            -cell.asc - dh
        } else {
            cell.des + 1
        };
        let color = pi.base.font.color;
        if info.wide {
            deco::draw_shape(pi.pain, info.shape, x + 1, y + dy, wid - 2, dh, !info.upper, color);
        } else {
            let left = x + (wid - dw) / 2;
            deco::draw_shape(pi.pain, info.shape, left, y + dy, dw, dh, !info.upper, color);
        }
        Ok(())
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        match self.name.as_str() {
            "widehat" | "widetilde" => features.require("amssymb"),
            "underleftarrow" | "underrightarrow" | "underleftrightarrow"
            | "overleftrightarrow" | "dddot" => features.require("amsmath"),
            _ => {}
        }
        features.add_css("decoration");
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
    fn test_unknown_decoration() {
        assert!(DecorationInset::new("frac", MathData::new()).is_none());
    }

    #[test]
    fn test_upper_and_lower_extents() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);

        let mut hat = DecorationInset::new("hat", cell("x")).unwrap();
        let dim = hat.metrics(&mut mi);
        let inner = hat.cell().dimension().unwrap();
        assert_eq!(dim.asc, inner.asc + config.decoration_height + 1);
        assert_eq!(dim.des, inner.des);

        let mut under = DecorationInset::new("underline", cell("x")).unwrap();
        let dim = under.metrics(&mut mi);
        assert_eq!(dim.asc, inner.asc);
        assert_eq!(dim.des, inner.des + config.decoration_height + 2);
    }

    #[test]
    fn test_wide_decoration_spans_cell() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let mut over = DecorationInset::new("overline", cell("abcd")).unwrap();
        let dim = over.metrics(&mut mi);

        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        over.draw(&mut pi, 0, 30).unwrap();
        match painter.ops().last() {
            Some(PaintOp::Lines { points, .. }) => {
                assert_eq!(points[0].0, 1);
                assert_eq!(points[1].0, dim.wid - 1);
                assert!(points[0].1 < 30 - over.cell().dimension().unwrap().asc);
            }
            other => panic!("expected decoration polyline, got {:?}", other),
        }
    }

    #[test]
    fn test_packages() {
        let mut f = LatexFeatures::new();
        DecorationInset::new("widehat", cell("x"))
            .unwrap()
            .validate(&mut f);
        DecorationInset::new("hat", cell("x")).unwrap().validate(&mut f);
        assert!(f.is_required("amssymb"));
        assert!(!f.is_required("amsmath"));
    }
}

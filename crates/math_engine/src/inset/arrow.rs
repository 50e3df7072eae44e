//! Extensible arrows (`\xrightarrow`) and xymatrix arrows (`\ar`)

use crate::context::{MetricsBase, MetricsInfo, PainterInfo, StyleContext};
use crate::data::MathData;
use crate::deco::{self, ArrowHead};
use crate::dimension::Dimension;
use crate::error::MathResult;
use crate::features::LatexFeatures;
use serde::{Deserialize, Serialize};

/// Height of an arrow shape
const ARROW_HEIGHT: i32 = 6;
/// Extra length beyond the wider label
const ARROW_PAD: i32 = 10;
/// Length of one direction step of an xymatrix arrow
const XY_STEP: i32 = 24;

// =============================================================================
// Extensible arrows
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum XArrowKind {
    Right,
    Left,
    LeftRight,
    DoubleRight,
    DoubleLeft,
    DoubleLeftRight,
    MapsTo,
    HookRight,
    HookLeft,
}

const XARROWS: &[(&str, XArrowKind, &str)] = &[
    ("xrightarrow", XArrowKind::Right, "→"),
    ("xleftarrow", XArrowKind::Left, "←"),
    ("xleftrightarrow", XArrowKind::LeftRight, "↔"),
    ("xRightarrow", XArrowKind::DoubleRight, "⇒"),
    ("xLeftarrow", XArrowKind::DoubleLeft, "⇐"),
    ("xLeftrightarrow", XArrowKind::DoubleLeftRight, "⇔"),
    ("xmapsto", XArrowKind::MapsTo, "↦"),
    ("xhookrightarrow", XArrowKind::HookRight, "↪"),
    ("xhookleftarrow", XArrowKind::HookLeft, "↩"),
];

impl XArrowKind {
    pub fn from_name(name: &str) -> Option<Self> {
        XARROWS.iter().find(|(n, _, _)| *n == name).map(|(_, k, _)| *k)
    }

    fn entry(&self) -> (&'static str, &'static str) {
        XARROWS
            .iter()
            .find(|(_, k, _)| k == self)
            .map(|(n, _, u)| (*n, *u))
            .unwrap_or(("xrightarrow", "→"))
    }

    pub fn name(&self) -> &'static str {
        self.entry().0
    }

    /// Stretchy operator character for MathML
    pub fn unicode(&self) -> &'static str {
        self.entry().1
    }

    fn head(&self) -> ArrowHead {
        match self {
            XArrowKind::Left | XArrowKind::DoubleLeft | XArrowKind::HookLeft => ArrowHead::Left,
            XArrowKind::LeftRight | XArrowKind::DoubleLeftRight => ArrowHead::Both,
            _ => ArrowHead::Right,
        }
    }

    fn is_double(&self) -> bool {
        matches!(
            self,
            XArrowKind::DoubleRight | XArrowKind::DoubleLeft | XArrowKind::DoubleLeftRight
        )
    }

    fn package(&self) -> &'static str {
        match self {
            XArrowKind::Right | XArrowKind::Left => "amsmath",
            _ => "mathtools",
        }
    }
}

/// Arrow stretched under a label, `\xrightarrow[below]{above}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XArrowInset {
    pub kind: XArrowKind,
    cells: [MathData; 2],
}

impl XArrowInset {
    pub fn new(kind: XArrowKind, above: MathData, below: MathData) -> Self {
        Self {
            kind,
            cells: [above, below],
        }
    }

    pub fn above(&self) -> &MathData {
        &self.cells[0]
    }

    pub fn below(&self) -> &MathData {
        &self.cells[1]
    }

    pub fn cells(&self) -> &[MathData; 2] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [MathData; 2] {
        &mut self.cells
    }

    fn dimension(&self, base: &MetricsBase<'_>, above: Dimension, below: Dimension) -> Dimension {
        let axis = base.axis();
        let half = ARROW_HEIGHT / 2;
        let wid = above.wid.max(below.wid).max(base.em()) + ARROW_PAD;
        let asc = axis + half + 1 + above.height();
        let des = if self.below().is_empty() {
            (half - axis).max(0)
        } else {
            (half - axis + 1 + below.height()).max(0)
        };
        Dimension::new(wid, asc, des)
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let [above, below] = &mut self.cells;
        let (da, db) = mi.with_script_style(|mi| (above.metrics(mi), below.metrics(mi)));
        let db = if below.is_empty() { Dimension::default() } else { db };
        self.dimension(&mi.base, da, db)
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        let da = self.cells[0].dimension()?;
        let db = if self.below().is_empty() {
            Dimension::default()
        } else {
            self.cells[1].dimension()?
        };
        let dim = self.dimension(&pi.base, da, db);
        let axis = pi.base.axis();
        let half = ARROW_HEIGHT / 2;

        pi.with_script_style(|pi| -> MathResult<()> {
            let ay = y - axis - half - 1 - da.des;
            self.cells[0].draw(pi, x + (dim.wid - da.wid) / 2, ay)?;
            if !self.below().is_empty() {
                let by = y - axis + half + 1 + db.asc;
                self.cells[1].draw(pi, x + (dim.wid - db.wid) / 2, by)?;
            }
            Ok(())
        })?;

        let color = pi.base.font.color;
        let shape = deco::arrow_shape(self.kind.head());
        let top = y - axis - half;
        deco::draw_shape(pi.pain, shape, x + 1, top, dim.wid - 2, ARROW_HEIGHT, false, color);
        if self.kind.is_double() {
            let ly = top + half + 2;
            pi.pain.line(x + 3, ly, x + dim.wid - 3, ly, color);
        }
        Ok(())
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        features.require(self.kind.package());
        features.add_css("xarrow");
    }
}

// =============================================================================
// xymatrix arrows
// =============================================================================

/// Where the label of an `\ar` goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelPos {
    /// `^`
    Above,
    /// `_`
    Below,
    /// `|`, breaking the arrow
    Middle,
}

impl LabelPos {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '^' => Some(LabelPos::Above),
            '_' => Some(LabelPos::Below),
            '|' => Some(LabelPos::Middle),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            LabelPos::Above => '^',
            LabelPos::Below => '_',
            LabelPos::Middle => '|',
        }
    }
}

/// `\ar[dir]^{label}` inside an xymatrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XYArrowInset {
    /// Direction letters `u`, `d`, `l`, `r`, e.g. `dr`
    pub dir: String,
    pub label_pos: Option<LabelPos>,
    label: MathData,
}

impl XYArrowInset {
    pub fn new(dir: impl Into<String>, label_pos: Option<LabelPos>, label: MathData) -> Self {
        Self {
            dir: dir.into(),
            label_pos,
            label,
        }
    }

    pub fn label(&self) -> &MathData {
        &self.label
    }

    pub fn label_mut(&mut self) -> &mut MathData {
        &mut self.label
    }

    /// Target offset in grid steps (columns right, rows down)
    pub fn target(&self) -> (i32, i32) {
        self.dir.chars().fold((0, 0), |(dx, dy), c| match c {
            'r' => (dx + 1, dy),
            'l' => (dx - 1, dy),
            'd' => (dx, dy + 1),
            'u' => (dx, dy - 1),
            _ => (dx, dy),
        })
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let label = &mut self.label;
        let dl = mi.with_script_style(|mi| label.metrics(mi));
        if self.label_pos.is_some() {
            Dimension::new(dl.wid + 2, dl.asc, dl.des)
        } else {
            Dimension::new(2, 0, 0)
        }
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        let dl = self.label.dimension()?;
        let axis = pi.base.axis();
        let (dx, dy) = self.target();
        let from = (x, y - axis);
        let to = (x + dx * XY_STEP, y - axis + dy * XY_STEP);
        let color = pi.base.font.color;
        pi.pain.line(from.0, from.1, to.0, to.1, color);
        // Head: a short bar across the end point
        pi.pain.line(to.0 - 2, to.1 - 2, to.0 + 2, to.1 + 2, color);

        if let Some(pos) = self.label_pos {
            let mid = ((from.0 + to.0) / 2, (from.1 + to.1) / 2);
            let ly = match pos {
                LabelPos::Above => mid.1 - 2 - dl.des,
                LabelPos::Below => mid.1 + 2 + dl.asc,
                LabelPos::Middle => mid.1 + (dl.asc - dl.des) / 2,
            };
            pi.with_script_style(|pi| self.label.draw(pi, mid.0 - dl.wid / 2, ly))?;
        }
        Ok(())
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        features.require("xy");
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
    use crate::painter::RecordingPainter;

    fn cell(s: &str) -> MathData {
        s.chars().map(InsetMath::Char).collect()
    }

    #[test]
    fn test_xarrow_stretches_to_label() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let mut short = XArrowInset::new(XArrowKind::Right, cell("f"), MathData::new());
        let mut long = XArrowInset::new(XArrowKind::Right, cell("ffffffffff"), MathData::new());
        let ds = short.metrics(&mut mi);
        let dl = long.metrics(&mut mi);
        assert!(dl.wid > ds.wid);
        assert!(dl.wid >= long.above().dimension().unwrap().wid);

        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        long.draw(&mut pi, 0, 30).unwrap();
        let (_, fy) = painter.text_position("f").unwrap();
        assert!(fy < 30 - pi_axis(&fm, &config, &colors));
    }

    fn pi_axis(fm: &FixedFontMetrics, config: &EngineConfig, colors: &ColorTable) -> i32 {
        MetricsInfo::new(fm, config, colors, MathStyle::Text).base.axis()
    }

    #[test]
    fn test_names() {
        assert_eq!(XArrowKind::from_name("xmapsto"), Some(XArrowKind::MapsTo));
        assert_eq!(XArrowKind::MapsTo.name(), "xmapsto");
        let mut f = LatexFeatures::new();
        XArrowInset::new(XArrowKind::Left, MathData::new(), MathData::new()).validate(&mut f);
        assert!(f.is_required("amsmath") && !f.is_required("mathtools"));
    }

    #[test]
    fn test_xy_target() {
        let arrow = XYArrowInset::new("drr", Some(LabelPos::Above), cell("f"));
        assert_eq!(arrow.target(), (2, 1));
        assert_eq!(LabelPos::from_char('|'), Some(LabelPos::Middle));
    }

    #[test]
    fn test_xy_draws_label() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let mut arrow = XYArrowInset::new("r", Some(LabelPos::Above), cell("g"));
        arrow.metrics(&mut mi);
        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        arrow.draw(&mut pi, 0, 30).unwrap();
        assert_eq!(painter.texts(), vec!["g"]);
    }
}

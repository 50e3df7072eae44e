//! Math nodes
//!
//! [`InsetMath`] is the closed set of node kinds. Every kind owns a fixed
//! number of [`MathData`] cells (a grid owns rows x columns of them) and
//! implements the two layout passes: `metrics` computes and caches sizes
//! bottom-up, `draw` positions children from the cached sizes top-down.

mod arrow;
mod boxes;
mod cancel;
mod color;
mod decoration;
mod delim;
mod font;
mod frac;
pub(crate) mod glyph;
mod grid;
mod misc;
mod root;
mod script;
mod space;
mod symbol;

pub use arrow::{LabelPos, XArrowInset, XArrowKind, XYArrowInset};
pub use boxes::{BoxInset, BoxKind};
pub use cancel::{CancelInset, CancelKind, CancelToInset};
pub use color::ColorInset;
pub use decoration::DecorationInset;
pub use delim::DelimInset;
pub use font::{BoldSymbolInset, BoldSymbolKind, FontCommand, FontInset};
pub use frac::{FracInset, FracKind};
pub use grid::{
    parse_col_spec, CellSpan, ColInfo, GridInset, GridKind, HAlign, MatrixDelim, RowInfo, VAlign,
};
pub use misc::BraceInset;
pub use root::{RootInset, SqrtInset};
pub use script::ScriptInset;
pub use space::{parse_length, SpaceKind};
pub use symbol::SymbolInset;

use crate::color::ColorRole;
use crate::context::{MetricsInfo, PainterInfo};
use crate::data::MathData;
use crate::dimension::Dimension;
use crate::error::MathResult;
use crate::features::LatexFeatures;
use crate::symbols::SymbolInfo;
use serde::{Deserialize, Serialize};

/// A math node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InsetMath {
    /// Letter or other single character
    Char(char),
    /// Digit run such as `3.14`
    Number(String),
    /// Text-mode run inside `\text{}`, boxes and tabular cells
    Text(String),
    Symbol(SymbolInset),
    Frac(FracInset),
    Sqrt(SqrtInset),
    Root(RootInset),
    Decoration(DecorationInset),
    Color(ColorInset),
    Box(BoxInset),
    Grid(GridInset),
    Scripts(ScriptInset),
    Delim(DelimInset),
    Font(FontInset),
    BoldSymbol(BoldSymbolInset),
    Space(SpaceKind),
    Cancel(CancelInset),
    CancelTo(CancelToInset),
    Brace(BraceInset),
    /// Macro argument `#n`
    MacroArg(u8),
    /// Control word without a known meaning, kept by name
    Unknown(String),
    /// `%` comment up to the end of the line
    Comment(String),
    XArrow(XArrowInset),
    XYArrow(XYArrowInset),
}

impl InsetMath {
    /// Symbol node for a command name or operator character
    pub fn symbol(name: &str) -> Option<Self> {
        SymbolInset::new(name).map(InsetMath::Symbol)
    }

    /// Short lowercase name of the node kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            InsetMath::Char(_) => "char",
            InsetMath::Number(_) => "number",
            InsetMath::Text(_) => "text",
            InsetMath::Symbol(_) => "symbol",
            InsetMath::Frac(f) => f.kind.name(),
            InsetMath::Sqrt(_) => "sqrt",
            InsetMath::Root(_) => "root",
            InsetMath::Decoration(_) => "decoration",
            InsetMath::Color(_) => "color",
            InsetMath::Box(b) => b.kind.name(),
            InsetMath::Grid(g) => g.kind.name(),
            InsetMath::Scripts(_) => "scripts",
            InsetMath::Delim(_) => "delim",
            InsetMath::Font(f) => f.command.name(),
            InsetMath::BoldSymbol(b) => b.kind.name(),
            InsetMath::Space(_) => "space",
            InsetMath::Cancel(c) => c.kind.name(),
            InsetMath::CancelTo(_) => "cancelto",
            InsetMath::Brace(_) => "brace",
            InsetMath::MacroArg(_) => "macroarg",
            InsetMath::Unknown(_) => "unknown",
            InsetMath::Comment(_) => "comment",
            InsetMath::XArrow(_) => "xarrow",
            InsetMath::XYArrow(_) => "xyarrow",
        }
    }

    pub fn symbol_info(&self) -> Option<&'static SymbolInfo> {
        match self {
            InsetMath::Symbol(s) => s.info(),
            _ => None,
        }
    }

    /// Whether the cells of this node are LaTeX text mode
    pub fn has_text_cells(&self) -> bool {
        match self {
            InsetMath::Box(b) => b.kind.is_text_mode(),
            InsetMath::Font(f) => f.command.is_text_mode(),
            InsetMath::Grid(g) => g.kind.is_text_mode(),
            _ => false,
        }
    }

    // =========================================================================
    // Cells
    // =========================================================================

    /// Cells owned by this node, in writing order
    pub fn cells(&self) -> Vec<&MathData> {
        match self {
            InsetMath::Char(_)
            | InsetMath::Number(_)
            | InsetMath::Text(_)
            | InsetMath::Symbol(_)
            | InsetMath::Space(_)
            | InsetMath::MacroArg(_)
            | InsetMath::Unknown(_)
            | InsetMath::Comment(_) => Vec::new(),
            InsetMath::Frac(f) => f.cells().iter().collect(),
            InsetMath::Sqrt(s) => vec![s.cell()],
            InsetMath::Root(r) => r.cells().iter().collect(),
            InsetMath::Decoration(d) => vec![d.cell()],
            InsetMath::Color(c) => vec![c.cell()],
            InsetMath::Box(b) => vec![b.cell()],
            InsetMath::Grid(g) => g.cells().iter().collect(),
            InsetMath::Scripts(s) => s.cells(),
            InsetMath::Delim(d) => vec![d.cell()],
            InsetMath::Font(f) => vec![f.cell()],
            InsetMath::BoldSymbol(b) => vec![b.cell()],
            InsetMath::Cancel(c) => vec![c.cell()],
            InsetMath::CancelTo(c) => c.cells().iter().collect(),
            InsetMath::Brace(b) => vec![b.cell()],
            InsetMath::XArrow(a) => a.cells().iter().collect(),
            InsetMath::XYArrow(a) => vec![a.label()],
        }
    }

    /// Mutable cells; a grid drops its own layout as well
    pub fn cells_mut(&mut self) -> Vec<&mut MathData> {
        match self {
            InsetMath::Char(_)
            | InsetMath::Number(_)
            | InsetMath::Text(_)
            | InsetMath::Symbol(_)
            | InsetMath::Space(_)
            | InsetMath::MacroArg(_)
            | InsetMath::Unknown(_)
            | InsetMath::Comment(_) => Vec::new(),
            InsetMath::Frac(f) => f.cells_mut().iter_mut().collect(),
            InsetMath::Sqrt(s) => vec![s.cell_mut()],
            InsetMath::Root(r) => r.cells_mut().iter_mut().collect(),
            InsetMath::Decoration(d) => vec![d.cell_mut()],
            InsetMath::Color(c) => vec![c.cell_mut()],
            InsetMath::Box(b) => vec![b.cell_mut()],
            InsetMath::Grid(g) => g.cells_mut().iter_mut().collect(),
            InsetMath::Scripts(s) => s.cells_mut(),
            InsetMath::Delim(d) => vec![d.cell_mut()],
            InsetMath::Font(f) => vec![f.cell_mut()],
            InsetMath::BoldSymbol(b) => vec![b.cell_mut()],
            InsetMath::Cancel(c) => vec![c.cell_mut()],
            InsetMath::CancelTo(c) => c.cells_mut().iter_mut().collect(),
            InsetMath::Brace(b) => vec![b.cell_mut()],
            InsetMath::XArrow(a) => a.cells_mut().iter_mut().collect(),
            InsetMath::XYArrow(a) => vec![a.label_mut()],
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cells().len()
    }

    // =========================================================================
    // Layout passes
    // =========================================================================

    /// Compute and cache the size of this node and its cells
    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        match self {
            InsetMath::Char(c) => glyph::char_metrics(*c, mi),
            InsetMath::Number(n) => glyph::number_metrics(n, mi),
            InsetMath::Text(t) => glyph::text_metrics(t, mi),
            InsetMath::Symbol(s) => s.metrics(mi),
            InsetMath::Frac(f) => f.metrics(mi),
            InsetMath::Sqrt(s) => s.metrics(mi),
            InsetMath::Root(r) => r.metrics(mi),
            InsetMath::Decoration(d) => d.metrics(mi),
            InsetMath::Color(c) => c.metrics(mi),
            InsetMath::Box(b) => b.metrics(mi),
            InsetMath::Grid(g) => g.metrics(mi),
            InsetMath::Scripts(s) => s.metrics(mi),
            InsetMath::Delim(d) => d.metrics(mi),
            InsetMath::Font(f) => f.metrics(mi),
            InsetMath::BoldSymbol(b) => b.metrics(mi),
            InsetMath::Space(s) => s.metrics(mi),
            InsetMath::Cancel(c) => c.metrics(mi),
            InsetMath::CancelTo(c) => c.metrics(mi),
            InsetMath::Brace(b) => b.metrics(mi),
            InsetMath::MacroArg(n) => misc::label_metrics(&format!("#{}", n), mi),
            InsetMath::Unknown(name) => misc::label_metrics(&format!("\\{}", name), mi),
            InsetMath::Comment(text) => misc::label_metrics(&format!("%{}", text), mi),
            InsetMath::XArrow(a) => a.metrics(mi),
            InsetMath::XYArrow(a) => a.metrics(mi),
        }
    }

    /// Draw the node with its baseline at `y`, using the cached sizes
    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        match self {
            InsetMath::Char(c) => glyph::char_draw(*c, pi, x, y),
            InsetMath::Number(n) => glyph::number_draw(n, pi, x, y),
            InsetMath::Text(t) => glyph::text_draw(t, pi, x, y),
            InsetMath::Symbol(s) => s.draw(pi, x, y),
            InsetMath::Frac(f) => return f.draw(pi, x, y),
            InsetMath::Sqrt(s) => return s.draw(pi, x, y),
            InsetMath::Root(r) => return r.draw(pi, x, y),
            InsetMath::Decoration(d) => return d.draw(pi, x, y),
            InsetMath::Color(c) => return c.draw(pi, x, y),
            InsetMath::Box(b) => return b.draw(pi, x, y),
            InsetMath::Grid(g) => return g.draw(pi, x, y),
            InsetMath::Scripts(s) => return s.draw(pi, x, y),
            InsetMath::Delim(d) => return d.draw(pi, x, y),
            InsetMath::Font(f) => return f.draw(pi, x, y),
            InsetMath::BoldSymbol(b) => return b.draw(pi, x, y),
            InsetMath::Space(_) => {}
            InsetMath::Cancel(c) => return c.draw(pi, x, y),
            InsetMath::CancelTo(c) => return c.draw(pi, x, y),
            InsetMath::Brace(b) => return b.draw(pi, x, y),
            InsetMath::MacroArg(n) => {
                misc::label_draw(&format!("#{}", n), ColorRole::MacroArg, pi, x, y)
            }
            InsetMath::Unknown(name) => {
                misc::label_draw(&format!("\\{}", name), ColorRole::Error, pi, x, y)
            }
            InsetMath::Comment(text) => {
                misc::label_draw(&format!("%{}", text), ColorRole::Comment, pi, x, y)
            }
            InsetMath::XArrow(a) => return a.draw(pi, x, y),
            InsetMath::XYArrow(a) => return a.draw(pi, x, y),
        }
        Ok(())
    }

    // =========================================================================
    // Requirements
    // =========================================================================

    /// Record the LaTeX packages and CSS classes this node and its cells need
    pub fn validate(&self, features: &mut LatexFeatures) {
        match self {
            InsetMath::Symbol(s) => s.validate(features),
            InsetMath::Frac(f) => f.validate(features),
            InsetMath::Sqrt(s) => s.validate(features),
            InsetMath::Root(r) => r.validate(features),
            InsetMath::Decoration(d) => d.validate(features),
            InsetMath::Color(c) => c.validate(features),
            InsetMath::Box(b) => b.validate(features),
            InsetMath::Grid(g) => g.validate(features),
            InsetMath::Scripts(s) => s.validate(features),
            InsetMath::Delim(d) => d.validate(features),
            InsetMath::Font(f) => f.validate(features),
            InsetMath::BoldSymbol(b) => b.validate(features),
            InsetMath::Space(s) => {
                if let Some(package) = s.package() {
                    features.require(package);
                }
            }
            InsetMath::Cancel(c) => c.validate(features),
            InsetMath::CancelTo(c) => c.validate(features),
            InsetMath::XArrow(a) => a.validate(features),
            InsetMath::XYArrow(a) => a.validate(features),
            InsetMath::Unknown(_) => features.add_css("unknown"),
            InsetMath::Char(_)
            | InsetMath::Number(_)
            | InsetMath::Text(_)
            | InsetMath::Brace(_)
            | InsetMath::MacroArg(_)
            | InsetMath::Comment(_) => {}
        }
        for cell in self.cells() {
            cell.validate(features);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorTable;
    use crate::config::EngineConfig;
    use crate::context::MathStyle;
    use crate::font::FixedFontMetrics;
    use crate::painter::RecordingPainter;

    fn cell(s: &str) -> MathData {
        s.chars().map(InsetMath::Char).collect()
    }

    fn sample_nodes() -> Vec<InsetMath> {
        let mut grid = GridInset::new(GridKind::Cases, 2, 2);
        *grid.cell_mut(0, 0).unwrap() = cell("a");
        vec![
            InsetMath::Char('x'),
            InsetMath::Number("3.14".into()),
            InsetMath::Text("if".into()),
            InsetMath::symbol("alpha").unwrap(),
            InsetMath::Frac(FracInset::new(cell("1"), cell("2"))),
            InsetMath::Sqrt(SqrtInset::new(cell("x"))),
            InsetMath::Root(RootInset::new(cell("3"), cell("x"))),
            InsetMath::Decoration(DecorationInset::new("hat", cell("x")).unwrap()),
            InsetMath::Color(ColorInset::new("red", true, cell("x"))),
            InsetMath::Box(BoxInset::new(BoxKind::Fbox, cell("x"))),
            InsetMath::Grid(grid),
            InsetMath::Scripts(ScriptInset::with_scripts(cell("x"), Some(cell("i")), None)),
            InsetMath::Delim(DelimInset::new("(", ")", cell("x"))),
            InsetMath::Font(FontInset::new(FontCommand::MathBf, cell("x"))),
            InsetMath::BoldSymbol(BoldSymbolInset::new(BoldSymbolKind::Bm, cell("x"))),
            InsetMath::Space(SpaceKind::Quad),
            InsetMath::Cancel(CancelInset::new(CancelKind::Cancel, cell("x"))),
            InsetMath::CancelTo(CancelToInset::new(cell("x"), cell("0"))),
            InsetMath::Brace(BraceInset::new(cell("x"))),
            InsetMath::MacroArg(1),
            InsetMath::Unknown("foo".into()),
            InsetMath::Comment("note".into()),
            InsetMath::XArrow(XArrowInset::new(XArrowKind::Right, cell("f"), MathData::new())),
            InsetMath::XYArrow(XYArrowInset::new("r", None, MathData::new())),
        ]
    }

    #[test]
    fn test_every_node_lays_out_and_draws() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        for mut node in sample_nodes() {
            let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
            let dim = node.metrics(&mut mi);
            assert!(dim.asc >= 0 && dim.des >= 0, "{} {:?}", node.kind_name(), dim);
            for cell in node.cells() {
                assert!(cell.has_layout(), "{} left a cell without layout", node.kind_name());
            }

            let mut first = RecordingPainter::new();
            let mut pi = PainterInfo::new(&mut first, &fm, &config, &colors, MathStyle::Text);
            node.draw(&mut pi, 10, 40).unwrap();
            let mut second = RecordingPainter::new();
            let mut pi = PainterInfo::new(&mut second, &fm, &config, &colors, MathStyle::Text);
            node.draw(&mut pi, 10, 40).unwrap();
            assert_eq!(first.ops(), second.ops(), "{} draws differently", node.kind_name());
        }
    }

    #[test]
    fn test_draw_without_metrics_fails() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        for node in sample_nodes().into_iter().filter(|n| n.cell_count() > 0) {
            assert!(node.draw(&mut pi, 0, 0).is_err(), "{}", node.kind_name());
        }
    }

    #[test]
    fn test_cells_mut_matches_cells() {
        for mut node in sample_nodes() {
            let count = node.cell_count();
            assert_eq!(node.cells_mut().len(), count, "{}", node.kind_name());
        }
    }

    #[test]
    fn test_validate_recurses_into_cells() {
        let inner = [InsetMath::Cancel(CancelInset::new(CancelKind::Cancel, cell("x")))]
            .into_iter()
            .collect();
        let node = InsetMath::Frac(FracInset::new(inner, cell("y")));
        let mut f = LatexFeatures::new();
        node.validate(&mut f);
        assert!(f.is_required("cancel"));
    }
}

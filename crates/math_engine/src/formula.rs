//! Top-level formulas
//!
//! A [`Formula`] is what the surrounding document embeds: a root cell plus
//! the choice between inline (`$..$`) and display (`\[..\]`) placement.
//! Display formulas take the whole text width and centre their content.

use serde::{Deserialize, Serialize};

use crate::context::{MathStyle, MetricsInfo, PainterInfo, StyleContext};
use crate::data::{Cached, MathData};
use crate::dimension::Dimension;
use crate::error::{MathError, MathResult};
use crate::export::{self, CasTarget};
use crate::features::LatexFeatures;
use crate::parser::parse_latex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FormulaKind {
    #[default]
    Inline,
    Display,
}

impl FormulaKind {
    fn style(self) -> MathStyle {
        match self {
            FormulaKind::Inline => MathStyle::Text,
            FormulaKind::Display => MathStyle::Display,
        }
    }

    fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            FormulaKind::Inline => ("$", "$"),
            FormulaKind::Display => ("\\[", "\\]"),
        }
    }
}

#[derive(Debug)]
struct FormulaLayout {
    dim: Dimension,
    /// Offset of the content inside the formula box
    offset: i32,
}

/// A math formula embedded in a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formula {
    pub kind: FormulaKind,
    cell: MathData,
    #[serde(skip)]
    layout: Cached<FormulaLayout>,
}

impl Formula {
    pub fn new(kind: FormulaKind, cell: MathData) -> Self {
        Self {
            kind,
            cell,
            layout: Cached::default(),
        }
    }

    pub fn inline(cell: MathData) -> Self {
        Self::new(FormulaKind::Inline, cell)
    }

    pub fn display(cell: MathData) -> Self {
        Self::new(FormulaKind::Display, cell)
    }

    /// Parse a formula with its delimiters.
    ///
    /// `$..$` and `\(..\)` give inline formulas, `$$..$$` and `\[..\]`
    /// display formulas. Input without delimiters is an inline formula.
    /// Error positions refer to `input`.
    pub fn parse(input: &str) -> MathResult<Self> {
        let trimmed = input.trim();
        let lead = input.len() - input.trim_start().len();
        let forms = [
            ("$$", "$$", FormulaKind::Display),
            ("\\[", "\\]", FormulaKind::Display),
            ("\\(", "\\)", FormulaKind::Inline),
            ("$", "$", FormulaKind::Inline),
        ];
        let (kind, body, start) = forms
            .iter()
            .find_map(|&(open, close, kind)| {
                let inner = trimmed.strip_prefix(open)?.strip_suffix(close)?;
                Some((kind, inner, lead + open.len()))
            })
            .unwrap_or((FormulaKind::Inline, trimmed, lead));

        let offset = input[..start].chars().count();
        let cell = parse_latex(body).map_err(|err| match err {
            MathError::LatexParse { position, message } => MathError::LatexParse {
                position: position + offset,
                message,
            },
            other => other,
        })?;
        Ok(Self::new(kind, cell))
    }

    pub fn is_display(&self) -> bool {
        self.kind == FormulaKind::Display
    }

    pub fn cell(&self) -> &MathData {
        &self.cell
    }

    /// Mutable root cell; drops the formula layout
    pub fn cell_mut(&mut self) -> &mut MathData {
        self.layout.clear();
        &mut self.cell
    }

    pub fn into_cell(self) -> MathData {
        self.cell
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lay out the formula. Returns whether its dimension changed since the
    /// previous call, so the caller knows to reflow the surrounding line.
    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> bool {
        let previous = self.layout.get().map(|l| l.dim);
        let style = self.kind.style();
        let content = mi.with_style(style, |mi| self.cell.metrics(mi));

        let (dim, offset) = match self.kind {
            FormulaKind::Inline => (content, 0),
            FormulaKind::Display => {
                let wid = content.wid.max(mi.base.text_width);
                (Dimension { wid, ..content }, (wid - content.wid) / 2)
            }
        };
        self.layout.set(FormulaLayout { dim, offset });

        let changed = previous != Some(dim);
        tracing::debug!(kind = ?self.kind, ?dim, changed, "formula metrics");
        changed
    }

    pub fn dimension(&self) -> MathResult<Dimension> {
        self.layout
            .get()
            .map(|l| l.dim)
            .ok_or(MathError::StaleLayout("Formula::dimension"))
    }

    /// Draw with the left end of the baseline at `(x, y)`
    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        let layout = self
            .layout
            .get()
            .ok_or(MathError::StaleLayout("Formula::draw"))?;
        let style = self.kind.style();
        pi.with_style(style, |pi| self.cell.draw(pi, x + layout.offset, y))
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// LaTeX of the content, without delimiters
    pub fn latex(&self) -> String {
        export::latex(&self.cell)
    }

    /// LaTeX with the delimiters of the formula kind, the persisted form
    pub fn write(&self) -> String {
        let (open, close) = self.kind.delimiters();
        format!("{}{}{}", open, self.latex(), close)
    }

    pub fn mathml(&self) -> MathResult<String> {
        export::mathml(&self.cell, self.is_display())
    }

    pub fn html(&self) -> MathResult<String> {
        export::html(&self.cell, self.is_display())
    }

    pub fn cas(&self, target: CasTarget) -> String {
        export::cas::export(&self.cell, target)
    }

    pub fn normalize(&self) -> String {
        export::normalize(&self.cell)
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        self.cell.validate(features);
    }
}

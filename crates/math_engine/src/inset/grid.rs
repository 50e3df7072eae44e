//! Grids: arrays, matrices, cases, substacks, split, tabular and xymatrix
//!
//! A grid stores its cells row-major. Row heights and column widths are
//! computed independently: a row's ascent and descent only look at the cells
//! of that row, a column's width only at the cells of that column. Cells
//! spanning several columns (`\multicolumn`) are left out of the column scan
//! and afterwards widen the spanned columns if they do not fit.

use crate::context::{MathStyle, MetricsInfo, PainterInfo, StyleContext};
use crate::data::{Cached, MathData};
use crate::deco;
use crate::dimension::Dimension;
use crate::error::{MathError, MathResult};
use crate::features::LatexFeatures;
use serde::{Deserialize, Serialize};

/// Distance between two adjacent rule lines
const LINE_SEP: i32 = 3;

// =============================================================================
// Kinds
// =============================================================================

/// Delimiters of the amsmath matrix environments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatrixDelim {
    None,
    Paren,
    Bracket,
    Brace,
    Vert,
    DoubleVert,
}

impl MatrixDelim {
    fn env(&self) -> &'static str {
        match self {
            MatrixDelim::None => "matrix",
            MatrixDelim::Paren => "pmatrix",
            MatrixDelim::Bracket => "bmatrix",
            MatrixDelim::Brace => "Bmatrix",
            MatrixDelim::Vert => "vmatrix",
            MatrixDelim::DoubleVert => "Vmatrix",
        }
    }

    fn delims(&self) -> Option<(&'static str, &'static str)> {
        match self {
            MatrixDelim::None => None,
            MatrixDelim::Paren => Some(("(", ")")),
            MatrixDelim::Bracket => Some(("[", "]")),
            MatrixDelim::Brace => Some(("\\{", "\\}")),
            MatrixDelim::Vert => Some(("|", "|")),
            MatrixDelim::DoubleVert => Some(("\\|", "\\|")),
        }
    }
}

/// Grid flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridKind {
    /// `array` with an explicit column specification
    Array,
    /// `matrix`, `pmatrix`, `bmatrix`, ...
    Matrix(MatrixDelim),
    Cases,
    /// `\substack{a\\b}`
    Substack,
    Split,
    /// `tabular`; cells are text mode
    Tabular,
    /// `\xymatrix{...}` diagram
    XYMatrix,
}

impl GridKind {
    /// Kind for a `\begin{...}` environment name
    pub fn from_env(name: &str) -> Option<Self> {
        Some(match name {
            "array" => GridKind::Array,
            "matrix" => GridKind::Matrix(MatrixDelim::None),
            "pmatrix" => GridKind::Matrix(MatrixDelim::Paren),
            "bmatrix" => GridKind::Matrix(MatrixDelim::Bracket),
            "Bmatrix" => GridKind::Matrix(MatrixDelim::Brace),
            "vmatrix" => GridKind::Matrix(MatrixDelim::Vert),
            "Vmatrix" => GridKind::Matrix(MatrixDelim::DoubleVert),
            "cases" => GridKind::Cases,
            "split" => GridKind::Split,
            "tabular" => GridKind::Tabular,
            _ => return None,
        })
    }

    /// Environment name; `None` for the command forms
    pub fn env_name(&self) -> Option<&'static str> {
        match self {
            GridKind::Array => Some("array"),
            GridKind::Matrix(d) => Some(d.env()),
            GridKind::Cases => Some("cases"),
            GridKind::Split => Some("split"),
            GridKind::Tabular => Some("tabular"),
            GridKind::Substack | GridKind::XYMatrix => None,
        }
    }

    /// Name used in diagnostics and debug output
    pub fn name(&self) -> &'static str {
        match self {
            GridKind::Substack => "substack",
            GridKind::XYMatrix => "xymatrix",
            other => other.env_name().unwrap_or("grid"),
        }
    }

    /// Whether the environment takes `[valign]{colspec}` arguments
    pub fn has_col_spec(&self) -> bool {
        matches!(self, GridKind::Array | GridKind::Tabular)
    }

    pub fn is_text_mode(&self) -> bool {
        *self == GridKind::Tabular
    }

    /// Left and right stretchy delimiters
    pub fn delims(&self) -> Option<(&'static str, &'static str)> {
        match self {
            GridKind::Matrix(d) => d.delims(),
            GridKind::Cases => Some(("\\{", ".")),
            _ => None,
        }
    }

    fn default_align(&self, col: usize) -> HAlign {
        match self {
            GridKind::Cases | GridKind::Tabular => HAlign::Left,
            GridKind::Split if col == 0 => HAlign::Right,
            GridKind::Split => HAlign::Left,
            _ => HAlign::Center,
        }
    }

    fn package(&self) -> Option<&'static str> {
        match self {
            GridKind::Matrix(_) | GridKind::Cases | GridKind::Split | GridKind::Substack => {
                Some("amsmath")
            }
            GridKind::XYMatrix => Some("xy"),
            GridKind::Array | GridKind::Tabular => None,
        }
    }
}

// =============================================================================
// Row, column and cell attributes
// =============================================================================

/// Horizontal alignment of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

impl HAlign {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'l' => Some(HAlign::Left),
            'c' => Some(HAlign::Center),
            'r' => Some(HAlign::Right),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            HAlign::Left => 'l',
            HAlign::Center => 'c',
            HAlign::Right => 'r',
        }
    }

    fn offset(&self, avail: i32, wid: i32) -> i32 {
        match self {
            HAlign::Left => 0,
            HAlign::Center => (avail - wid) / 2,
            HAlign::Right => avail - wid,
        }
    }
}

/// Vertical alignment of the whole grid relative to the surrounding baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

impl VAlign {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            't' => Some(VAlign::Top),
            'c' => Some(VAlign::Center),
            'b' => Some(VAlign::Bottom),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            VAlign::Top => 't',
            VAlign::Center => 'c',
            VAlign::Bottom => 'b',
        }
    }
}

/// Column attributes; `lines` counts the vertical rules left of the column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColInfo {
    pub align: HAlign,
    pub lines: usize,
    /// Column type other than `l`, `c`, `r`, kept verbatim (`p{2cm}`)
    pub special: Option<String>,
}

impl ColInfo {
    fn new(align: HAlign) -> Self {
        Self {
            align,
            lines: 0,
            special: None,
        }
    }
}

/// Row attributes; `lines` counts the horizontal rules above the row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowInfo {
    pub lines: usize,
}

/// Multicolumn status of a cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CellSpan {
    #[default]
    Normal,
    /// First cell of a `\multicolumn{span}{spec}`
    Begin { span: usize, spec: String },
    /// Covered by a multicolumn cell to its left
    Part,
}

impl CellSpan {
    /// Alignment from a multicolumn column spec such as `|c|`
    fn align(spec: &str) -> HAlign {
        spec.chars().find_map(HAlign::from_char).unwrap_or(HAlign::Center)
    }
}

#[derive(Debug)]
struct GridLayout {
    cell_dims: Vec<Dimension>,
    row_asc: Vec<i32>,
    row_des: Vec<i32>,
    /// Baseline of each row below the grid top
    row_base: Vec<i32>,
    col_wid: Vec<i32>,
    col_x: Vec<i32>,
    /// Start of the rules at each row boundary, `nrows + 1` entries
    hline_y: Vec<i32>,
    /// Start of the rules at each column boundary, `ncols + 1` entries
    vline_x: Vec<i32>,
    delim_wid: i32,
    height: i32,
    dim: Dimension,
}

// =============================================================================
// GridInset
// =============================================================================

/// A rows x columns array of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr")]
pub struct GridInset {
    pub kind: GridKind,
    /// `nrows + 1` entries; the last one holds the rules below the last row
    rows: Vec<RowInfo>,
    /// `ncols + 1` entries; the last one holds the rules right of the last column
    cols: Vec<ColInfo>,
    cells: Vec<MathData>,
    cellinfo: Vec<CellSpan>,
    pub v_align: VAlign,
    #[serde(skip)]
    layout: Cached<GridLayout>,
}

impl GridInset {
    /// Empty grid; at least one row and one column are created
    pub fn new(kind: GridKind, nrows: usize, ncols: usize) -> Self {
        let nrows = nrows.max(1);
        let ncols = ncols.max(1);
        let mut cols: Vec<ColInfo> = (0..ncols).map(|c| ColInfo::new(kind.default_align(c))).collect();
        cols.push(ColInfo::new(HAlign::Center));
        Self {
            kind,
            rows: vec![RowInfo::default(); nrows + 1],
            cols,
            cells: vec![MathData::new(); nrows * ncols],
            cellinfo: vec![CellSpan::Normal; nrows * ncols],
            v_align: VAlign::Center,
            layout: Cached::default(),
        }
    }

    /// Grid from rows of cells; short rows are padded with empty cells
    pub fn from_rows(kind: GridKind, rows: Vec<Vec<MathData>>) -> Self {
        let ncols = rows.iter().map(Vec::len).max().unwrap_or(1);
        let mut grid = Self::new(kind, rows.len(), ncols);
        let ncols = grid.ncols();
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                grid.cells[r * ncols + c] = cell;
            }
        }
        grid
    }

    pub fn nrows(&self) -> usize {
        self.rows.len() - 1
    }

    pub fn ncols(&self) -> usize {
        self.cols.len() - 1
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.nrows() && col < self.ncols()).then(|| row * self.ncols() + col)
    }

    fn out_of_range(&self, what: &str, idx: usize) -> MathError {
        MathError::InvalidStructure(format!(
            "{} {} outside {}x{} grid",
            what,
            idx,
            self.nrows(),
            self.ncols()
        ))
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&MathData> {
        self.index(row, col).map(|i| &self.cells[i])
    }

    /// Mutable cell access; drops the grid layout
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut MathData> {
        let i = self.index(row, col)?;
        self.layout.clear();
        Some(&mut self.cells[i])
    }

    /// All cells, row-major
    pub fn cells(&self) -> &[MathData] {
        &self.cells
    }

    /// All cells, row-major; drops the grid layout
    pub fn cells_mut(&mut self) -> &mut [MathData] {
        self.layout.clear();
        &mut self.cells
    }

    pub fn cell_span(&self, row: usize, col: usize) -> Option<&CellSpan> {
        self.index(row, col).map(|i| &self.cellinfo[i])
    }

    pub fn row_info(&self, row: usize) -> Option<&RowInfo> {
        self.rows.get(row)
    }

    pub fn col_info(&self, col: usize) -> Option<&ColInfo> {
        self.cols.get(col)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn set_halign(&mut self, col: usize, align: HAlign) -> MathResult<()> {
        if col >= self.ncols() {
            return Err(self.out_of_range("column", col));
        }
        self.layout.clear();
        self.cols[col].align = align;
        self.cols[col].special = None;
        Ok(())
    }

    pub fn set_valign(&mut self, align: VAlign) {
        self.layout.clear();
        self.v_align = align;
    }

    /// Set the number of horizontal rules above `row` (`row == nrows` is the bottom)
    pub fn set_row_lines(&mut self, row: usize, lines: usize) -> MathResult<()> {
        if row > self.nrows() {
            return Err(self.out_of_range("row", row));
        }
        self.layout.clear();
        self.rows[row].lines = lines;
        Ok(())
    }

    /// Set the number of vertical rules left of `col` (`col == ncols` is the right edge)
    pub fn set_col_lines(&mut self, col: usize, lines: usize) -> MathResult<()> {
        if col > self.ncols() {
            return Err(self.out_of_range("column", col));
        }
        self.layout.clear();
        self.cols[col].lines = lines;
        Ok(())
    }

    /// Set columns and trailing rules from a column spec such as `|l|cc|`
    pub fn set_col_spec(&mut self, spec: &str) -> MathResult<()> {
        let cols = parse_col_spec(spec)?;
        while self.ncols() < cols.len() - 1 {
            self.add_col(self.ncols())?;
        }
        self.layout.clear();
        for (c, info) in cols.into_iter().enumerate() {
            if c < self.cols.len() {
                self.cols[c] = info;
            }
        }
        Ok(())
    }

    /// Column spec for `array` and `tabular`
    pub fn col_spec(&self) -> String {
        let mut spec = String::new();
        for (c, info) in self.cols.iter().enumerate() {
            spec.extend(std::iter::repeat('|').take(info.lines));
            if c < self.ncols() {
                match &info.special {
                    Some(special) => spec.push_str(special),
                    None => spec.push(info.align.as_char()),
                }
            }
        }
        spec
    }

    /// Turn the cell at (`row`, `col`) into a multicolumn cell covering `span` columns
    pub fn multicolumn(
        &mut self,
        row: usize,
        col: usize,
        span: usize,
        spec: &str,
        content: MathData,
    ) -> MathResult<()> {
        if span == 0 || col + span > self.ncols() || row >= self.nrows() {
            return Err(MathError::InvalidStructure(format!(
                "multicolumn of {} at ({}, {}) does not fit {}x{} grid",
                span,
                row,
                col,
                self.nrows(),
                self.ncols()
            )));
        }
        let first = row * self.ncols() + col;
        if self.cellinfo[first..first + span]
            .iter()
            .any(|info| *info != CellSpan::Normal)
        {
            return Err(MathError::InvalidStructure(format!(
                "cells ({}, {}..{}) already belong to a multicolumn",
                row,
                col,
                col + span
            )));
        }
        self.layout.clear();
        self.cellinfo[first] = CellSpan::Begin {
            span,
            spec: spec.to_string(),
        };
        self.cells[first] = content;
        for i in first + 1..first + span {
            self.cellinfo[i] = CellSpan::Part;
            self.cells[i].clear();
        }
        Ok(())
    }

    // =========================================================================
    // Row and column editing
    // =========================================================================

    /// Insert an empty row before `row`
    pub fn add_row(&mut self, row: usize) -> MathResult<()> {
        if row > self.nrows() {
            return Err(self.out_of_range("row", row));
        }
        self.layout.clear();
        let ncols = self.ncols();
        let at = row * ncols;
        self.cells
            .splice(at..at, std::iter::repeat_with(MathData::new).take(ncols));
        self.cellinfo
            .splice(at..at, std::iter::repeat(CellSpan::Normal).take(ncols));
        self.rows.insert(row, RowInfo::default());
        tracing::debug!(row, nrows = self.nrows(), "grid row added");
        Ok(())
    }

    /// Remove `row`; the last remaining row cannot be removed
    pub fn del_row(&mut self, row: usize) -> MathResult<()> {
        if row >= self.nrows() {
            return Err(self.out_of_range("row", row));
        }
        if self.nrows() == 1 {
            return Err(MathError::InvalidStructure(
                "cannot delete the only row of a grid".into(),
            ));
        }
        self.layout.clear();
        let ncols = self.ncols();
        let at = row * ncols;
        self.cells.drain(at..at + ncols);
        self.cellinfo.drain(at..at + ncols);
        self.rows.remove(row);
        Ok(())
    }

    /// Insert an empty column before `col`.
    ///
    /// A column inserted inside a multicolumn cell widens that cell.
    pub fn add_col(&mut self, col: usize) -> MathResult<()> {
        if col > self.ncols() {
            return Err(self.out_of_range("column", col));
        }
        self.layout.clear();
        let old = self.ncols();
        let mut cells = Vec::with_capacity(self.nrows() * (old + 1));
        let mut cellinfo = Vec::with_capacity(self.nrows() * (old + 1));
        for r in 0..self.nrows() {
            let row_start = r * old;
            let inside_span = col < old && self.cellinfo[row_start + col] == CellSpan::Part;
            if inside_span {
                if let Some(begin) = self.span_start(r, col) {
                    if let CellSpan::Begin { span, .. } = &mut self.cellinfo[row_start + begin] {
                        *span += 1;
                    }
                }
            }
            for c in 0..=old {
                if c == col {
                    cells.push(MathData::new());
                    cellinfo.push(if inside_span {
                        CellSpan::Part
                    } else {
                        CellSpan::Normal
                    });
                }
                if c < old {
                    cells.push(std::mem::take(&mut self.cells[row_start + c]));
                    cellinfo.push(std::mem::take(&mut self.cellinfo[row_start + c]));
                }
            }
        }
        self.cells = cells;
        self.cellinfo = cellinfo;
        self.cols
            .insert(col, ColInfo::new(self.kind.default_align(col)));
        Ok(())
    }

    /// Remove `col`; the last remaining column cannot be removed.
    ///
    /// Multicolumn cells covering the column shrink by one.
    pub fn del_col(&mut self, col: usize) -> MathResult<()> {
        if col >= self.ncols() {
            return Err(self.out_of_range("column", col));
        }
        if self.ncols() == 1 {
            return Err(MathError::InvalidStructure(
                "cannot delete the only column of a grid".into(),
            ));
        }
        self.layout.clear();
        let old = self.ncols();
        for r in 0..self.nrows() {
            let row_start = r * old;
            match self.cellinfo[row_start + col].clone() {
                CellSpan::Begin { span, spec } if span > 1 => {
                    // The next covered cell takes over content and span
                    let content = std::mem::take(&mut self.cells[row_start + col]);
                    self.cells[row_start + col + 1] = content;
                    self.cellinfo[row_start + col + 1] = if span > 2 {
                        CellSpan::Begin {
                            span: span - 1,
                            spec,
                        }
                    } else {
                        CellSpan::Normal
                    };
                }
                CellSpan::Part => {
                    if let Some(begin) = self.span_start(r, col) {
                        let info = &mut self.cellinfo[row_start + begin];
                        if let CellSpan::Begin { span, spec } = info {
                            *info = if *span > 2 {
                                CellSpan::Begin {
                                    span: *span - 1,
                                    spec: std::mem::take(spec),
                                }
                            } else {
                                CellSpan::Normal
                            };
                        }
                    }
                }
                _ => {}
            }
        }
        for r in (0..self.nrows()).rev() {
            let i = r * old + col;
            self.cells.remove(i);
            self.cellinfo.remove(i);
        }
        self.cols.remove(col);
        Ok(())
    }

    /// Column of the multicolumn cell covering (`row`, `col`)
    fn span_start(&self, row: usize, col: usize) -> Option<usize> {
        let row_start = row * self.ncols();
        (0..=col)
            .rev()
            .find(|&c| matches!(self.cellinfo[row_start + c], CellSpan::Begin { .. }))
    }

    /// Whether the last row holds only empty cells
    pub(crate) fn last_row_is_empty(&self) -> bool {
        let ncols = self.ncols();
        let start = (self.nrows() - 1) * ncols;
        self.cells[start..start + ncols].iter().all(MathData::is_empty)
    }

    // =========================================================================
    // Layout
    // =========================================================================

    fn cell_style(&self, style: MathStyle) -> MathStyle {
        match self.kind {
            GridKind::Substack => style,
            _ => style.cell(),
        }
    }

    fn col_sep(&self, mi: &MetricsInfo<'_>) -> i32 {
        match self.kind {
            GridKind::XYMatrix => 3 * mi.base.config.grid_col_sep,
            GridKind::Substack => 0,
            _ => mi.base.config.grid_col_sep,
        }
    }

    fn row_sep(&self, mi: &MetricsInfo<'_>) -> i32 {
        match self.kind {
            GridKind::XYMatrix => 4 * mi.base.config.grid_row_sep,
            _ => mi.base.config.grid_row_sep,
        }
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let nrows = self.nrows();
        let ncols = self.ncols();
        let style = self.cell_style(mi.base.style);
        let cells = &mut self.cells;
        let cell_dims: Vec<Dimension> =
            mi.with_style(style, |mi| cells.iter_mut().map(|c| c.metrics(mi)).collect());

        let mut row_asc = vec![0; nrows];
        let mut row_des = vec![0; nrows];
        let mut col_wid = vec![0; ncols];
        for r in 0..nrows {
            for c in 0..ncols {
                let i = r * ncols + c;
                let d = cell_dims[i];
                row_asc[r] = row_asc[r].max(d.asc);
                row_des[r] = row_des[r].max(d.des);
                if self.cellinfo[i] == CellSpan::Normal {
                    col_wid[c] = col_wid[c].max(d.wid);
                }
            }
        }

        // Widen columns under multicolumn cells that do not fit
        let colsep = self.col_sep(mi);
        for r in 0..nrows {
            for c in 0..ncols {
                let i = r * ncols + c;
                if let CellSpan::Begin { span, .. } = &self.cellinfo[i] {
                    let span = (*span).min(ncols - c);
                    let inner_lines: usize = self.cols[c + 1..c + span].iter().map(|i| i.lines).sum();
                    let avail: i32 = col_wid[c..c + span].iter().sum::<i32>()
                        + (span as i32 - 1) * colsep
                        + inner_lines as i32 * LINE_SEP;
                    let excess = cell_dims[i].wid - avail;
                    if excess > 0 {
                        let share = excess / span as i32;
                        for w in &mut col_wid[c..c + span] {
                            *w += share;
                        }
                        col_wid[c + span - 1] += excess - share * span as i32;
                    }
                }
            }
        }

        let rowsep = self.row_sep(mi);
        let mut row_base = vec![0; nrows];
        let mut hline_y = vec![0; nrows + 1];
        let mut y = 0;
        for r in 0..nrows {
            if r > 0 {
                y += rowsep;
            }
            hline_y[r] = y;
            y += self.rows[r].lines as i32 * LINE_SEP;
            y += row_asc[r];
            row_base[r] = y;
            y += row_des[r];
        }
        hline_y[nrows] = y;
        y += self.rows[nrows].lines as i32 * LINE_SEP;
        let height = y;

        let delim_wid = if self.kind.delims().is_some() {
            (height / 6).max(5) + 2
        } else {
            0
        };
        let half = colsep / 2;
        let mut col_x = vec![0; ncols];
        let mut vline_x = vec![0; ncols + 1];
        let mut x = delim_wid;
        for c in 0..ncols {
            vline_x[c] = x;
            x += self.cols[c].lines as i32 * LINE_SEP;
            if c > 0 {
                x += half;
            }
            col_x[c] = x;
            x += col_wid[c];
            if c + 1 < ncols {
                x += colsep - half;
            }
        }
        vline_x[ncols] = x;
        x += self.cols[ncols].lines as i32 * LINE_SEP;
        let right_delim = match self.kind.delims() {
            Some((_, ".")) | None => 0,
            Some(_) => delim_wid,
        };
        let width = x + right_delim;

        let asc = match self.v_align {
            VAlign::Top => row_base[0],
            VAlign::Bottom => row_base[nrows - 1],
            VAlign::Center => height / 2 + mi.base.axis(),
        };
        let dim = Dimension::new(width, asc, height - asc);
        tracing::trace!(kind = self.kind.name(), nrows, ncols, ?dim, "grid metrics");

        self.layout.set(GridLayout {
            cell_dims,
            row_asc,
            row_des,
            row_base,
            col_wid,
            col_x,
            hline_y,
            vline_x,
            delim_wid,
            height,
            dim,
        });
        dim
    }

    fn layout(&self, what: &'static str) -> MathResult<&GridLayout> {
        self.layout.get().ok_or(MathError::StaleLayout(what))
    }

    /// Ascent and descent of `row` from the last metrics pass
    pub fn row_extent(&self, row: usize) -> MathResult<(i32, i32)> {
        let layout = self.layout("GridInset::row_extent")?;
        match (layout.row_asc.get(row), layout.row_des.get(row)) {
            (Some(&a), Some(&d)) => Ok((a, d)),
            _ => Err(self.out_of_range("row", row)),
        }
    }

    /// Width of `col` from the last metrics pass
    pub fn col_width(&self, col: usize) -> MathResult<i32> {
        let layout = self.layout("GridInset::col_width")?;
        layout
            .col_wid
            .get(col)
            .copied()
            .ok_or_else(|| self.out_of_range("column", col))
    }

    pub fn dimension(&self) -> MathResult<Dimension> {
        Ok(self.layout("GridInset::dimension")?.dim)
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        let layout = self.layout("GridInset::draw")?;
        let ncols = self.ncols();
        let top = y - layout.dim.asc;
        let style = self.cell_style(pi.base.style);

        pi.with_style(style, |pi| -> MathResult<()> {
            for (i, cell) in self.cells.iter().enumerate() {
                let (r, c) = (i / ncols, i % ncols);
                let (align, last) = match &self.cellinfo[i] {
                    CellSpan::Part => continue,
                    CellSpan::Normal => (self.cols[c].align, c),
                    CellSpan::Begin { span, spec } => {
                        (CellSpan::align(spec), (c + span - 1).min(ncols - 1))
                    }
                };
                let avail = layout.col_x[last] + layout.col_wid[last] - layout.col_x[c];
                let dx = align.offset(avail, layout.cell_dims[i].wid);
                cell.draw(pi, x + layout.col_x[c] + dx, top + layout.row_base[r])?;
            }
            Ok(())
        })?;

        let color = pi.base.font.color;
        let left = x + layout.delim_wid;
        let right = x + layout.vline_x[ncols] + self.cols[ncols].lines as i32 * LINE_SEP;
        for (r, info) in self.rows.iter().enumerate() {
            for k in 0..info.lines as i32 {
                let ly = top + layout.hline_y[r] + k * LINE_SEP + LINE_SEP / 2;
                pi.pain.line(left, ly, right, ly, color);
            }
        }
        for (c, info) in self.cols.iter().enumerate() {
            for k in 0..info.lines as i32 {
                let lx = x + layout.vline_x[c] + k * LINE_SEP + LINE_SEP / 2;
                pi.pain.line(lx, top, lx, top + layout.height, color);
            }
        }

        if let Some((l, r)) = self.kind.delims() {
            let dw = layout.delim_wid - 2;
            if let Some(shape) = deco::delimiter_shape(l) {
                deco::draw_shape(pi.pain, shape, x + 1, top, dw, layout.height, false, color);
            }
            if let Some(shape) = deco::delimiter_shape(r) {
                let rx = x + layout.dim.wid - layout.delim_wid + 1;
                deco::draw_shape(pi.pain, shape, rx, top, dw, layout.height, false, color);
            }
        }
        Ok(())
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        if let Some(package) = self.kind.package() {
            features.require(package);
        }
        features.add_css(match self.kind {
            GridKind::Cases => "cases",
            _ => "matrix",
        });
    }
}

/// Serialized form of a [`GridInset`]; checked before it becomes a grid
#[derive(Deserialize)]
struct GridRepr {
    kind: GridKind,
    rows: Vec<RowInfo>,
    cols: Vec<ColInfo>,
    cells: Vec<MathData>,
    cellinfo: Vec<CellSpan>,
    v_align: VAlign,
}

impl TryFrom<GridRepr> for GridInset {
    type Error = MathError;

    fn try_from(repr: GridRepr) -> MathResult<Self> {
        let invalid =
            |message: String| -> MathResult<Self> { Err(MathError::InvalidStructure(message)) };
        if repr.rows.len() < 2 || repr.cols.len() < 2 {
            return invalid(format!(
                "grid needs at least one row and one column, got {} row and {} column entries",
                repr.rows.len(),
                repr.cols.len()
            ));
        }
        let nrows = repr.rows.len() - 1;
        let ncols = repr.cols.len() - 1;
        let expected = nrows * ncols;
        if repr.cells.len() != expected || repr.cellinfo.len() != expected {
            return invalid(format!(
                "{}x{} grid declares {} cells and {} cell infos",
                nrows,
                ncols,
                repr.cells.len(),
                repr.cellinfo.len()
            ));
        }
        for (r, infos) in repr.cellinfo.chunks(ncols).enumerate() {
            let mut covered = 0;
            for (c, info) in infos.iter().enumerate() {
                match info {
                    CellSpan::Part if covered > 0 => covered -= 1,
                    CellSpan::Part => {
                        return invalid(format!("cell ({}, {}) is part of no multicolumn", r, c));
                    }
                    _ if covered > 0 => {
                        return invalid(format!("multicolumn before ({}, {}) is cut short", r, c));
                    }
                    CellSpan::Begin { span, .. } if *span == 0 || c + span > ncols => {
                        return invalid(format!(
                            "multicolumn of {} at ({}, {}) does not fit {} columns",
                            span, r, c, ncols
                        ));
                    }
                    CellSpan::Begin { span, .. } => covered = span - 1,
                    CellSpan::Normal => {}
                }
            }
            if covered > 0 {
                return invalid(format!("multicolumn in row {} is cut short", r));
            }
        }
        Ok(Self {
            kind: repr.kind,
            rows: repr.rows,
            cols: repr.cols,
            cells: repr.cells,
            cellinfo: repr.cellinfo,
            v_align: repr.v_align,
            layout: Cached::default(),
        })
    }
}

/// Parse an `array`/`tabular` column spec into `ncols + 1` column infos
pub fn parse_col_spec(spec: &str) -> MathResult<Vec<ColInfo>> {
    let mut cols = Vec::new();
    let mut lines = 0;
    let mut chars = spec.char_indices().peekable();
    while let Some((pos, c)) = chars.next() {
        match c {
            '|' => lines += 1,
            ' ' => {}
            'p' | 'm' | 'b' => {
                let mut special = String::from(c);
                let mut depth = 0;
                for (_, d) in chars.by_ref() {
                    special.push(d);
                    match d {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                if depth != 0 {
                    return Err(MathError::parse(pos, "unterminated column width"));
                }
                cols.push(ColInfo {
                    align: HAlign::Left,
                    lines,
                    special: Some(special),
                });
                lines = 0;
            }
            _ => match HAlign::from_char(c) {
                Some(align) => {
                    cols.push(ColInfo {
                        align,
                        lines,
                        special: None,
                    });
                    lines = 0;
                }
                None => {
                    return Err(MathError::parse(
                        pos,
                        format!("unknown column type '{}'", c),
                    ))
                }
            },
        }
    }
    if cols.is_empty() {
        return Err(MathError::parse(0, "empty column specification"));
    }
    cols.push(ColInfo {
        align: HAlign::Center,
        lines,
        special: None,
    });
    Ok(cols)
}

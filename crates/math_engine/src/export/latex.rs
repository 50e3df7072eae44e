//! LaTeX writer
//!
//! [`WriteStream`] serialises a tree back to the LaTeX fragment that
//! [`parse_latex`](crate::parser::parse_latex) reads. Re-parsing the output of
//! a parsed tree gives the same tree, so writing reaches a fixed point after
//! one round.

use crate::data::MathData;
use crate::inset::{BoxInset, CellSpan, FracInset, GridInset, InsetMath, ScriptInset, VAlign};

/// Commands that need `\protect` inside moving arguments
const FRAGILE: &[&str] = &[
    "sqrt",
    "xrightarrow",
    "xleftarrow",
    "cancel",
    "bcancel",
    "xcancel",
    "cancelto",
    "boxed",
    "makebox",
    "framebox",
    "substack",
    "text",
    "ensuremath",
    "hspace",
];

/// LaTeX output sink with the state needed to keep tokens apart
#[derive(Debug, Default)]
pub struct WriteStream {
    out: String,
    fragile: bool,
    /// Last token was a control word; a following letter needs a space
    pending_space: bool,
    /// An `\ensuremath{` opened inside text mode is waiting for its `}`
    pending_brace: bool,
    text_mode: bool,
    line: usize,
}

impl WriteStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream for moving arguments such as section titles
    pub fn fragile() -> Self {
        Self {
            fragile: true,
            ..Self::default()
        }
    }

    pub fn is_fragile(&self) -> bool {
        self.fragile
    }

    /// Number of line breaks written so far
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn finish(mut self) -> String {
        self.close_ensuremath();
        self.out
    }

    /// Write raw LaTeX, separating it from a preceding control word
    pub fn write_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if self.pending_space && s.starts_with(|c: char| c.is_ascii_alphabetic()) {
            self.out.push(' ');
        }
        self.out.push_str(s);
        self.line += s.matches('\n').count();
        self.pending_space = ends_with_control_word(s);
    }

    fn command(&mut self, name: &str) {
        if self.fragile && FRAGILE.contains(&name) {
            self.write_str("\\protect");
        }
        self.write_str(&format!("\\{}", name));
    }

    fn ends_in_number(&self) -> bool {
        self.out.ends_with(|c: char| c.is_ascii_digit() || c == '.')
    }

    fn in_text(&self) -> bool {
        self.text_mode && !self.pending_brace
    }

    fn close_ensuremath(&mut self) {
        if self.pending_brace {
            self.pending_brace = false;
            self.write_str("}");
        }
    }

    /// Write a top-level math cell
    pub fn write_data(&mut self, data: &MathData) {
        self.write_cell(data, false);
    }

    /// Write a cell in math or text mode, restoring the outer mode afterwards
    fn write_cell(&mut self, data: &MathData, text: bool) {
        let outer_mode = std::mem::replace(&mut self.text_mode, text);
        let outer_brace = std::mem::replace(&mut self.pending_brace, false);
        for atom in data.iter() {
            self.write_inset(atom.nucleus());
        }
        self.close_ensuremath();
        self.text_mode = outer_mode;
        self.pending_brace = outer_brace;
    }

    /// Cell in the current mode, as for groups and colour changes
    fn write_same_mode(&mut self, data: &MathData) {
        let text = self.in_text();
        self.write_cell(data, text);
    }

    fn write_arg(&mut self, data: &MathData, text: bool) {
        self.write_str("{");
        self.write_cell(data, text);
        self.write_str("}");
    }

    pub fn write_inset(&mut self, inset: &InsetMath) {
        if self.text_mode {
            if is_text_capable(inset) {
                self.close_ensuremath();
            } else if !self.pending_brace {
                self.command("ensuremath");
                self.write_str("{");
                self.pending_brace = true;
            }
        }
        let text = self.in_text();
        match inset {
            InsetMath::Char(c) => match c {
                '{' | '}' | '%' | '&' | '#' | '$' | '_' => self.write_str(&format!("\\{}", c)),
                _ => self.write_str(&c.to_string()),
            },
            InsetMath::Number(digits) => self.write_str(digits),
            InsetMath::Text(s) if text => self.write_text(s),
            InsetMath::Text(s) => {
                self.command("text");
                self.write_str("{");
                self.write_text(s);
                self.write_str("}");
            }
            InsetMath::Symbol(symbol) => match symbol.info() {
                Some(info) => self.write_str(&info.latex()),
                None => self.write_str(symbol.name()),
            },
            InsetMath::Frac(frac) => self.write_frac(frac),
            InsetMath::Sqrt(sqrt) => {
                self.command("sqrt");
                self.write_arg(sqrt.cell(), false);
            }
            InsetMath::Root(root) => {
                self.command("sqrt");
                self.write_str("[");
                self.write_cell(root.index(), false);
                self.write_str("]");
                self.write_arg(root.radicand(), false);
            }
            InsetMath::Decoration(deco) => {
                self.command(deco.name());
                self.write_arg(deco.cell(), false);
            }
            InsetMath::Color(color) if color.old_style => {
                self.write_str("{");
                self.command("color");
                self.write_str(&format!("{{{}}}", color.color));
                self.write_same_mode(color.cell());
                self.write_str("}");
            }
            InsetMath::Color(color) => {
                self.command("textcolor");
                self.write_str(&format!("{{{}}}", color.color));
                self.write_str("{");
                self.write_same_mode(color.cell());
                self.write_str("}");
            }
            InsetMath::Box(boxed) => self.write_box(boxed),
            InsetMath::Grid(grid) => self.write_grid(grid),
            InsetMath::Scripts(scripts) => self.write_scripts(scripts),
            InsetMath::Delim(delim) => {
                self.command("left");
                self.write_str(&delim.left);
                self.write_cell(delim.cell(), false);
                self.command("right");
                self.write_str(&delim.right);
            }
            InsetMath::Font(font) => {
                self.command(font.command.name());
                self.write_arg(font.cell(), font.command.is_text_mode());
            }
            InsetMath::BoldSymbol(bold) => {
                self.command(bold.kind.name());
                self.write_arg(bold.cell(), false);
            }
            InsetMath::Space(space) => self.write_str(&space.latex()),
            InsetMath::Cancel(cancel) => {
                self.command(cancel.kind.name());
                self.write_arg(cancel.cell(), false);
            }
            InsetMath::CancelTo(cancel) => {
                self.command("cancelto");
                self.write_arg(cancel.target(), false);
                self.write_arg(cancel.expr(), false);
            }
            InsetMath::Brace(brace) => {
                self.write_str("{");
                self.write_same_mode(brace.cell());
                self.write_str("}");
            }
            InsetMath::MacroArg(n) => self.write_str(&format!("#{}", n)),
            InsetMath::Unknown(name) => self.command(name),
            InsetMath::Comment(comment) => {
                self.write_str("%");
                self.write_str(comment);
                self.write_str("\n");
            }
            InsetMath::XArrow(arrow) => {
                self.command(arrow.kind.name());
                if !arrow.below().is_empty() {
                    self.write_str("[");
                    self.write_cell(arrow.below(), false);
                    self.write_str("]");
                }
                self.write_arg(arrow.above(), false);
            }
            InsetMath::XYArrow(arrow) => {
                self.command("ar");
                if !arrow.dir.is_empty() {
                    self.write_str(&format!("[{}]", arrow.dir));
                }
                if let Some(pos) = arrow.label_pos {
                    self.write_str(&pos.as_char().to_string());
                    self.write_arg(arrow.label(), false);
                }
            }
        }
    }

    fn write_text(&mut self, s: &str) {
        let mut escaped = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '\\' => escaped.push_str("\\textbackslash{}"),
                '~' => escaped.push_str("\\textasciitilde{}"),
                '^' => escaped.push_str("\\textasciicircum{}"),
                '{' | '}' | '%' | '&' | '#' | '$' | '_' => {
                    escaped.push('\\');
                    escaped.push(c);
                }
                _ => escaped.push(c),
            }
        }
        self.write_str(&escaped);
    }

    fn write_frac(&mut self, frac: &FracInset) {
        if frac.kind.is_infix() {
            self.write_str("{");
            self.write_cell(frac.num(), false);
            self.command(frac.kind.name());
            self.write_cell(frac.den(), false);
            self.write_str("}");
        } else {
            self.command(frac.kind.name());
            self.write_arg(frac.num(), false);
            self.write_arg(frac.den(), false);
        }
    }

    fn write_box(&mut self, boxed: &BoxInset) {
        self.command(boxed.kind.name());
        if let Some((width, pos)) = boxed.kind.optional_args() {
            if !width.is_empty() || !pos.is_empty() {
                self.write_str(&format!("[{}]", width));
            }
            if !pos.is_empty() {
                self.write_str(&format!("[{}]", pos));
            }
        }
        self.write_arg(boxed.cell(), boxed.kind.is_text_mode());
    }

    fn write_scripts(&mut self, scripts: &ScriptInset) {
        let nucleus = scripts.nucleus();
        let bare = match nucleus.atoms() {
            // a bare number would run into digits written before it
            [only] if matches!(only.nucleus(), InsetMath::Number(_)) => !self.ends_in_number(),
            [only] => !matches!(
                only.nucleus(),
                InsetMath::Scripts(_) | InsetMath::Brace(_)
            ),
            _ => false,
        };
        if bare {
            self.write_cell(nucleus, false);
        } else {
            self.write_arg(nucleus, false);
        }
        match scripts.limits {
            Some(true) => self.command("limits"),
            Some(false) => self.command("nolimits"),
            None => {}
        }
        if let Some(sub) = scripts.sub() {
            self.write_str("_");
            self.write_arg(sub, false);
        }
        if let Some(sup) = scripts.sup() {
            self.write_str("^");
            self.write_arg(sup, false);
        }
    }

    fn write_grid(&mut self, grid: &GridInset) {
        let text = grid.kind.is_text_mode();
        match grid.kind.env_name() {
            Some(env) => {
                self.command("begin");
                self.write_str(&format!("{{{}}}", env));
                if grid.kind.has_col_spec() {
                    if grid.v_align != VAlign::Center {
                        self.write_str(&format!("[{}]", grid.v_align.as_char()));
                    }
                    self.write_str(&format!("{{{}}}", grid.col_spec()));
                }
            }
            None => {
                self.command(grid.kind.name());
                self.write_str("{");
            }
        }

        for row in 0..grid.nrows() {
            if row > 0 {
                self.write_str("\\\\\n");
            }
            self.write_hlines(grid, row);
            let mut first = true;
            for col in 0..grid.ncols() {
                let span = grid.cell_span(row, col).cloned().unwrap_or_default();
                if span == CellSpan::Part {
                    continue;
                }
                if !first {
                    self.write_str("&");
                }
                first = false;
                let Some(cell) = grid.cell(row, col) else {
                    continue;
                };
                match span {
                    CellSpan::Begin { span, spec } => {
                        self.command("multicolumn");
                        self.write_str(&format!("{{{}}}{{{}}}", span, spec));
                        self.write_arg(cell, text);
                    }
                    _ => self.write_cell(cell, text),
                }
            }
        }

        let bottom = grid.row_info(grid.nrows()).map_or(0, |info| info.lines);
        // a lone empty cell after the last `\\` would be read as a trailing separator
        let empty_tail = grid.nrows() > 1 && grid.ncols() == 1 && grid.last_row_is_empty();
        if bottom > 0 || empty_tail {
            self.write_str("\\\\\n");
            self.write_hlines(grid, grid.nrows());
        }

        match grid.kind.env_name() {
            Some(env) => {
                self.command("end");
                self.write_str(&format!("{{{}}}", env));
            }
            None => self.write_str("}"),
        }
    }

    fn write_hlines(&mut self, grid: &GridInset, row: usize) {
        let lines = grid.row_info(row).map_or(0, |info| info.lines);
        for _ in 0..lines {
            self.command("hline");
        }
    }
}

/// Atoms that may stand in LaTeX text mode without `\ensuremath`
fn is_text_capable(inset: &InsetMath) -> bool {
    match inset {
        InsetMath::Text(_)
        | InsetMath::Space(_)
        | InsetMath::Comment(_)
        | InsetMath::MacroArg(_)
        | InsetMath::Unknown(_)
        | InsetMath::Brace(_)
        | InsetMath::Color(_) => true,
        InsetMath::Font(font) => font.command.is_text_mode(),
        InsetMath::Box(boxed) => boxed.kind.is_text_mode(),
        _ => false,
    }
}

fn ends_with_control_word(s: &str) -> bool {
    let stem = s.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    stem.len() < s.len() && stem.ends_with('\\')
}

/// LaTeX for a math cell
pub fn latex(data: &MathData) -> String {
    let mut ws = WriteStream::new();
    ws.write_data(data);
    ws.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inset::{ColorInset, FracKind, GridKind, MatrixDelim, SymbolInset};
    use crate::parser::parse_latex;

    fn roundtrip(src: &str) -> String {
        let data = parse_latex(src).unwrap();
        let written = latex(&data);
        let reparsed = parse_latex(&written).unwrap();
        assert_eq!(reparsed, data, "tree changed after writing {:?}", written);
        written
    }

    #[test]
    fn test_frac_sqrt_root() {
        assert_eq!(roundtrip("\\frac{1}{2}"), "\\frac{1}{2}");
        assert_eq!(roundtrip("\\sqrt[3]{x}"), "\\sqrt[3]{x}");
        assert_eq!(roundtrip("\\sqrt x"), "\\sqrt{x}");
        assert_eq!(roundtrip("a \\over b"), "{a\\over b}");
    }

    #[test]
    fn test_color_forms() {
        let x = MathData::from_iter([InsetMath::Char('x')]);
        let old = MathData::from_iter([InsetMath::Color(ColorInset::new("red", true, x.clone()))]);
        assert_eq!(latex(&old), "{\\color{red}x}");
        let new = MathData::from_iter([InsetMath::Color(ColorInset::new("red", false, x))]);
        assert_eq!(latex(&new), "\\textcolor{red}{x}");
        roundtrip("{\\color{red}x}");
        roundtrip("\\textcolor{red}{x}");
    }

    #[test]
    fn test_control_words_are_separated() {
        let data = MathData::from_iter([
            InsetMath::Symbol(SymbolInset::new("alpha").unwrap()),
            InsetMath::Char('x'),
            InsetMath::Symbol(SymbolInset::new("beta").unwrap()),
            InsetMath::Number("2".into()),
        ]);
        assert_eq!(latex(&data), "\\alpha x\\beta2");
    }

    #[test]
    fn test_scripts() {
        assert_eq!(roundtrip("x_i^2"), "x_{i}^{2}");
        assert_eq!(roundtrip("{ab}^2"), "{ab}^{2}");
        assert_eq!(roundtrip("^2"), "{}^{2}");
        assert_eq!(roundtrip("{x^2}^3"), "{x^{2}}^{3}");
        assert_eq!(roundtrip("\\sum\\limits_{i=1}^n"), "\\sum\\limits_{i=1}^{n}");
        roundtrip("{{x}}^2");
    }

    #[test]
    fn test_numbers_stay_apart() {
        assert_eq!(roundtrip("12 34"), "1234");
        assert_eq!(roundtrip("1.5\\,2"), "1.5\\,2");
        assert_eq!(roundtrip("2{3}^2"), "2{3}^{2}");
        assert_eq!(roundtrip("1.{5}^2"), "1.{5}^{2}");
        assert_eq!(roundtrip("x 3^2"), "x3^{2}");
    }

    #[test]
    fn test_grids() {
        assert_eq!(
            roundtrip("\\begin{cases}a&b\\\\c&d\\end{cases}"),
            "\\begin{cases}a&b\\\\\nc&d\\end{cases}"
        );
        roundtrip("\\begin{array}[t]{|l|c|}\\hline \\multicolumn{2}{|c|}{x}\\\\ a&b\\\\ \\hline\\end{array}");
        roundtrip("\\begin{tabular}{lr}one & two\\\\ $x$ & \\textbf{y}\\end{tabular}");
        roundtrip("\\begin{matrix}a\\\\ \\\\ \\end{matrix}");
        roundtrip("\\sum_{\\substack{i<n\\\\j<m}}");
        roundtrip("\\xymatrix{A \\ar[r]^{f} & B \\ar[d] \\\\ & C}");
    }

    #[test]
    fn test_empty_last_row_survives() {
        let mut grid = GridInset::new(GridKind::Matrix(MatrixDelim::Paren), 2, 1);
        if let Some(cell) = grid.cell_mut(0, 0) {
            cell.push(InsetMath::Char('a'));
        }
        let data = MathData::from_iter([InsetMath::Grid(grid)]);
        let written = latex(&data);
        assert_eq!(written, "\\begin{pmatrix}a\\\\\n\\\\\n\\end{pmatrix}");
        assert_eq!(parse_latex(&written).unwrap(), data);
    }

    #[test]
    fn test_text_mode_switching() {
        assert_eq!(
            roundtrip("\\text{if $x>0$, 100\\% \\{sure\\}}"),
            "\\text{if \\ensuremath{x>0}, 100\\% \\{sure\\}}"
        );
        roundtrip("\\mbox{a~b\\,c\\quad d}");
        roundtrip("\\text{x\\textbackslash{}y\\textasciicircum{}}");
        roundtrip("\\text{{\\color{blue}w}}");
    }

    #[test]
    fn test_misc_nodes() {
        roundtrip("\\left\\langle x\\right.");
        roundtrip("\\mathbf{v}+\\bm{w}");
        roundtrip("\\cancel{a}\\cancelto{0}{b}");
        roundtrip("\\makebox[2cm][l]{hi}\\framebox{x}\\boxed{y}");
        roundtrip("\\xrightarrow[u]{f}\\xleftarrow{g}");
        roundtrip("\\overline{ab}\\hat x");
        roundtrip("\\foo #1 % note\n y");
        roundtrip("\\,\\:\\;\\!\\quad\\qquad~\\hspace{1em}");
        roundtrip("\\binom{n}{k}\\dfrac{1}{x}{a\\choose b}");
        roundtrip("\\{x\\}\\_\\#");
    }

    #[test]
    fn test_fragile_protects() {
        let data = parse_latex("\\sqrt{\\text{a}}").unwrap();
        let mut ws = WriteStream::fragile();
        ws.write_data(&data);
        assert_eq!(ws.finish(), "\\protect\\sqrt{\\protect\\text{a}}");
    }

    #[test]
    fn test_line_counter() {
        let data = parse_latex("\\begin{matrix}a\\\\b\\\\c\\end{matrix}%x\n").unwrap();
        let mut ws = WriteStream::new();
        ws.write_data(&data);
        assert_eq!(ws.line(), 3);
    }

    #[test]
    fn test_infix_kinds() {
        let frac = FracInset::with_kind(
            FracKind::Atop,
            MathData::from_iter([InsetMath::Char('a')]),
            MathData::from_iter([InsetMath::Char('b')]),
        );
        assert_eq!(latex(&MathData::from_iter([InsetMath::Frac(frac)])), "{a\\atop b}");
    }
}

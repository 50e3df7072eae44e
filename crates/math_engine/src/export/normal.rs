//! Bracketed debug form
//!
//! `\frac{1}{2}` prints as `[frac [number 1] [number 2]]`. A cell holding a
//! single atom prints as that atom, longer cells as `[a b ...]`.

use crate::data::MathData;
use crate::inset::{CellSpan, GridInset, InsetMath};

#[derive(Debug, Default)]
pub struct NormalStream {
    out: String,
}

impl NormalStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn write_data(&mut self, data: &MathData) {
        self.write_cell(data);
    }

    fn write_cell(&mut self, data: &MathData) {
        match data.atoms() {
            [only] => self.write_inset(only.nucleus()),
            atoms => {
                self.out.push('[');
                for (i, atom) in atoms.iter().enumerate() {
                    if i > 0 {
                        self.out.push(' ');
                    }
                    self.write_inset(atom.nucleus());
                }
                self.out.push(']');
            }
        }
    }

    fn open(&mut self, head: &str) {
        self.out.push('[');
        self.out.push_str(head);
    }

    fn arg(&mut self, data: &MathData) {
        self.out.push(' ');
        self.write_cell(data);
    }

    fn word(&mut self, word: &str) {
        self.out.push(' ');
        self.out.push_str(word);
    }

    fn close(&mut self) {
        self.out.push(']');
    }

    pub fn write_inset(&mut self, inset: &InsetMath) {
        match inset {
            InsetMath::Char(c) => {
                self.open("char");
                self.word(&c.to_string());
            }
            InsetMath::Number(digits) => {
                self.open("number");
                self.word(digits);
            }
            InsetMath::Text(text) => {
                self.open("text");
                self.word(&format!("{:?}", text));
            }
            InsetMath::Symbol(symbol) => {
                self.open("symbol");
                self.word(symbol.name());
            }
            InsetMath::Decoration(deco) => {
                self.open(deco.name());
                self.arg(deco.cell());
            }
            InsetMath::Color(color) => {
                self.open("color");
                self.word(&color.color);
                self.arg(color.cell());
            }
            InsetMath::Grid(grid) => self.write_grid(grid),
            InsetMath::Scripts(scripts) => {
                let head = match (scripts.sub(), scripts.sup()) {
                    (Some(_), Some(_)) => "subsup",
                    (Some(_), None) => "sub",
                    (None, Some(_)) => "sup",
                    (None, None) => "scripts",
                };
                self.open(head);
                self.arg(scripts.nucleus());
                if let Some(sub) = scripts.sub() {
                    self.arg(sub);
                }
                if let Some(sup) = scripts.sup() {
                    self.arg(sup);
                }
                match scripts.limits {
                    Some(true) => self.word("limits"),
                    Some(false) => self.word("nolimits"),
                    None => {}
                }
            }
            InsetMath::Delim(delim) => {
                self.open("delim");
                self.word(&delim.left);
                self.word(&delim.right);
                self.arg(delim.cell());
            }
            InsetMath::Space(space) => {
                self.open("space");
                self.word(&space.latex());
            }
            InsetMath::MacroArg(n) => {
                self.open("macroarg");
                self.word(&n.to_string());
            }
            InsetMath::Unknown(name) => {
                self.open("unknown");
                self.word(name);
            }
            InsetMath::Comment(text) => {
                self.open("comment");
                self.word(&format!("{:?}", text));
            }
            InsetMath::XYArrow(arrow) => {
                self.open("xyarrow");
                self.word(&arrow.dir);
                if arrow.label_pos.is_some() {
                    self.arg(arrow.label());
                }
            }
            other => {
                self.open(other.kind_name());
                for cell in other.cells() {
                    self.arg(cell);
                }
            }
        }
        self.close();
    }

    fn write_grid(&mut self, grid: &GridInset) {
        self.open(grid.kind.name());
        for row in 0..grid.nrows() {
            self.out.push_str(" [row");
            for col in 0..grid.ncols() {
                if grid.cell_span(row, col) == Some(&CellSpan::Part) {
                    continue;
                }
                if let Some(cell) = grid.cell(row, col) {
                    self.arg(cell);
                }
            }
            self.out.push(']');
        }
    }
}

/// Debug form of a cell
pub fn normalize(data: &MathData) -> String {
    let mut ns = NormalStream::new();
    ns.write_data(data);
    ns.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_latex;

    fn normal(src: &str) -> String {
        normalize(&parse_latex(src).unwrap())
    }

    #[test]
    fn test_frac() {
        assert_eq!(normal("\\frac{1}{2}"), "[frac [number 1] [number 2]]");
    }

    #[test]
    fn test_sequences_and_scripts() {
        assert_eq!(
            normal("x^2+y"),
            "[[sup [char x] [number 2]] [symbol +] [char y]]"
        );
        assert_eq!(
            normal("\\sum\\limits_{i}^{n}"),
            "[subsup [symbol sum] [char i] [char n] limits]"
        );
        assert_eq!(normal(""), "[]");
    }

    #[test]
    fn test_grid_and_attributes() {
        assert_eq!(
            normal("\\begin{pmatrix}a&b\\\\c&d\\end{pmatrix}"),
            "[pmatrix [row [char a] [char b]] [row [char c] [char d]]]"
        );
        assert_eq!(
            normal("\\left(x\\right]"),
            "[delim ( ] [char x]]"
        );
        assert_eq!(
            normal("\\textcolor{red}{\\sqrt{x}}"),
            "[color red [sqrt [char x]]]"
        );
        assert_eq!(normal("\\hat{x}"), "[hat [char x]]");
        assert_eq!(normal("\\foo"), "[unknown foo]");
        assert_eq!(normal("\\text{a b}"), "[text [text \"a b\"]]");
    }
}

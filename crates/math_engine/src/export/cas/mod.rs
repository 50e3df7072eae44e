//! Computer algebra output
//!
//! Writes a formula in the input syntax of Maple, Maxima, Mathematica or
//! Octave. Structure that typesetting leaves implicit is recovered by
//! [`extract`] first. Nodes with no algebraic meaning degrade to their
//! content (or nothing) and log a warning; the export itself never fails.

pub mod extract;

use serde::{Deserialize, Serialize};

use crate::data::MathData;
use crate::inset::{GridInset, InsetMath};
use crate::symbols::SymbolClass;

pub use extract::{extract, BigOp, CasItem};

/// Target system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasTarget {
    Maple,
    Maxima,
    Mathematica,
    Octave,
}

impl CasTarget {
    pub fn name(&self) -> &'static str {
        match self {
            CasTarget::Maple => "maple",
            CasTarget::Maxima => "maxima",
            CasTarget::Mathematica => "mathematica",
            CasTarget::Octave => "octave",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "maple" => Some(CasTarget::Maple),
            "maxima" => Some(CasTarget::Maxima),
            "mathematica" => Some(CasTarget::Mathematica),
            "octave" => Some(CasTarget::Octave),
            _ => None,
        }
    }

    /// Mathematica uses `f[x]` where the others use `f(x)`
    fn call_brackets(&self) -> (char, char) {
        match self {
            CasTarget::Mathematica => ('[', ']'),
            _ => ('(', ')'),
        }
    }
}

/// Output stream for one target
#[derive(Debug)]
pub struct CasStream {
    target: CasTarget,
    out: String,
}

impl CasStream {
    pub fn new(target: CasTarget) -> Self {
        Self {
            target,
            out: String::new(),
        }
    }

    pub fn target(&self) -> CasTarget {
        self.target
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn write_data(&mut self, data: &MathData) {
        let items = extract(data);
        self.write_items(&items);
    }

    fn write_items(&mut self, items: &[CasItem<'_>]) {
        for item in items {
            self.write_item(item);
        }
    }

    /// `(cell)`, so the operand binds as a unit
    fn write_paren_data(&mut self, data: &MathData) {
        self.out.push('(');
        self.write_data(data);
        self.out.push(')');
    }

    /// `name(args, ...)` or `Name[args, ...]`
    fn call(&mut self, name: &str, args: &[&[CasItem<'_>]]) {
        let (open, close) = self.target.call_brackets();
        self.out.push_str(name);
        self.out.push(open);
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.write_items(arg);
        }
        self.out.push(close);
    }

    fn call_data(&mut self, name: &str, args: &[&MathData]) {
        let extracted: Vec<Vec<CasItem<'_>>> = args.iter().map(|data| extract(data)).collect();
        let refs: Vec<&[CasItem<'_>]> = extracted.iter().map(Vec::as_slice).collect();
        self.call(name, &refs);
    }

    fn write_item(&mut self, item: &CasItem<'_>) {
        match item {
            CasItem::Node(node) => self.write_node(node),
            CasItem::Times => self.out.push('*'),
            CasItem::Diff { expr, var } => {
                let name = match self.target {
                    CasTarget::Mathematica => "D",
                    _ => "diff",
                };
                self.call(name, &[expr.as_slice(), var.as_slice()]);
            }
            CasItem::ExInt {
                op,
                var,
                lower,
                upper,
                body,
            } => self.write_big_op(*op, var, lower.as_deref(), upper.as_deref(), body),
            CasItem::Lim { var, target, body } => match self.target {
                CasTarget::Maple => {
                    self.out.push_str("limit(");
                    self.write_items(body);
                    self.out.push_str(", ");
                    self.write_items(var);
                    self.out.push('=');
                    self.write_items(target);
                    self.out.push(')');
                }
                CasTarget::Mathematica => {
                    self.out.push_str("Limit[");
                    self.write_items(body);
                    self.out.push_str(", ");
                    self.write_items(var);
                    self.out.push_str(" -> ");
                    self.write_items(target);
                    self.out.push(']');
                }
                CasTarget::Maxima | CasTarget::Octave => {
                    self.call("limit", &[body.as_slice(), var.as_slice(), target.as_slice()])
                }
            },
            CasItem::Apply { func, arg } => {
                let name = self.function_name(func);
                self.call(&name, &[arg.as_slice()]);
            }
            CasItem::Abs(arg) => {
                let name = match self.target {
                    CasTarget::Mathematica => "Abs",
                    _ => "abs",
                };
                self.call(name, &[arg.as_slice()]);
            }
        }
    }

    fn write_big_op(
        &mut self,
        op: BigOp,
        var: &[CasItem<'_>],
        lower: Option<&[CasItem<'_>]>,
        upper: Option<&[CasItem<'_>]>,
        body: &[CasItem<'_>],
    ) {
        let name = match (self.target, op) {
            (CasTarget::Maple, BigOp::Int) | (CasTarget::Octave, BigOp::Int) => "int",
            (CasTarget::Maxima, BigOp::Int) => "integrate",
            (CasTarget::Mathematica, BigOp::Int) => "Integrate",
            (CasTarget::Mathematica, BigOp::Sum) => "Sum",
            (CasTarget::Mathematica, BigOp::Prod) => "Product",
            (CasTarget::Octave, BigOp::Sum) => "symsum",
            (CasTarget::Octave, BigOp::Prod) => "symprod",
            (_, BigOp::Sum) => "sum",
            (_, BigOp::Prod) => "product",
        };
        let (open, close) = self.target.call_brackets();
        self.out.push_str(name);
        self.out.push(open);
        self.write_items(body);
        self.out.push_str(", ");
        match (self.target, lower, upper) {
            (CasTarget::Maple, Some(lower), Some(upper)) => {
                self.write_items(var);
                self.out.push('=');
                self.write_items(lower);
                self.out.push_str("..");
                self.write_items(upper);
            }
            (CasTarget::Mathematica, Some(lower), Some(upper)) => {
                self.out.push('{');
                self.write_items(var);
                self.out.push_str(", ");
                self.write_items(lower);
                self.out.push_str(", ");
                self.write_items(upper);
                self.out.push('}');
            }
            (_, Some(lower), Some(upper)) => {
                self.write_items(var);
                self.out.push_str(", ");
                self.write_items(lower);
                self.out.push_str(", ");
                self.write_items(upper);
            }
            (_, lower, upper) => {
                if lower.is_some() || upper.is_some() {
                    tracing::warn!(
                        system = self.target.name(),
                        "{} with a single bound exported without bounds",
                        name
                    );
                }
                self.write_items(var);
            }
        }
        self.out.push(close);
    }

    fn function_name(&self, func: &str) -> String {
        match (self.target, func) {
            (CasTarget::Maxima | CasTarget::Octave, "ln") => "log".to_string(),
            (CasTarget::Mathematica, "ln" | "log") => "Log".to_string(),
            (CasTarget::Mathematica, name) => capitalize(name),
            (_, name) => name.to_string(),
        }
    }

    fn write_node(&mut self, node: &InsetMath) {
        match node {
            InsetMath::Char(c) => self.out.push(*c),
            InsetMath::Number(digits) => self.out.push_str(digits),
            InsetMath::Symbol(symbol) => {
                let class = symbol.info().map(|info| info.class);
                self.write_symbol(symbol.name(), class);
            }
            InsetMath::Frac(frac) if frac.kind.is_binomial() => {
                let name = match self.target {
                    CasTarget::Mathematica => "Binomial",
                    CasTarget::Octave => "nchoosek",
                    _ => "binomial",
                };
                self.call_data(name, &[frac.num(), frac.den()]);
            }
            InsetMath::Frac(frac) if !frac.kind.has_rule() => {
                tracing::warn!(system = self.target.name(), "\\atop has no CAS meaning");
                self.write_paren_data(frac.num());
            }
            InsetMath::Frac(frac) => {
                self.write_paren_data(frac.num());
                self.out.push('/');
                self.write_paren_data(frac.den());
            }
            InsetMath::Sqrt(sqrt) => {
                let name = match self.target {
                    CasTarget::Mathematica => "Sqrt",
                    _ => "sqrt",
                };
                self.call_data(name, &[sqrt.cell()]);
            }
            InsetMath::Root(root) => {
                self.write_paren_data(root.radicand());
                self.out.push_str("^(1/");
                self.write_paren_data(root.index());
                self.out.push(')');
            }
            InsetMath::Scripts(scripts) => {
                let nucleus_is_atom = scripts.nucleus().len() == 1;
                let wrap_nucleus = |stream: &mut Self| {
                    if nucleus_is_atom {
                        stream.write_data(scripts.nucleus());
                    } else {
                        stream.write_paren_data(scripts.nucleus());
                    }
                };
                match (scripts.sub(), self.target) {
                    (Some(sub), CasTarget::Mathematica) => {
                        self.out.push_str("Subscript[");
                        wrap_nucleus(self);
                        self.out.push_str(", ");
                        self.write_data(sub);
                        self.out.push(']');
                    }
                    (Some(sub), CasTarget::Octave) => {
                        wrap_nucleus(self);
                        self.write_paren_data(sub);
                    }
                    (Some(sub), _) => {
                        wrap_nucleus(self);
                        self.out.push('[');
                        self.write_data(sub);
                        self.out.push(']');
                    }
                    (None, _) => wrap_nucleus(self),
                }
                if let Some(sup) = scripts.sup() {
                    self.out.push('^');
                    self.write_paren_data(sup);
                }
            }
            InsetMath::Delim(delim) => {
                self.write_paren_data(delim.cell());
            }
            InsetMath::Grid(grid) => self.write_matrix(grid),
            InsetMath::Brace(brace) => self.write_data(brace.cell()),
            InsetMath::Font(font) => self.write_data(font.cell()),
            InsetMath::BoldSymbol(bold) => self.write_data(bold.cell()),
            InsetMath::Color(color) => self.write_data(color.cell()),
            InsetMath::Box(boxed) => self.write_data(boxed.cell()),
            InsetMath::Decoration(deco) => {
                tracing::warn!(
                    system = self.target.name(),
                    decoration = deco.name(),
                    "decoration dropped in CAS output"
                );
                self.write_data(deco.cell());
            }
            InsetMath::Cancel(cancel) => {
                tracing::warn!(system = self.target.name(), "cancel dropped in CAS output");
                self.write_data(cancel.cell());
            }
            InsetMath::CancelTo(cancel) => {
                tracing::warn!(system = self.target.name(), "cancelto dropped in CAS output");
                self.write_data(cancel.expr());
            }
            InsetMath::Text(text) => {
                tracing::warn!(system = self.target.name(), "text exported verbatim");
                self.out.push_str(text);
            }
            InsetMath::Unknown(name) => {
                tracing::warn!(system = self.target.name(), command = %name, "unknown command exported verbatim");
                self.out.push_str(name);
            }
            InsetMath::MacroArg(n) => {
                self.out.push('#');
                self.out.push_str(&n.to_string());
            }
            InsetMath::Space(_) | InsetMath::Comment(_) => {}
            InsetMath::XArrow(_) | InsetMath::XYArrow(_) => {
                tracing::warn!(
                    system = self.target.name(),
                    node = node.kind_name(),
                    "arrow has no CAS equivalent"
                );
            }
        }
    }

    fn write_symbol(&mut self, name: &str, class: Option<SymbolClass>) {
        let target = self.target;
        let text = match (name, target) {
            ("=", CasTarget::Mathematica) => "==",
            ("=" | "+" | "-" | "*" | "<" | ">", _) => name,
            ("cdot" | "times" | "ast", _) => "*",
            ("div", _) => "/",
            ("leq" | "le", _) => "<=",
            ("geq" | "ge", _) => ">=",
            ("neq" | "ne", CasTarget::Maple) => "<>",
            ("neq" | "ne", CasTarget::Maxima) => "#",
            ("neq" | "ne", CasTarget::Mathematica) => "!=",
            ("neq" | "ne", CasTarget::Octave) => "~=",
            ("pi", CasTarget::Maple | CasTarget::Mathematica) => "Pi",
            ("pi", CasTarget::Maxima) => "%pi",
            ("pi", CasTarget::Octave) => "pi",
            ("infty", CasTarget::Maple) => "infinity",
            ("infty", CasTarget::Maxima) => "inf",
            ("infty", CasTarget::Mathematica) => "Infinity",
            ("infty", CasTarget::Octave) => "Inf",
            (name, CasTarget::Mathematica) if class == Some(SymbolClass::Greek) => {
                self.out.push_str("\\[");
                self.out.push_str(&capitalize(name));
                self.out.push(']');
                return;
            }
            (name, _) if class == Some(SymbolClass::Greek) => name,
            (name, _) => {
                if matches!(class, Some(SymbolClass::Func { .. })) {
                    let name = self.function_name(name);
                    self.out.push_str(&name);
                    return;
                }
                tracing::warn!(system = target.name(), symbol = name, "symbol exported by name");
                name
            }
        };
        self.out.push_str(text);
    }

    fn write_matrix(&mut self, grid: &GridInset) {
        let rows: Vec<Vec<&MathData>> = (0..grid.nrows())
            .map(|row| (0..grid.ncols()).filter_map(|col| grid.cell(row, col)).collect())
            .collect();
        let (open, row_open, row_sep, row_close, close) = match self.target {
            CasTarget::Maple => ("matrix([", "[", ", ", "]", "])"),
            CasTarget::Maxima => ("matrix(", "[", ", ", "]", ")"),
            CasTarget::Mathematica => ("{", "{", ", ", "}", "}"),
            CasTarget::Octave => ("[", "", "; ", "", "]"),
        };
        self.out.push_str(open);
        for (r, row) in rows.iter().enumerate() {
            if r > 0 {
                self.out.push_str(row_sep);
            }
            self.out.push_str(row_open);
            for (c, cell) in row.iter().enumerate() {
                if c > 0 {
                    self.out.push_str(", ");
                }
                self.write_data(cell);
            }
            self.out.push_str(row_close);
        }
        self.out.push_str(close);
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Write a cell in the syntax of `target`
pub fn export(data: &MathData, target: CasTarget) -> String {
    let mut stream = CasStream::new(target);
    stream.write_data(data);
    let out = stream.finish();
    tracing::debug!(system = target.name(), output = %out, "cas export");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_latex;

    fn cas(src: &str, target: CasTarget) -> String {
        export(&parse_latex(src).unwrap(), target)
    }

    #[test]
    fn test_fractions_and_products() {
        assert_eq!(cas("\\frac{1}{2}x", CasTarget::Maple), "(1)/(2)*x");
        assert_eq!(cas("2ab", CasTarget::Octave), "2*a*b");
        assert_eq!(cas("\\sqrt{x}", CasTarget::Mathematica), "Sqrt[x]");
        assert_eq!(cas("\\binom{n}{k}", CasTarget::Maxima), "binomial(n, k)");
    }

    #[test]
    fn test_scripts() {
        assert_eq!(cas("x^2", CasTarget::Maple), "x^(2)");
        assert_eq!(cas("x_i", CasTarget::Maxima), "x[i]");
        assert_eq!(cas("x_i", CasTarget::Mathematica), "Subscript[x, i]");
        assert_eq!(cas("x_i^2", CasTarget::Octave), "x(i)^(2)");
    }

    #[test]
    fn test_derivative() {
        assert_eq!(cas("\\frac{d}{dx} x^2", CasTarget::Maple), "diff(x^(2), x)");
        assert_eq!(
            cas("\\frac{\\partial f}{\\partial y}", CasTarget::Mathematica),
            "D[f, y]"
        );
    }

    #[test]
    fn test_integrals() {
        let src = "\\int_0^1 x\\,dx";
        assert_eq!(cas(src, CasTarget::Maple), "int(x, x=0..1)");
        assert_eq!(cas(src, CasTarget::Maxima), "integrate(x, x, 0, 1)");
        assert_eq!(cas(src, CasTarget::Mathematica), "Integrate[x, {x, 0, 1}]");
        assert_eq!(cas(src, CasTarget::Octave), "int(x, x, 0, 1)");
        assert_eq!(cas("\\int x\\,dx", CasTarget::Maxima), "integrate(x, x)");
    }

    #[test]
    fn test_sums_and_limits() {
        let sum = "\\sum_{i=1}^{n} i";
        assert_eq!(cas(sum, CasTarget::Maple), "sum(i, i=1..n)");
        assert_eq!(cas(sum, CasTarget::Mathematica), "Sum[i, {i, 1, n}]");
        assert_eq!(cas(sum, CasTarget::Octave), "symsum(i, i, 1, n)");

        let lim = "\\lim_{x\\to 0} \\sin x";
        assert_eq!(cas(lim, CasTarget::Maple), "limit(sin(x), x=0)");
        assert_eq!(cas(lim, CasTarget::Maxima), "limit(sin(x), x, 0)");
        assert_eq!(cas(lim, CasTarget::Mathematica), "Limit[Sin[x], x -> 0]");
    }

    #[test]
    fn test_constants_and_relations() {
        assert_eq!(cas("\\pi", CasTarget::Maxima), "%pi");
        assert_eq!(cas("\\infty", CasTarget::Mathematica), "Infinity");
        assert_eq!(cas("\\alpha", CasTarget::Mathematica), "\\[Alpha]");
        assert_eq!(cas("\\alpha", CasTarget::Maple), "alpha");
        assert_eq!(cas("a=b", CasTarget::Mathematica), "a==b");
        assert_eq!(cas("a\\neq b", CasTarget::Maxima), "a#b");
        assert_eq!(cas("a\\neq b", CasTarget::Octave), "a~=b");
        assert_eq!(cas("\\ln(x)", CasTarget::Octave), "log(x)");
        assert_eq!(cas("|x|", CasTarget::Mathematica), "Abs[x]");
    }

    #[test]
    fn test_matrices() {
        let m = "\\begin{pmatrix}a&b\\\\c&d\\end{pmatrix}";
        assert_eq!(cas(m, CasTarget::Maple), "matrix([[a, b], [c, d]])");
        assert_eq!(cas(m, CasTarget::Maxima), "matrix([a, b], [c, d])");
        assert_eq!(cas(m, CasTarget::Mathematica), "{{a, b}, {c, d}}");
        assert_eq!(cas(m, CasTarget::Octave), "[a, b; c, d]");
    }

    #[test]
    fn test_degrades_without_failing() {
        assert_eq!(cas("\\hat{x}+\\text{ok}", CasTarget::Maple), "x+ok");
        assert_eq!(cas("a \\xrightarrow{f} b", CasTarget::Maple), "ab");
    }

    #[test]
    fn test_target_names() {
        for target in [
            CasTarget::Maple,
            CasTarget::Maxima,
            CasTarget::Mathematica,
            CasTarget::Octave,
        ] {
            assert_eq!(CasTarget::from_name(target.name()), Some(target));
        }
        assert_eq!(CasTarget::from_name("reduce"), None);
    }
}

//! Structure extraction for CAS output
//!
//! Typeset math leaves derivatives, integrals, limits and function calls
//! implicit: `\frac{d}{dx} f` is just a fraction followed by `f`. Before a
//! cell is written in CAS syntax it is rewritten into [`CasItem`]s in which
//! those constructs are explicit. The items borrow the tree and exist only
//! for the duration of one export; they cannot be laid out or drawn.

use crate::data::MathData;
use crate::inset::InsetMath;
use crate::symbols::SymbolClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BigOp {
    Int,
    Sum,
    Prod,
}

/// One element of a cell after extraction
#[derive(Debug, Clone, PartialEq)]
pub enum CasItem<'a> {
    /// A node written as is
    Node(&'a InsetMath),
    /// Implicit multiplication made explicit
    Times,
    Diff {
        expr: Vec<CasItem<'a>>,
        var: Vec<CasItem<'a>>,
    },
    /// Integral, sum or product with its bound variable
    ExInt {
        op: BigOp,
        var: Vec<CasItem<'a>>,
        lower: Option<Vec<CasItem<'a>>>,
        upper: Option<Vec<CasItem<'a>>>,
        body: Vec<CasItem<'a>>,
    },
    Lim {
        var: Vec<CasItem<'a>>,
        target: Vec<CasItem<'a>>,
        body: Vec<CasItem<'a>>,
    },
    Apply {
        func: &'a str,
        arg: Vec<CasItem<'a>>,
    },
    Abs(Vec<CasItem<'a>>),
}

/// Extract the CAS structure of a cell
pub fn extract(data: &MathData) -> Vec<CasItem<'_>> {
    extract_atoms(&cell_atoms(data))
}

/// Atoms of a cell without spacing and comments
fn cell_atoms(data: &MathData) -> Vec<&InsetMath> {
    data.iter()
        .map(|atom| atom.nucleus())
        .filter(|node| !matches!(node, InsetMath::Space(_) | InsetMath::Comment(_)))
        .collect()
}

fn extract_atoms<'a>(atoms: &[&'a InsetMath]) -> Vec<CasItem<'a>> {
    let mut items = Vec::new();
    let mut i = 0;
    while i < atoms.len() {
        let (item, next) = diff_at(atoms, i)
            .or_else(|| big_op_at(atoms, i))
            .or_else(|| limit_at(atoms, i))
            .or_else(|| apply_at(atoms, i))
            .or_else(|| abs_at(atoms, i))
            .unwrap_or((CasItem::Node(atoms[i]), i + 1));
        push_operand(&mut items, item);
        i = next;
    }
    items
}

fn push_operand<'a>(items: &mut Vec<CasItem<'a>>, item: CasItem<'a>) {
    if items.last().is_some_and(ends_operand) && starts_operand(&item) {
        items.push(CasItem::Times);
    }
    items.push(item);
}

// =============================================================================
// Classification
// =============================================================================

fn symbol_name(node: &InsetMath) -> Option<&str> {
    match node {
        InsetMath::Symbol(symbol) => Some(symbol.name()),
        _ => None,
    }
}

fn is_relation(node: &InsetMath) -> bool {
    matches!(node, InsetMath::Symbol(s) if s.is_relation())
}

fn is_differential(node: &InsetMath) -> bool {
    matches!(node, InsetMath::Char('d')) || symbol_name(node) == Some("partial")
}

fn is_bar(delim: &str) -> bool {
    matches!(delim, "|" | "\\vert" | "\\lvert" | "\\rvert")
}

fn is_value_symbol(node: &InsetMath) -> bool {
    match node {
        InsetMath::Symbol(symbol) => symbol
            .info()
            .map_or(true, |info| matches!(info.class, SymbolClass::Greek | SymbolClass::Ord)),
        _ => false,
    }
}

fn ends_operand(item: &CasItem<'_>) -> bool {
    match item {
        CasItem::Times => false,
        CasItem::Node(InsetMath::Char(c)) => c.is_alphanumeric() || *c == ')' || *c == '\'',
        CasItem::Node(node @ InsetMath::Symbol(_)) => is_value_symbol(node),
        CasItem::Node(InsetMath::XArrow(_) | InsetMath::XYArrow(_)) => false,
        _ => true,
    }
}

fn starts_operand(item: &CasItem<'_>) -> bool {
    match item {
        CasItem::Times => false,
        CasItem::Node(InsetMath::Char(c)) => c.is_alphanumeric() || *c == '(',
        CasItem::Node(node @ InsetMath::Symbol(_)) => is_value_symbol(node),
        CasItem::Node(InsetMath::XArrow(_) | InsetMath::XYArrow(_)) => false,
        _ => true,
    }
}

/// The nucleus of a script node when it is a single atom
fn single(data: &MathData) -> Option<&InsetMath> {
    match data.atoms() {
        [only] => Some(only.nucleus()),
        _ => None,
    }
}

/// End of the operand starting at `start`: the next relation or the cell end
fn operand_end(atoms: &[&InsetMath], start: usize) -> usize {
    atoms[start..]
        .iter()
        .position(|node| is_relation(node))
        .map_or(atoms.len(), |p| start + p)
}

fn matching_paren(atoms: &[&InsetMath], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (j, node) in atoms.iter().enumerate().skip(open) {
        match node {
            InsetMath::Char('(') => depth += 1,
            InsetMath::Char(')') => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
    }
    None
}

// =============================================================================
// Patterns
// =============================================================================

/// `\frac{d}{dx} f`, `\frac{df}{dx}` and the `\partial` forms
fn diff_at<'a>(atoms: &[&'a InsetMath], i: usize) -> Option<(CasItem<'a>, usize)> {
    let InsetMath::Frac(frac) = atoms[i] else {
        return None;
    };
    if !frac.kind.has_rule() || frac.kind.is_infix() {
        return None;
    }
    let num = cell_atoms(frac.num());
    let den = cell_atoms(frac.den());
    let (num_d, expr) = num.split_first()?;
    let (den_d, var) = den.split_first()?;
    if !is_differential(num_d) || !is_differential(den_d) || var.is_empty() {
        return None;
    }
    if expr.is_empty() {
        let end = operand_end(atoms, i + 1);
        if end == i + 1 {
            return None;
        }
        let diff = CasItem::Diff {
            expr: extract_atoms(&atoms[i + 1..end]),
            var: extract_atoms(var),
        };
        Some((diff, end))
    } else {
        let diff = CasItem::Diff {
            expr: extract_atoms(expr),
            var: extract_atoms(var),
        };
        Some((diff, i + 1))
    }
}

/// `\int_a^b f\,dx`, `\sum_{i=a}^b f`, `\prod_{i=a}^b f`
fn big_op_at<'a>(atoms: &[&'a InsetMath], i: usize) -> Option<(CasItem<'a>, usize)> {
    let (nucleus, sub, sup) = match atoms[i] {
        InsetMath::Scripts(scripts) => (single(scripts.nucleus())?, scripts.sub(), scripts.sup()),
        other => (other, None, None),
    };
    let op = match symbol_name(nucleus)? {
        "int" => BigOp::Int,
        "sum" => BigOp::Sum,
        "prod" => BigOp::Prod,
        _ => return None,
    };
    let upper = sup.map(|cell| extract(cell));

    if op == BigOp::Int {
        // the body runs up to the differential `d x`
        let d = (i + 1..atoms.len().saturating_sub(1))
            .find(|&j| matches!(atoms[j], InsetMath::Char('d')))?;
        let item = CasItem::ExInt {
            op,
            var: extract_atoms(&atoms[d + 1..d + 2]),
            lower: sub.map(|cell| extract(cell)),
            upper,
            body: extract_atoms(&atoms[i + 1..d]),
        };
        return Some((item, d + 2));
    }

    let sub = cell_atoms(sub?);
    let (var, lower) = match sub.iter().position(|node| symbol_name(node) == Some("=")) {
        Some(k) => (extract_atoms(&sub[..k]), Some(extract_atoms(&sub[k + 1..]))),
        None => (extract_atoms(&sub), None),
    };
    if var.is_empty() {
        return None;
    }
    let end = operand_end(atoms, i + 1);
    let item = CasItem::ExInt {
        op,
        var,
        lower,
        upper,
        body: extract_atoms(&atoms[i + 1..end]),
    };
    Some((item, end))
}

/// `\lim_{x \to a} f`
fn limit_at<'a>(atoms: &[&'a InsetMath], i: usize) -> Option<(CasItem<'a>, usize)> {
    let InsetMath::Scripts(scripts) = atoms[i] else {
        return None;
    };
    if symbol_name(single(scripts.nucleus())?)? != "lim" {
        return None;
    }
    let sub = cell_atoms(scripts.sub()?);
    let k = sub
        .iter()
        .position(|node| matches!(symbol_name(node), Some("to" | "rightarrow")))?;
    let end = operand_end(atoms, i + 1);
    let item = CasItem::Lim {
        var: extract_atoms(&sub[..k]),
        target: extract_atoms(&sub[k + 1..]),
        body: extract_atoms(&atoms[i + 1..end]),
    };
    Some((item, end))
}

/// `\sin x`, `\ln(x)`, `\exp{x}`
fn apply_at<'a>(atoms: &[&'a InsetMath], i: usize) -> Option<(CasItem<'a>, usize)> {
    let InsetMath::Symbol(symbol) = atoms[i] else {
        return None;
    };
    if !symbol.info()?.is_function() || symbol.name() == "lim" {
        return None;
    }
    let func = symbol.name();
    let next = *atoms.get(i + 1)?;
    match next {
        InsetMath::Delim(delim) if delim.left == "(" => {
            let arg = extract(delim.cell());
            Some((CasItem::Apply { func, arg }, i + 2))
        }
        InsetMath::Brace(brace) => {
            let arg = extract(brace.cell());
            Some((CasItem::Apply { func, arg }, i + 2))
        }
        InsetMath::Char('(') => {
            let close = matching_paren(atoms, i + 1)?;
            let arg = extract_atoms(&atoms[i + 2..close]);
            Some((CasItem::Apply { func, arg }, close + 1))
        }
        InsetMath::Symbol(s) if s.is_relation() || s.is_binary() => None,
        _ => {
            let arg = extract_atoms(&atoms[i + 1..i + 2]);
            Some((CasItem::Apply { func, arg }, i + 2))
        }
    }
}

/// `|x|` and `\left| x \right|`
fn abs_at<'a>(atoms: &[&'a InsetMath], i: usize) -> Option<(CasItem<'a>, usize)> {
    match atoms[i] {
        InsetMath::Delim(delim) if is_bar(&delim.left) && is_bar(&delim.right) => {
            Some((CasItem::Abs(extract(delim.cell())), i + 1))
        }
        InsetMath::Char('|') => {
            let close = (i + 1..atoms.len()).find(|&j| matches!(atoms[j], InsetMath::Char('|')))?;
            Some((CasItem::Abs(extract_atoms(&atoms[i + 1..close])), close + 1))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_latex;

    fn kinds(items: &[CasItem<'_>]) -> Vec<&'static str> {
        items
            .iter()
            .map(|item| match item {
                CasItem::Node(node) => node.kind_name(),
                CasItem::Times => "times",
                CasItem::Diff { .. } => "diff",
                CasItem::ExInt { .. } => "exint",
                CasItem::Lim { .. } => "lim",
                CasItem::Apply { .. } => "apply",
                CasItem::Abs(_) => "abs",
            })
            .collect()
    }

    #[test]
    fn test_implicit_products() {
        let data = parse_latex("2x y+1").unwrap();
        let items = extract(&data);
        assert_eq!(
            kinds(&items),
            ["number", "times", "char", "times", "char", "symbol", "number"]
        );
    }

    #[test]
    fn test_derivative_forms() {
        let data = parse_latex("\\frac{d}{dx} x^2 = \\frac{\\partial f}{\\partial y}").unwrap();
        let items = extract(&data);
        assert_eq!(kinds(&items), ["diff", "symbol", "diff"]);
        match &items[0] {
            CasItem::Diff { expr, var } => {
                assert_eq!(kinds(expr), ["scripts"]);
                assert_eq!(var, &vec![CasItem::Node(&InsetMath::Char('x'))]);
            }
            other => panic!("not a derivative: {:?}", other),
        }
    }

    #[test]
    fn test_integral_needs_differential() {
        let data = parse_latex("\\int_0^1 x^2\\,dx").unwrap();
        let items = extract(&data);
        match items.as_slice() {
            [CasItem::ExInt {
                op: BigOp::Int,
                var,
                lower: Some(_),
                upper: Some(_),
                body,
            }] => {
                assert_eq!(var.len(), 1);
                assert_eq!(kinds(body), ["scripts"]);
            }
            other => panic!("not an integral: {:?}", other),
        }

        let data = parse_latex("\\int f").unwrap();
        assert_eq!(kinds(&extract(&data)), ["symbol", "char"]);
    }

    #[test]
    fn test_sum_splits_lower_bound() {
        let data = parse_latex("\\sum_{i=1}^{n} i^2").unwrap();
        match extract(&data).as_slice() {
            [CasItem::ExInt {
                op: BigOp::Sum,
                var,
                lower: Some(lower),
                ..
            }] => {
                assert_eq!(var, &vec![CasItem::Node(&InsetMath::Char('i'))]);
                assert_eq!(kinds(lower), ["number"]);
            }
            other => panic!("not a sum: {:?}", other),
        }
    }

    #[test]
    fn test_limit_and_functions() {
        let data = parse_latex("\\lim_{x\\to 0} \\sin x").unwrap();
        match extract(&data).as_slice() {
            [CasItem::Lim { var, target, body }] => {
                assert_eq!(var.len(), 1);
                assert_eq!(kinds(target), ["number"]);
                assert_eq!(kinds(body), ["apply"]);
            }
            other => panic!("not a limit: {:?}", other),
        }

        let data = parse_latex("\\ln(x+1)y").unwrap();
        let items = extract(&data);
        assert_eq!(kinds(&items), ["apply", "times", "char"]);
    }

    #[test]
    fn test_absolute_values() {
        let data = parse_latex("|x|+\\left|y\\right|").unwrap();
        assert_eq!(kinds(&extract(&data)), ["abs", "symbol", "abs"]);
    }
}

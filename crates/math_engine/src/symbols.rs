//! Symbol table
//!
//! Every named symbol the engine knows: its LaTeX spelling, the Unicode
//! character used for drawing and MathML, its spacing class and the package
//! that defines it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Spacing and export class of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolClass {
    /// Ordinary symbol
    Ord,
    /// Greek letter
    Greek,
    /// Relation, padded on both sides
    Rel,
    /// Binary operator, padded on both sides
    Bin,
    /// Large operator; `limits` puts scripts above and below in display style
    BigOp { limits: bool },
    /// Function name set upright
    Func { limits: bool },
}

/// One entry of the symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Command name without backslash, or the character itself
    pub name: &'static str,
    /// Text drawn and exported to MathML
    pub unicode: &'static str,
    pub class: SymbolClass,
    /// LaTeX package defining the command
    pub package: Option<&'static str>,
}

impl SymbolInfo {
    /// Whether the symbol is written as a control word
    pub fn is_command(&self) -> bool {
        self.name.chars().all(|c| c.is_ascii_alphabetic())
    }

    /// LaTeX spelling
    pub fn latex(&self) -> String {
        if self.is_command() {
            format!("\\{}", self.name)
        } else {
            self.name.to_string()
        }
    }

    pub fn is_relation(&self) -> bool {
        self.class == SymbolClass::Rel
    }

    pub fn is_binary(&self) -> bool {
        self.class == SymbolClass::Bin
    }

    /// Whether scripts go above and below in display style
    pub fn takes_limits(&self) -> bool {
        matches!(
            self.class,
            SymbolClass::BigOp { limits: true } | SymbolClass::Func { limits: true }
        )
    }

    pub fn is_big_op(&self) -> bool {
        matches!(self.class, SymbolClass::BigOp { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self.class, SymbolClass::Func { .. })
    }
}

const fn sym(
    name: &'static str,
    unicode: &'static str,
    class: SymbolClass,
    package: Option<&'static str>,
) -> SymbolInfo {
    SymbolInfo {
        name,
        unicode,
        class,
        package,
    }
}

const fn ord(name: &'static str, unicode: &'static str) -> SymbolInfo {
    sym(name, unicode, SymbolClass::Ord, None)
}

const fn greek(name: &'static str, unicode: &'static str) -> SymbolInfo {
    sym(name, unicode, SymbolClass::Greek, None)
}

const fn rel(name: &'static str, unicode: &'static str) -> SymbolInfo {
    sym(name, unicode, SymbolClass::Rel, None)
}

const fn bin(name: &'static str, unicode: &'static str) -> SymbolInfo {
    sym(name, unicode, SymbolClass::Bin, None)
}

const fn op(name: &'static str, unicode: &'static str, limits: bool) -> SymbolInfo {
    sym(name, unicode, SymbolClass::BigOp { limits }, None)
}

const fn func(name: &'static str, limits: bool) -> SymbolInfo {
    sym(name, name, SymbolClass::Func { limits }, None)
}

const AMSSYMB: Option<&str> = Some("amssymb");
const AMSMATH: Option<&str> = Some("amsmath");

const SYMBOLS: &[SymbolInfo] = &[
    // Operators written as characters
    bin("+", "+"),
    bin("-", "\u{2212}"),
    bin("*", "\u{2217}"),
    rel("=", "="),
    rel("<", "<"),
    rel(">", ">"),
    // Greek
    greek("alpha", "α"),
    greek("beta", "β"),
    greek("gamma", "γ"),
    greek("delta", "δ"),
    greek("epsilon", "ϵ"),
    greek("varepsilon", "ε"),
    greek("zeta", "ζ"),
    greek("eta", "η"),
    greek("theta", "θ"),
    greek("vartheta", "ϑ"),
    greek("iota", "ι"),
    greek("kappa", "κ"),
    greek("lambda", "λ"),
    greek("mu", "μ"),
    greek("nu", "ν"),
    greek("xi", "ξ"),
    greek("pi", "π"),
    greek("varpi", "ϖ"),
    greek("rho", "ρ"),
    greek("varrho", "ϱ"),
    greek("sigma", "σ"),
    greek("varsigma", "ς"),
    greek("tau", "τ"),
    greek("upsilon", "υ"),
    greek("phi", "ϕ"),
    greek("varphi", "φ"),
    greek("chi", "χ"),
    greek("psi", "ψ"),
    greek("omega", "ω"),
    greek("Gamma", "Γ"),
    greek("Delta", "Δ"),
    greek("Theta", "Θ"),
    greek("Lambda", "Λ"),
    greek("Xi", "Ξ"),
    greek("Pi", "Π"),
    greek("Sigma", "Σ"),
    greek("Upsilon", "Υ"),
    greek("Phi", "Φ"),
    greek("Psi", "Ψ"),
    greek("Omega", "Ω"),
    // Relations
    rel("leq", "≤"),
    rel("le", "≤"),
    rel("geq", "≥"),
    rel("ge", "≥"),
    rel("neq", "≠"),
    rel("ne", "≠"),
    rel("equiv", "≡"),
    rel("approx", "≈"),
    rel("sim", "∼"),
    rel("simeq", "≃"),
    rel("cong", "≅"),
    rel("propto", "∝"),
    rel("in", "∈"),
    rel("notin", "∉"),
    rel("ni", "∋"),
    rel("subset", "⊂"),
    rel("supset", "⊃"),
    rel("subseteq", "⊆"),
    rel("supseteq", "⊇"),
    rel("to", "→"),
    rel("rightarrow", "→"),
    rel("leftarrow", "←"),
    rel("gets", "←"),
    rel("leftrightarrow", "↔"),
    rel("Rightarrow", "⇒"),
    rel("Leftarrow", "⇐"),
    rel("Leftrightarrow", "⇔"),
    rel("mapsto", "↦"),
    rel("longrightarrow", "⟶"),
    rel("longleftarrow", "⟵"),
    rel("Longrightarrow", "⟹"),
    rel("implies", "⟹"),
    rel("iff", "⟺"),
    rel("ll", "≪"),
    rel("gg", "≫"),
    rel("perp", "⊥"),
    rel("parallel", "∥"),
    rel("mid", "∣"),
    rel("models", "⊨"),
    rel("vdash", "⊢"),
    rel("prec", "≺"),
    rel("succ", "≻"),
    sym("leqslant", "⩽", SymbolClass::Rel, AMSSYMB),
    sym("geqslant", "⩾", SymbolClass::Rel, AMSSYMB),
    sym("lesssim", "≲", SymbolClass::Rel, AMSSYMB),
    sym("gtrsim", "≳", SymbolClass::Rel, AMSSYMB),
    sym("subsetneq", "⊊", SymbolClass::Rel, AMSSYMB),
    sym("twoheadrightarrow", "↠", SymbolClass::Rel, AMSSYMB),
    // Binary operators
    bin("times", "×"),
    bin("div", "÷"),
    bin("pm", "±"),
    bin("mp", "∓"),
    bin("cdot", "⋅"),
    bin("ast", "∗"),
    bin("star", "⋆"),
    bin("circ", "∘"),
    bin("bullet", "∙"),
    bin("cap", "∩"),
    bin("cup", "∪"),
    bin("wedge", "∧"),
    bin("land", "∧"),
    bin("vee", "∨"),
    bin("lor", "∨"),
    bin("setminus", "∖"),
    bin("oplus", "⊕"),
    bin("ominus", "⊖"),
    bin("otimes", "⊗"),
    bin("odot", "⊙"),
    sym("ltimes", "⋉", SymbolClass::Bin, AMSSYMB),
    sym("rtimes", "⋊", SymbolClass::Bin, AMSSYMB),
    // Ordinary symbols
    ord("infty", "∞"),
    ord("partial", "∂"),
    ord("nabla", "∇"),
    ord("forall", "∀"),
    ord("exists", "∃"),
    ord("neg", "¬"),
    ord("lnot", "¬"),
    ord("emptyset", "∅"),
    ord("hbar", "ℏ"),
    ord("ell", "ℓ"),
    ord("Re", "ℜ"),
    ord("Im", "ℑ"),
    ord("aleph", "ℵ"),
    ord("wp", "℘"),
    ord("prime", "′"),
    ord("ldots", "…"),
    ord("dots", "…"),
    ord("cdots", "⋯"),
    ord("vdots", "⋮"),
    ord("ddots", "⋱"),
    ord("angle", "∠"),
    ord("triangle", "△"),
    ord("surd", "√"),
    ord("top", "⊤"),
    ord("bot", "⊥"),
    ord("imath", "ı"),
    ord("jmath", "ȷ"),
    ord("langle", "⟨"),
    ord("rangle", "⟩"),
    ord("lfloor", "⌊"),
    ord("rfloor", "⌋"),
    ord("lceil", "⌈"),
    ord("rceil", "⌉"),
    sym("varnothing", "∅", SymbolClass::Ord, AMSSYMB),
    sym("therefore", "∴", SymbolClass::Ord, AMSSYMB),
    sym("because", "∵", SymbolClass::Ord, AMSSYMB),
    sym("complement", "∁", SymbolClass::Ord, AMSSYMB),
    sym("nexists", "∄", SymbolClass::Ord, AMSSYMB),
    sym("square", "□", SymbolClass::Ord, AMSSYMB),
    sym("blacksquare", "■", SymbolClass::Ord, AMSSYMB),
    // Large operators
    op("sum", "∑", true),
    op("prod", "∏", true),
    op("coprod", "∐", true),
    op("bigcup", "⋃", true),
    op("bigcap", "⋂", true),
    op("bigvee", "⋁", true),
    op("bigwedge", "⋀", true),
    op("bigoplus", "⨁", true),
    op("bigotimes", "⨂", true),
    op("bigodot", "⨀", true),
    op("biguplus", "⨄", true),
    op("bigsqcup", "⨆", true),
    op("int", "∫", false),
    op("oint", "∮", false),
    sym("iint", "∬", SymbolClass::BigOp { limits: false }, AMSMATH),
    sym("iiint", "∭", SymbolClass::BigOp { limits: false }, AMSMATH),
    // Function names
    func("sin", false),
    func("cos", false),
    func("tan", false),
    func("cot", false),
    func("sec", false),
    func("csc", false),
    func("arcsin", false),
    func("arccos", false),
    func("arctan", false),
    func("sinh", false),
    func("cosh", false),
    func("tanh", false),
    func("coth", false),
    func("exp", false),
    func("ln", false),
    func("log", false),
    func("lg", false),
    func("arg", false),
    func("deg", false),
    func("dim", false),
    func("hom", false),
    func("ker", false),
    func("lim", true),
    func("liminf", true),
    func("limsup", true),
    func("max", true),
    func("min", true),
    func("sup", true),
    func("inf", true),
    func("det", true),
    func("gcd", true),
    func("Pr", true),
];

fn table() -> &'static HashMap<&'static str, &'static SymbolInfo> {
    static TABLE: OnceLock<HashMap<&'static str, &'static SymbolInfo>> = OnceLock::new();
    TABLE.get_or_init(|| SYMBOLS.iter().map(|s| (s.name, s)).collect())
}

/// Look up a symbol by command name or character
pub fn lookup(name: &str) -> Option<&'static SymbolInfo> {
    table().get(name).copied()
}

/// Whether `c` is one of the operator characters parsed as symbols
pub fn is_symbol_char(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '=' | '<' | '>')
}

/// All known symbols, in table order
pub fn all() -> &'static [SymbolInfo] {
    SYMBOLS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let alpha = lookup("alpha").unwrap();
        assert_eq!(alpha.unicode, "α");
        assert_eq!(alpha.latex(), "\\alpha");
        assert!(lookup("frac").is_none());
    }

    #[test]
    fn test_character_symbols() {
        let eq = lookup("=").unwrap();
        assert!(eq.is_relation());
        assert!(!eq.is_command());
        assert_eq!(eq.latex(), "=");
        assert!(lookup("+").unwrap().is_binary());
        for c in ['+', '-', '*', '=', '<', '>'] {
            assert!(is_symbol_char(c));
            assert!(lookup(&c.to_string()).is_some());
        }
    }

    #[test]
    fn test_limits() {
        assert!(lookup("sum").unwrap().takes_limits());
        assert!(!lookup("int").unwrap().takes_limits());
        assert!(lookup("lim").unwrap().takes_limits());
        assert!(lookup("sin").unwrap().is_function());
    }

    #[test]
    fn test_names_are_unique() {
        assert_eq!(table().len(), all().len());
    }

    #[test]
    fn test_packages() {
        assert_eq!(lookup("leqslant").unwrap().package, Some("amssymb"));
        assert_eq!(lookup("leq").unwrap().package, None);
    }
}

//! MathML writer
//!
//! Serialises a tree to MathML 3 presentation markup with quick-xml. Nodes
//! without a MathML form (diagram arrows) fail with
//! [`MathError::UnsupportedExport`]; the caller decides what to substitute.

use crate::data::MathData;
use crate::error::{MathError, MathResult};
use crate::export::delimiter_char;
use crate::font::FontFamily;
use crate::inset::{
    BoxKind, CancelKind, CellSpan, FracInset, FracKind, GridInset, HAlign, InsetMath,
    ScriptInset, SpaceKind,
};
use crate::symbols::SymbolClass;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// MathML namespace URI
const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

pub struct MathMLStream {
    writer: Writer<Vec<u8>>,
    /// Open elements, checked when the stream is finished
    depth: usize,
}

impl Default for MathMLStream {
    fn default() -> Self {
        Self::new()
    }
}

impl MathMLStream {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            depth: 0,
        }
    }

    pub fn finish(self) -> MathResult<String> {
        debug_assert_eq!(self.depth, 0, "unbalanced MathML elements");
        String::from_utf8(self.writer.into_inner()).map_err(|e| MathError::Xml(e.to_string()))
    }

    // =========================================================================
    // Tags
    // =========================================================================

    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) -> MathResult<()> {
        let mut elem = BytesStart::new(tag);
        for attr in attrs {
            elem.push_attribute(*attr);
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(|e| MathError::Xml(e.to_string()))?;
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self, tag: &str) -> MathResult<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(|e| MathError::Xml(e.to_string()))?;
        self.depth -= 1;
        Ok(())
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) -> MathResult<()> {
        let mut elem = BytesStart::new(tag);
        for attr in attrs {
            elem.push_attribute(*attr);
        }
        self.writer
            .write_event(Event::Empty(elem))
            .map_err(|e| MathError::Xml(e.to_string()))?;
        Ok(())
    }

    /// Element holding only text
    fn leaf(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) -> MathResult<()> {
        self.open(tag, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| MathError::Xml(e.to_string()))?;
        self.close(tag)
    }

    // =========================================================================
    // Cells
    // =========================================================================

    /// `<math>` root around a cell
    pub fn write_math(&mut self, data: &MathData, display: bool) -> MathResult<()> {
        let mode = if display { "block" } else { "inline" };
        self.open("math", &[("xmlns", MATHML_NS), ("display", mode)])?;
        self.write_data(data)?;
        self.close("math")
    }

    /// Atoms of a cell in sequence
    pub fn write_data(&mut self, data: &MathData) -> MathResult<()> {
        for atom in data.iter() {
            self.write_inset(atom.nucleus())?;
        }
        Ok(())
    }

    /// A cell as exactly one child element
    fn write_row(&mut self, data: &MathData) -> MathResult<()> {
        match data.atoms() {
            [only] if !matches!(only.nucleus(), InsetMath::Comment(_)) => {
                self.write_inset(only.nucleus())
            }
            _ => {
                self.open("mrow", &[])?;
                self.write_data(data)?;
                self.close("mrow")
            }
        }
    }

    fn fence(&mut self, delim: &str) -> MathResult<()> {
        match delimiter_char(delim) {
            Some(c) => self.leaf("mo", &[("fence", "true"), ("stretchy", "true")], c),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    pub fn write_inset(&mut self, inset: &InsetMath) -> MathResult<()> {
        match inset {
            InsetMath::Char(c) => {
                let s = c.to_string();
                if c.is_alphabetic() {
                    self.leaf("mi", &[], &s)
                } else if c.is_ascii_digit() {
                    self.leaf("mn", &[], &s)
                } else if *c == '\'' {
                    self.leaf("mo", &[], "\u{2032}")
                } else {
                    self.leaf("mo", &[], &s)
                }
            }
            InsetMath::Number(digits) => self.leaf("mn", &[], digits),
            InsetMath::Text(text) => self.leaf("mtext", &[], text),
            InsetMath::Symbol(symbol) => match symbol.info().map(|info| info.class) {
                Some(SymbolClass::Rel) | Some(SymbolClass::Bin) => {
                    self.leaf("mo", &[], symbol.glyph())
                }
                Some(SymbolClass::BigOp { .. }) => {
                    self.leaf("mo", &[("largeop", "true")], symbol.glyph())
                }
                Some(SymbolClass::Func { .. }) => self.leaf("mi", &[], symbol.glyph()),
                _ => self.leaf("mi", &[], symbol.glyph()),
            },
            InsetMath::Frac(frac) => self.write_frac(frac),
            InsetMath::Sqrt(sqrt) => {
                self.open("msqrt", &[])?;
                self.write_data(sqrt.cell())?;
                self.close("msqrt")
            }
            InsetMath::Root(root) => {
                self.open("mroot", &[])?;
                self.write_row(root.radicand())?;
                self.write_row(root.index())?;
                self.close("mroot")
            }
            InsetMath::Decoration(deco) => {
                let info = deco.info()?;
                let stretchy = if info.wide { "true" } else { "false" };
                let (tag, accent) = if info.upper {
                    ("mover", "accent")
                } else {
                    ("munder", "accentunder")
                };
                self.open(tag, &[(accent, "true")])?;
                self.write_row(deco.cell())?;
                self.leaf("mo", &[("stretchy", stretchy)], info.mathml)?;
                self.close(tag)
            }
            InsetMath::Color(color) => {
                self.open("mstyle", &[("mathcolor", &color.color)])?;
                self.write_data(color.cell())?;
                self.close("mstyle")
            }
            InsetMath::Box(boxed) => {
                let notation = match boxed.kind {
                    BoxKind::Mbox | BoxKind::Makebox { .. } => None,
                    BoxKind::Ovalbox | BoxKind::OOvalbox => Some("roundedbox"),
                    _ => Some("box"),
                };
                match notation {
                    Some(notation) => {
                        self.open("menclose", &[("notation", notation)])?;
                        self.write_data(boxed.cell())?;
                        self.close("menclose")
                    }
                    None => {
                        self.open("mrow", &[])?;
                        self.write_data(boxed.cell())?;
                        self.close("mrow")
                    }
                }
            }
            InsetMath::Grid(grid) => self.write_grid(grid),
            InsetMath::Scripts(scripts) => self.write_scripts(scripts),
            InsetMath::Delim(delim) => {
                self.open("mrow", &[])?;
                self.fence(&delim.left)?;
                self.write_data(delim.cell())?;
                self.fence(&delim.right)?;
                self.close("mrow")
            }
            InsetMath::Font(font) => self.write_variant(font.command.family(), font.cell()),
            InsetMath::BoldSymbol(bold) => self.write_variant(FontFamily::BoldMath, bold.cell()),
            InsetMath::Space(space) => {
                let width = match (space.em_width(), space) {
                    (Some(em), _) => format!("{:.3}em", em),
                    (None, SpaceKind::Hspace(len)) => len.clone(),
                    (None, _) => "0.333em".to_string(),
                };
                self.empty("mspace", &[("width", &width)])
            }
            InsetMath::Cancel(cancel) => {
                let notation = match cancel.kind {
                    CancelKind::Cancel => "updiagonalstrike",
                    CancelKind::BCancel => "downdiagonalstrike",
                    CancelKind::XCancel => "updiagonalstrike downdiagonalstrike",
                };
                self.open("menclose", &[("notation", notation)])?;
                self.write_data(cancel.cell())?;
                self.close("menclose")
            }
            InsetMath::CancelTo(cancel) => {
                self.open("msup", &[])?;
                self.open("menclose", &[("notation", "updiagonalarrow")])?;
                self.write_data(cancel.expr())?;
                self.close("menclose")?;
                self.write_row(cancel.target())?;
                self.close("msup")
            }
            InsetMath::Brace(brace) => {
                self.open("mrow", &[])?;
                self.write_data(brace.cell())?;
                self.close("mrow")
            }
            InsetMath::MacroArg(n) => self.leaf("mi", &[], &format!("#{}", n)),
            InsetMath::Unknown(name) => {
                self.open("merror", &[])?;
                self.leaf("mtext", &[], &format!("\\{}", name))?;
                self.close("merror")
            }
            InsetMath::Comment(_) => Ok(()),
            InsetMath::XArrow(arrow) => {
                let tag = if arrow.below().is_empty() {
                    "mover"
                } else {
                    "munderover"
                };
                self.open(tag, &[])?;
                self.leaf("mo", &[("stretchy", "true")], arrow.kind.unicode())?;
                if !arrow.below().is_empty() {
                    self.write_row(arrow.below())?;
                }
                self.write_row(arrow.above())?;
                self.close(tag)
            }
            InsetMath::XYArrow(_) => Err(MathError::UnsupportedExport {
                node: "xyarrow",
                format: "MathML",
            }),
        }
    }

    fn write_frac(&mut self, frac: &FracInset) -> MathResult<()> {
        let display = match frac.kind {
            FracKind::DFrac | FracKind::DBinom => Some("true"),
            FracKind::TFrac | FracKind::TBinom => Some("false"),
            _ => None,
        };
        if let Some(display) = display {
            self.open("mstyle", &[("displaystyle", display)])?;
        }
        if frac.kind.is_binomial() {
            self.open("mrow", &[])?;
            self.leaf("mo", &[], "(")?;
        }
        if frac.kind.has_rule() {
            self.open("mfrac", &[])?;
        } else {
            self.open("mfrac", &[("linethickness", "0")])?;
        }
        self.write_row(frac.num())?;
        self.write_row(frac.den())?;
        self.close("mfrac")?;
        if frac.kind.is_binomial() {
            self.leaf("mo", &[], ")")?;
            self.close("mrow")?;
        }
        if display.is_some() {
            self.close("mstyle")?;
        }
        Ok(())
    }

    fn write_scripts(&mut self, scripts: &ScriptInset) -> MathResult<()> {
        let limits = scripts.limits.unwrap_or_else(|| {
            matches!(scripts.nucleus().atoms(), [only] if only.symbol_info().is_some_and(|info| info.takes_limits()))
        });
        let tag = match (scripts.sub().is_some(), scripts.sup().is_some(), limits) {
            (true, true, true) => "munderover",
            (true, false, true) => "munder",
            (false, true, true) => "mover",
            (true, true, false) => "msubsup",
            (true, false, false) => "msub",
            (false, true, false) => "msup",
            (false, false, _) => return self.write_row(scripts.nucleus()),
        };
        self.open(tag, &[])?;
        self.write_row(scripts.nucleus())?;
        if let Some(sub) = scripts.sub() {
            self.write_row(sub)?;
        }
        if let Some(sup) = scripts.sup() {
            self.write_row(sup)?;
        }
        self.close(tag)
    }

    fn write_variant(&mut self, family: FontFamily, cell: &MathData) -> MathResult<()> {
        let variant = match family {
            FontFamily::Roman => "normal",
            FontFamily::Italic => "italic",
            FontFamily::Bold => "bold",
            FontFamily::BoldMath => "bold-italic",
            FontFamily::SansSerif => "sans-serif",
            FontFamily::Typewriter => "monospace",
            FontFamily::Calligraphic => "script",
            FontFamily::Blackboard => "double-struck",
            FontFamily::Fraktur => "fraktur",
            FontFamily::Math => {
                self.open("mrow", &[])?;
                self.write_data(cell)?;
                return self.close("mrow");
            }
        };
        self.open("mstyle", &[("mathvariant", variant)])?;
        self.write_data(cell)?;
        self.close("mstyle")
    }

    fn write_grid(&mut self, grid: &GridInset) -> MathResult<()> {
        let delims = grid.kind.delims();
        if let Some((left, _)) = delims {
            self.open("mrow", &[])?;
            self.fence(left)?;
        }
        let aligns: Vec<&str> = (0..grid.ncols())
            .filter_map(|c| grid.col_info(c))
            .map(|info| match info.align {
                HAlign::Left => "left",
                HAlign::Center => "center",
                HAlign::Right => "right",
            })
            .collect();
        let column_align = aligns.join(" ");
        if aligns.iter().all(|a| *a == "center") {
            self.open("mtable", &[])?;
        } else {
            self.open("mtable", &[("columnalign", &column_align)])?;
        }
        for row in 0..grid.nrows() {
            self.open("mtr", &[])?;
            for col in 0..grid.ncols() {
                let Some(cell) = grid.cell(row, col) else {
                    continue;
                };
                match grid.cell_span(row, col) {
                    Some(CellSpan::Part) => continue,
                    Some(CellSpan::Begin { span, .. }) => {
                        let span = span.to_string();
                        self.open("mtd", &[("columnspan", &span)])?;
                    }
                    _ => self.open("mtd", &[])?,
                }
                self.write_data(cell)?;
                self.close("mtd")?;
            }
            self.close("mtr")?;
        }
        self.close("mtable")?;
        if let Some((_, right)) = delims {
            self.fence(right)?;
            self.close("mrow")?;
        }
        Ok(())
    }
}

/// MathML document for a cell
pub fn mathml(data: &MathData, display: bool) -> MathResult<String> {
    let mut ms = MathMLStream::new();
    ms.write_math(data, display)?;
    ms.finish()
}

//! HTML writer
//!
//! Plain XHTML rendering for readers without MathML support. Layout comes
//! from CSS classes; `validate` on an HTML [`LatexFeatures`] collects the
//! classes a document uses and [`stylesheet`] returns their rules.

use crate::data::MathData;
use crate::error::{MathError, MathResult};
use crate::export::delimiter_char;
use crate::features::LatexFeatures;
use crate::font::FontFamily;
use crate::inset::{
    BoxKind, CancelKind, CellSpan, FracInset, GridInset, GridKind, InsetMath, ScriptInset,
    SpaceKind,
};
use crate::symbols::SymbolClass;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

pub struct HtmlStream {
    writer: Writer<Vec<u8>>,
    depth: usize,
}

impl Default for HtmlStream {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlStream {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            depth: 0,
        }
    }

    pub fn finish(self) -> MathResult<String> {
        debug_assert_eq!(self.depth, 0, "unbalanced HTML elements");
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

    fn span(&mut self, class: &str) -> MathResult<()> {
        self.open("span", &[("class", class)])
    }

    fn close(&mut self, tag: &str) -> MathResult<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(|e| MathError::Xml(e.to_string()))?;
        self.depth -= 1;
        Ok(())
    }

    fn text(&mut self, text: &str) -> MathResult<()> {
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| MathError::Xml(e.to_string()))?;
        Ok(())
    }

    /// `<span class=...>text</span>`
    fn leaf(&mut self, class: &str, text: &str) -> MathResult<()> {
        self.span(class)?;
        self.text(text)?;
        self.close("span")
    }

    /// Cell wrapped in one span
    fn wrapped(&mut self, class: &str, data: &MathData) -> MathResult<()> {
        self.span(class)?;
        self.write_data(data)?;
        self.close("span")
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Top-level element around a cell; display formulas form a block
    pub fn write_formula(&mut self, data: &MathData, display: bool) -> MathResult<()> {
        let tag = if display { "div" } else { "span" };
        self.open(tag, &[("class", "formula")])?;
        self.write_data(data)?;
        self.close(tag)
    }

    pub fn write_data(&mut self, data: &MathData) -> MathResult<()> {
        for atom in data.iter() {
            self.write_inset(atom.nucleus())?;
        }
        Ok(())
    }

    pub fn write_inset(&mut self, inset: &InsetMath) -> MathResult<()> {
        match inset {
            InsetMath::Char(c) if c.is_alphabetic() => {
                self.open("i", &[])?;
                self.text(&c.to_string())?;
                self.close("i")
            }
            InsetMath::Char('\'') => self.text("\u{2032}"),
            InsetMath::Char(c) => self.text(&c.to_string()),
            InsetMath::Number(digits) => self.text(digits),
            InsetMath::Text(text) => self.text(text),
            InsetMath::Symbol(symbol) => match symbol.info().map(|info| info.class) {
                Some(SymbolClass::Rel) | Some(SymbolClass::Bin) => {
                    self.text(&format!(" {} ", symbol.glyph()))
                }
                _ => self.text(symbol.glyph()),
            },
            InsetMath::Frac(frac) => self.write_frac(frac),
            InsetMath::Sqrt(sqrt) => {
                self.span("sqrt")?;
                self.text("\u{221a}")?;
                self.wrapped("sqrtbody", sqrt.cell())?;
                self.close("span")
            }
            InsetMath::Root(root) => {
                self.span("root")?;
                self.open("sup", &[])?;
                self.write_data(root.index())?;
                self.close("sup")?;
                self.text("\u{221a}")?;
                self.wrapped("rootbody", root.radicand())?;
                self.close("span")
            }
            InsetMath::Decoration(deco) => {
                let info = deco.info()?;
                self.span("decoration")?;
                if info.upper {
                    self.leaf("deco", info.mathml)?;
                    self.wrapped("decobody", deco.cell())?;
                } else {
                    self.wrapped("decobody", deco.cell())?;
                    self.leaf("deco", info.mathml)?;
                }
                self.close("span")
            }
            InsetMath::Color(color) => {
                let style = format!("color: {}", color.color);
                self.open("span", &[("style", &style)])?;
                self.write_data(color.cell())?;
                self.close("span")
            }
            InsetMath::Box(boxed) => match boxed.kind {
                BoxKind::Mbox | BoxKind::Makebox { .. } => self.wrapped("mbox", boxed.cell()),
                _ => self.wrapped("framebox", boxed.cell()),
            },
            InsetMath::Grid(grid) => self.write_grid(grid),
            InsetMath::Scripts(scripts) => self.write_scripts(scripts),
            InsetMath::Delim(delim) => {
                self.fence(&delim.left)?;
                self.write_data(delim.cell())?;
                self.fence(&delim.right)
            }
            InsetMath::Font(font) => match font.command.css_class() {
                Some(class) => self.wrapped(class, font.cell()),
                None => self.write_family(font.command.family(), font.cell()),
            },
            InsetMath::BoldSymbol(bold) => self.write_family(FontFamily::BoldMath, bold.cell()),
            InsetMath::Space(space) => match space {
                SpaceKind::Hspace(len) => {
                    let style = format!("display: inline-block; width: {}", len);
                    self.open("span", &[("style", &style)])?;
                    self.close("span")
                }
                other => self.text(space_chars(other)),
            },
            InsetMath::Cancel(cancel) => {
                let class = match cancel.kind {
                    CancelKind::Cancel => "cancel",
                    CancelKind::BCancel => "cancel bcancel",
                    CancelKind::XCancel => "cancel xcancel",
                };
                self.wrapped(class, cancel.cell())
            }
            InsetMath::CancelTo(cancel) => {
                self.wrapped("cancel", cancel.expr())?;
                self.open("sup", &[])?;
                self.write_data(cancel.target())?;
                self.close("sup")
            }
            InsetMath::Brace(brace) => self.write_data(brace.cell()),
            InsetMath::MacroArg(n) => self.text(&format!("#{}", n)),
            InsetMath::Unknown(name) => self.leaf("unknown", &format!("\\{}", name)),
            InsetMath::Comment(_) => Ok(()),
            InsetMath::XArrow(arrow) => {
                self.span("xarrow")?;
                self.wrapped("xabove", arrow.above())?;
                self.leaf("xarrowop", arrow.kind.unicode())?;
                self.wrapped("xbelow", arrow.below())?;
                self.close("span")
            }
            InsetMath::XYArrow(_) => Err(MathError::UnsupportedExport {
                node: "xyarrow",
                format: "HTML",
            }),
        }
    }

    fn fence(&mut self, delim: &str) -> MathResult<()> {
        match delimiter_char(delim) {
            Some(c) => self.leaf("delim", c),
            None => Ok(()),
        }
    }

    fn write_frac(&mut self, frac: &FracInset) -> MathResult<()> {
        let class = if frac.kind.is_binomial() {
            "binom"
        } else if frac.kind.has_rule() {
            "frac"
        } else {
            "frac atop"
        };
        if frac.kind.is_binomial() {
            self.leaf("delim", "(")?;
        }
        self.span(class)?;
        self.wrapped("numer", frac.num())?;
        self.wrapped("denom", frac.den())?;
        self.close("span")?;
        if frac.kind.is_binomial() {
            self.leaf("delim", ")")?;
        }
        Ok(())
    }

    fn write_scripts(&mut self, scripts: &ScriptInset) -> MathResult<()> {
        let limits = scripts.limits.unwrap_or_else(|| {
            matches!(scripts.nucleus().atoms(), [only] if only.symbol_info().is_some_and(|info| info.takes_limits()))
        });
        if limits && (scripts.has_sub() || scripts.has_sup()) {
            self.span("limits")?;
            if let Some(sup) = scripts.sup() {
                self.wrapped("limit", sup)?;
            }
            self.wrapped("limop", scripts.nucleus())?;
            if let Some(sub) = scripts.sub() {
                self.wrapped("limit", sub)?;
            }
            return self.close("span");
        }
        self.write_data(scripts.nucleus())?;
        if let Some(sub) = scripts.sub() {
            self.open("sub", &[])?;
            self.write_data(sub)?;
            self.close("sub")?;
        }
        if let Some(sup) = scripts.sup() {
            self.open("sup", &[])?;
            self.write_data(sup)?;
            self.close("sup")?;
        }
        Ok(())
    }

    fn write_family(&mut self, family: FontFamily, cell: &MathData) -> MathResult<()> {
        let (tag, style) = match family {
            FontFamily::Bold | FontFamily::BoldMath => ("b", None),
            FontFamily::Italic => ("i", None),
            FontFamily::Typewriter => ("code", None),
            FontFamily::Roman => ("span", Some("font-style: normal")),
            FontFamily::SansSerif => ("span", Some("font-family: sans-serif")),
            // the alphabet commands are written by class
            FontFamily::Calligraphic
            | FontFamily::Blackboard
            | FontFamily::Fraktur
            | FontFamily::Math => ("span", None),
        };
        match style {
            Some(style) => self.open(tag, &[("style", style)])?,
            None => self.open(tag, &[])?,
        }
        self.write_data(cell)?;
        self.close(tag)
    }

    fn write_grid(&mut self, grid: &GridInset) -> MathResult<()> {
        let delims = grid.kind.delims();
        if let Some((left, _)) = delims {
            self.fence(left)?;
        }
        let class = match grid.kind {
            GridKind::Cases => "cases",
            _ => "matrix",
        };
        self.open("table", &[("class", class)])?;
        for row in 0..grid.nrows() {
            self.open("tr", &[])?;
            for col in 0..grid.ncols() {
                let Some(cell) = grid.cell(row, col) else {
                    continue;
                };
                match grid.cell_span(row, col) {
                    Some(CellSpan::Part) => continue,
                    Some(CellSpan::Begin { span, .. }) => {
                        let span = span.to_string();
                        self.open("td", &[("colspan", &span)])?;
                    }
                    _ => self.open("td", &[])?,
                }
                self.write_data(cell)?;
                self.close("td")?;
            }
            self.close("tr")?;
        }
        self.close("table")?;
        if let Some((_, right)) = delims {
            self.fence(right)?;
        }
        Ok(())
    }
}

/// Unicode spaces approximating the TeX spacing commands
fn space_chars(space: &SpaceKind) -> &'static str {
    match space {
        SpaceKind::Thin => "\u{2009}",
        SpaceKind::Medium => "\u{205f}",
        SpaceKind::Thick => "\u{2004}",
        SpaceKind::NegThin | SpaceKind::NegMedium | SpaceKind::NegThick => "",
        SpaceKind::Quad => "\u{2003}",
        SpaceKind::QQuad => "\u{2003}\u{2003}",
        SpaceKind::Enspace => "\u{2002}",
        SpaceKind::Normal | SpaceKind::Nbsp | SpaceKind::Hspace(_) => "\u{a0}",
    }
}

/// HTML fragment for a cell
pub fn html(data: &MathData, display: bool) -> MathResult<String> {
    let mut hs = HtmlStream::new();
    hs.write_formula(data, display)?;
    hs.finish()
}

/// CSS rules for a class added by `validate`
pub fn css_for(class: &str) -> Option<&'static str> {
    Some(match class {
        "frac" => {
            "span.frac { display: inline-block; vertical-align: middle; text-align: center; }\n\
             span.frac > span.numer, span.frac > span.denom { display: block; }\n\
             span.frac > span.denom { border-top: thin solid; }\n\
             span.frac.atop > span.denom { border-top: none; }\n"
        }
        "binom" => {
            "span.binom { display: inline-block; vertical-align: middle; text-align: center; }\n\
             span.binom > span.numer, span.binom > span.denom { display: block; }\n"
        }
        "sqrt" => "span.sqrtbody { border-top: thin solid; }\n",
        "root" => {
            "span.root > sup { font-size: 60%; }\n\
             span.rootbody { border-top: thin solid; }\n"
        }
        "decoration" => {
            "span.decoration { display: inline-block; text-align: center; }\n\
             span.decoration > span { display: block; line-height: 1; }\n"
        }
        "framebox" => "span.framebox { border: thin solid; padding: 0 0.2em; }\n",
        "matrix" | "cases" => {
            "table.matrix, table.cases { display: inline-table; vertical-align: middle; }\n\
             table.cases td { text-align: left; }\n"
        }
        "limits" => {
            "span.limits { display: inline-block; vertical-align: middle; text-align: center; }\n\
             span.limits > span { display: block; }\n\
             span.limit { font-size: 70%; }\n"
        }
        "delim" => "span.delim { font-size: 120%; }\n",
        "cancel" => "span.cancel { text-decoration: line-through; }\n",
        "xarrow" => {
            "span.xarrow { display: inline-block; vertical-align: middle; text-align: center; }\n\
             span.xarrow > span { display: block; line-height: 1; }\n\
             span.xabove, span.xbelow { font-size: 70%; }\n"
        }
        "unknown" => "span.unknown { color: red; font-family: monospace; }\n",
        "mathcal" => {
            "span.mathcal { font-family: cursive; }\n\
             span.mathcal i { font-style: normal; }\n"
        }
        "mathbb" => {
            "span.mathbb { font-family: \"STIX Two Math\", serif; font-weight: bold; }\n\
             span.mathbb i { font-style: normal; }\n"
        }
        "mathfrak" => {
            "span.mathfrak { font-family: fantasy; }\n\
             span.mathfrak i { font-style: normal; }\n"
        }
        _ => return None,
    })
}

/// Stylesheet for the classes collected in `features`
pub fn stylesheet(features: &LatexFeatures) -> String {
    let mut css = String::new();
    for class in features.css_classes() {
        match css_for(class) {
            Some(rules) => css.push_str(rules),
            None => tracing::warn!(class, "no CSS rules for class"),
        }
    }
    css
}

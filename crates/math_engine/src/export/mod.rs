//! Output streams
//!
//! LaTeX is the persisted form and never fails. MathML and HTML return
//! [`MathError::UnsupportedExport`] for nodes they cannot express; the
//! document level [`export_xhtml`] turns those into placeholders. CAS output
//! degrades per node and only logs.

pub mod cas;
pub mod html;
pub mod latex;
pub mod mathml;
pub mod normal;

pub use cas::{CasStream, CasTarget};
pub use html::{css_for, html, stylesheet, HtmlStream};
pub use latex::{latex, WriteStream};
pub use mathml::{mathml, MathMLStream};
pub use normal::{normalize, NormalStream};

use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};
use crate::features::LatexFeatures;
use crate::formula::Formula;

/// Character drawn for a `\left`/`\right` delimiter, `None` for `.`
pub(crate) fn delimiter_char(delim: &str) -> Option<&'static str> {
    let c = match delim {
        "(" => "(",
        ")" => ")",
        "[" => "[",
        "]" => "]",
        "/" => "/",
        "\\{" | "\\lbrace" => "{",
        "\\}" | "\\rbrace" => "}",
        "|" | "\\vert" | "\\lvert" | "\\rvert" => "|",
        "\\|" | "\\Vert" | "\\lVert" | "\\rVert" => "‖",
        "<" | "\\langle" => "⟨",
        ">" | "\\rangle" => "⟩",
        "\\backslash" => "\\",
        "\\lfloor" => "⌊",
        "\\rfloor" => "⌋",
        "\\lceil" => "⌈",
        "\\rceil" => "⌉",
        _ => return None,
    };
    Some(c)
}

// =============================================================================
// Document export
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XhtmlFlavor {
    MathML,
    Html,
}

/// A formula replaced by its LaTeX source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFormula {
    /// Index in the exported slice
    pub index: usize,
    pub latex: String,
    /// Display form of the [`MathError::UnsupportedExport`] that was caught
    pub reason: String,
}

/// Result of [`export_xhtml`]
#[derive(Debug, Default)]
pub struct XhtmlExport {
    /// One fragment per formula, newline separated
    pub body: String,
    /// CSS for the classes used by the HTML flavor, empty for MathML
    pub stylesheet: String,
    pub skipped: Vec<SkippedFormula>,
    pub features: LatexFeatures,
}

impl XhtmlExport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

fn placeholder(latex: &str) -> String {
    format!(
        "<span class=\"unsupported\">{}</span>",
        quick_xml::escape::escape(latex)
    )
}

/// Export a list of formulas as XHTML fragments.
///
/// A formula containing a node the flavor cannot express is replaced by its
/// escaped LaTeX source and recorded in [`XhtmlExport::skipped`]; the rest
/// of the document is still exported. Any other error aborts the export.
pub fn export_xhtml(formulas: &[Formula], flavor: XhtmlFlavor) -> MathResult<XhtmlExport> {
    let mut export = XhtmlExport {
        features: match flavor {
            XhtmlFlavor::Html => LatexFeatures::for_html(),
            XhtmlFlavor::MathML => LatexFeatures::new(),
        },
        ..Default::default()
    };

    for (index, formula) in formulas.iter().enumerate() {
        formula.validate(&mut export.features);
        let result = match flavor {
            XhtmlFlavor::MathML => formula.mathml(),
            XhtmlFlavor::Html => formula.html(),
        };
        match result {
            Ok(fragment) => export.body.push_str(&fragment),
            Err(err @ MathError::UnsupportedExport { .. }) => {
                let latex = formula.latex();
                tracing::warn!(index, error = %err, "formula replaced by its LaTeX source");
                export.body.push_str(&placeholder(&latex));
                export.skipped.push(SkippedFormula {
                    index,
                    latex,
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
        export.body.push('\n');
    }

    if flavor == XhtmlFlavor::Html {
        export.stylesheet = stylesheet(&export.features);
    }
    tracing::debug!(
        formulas = formulas.len(),
        skipped = export.skipped.len(),
        ?flavor,
        "xhtml export finished"
    );
    Ok(export)
}

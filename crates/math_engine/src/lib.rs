//! Math Engine - formula trees with layout and export
//!
//! This crate provides:
//! - A math tree of [`InsetMath`] nodes owning [`MathData`] cells
//! - Two-pass layout (`metrics` then `draw`) against abstract font metrics
//!   and painter capabilities, with cached geometry that edits invalidate
//! - A LaTeX parser for the persisted form of a formula
//! - LaTeX, MathML, HTML and computer algebra (Maple, Maxima, Mathematica,
//!   Octave) export, plus a bracketed debug form
//! - LaTeX package and CSS requirement collection through `validate`

pub mod atom;
pub mod color;
pub mod config;
pub mod context;
pub mod data;
pub mod deco;
pub mod dimension;
pub mod error;
pub mod export;
pub mod features;
pub mod font;
pub mod formula;
pub mod inset;
pub mod painter;
pub mod parser;
pub mod symbols;

pub use atom::MathAtom;
pub use color::{Color, ColorRole, ColorTable};
pub use config::EngineConfig;
pub use context::{MathStyle, MetricsInfo, PainterInfo, StyleContext};
pub use data::MathData;
pub use dimension::Dimension;
pub use error::*;
pub use export::{export_xhtml, CasTarget, XhtmlExport, XhtmlFlavor};
pub use features::LatexFeatures;
pub use font::{FixedFontMetrics, FontFamily, FontInfo, FontMetrics};
pub use formula::{Formula, FormulaKind};
pub use inset::InsetMath;
pub use painter::{PaintOp, Painter, RecordingPainter};
pub use parser::{parse_latex, parse_text};

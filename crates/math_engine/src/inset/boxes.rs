//! Boxes: `\fbox`, `\mbox`, `\boxed`, `\makebox`, `\framebox` and the fancybox frames

use crate::color::ColorRole;
use crate::context::{MetricsInfo, PainterInfo};
use crate::data::MathData;
use crate::dimension::Dimension;
use crate::error::MathResult;
use crate::features::LatexFeatures;
use serde::{Deserialize, Serialize};

/// Space between a frame and its content
const FRAME_SEP: i32 = 3;
/// Offset of the shadow of `\shadowbox`
const SHADOW: i32 = 2;

/// Box flavours
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxKind {
    Fbox,
    Mbox,
    /// Math-mode frame from amsmath
    Boxed,
    /// `\makebox[width][pos]{...}`; empty strings are omitted arguments
    Makebox { width: String, pos: String },
    Framebox { width: String, pos: String },
    Shadowbox,
    Doublebox,
    Ovalbox,
    OOvalbox,
}

impl BoxKind {
    /// Kind for a command without optional arguments
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "fbox" => BoxKind::Fbox,
            "mbox" => BoxKind::Mbox,
            "boxed" => BoxKind::Boxed,
            "makebox" => BoxKind::Makebox {
                width: String::new(),
                pos: String::new(),
            },
            "framebox" => BoxKind::Framebox {
                width: String::new(),
                pos: String::new(),
            },
            "shadowbox" => BoxKind::Shadowbox,
            "doublebox" => BoxKind::Doublebox,
            "ovalbox" => BoxKind::Ovalbox,
            "Ovalbox" => BoxKind::OOvalbox,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoxKind::Fbox => "fbox",
            BoxKind::Mbox => "mbox",
            BoxKind::Boxed => "boxed",
            BoxKind::Makebox { .. } => "makebox",
            BoxKind::Framebox { .. } => "framebox",
            BoxKind::Shadowbox => "shadowbox",
            BoxKind::Doublebox => "doublebox",
            BoxKind::Ovalbox => "ovalbox",
            BoxKind::OOvalbox => "Ovalbox",
        }
    }

    /// Content is LaTeX text mode
    pub fn is_text_mode(&self) -> bool {
        !matches!(self, BoxKind::Boxed)
    }

    pub fn is_framed(&self) -> bool {
        !matches!(self, BoxKind::Mbox | BoxKind::Makebox { .. })
    }

    /// Width and position arguments, if the kind takes them
    pub fn optional_args(&self) -> Option<(&str, &str)> {
        match self {
            BoxKind::Makebox { width, pos } | BoxKind::Framebox { width, pos } => {
                Some((width.as_str(), pos.as_str()))
            }
            _ => None,
        }
    }
}

/// Box around a single cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxInset {
    pub kind: BoxKind,
    cell: MathData,
}

impl BoxInset {
    pub fn new(kind: BoxKind, cell: MathData) -> Self {
        Self { kind, cell }
    }

    pub fn cell(&self) -> &MathData {
        &self.cell
    }

    pub fn cell_mut(&mut self) -> &mut MathData {
        &mut self.cell
    }

    /// Padding on the (left, right) and (top, bottom) sides
    fn padding(&self) -> (i32, i32) {
        let sep = match self.kind {
            BoxKind::Mbox | BoxKind::Makebox { .. } => 0,
            BoxKind::Doublebox => 2 * FRAME_SEP,
            _ => FRAME_SEP,
        };
        let shadow = if self.kind == BoxKind::Shadowbox {
            SHADOW
        } else {
            0
        };
        (sep, sep + shadow)
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let dim = self.cell.metrics(mi);
        let (sep, far) = self.padding();
        Dimension::new(dim.wid + sep + far, dim.asc + sep, dim.des + far)
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        let cell = self.cell.dimension()?;
        let (sep, far) = self.padding();
        self.cell.draw(pi, x + sep, y)?;
        if !self.kind.is_framed() {
            return Ok(());
        }

        let color = pi.base.role(ColorRole::Frame);
        let top = y - cell.asc - sep;
        let w = cell.wid + 2 * sep;
        let h = cell.height() + 2 * sep;
        pi.pain.rectangle(x, top, w, h, color);
        match self.kind {
            BoxKind::Doublebox => {
                pi.pain.rectangle(x + 2, top + 2, w - 4, h - 4, color);
            }
            BoxKind::Shadowbox => {
                pi.pain.fill_rectangle(x + SHADOW, top + h, w, far - sep, color);
                pi.pain.fill_rectangle(x + w, top + SHADOW, far - sep, h, color);
            }
            _ => {}
        }
        Ok(())
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        match &self.kind {
            BoxKind::Boxed => features.require("amsmath"),
            BoxKind::Shadowbox | BoxKind::Doublebox | BoxKind::Ovalbox | BoxKind::OOvalbox => {
                features.require("fancybox")
            }
            BoxKind::Makebox { width, .. } | BoxKind::Framebox { width, .. } => {
                if ["\\width", "\\height", "\\depth", "\\totalheight"]
                    .iter()
                    .any(|len| width.contains(len))
                {
                    features.require("calc");
                }
            }
            _ => {}
        }
        if self.kind.is_framed() {
            features.add_css("framebox");
        }
    }
}

//! Painter abstraction
//!
//! The draw pass emits pixel primitives through [`Painter`]. Backends either
//! implement the trait directly or replay the [`PaintOp`] list captured by a
//! [`RecordingPainter`].

use crate::color::Color;
use crate::error::MathResult;
use crate::font::FontInfo;
use serde::{Deserialize, Serialize};

/// Drawing primitives at integer pixel coordinates; `y` grows downwards
pub trait Painter {
    /// Straight line segment
    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color);

    /// Connected polyline through `points`
    fn lines(&mut self, points: &[(i32, i32)], color: Color) {
        for pair in points.windows(2) {
            self.line(pair[0].0, pair[0].1, pair[1].0, pair[1].1, color);
        }
    }

    /// Rectangle outline
    fn rectangle(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color);

    fn fill_rectangle(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color);

    /// Text with its baseline at `y`
    fn text(&mut self, x: i32, y: i32, text: &str, font: &FontInfo);
}

// =============================================================================
// Recording
// =============================================================================

/// A recorded paint operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PaintOp {
    Line {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
    },
    Lines {
        points: Vec<(i32, i32)>,
        color: Color,
    },
    Rectangle {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Color,
    },
    FillRectangle {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Color,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        font: FontInfo,
    },
}

/// Painter that records every operation
#[derive(Debug, Clone, Default)]
pub struct RecordingPainter {
    ops: Vec<PaintOp>,
}

impl RecordingPainter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    pub fn take(&mut self) -> Vec<PaintOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Text runs in drawing order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Position of the first text run equal to `text`
    pub fn text_position(&self, text: &str) -> Option<(i32, i32)> {
        self.ops.iter().find_map(|op| match op {
            PaintOp::Text { x, y, text: t, .. } if t == text => Some((*x, *y)),
            _ => None,
        })
    }

    /// Serialize the recording for a replaying backend
    pub fn to_json(&self) -> MathResult<String> {
        Ok(serde_json::to_string(&self.ops)?)
    }
}

impl Painter for RecordingPainter {
    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        self.ops.push(PaintOp::Line {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }

    fn lines(&mut self, points: &[(i32, i32)], color: Color) {
        self.ops.push(PaintOp::Lines {
            points: points.to_vec(),
            color,
        });
    }

    fn rectangle(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.ops.push(PaintOp::Rectangle { x, y, w, h, color });
    }

    fn fill_rectangle(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.ops.push(PaintOp::FillRectangle { x, y, w, h, color });
    }

    fn text(&mut self, x: i32, y: i32, text: &str, font: &FontInfo) {
        self.ops.push(PaintOp::Text {
            x,
            y,
            text: text.to_string(),
            font: *font,
        });
    }
}

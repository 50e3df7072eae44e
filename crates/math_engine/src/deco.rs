//! Polyline shapes for decorations and stretchy delimiters
//!
//! Shapes live in a unit square (x to the right, y downwards) and are scaled
//! to the box they decorate when drawn.

use crate::color::Color;
use crate::painter::Painter;

type Polyline = &'static [(f32, f32)];

/// A shape made of one or more polylines in unit coordinates
pub type Shape = &'static [Polyline];

/// Static description of a decoration command
#[derive(Debug, Clone, Copy)]
pub struct DecorationInfo {
    pub name: &'static str,
    /// Drawn above the decorated cell (otherwise below)
    pub upper: bool,
    /// Stretched to the width of the decorated cell
    pub wide: bool,
    pub shape: Shape,
    /// Accent character used by MathML `<mover>`/`<munder>`
    pub mathml: &'static str,
}

const HAT: Shape = &[&[(0.0, 1.0), (0.5, 0.0), (1.0, 1.0)]];
const CHECK: Shape = &[&[(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]];
const TILDE: Shape = &[&[
    (0.0, 0.75),
    (0.25, 0.25),
    (0.5, 0.5),
    (0.75, 0.75),
    (1.0, 0.25),
]];
const BAR: Shape = &[&[(0.0, 0.5), (1.0, 0.5)]];
const RIGHT_ARROW: Shape = &[
    &[(0.0, 0.5), (1.0, 0.5)],
    &[(0.8, 0.1), (1.0, 0.5), (0.8, 0.9)],
];
const LEFT_ARROW: Shape = &[
    &[(0.0, 0.5), (1.0, 0.5)],
    &[(0.2, 0.1), (0.0, 0.5), (0.2, 0.9)],
];
const LEFT_RIGHT_ARROW: Shape = &[
    &[(0.0, 0.5), (1.0, 0.5)],
    &[(0.2, 0.1), (0.0, 0.5), (0.2, 0.9)],
    &[(0.8, 0.1), (1.0, 0.5), (0.8, 0.9)],
];
const DOT: Shape = &[&[(0.4, 0.4), (0.6, 0.4), (0.6, 0.6), (0.4, 0.6), (0.4, 0.4)]];
const DDOT: Shape = &[
    &[(0.2, 0.4), (0.35, 0.4), (0.35, 0.6), (0.2, 0.6), (0.2, 0.4)],
    &[(0.65, 0.4), (0.8, 0.4), (0.8, 0.6), (0.65, 0.6), (0.65, 0.4)],
];
const DDDOT: Shape = &[
    &[(0.05, 0.4), (0.2, 0.4), (0.2, 0.6), (0.05, 0.6), (0.05, 0.4)],
    &[(0.42, 0.4), (0.58, 0.4), (0.58, 0.6), (0.42, 0.6), (0.42, 0.4)],
    &[(0.8, 0.4), (0.95, 0.4), (0.95, 0.6), (0.8, 0.6), (0.8, 0.4)],
];
const BREVE: Shape = &[&[
    (0.0, 0.0),
    (0.25, 0.8),
    (0.5, 1.0),
    (0.75, 0.8),
    (1.0, 0.0),
]];
const ACUTE: Shape = &[&[(0.3, 1.0), (0.7, 0.0)]];
const GRAVE: Shape = &[&[(0.3, 0.0), (0.7, 1.0)]];
const RING: Shape = &[&[
    (0.5, 0.0),
    (0.8, 0.5),
    (0.5, 1.0),
    (0.2, 0.5),
    (0.5, 0.0),
]];
const BRACE: Shape = &[&[
    (0.0, 1.0),
    (0.05, 0.5),
    (0.45, 0.5),
    (0.5, 0.0),
    (0.55, 0.5),
    (0.95, 0.5),
    (1.0, 1.0),
]];

const DECORATIONS: &[DecorationInfo] = &[
    deco("hat", true, false, HAT, "^"),
    deco("widehat", true, true, HAT, "^"),
    deco("check", true, false, CHECK, "ˇ"),
    deco("tilde", true, false, TILDE, "~"),
    deco("widetilde", true, true, TILDE, "~"),
    deco("bar", true, false, BAR, "¯"),
    deco("overline", true, true, BAR, "¯"),
    deco("underline", false, true, BAR, "_"),
    deco("underbar", false, true, BAR, "_"),
    deco("vec", true, false, RIGHT_ARROW, "→"),
    deco("overrightarrow", true, true, RIGHT_ARROW, "→"),
    deco("overleftarrow", true, true, LEFT_ARROW, "←"),
    deco("overleftrightarrow", true, true, LEFT_RIGHT_ARROW, "↔"),
    deco("underrightarrow", false, true, RIGHT_ARROW, "→"),
    deco("underleftarrow", false, true, LEFT_ARROW, "←"),
    deco("underleftrightarrow", false, true, LEFT_RIGHT_ARROW, "↔"),
    deco("overbrace", true, true, BRACE, "⏞"),
    deco("underbrace", false, true, BRACE, "⏟"),
    deco("dot", true, false, DOT, "˙"),
    deco("ddot", true, false, DDOT, "¨"),
    deco("dddot", true, false, DDDOT, "⃛"),
    deco("breve", true, false, BREVE, "˘"),
    deco("acute", true, false, ACUTE, "´"),
    deco("grave", true, false, GRAVE, "`"),
    deco("mathring", true, false, RING, "˚"),
];

const fn deco(
    name: &'static str,
    upper: bool,
    wide: bool,
    shape: Shape,
    mathml: &'static str,
) -> DecorationInfo {
    DecorationInfo {
        name,
        upper,
        wide,
        shape,
        mathml,
    }
}

/// Look up a decoration command (without the backslash)
pub fn decoration(name: &str) -> Option<&'static DecorationInfo> {
    DECORATIONS.iter().find(|d| d.name == name)
}

/// Names of all decoration commands
pub fn decoration_names() -> impl Iterator<Item = &'static str> {
    DECORATIONS.iter().map(|d| d.name)
}

/// Which ends of an extensible arrow carry a head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowHead {
    Left,
    Right,
    Both,
}

/// Shape of an extensible arrow (`\xrightarrow` and friends)
pub fn arrow_shape(head: ArrowHead) -> Shape {
    match head {
        ArrowHead::Left => LEFT_ARROW,
        ArrowHead::Right => RIGHT_ARROW,
        ArrowHead::Both => LEFT_RIGHT_ARROW,
    }
}

// =============================================================================
// Delimiters
// =============================================================================

const EMPTY: Shape = &[];

/// Shape of a stretchy delimiter as written after `\left` or `\right`
pub fn delimiter_shape(delim: &str) -> Option<Shape> {
    let shape: Shape = match delim {
        "(" => &[&[(1.0, 0.0), (0.3, 0.15), (0.0, 0.5), (0.3, 0.85), (1.0, 1.0)]],
        ")" => &[&[(0.0, 0.0), (0.7, 0.15), (1.0, 0.5), (0.7, 0.85), (0.0, 1.0)]],
        "[" => &[&[(1.0, 0.0), (0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]],
        "]" => &[&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]],
        "\\{" | "\\lbrace" => &[&[
            (1.0, 0.0),
            (0.5, 0.05),
            (0.5, 0.45),
            (0.0, 0.5),
            (0.5, 0.55),
            (0.5, 0.95),
            (1.0, 1.0),
        ]],
        "\\}" | "\\rbrace" => &[&[
            (0.0, 0.0),
            (0.5, 0.05),
            (0.5, 0.45),
            (1.0, 0.5),
            (0.5, 0.55),
            (0.5, 0.95),
            (0.0, 1.0),
        ]],
        "|" | "\\vert" | "\\lvert" | "\\rvert" => &[&[(0.5, 0.0), (0.5, 1.0)]],
        "\\|" | "\\Vert" | "\\lVert" | "\\rVert" => {
            &[&[(0.3, 0.0), (0.3, 1.0)], &[(0.7, 0.0), (0.7, 1.0)]]
        }
        "<" | "\\langle" => &[&[(1.0, 0.0), (0.0, 0.5), (1.0, 1.0)]],
        ">" | "\\rangle" => &[&[(0.0, 0.0), (1.0, 0.5), (0.0, 1.0)]],
        "/" => &[&[(1.0, 0.0), (0.0, 1.0)]],
        "\\backslash" => &[&[(0.0, 0.0), (1.0, 1.0)]],
        "\\lfloor" => &[&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]],
        "\\rfloor" => &[&[(1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]],
        "\\lceil" => &[&[(1.0, 0.0), (0.0, 0.0), (0.0, 1.0)]],
        "\\rceil" => &[&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]],
        "." => EMPTY,
        _ => return None,
    };
    Some(shape)
}

/// Draw `shape` scaled into the box at (`x`, `y`) of size `w` x `h`.
///
/// With `flip` the shape is mirrored vertically, turning over-decorations
/// into their under counterparts.
#[allow(clippy::too_many_arguments)]
pub fn draw_shape(
    pain: &mut dyn Painter,
    shape: Shape,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    flip: bool,
    color: Color,
) {
    for polyline in shape {
        let points: Vec<(i32, i32)> = polyline
            .iter()
            .map(|&(px, py)| {
                let py = if flip { 1.0 - py } else { py };
                (
                    x + (px * w as f32).round() as i32,
                    y + (py * h as f32).round() as i32,
                )
            })
            .collect();
        pain.lines(&points, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::painter::{PaintOp, RecordingPainter};

    #[test]
    fn test_decoration_classes() {
        let hat = decoration("hat").unwrap();
        assert!(hat.upper && !hat.wide);
        let brace = decoration("underbrace").unwrap();
        assert!(!brace.upper && brace.wide);
        assert!(decoration("frac").is_none());
        assert!(decoration_names().any(|n| n == "widetilde"));
        assert_eq!(decoration("vec").unwrap().mathml, "→");
    }

    #[test]
    fn test_arrow_shapes() {
        assert_eq!(arrow_shape(ArrowHead::Right).len(), 2);
        assert_eq!(arrow_shape(ArrowHead::Both).len(), 3);
    }

    #[test]
    fn test_delimiters() {
        assert!(delimiter_shape("(").is_some());
        assert!(delimiter_shape("\\langle").is_some());
        assert_eq!(delimiter_shape(".").map(|s| s.len()), Some(0));
        assert!(delimiter_shape("x").is_none());
    }

    #[test]
    fn test_draw_shape_scales_and_flips() {
        let mut p = RecordingPainter::new();
        draw_shape(&mut p, HAT, 10, 20, 10, 4, false, Color::BLACK);
        draw_shape(&mut p, HAT, 10, 20, 10, 4, true, Color::BLACK);
        match (&p.ops()[0], &p.ops()[1]) {
            (PaintOp::Lines { points: a, .. }, PaintOp::Lines { points: b, .. }) => {
                assert_eq!(a, &vec![(10, 24), (15, 20), (20, 24)]);
                assert_eq!(b, &vec![(10, 20), (15, 24), (20, 20)]);
            }
            other => panic!("unexpected ops {:?}", other),
        }
    }
}

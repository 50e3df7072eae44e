//! Horizontal spacing: `\,`, `\quad`, `\hspace{..}`, ...

use crate::context::{MetricsBase, MetricsInfo};
use crate::dimension::Dimension;
use crate::font::FontFamily;
use serde::{Deserialize, Serialize};

/// Spacing commands
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpaceKind {
    /// `\,`
    Thin,
    /// `\:`
    Medium,
    /// `\;`
    Thick,
    /// `\!`
    NegThin,
    NegMedium,
    NegThick,
    Quad,
    QQuad,
    /// Control space `\ `
    Normal,
    /// Tie `~`
    Nbsp,
    Enspace,
    /// `\hspace{length}` with the length as written
    Hspace(String),
}

impl SpaceKind {
    /// Kind for a control sequence name (without backslash)
    pub fn from_command(name: &str) -> Option<Self> {
        Some(match name {
            "," | "thinspace" => SpaceKind::Thin,
            ":" | ">" | "medspace" => SpaceKind::Medium,
            ";" | "thickspace" => SpaceKind::Thick,
            "!" | "negthinspace" => SpaceKind::NegThin,
            "negmedspace" => SpaceKind::NegMedium,
            "negthickspace" => SpaceKind::NegThick,
            "quad" => SpaceKind::Quad,
            "qquad" => SpaceKind::QQuad,
            " " => SpaceKind::Normal,
            "enspace" => SpaceKind::Enspace,
            _ => return None,
        })
    }

    /// LaTeX spelling
    pub fn latex(&self) -> String {
        match self {
            SpaceKind::Thin => "\\,".into(),
            SpaceKind::Medium => "\\:".into(),
            SpaceKind::Thick => "\\;".into(),
            SpaceKind::NegThin => "\\!".into(),
            SpaceKind::NegMedium => "\\negmedspace".into(),
            SpaceKind::NegThick => "\\negthickspace".into(),
            SpaceKind::Quad => "\\quad".into(),
            SpaceKind::QQuad => "\\qquad".into(),
            SpaceKind::Normal => "\\ ".into(),
            SpaceKind::Nbsp => "~".into(),
            SpaceKind::Enspace => "\\enspace".into(),
            SpaceKind::Hspace(len) => format!("\\hspace{{{}}}", len),
        }
    }

    /// Width as a multiple of the em, where it is fixed
    pub fn em_width(&self) -> Option<f32> {
        Some(match self {
            SpaceKind::Thin => 3.0 / 18.0,
            SpaceKind::Medium => 4.0 / 18.0,
            SpaceKind::Thick => 5.0 / 18.0,
            SpaceKind::NegThin => -3.0 / 18.0,
            SpaceKind::NegMedium => -4.0 / 18.0,
            SpaceKind::NegThick => -5.0 / 18.0,
            SpaceKind::Quad => 1.0,
            SpaceKind::QQuad => 2.0,
            SpaceKind::Enspace => 0.5,
            SpaceKind::Normal | SpaceKind::Nbsp | SpaceKind::Hspace(_) => return None,
        })
    }

    /// Packages needed beyond plain LaTeX
    pub(crate) fn package(&self) -> Option<&'static str> {
        match self {
            SpaceKind::NegMedium | SpaceKind::NegThick => Some("amsmath"),
            _ => None,
        }
    }

    /// Pixel width in the current font
    pub(crate) fn width(&self, base: &MetricsBase<'_>) -> i32 {
        let em = base.font.size as f32;
        match self {
            SpaceKind::Normal | SpaceKind::Nbsp => {
                base.fm.char_width(&base.font.with_family(FontFamily::Roman), ' ')
            }
            SpaceKind::Hspace(len) => match parse_length(len, em, base.fm.x_height(&base.font) as f32) {
                Some(px) => px.round() as i32,
                None => {
                    tracing::warn!(length = %len, "unparsable \\hspace length, using zero");
                    0
                }
            },
            other => (other.em_width().unwrap_or(0.0) * em).round() as i32,
        }
    }

    pub fn metrics(&self, mi: &MetricsInfo<'_>) -> Dimension {
        Dimension::new(self.width(&mi.base), 0, 0)
    }
}

/// Convert a TeX length such as `1.5em` or `-2pt` into pixels.
///
/// `em` and `ex` are the pixel sizes of the font units; absolute units are
/// scaled so that 10pt equal one em.
pub fn parse_length(len: &str, em: f32, ex: f32) -> Option<f32> {
    let len = len.trim();
    let split = len
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(len.len());
    let (number, unit) = len.split_at(split);
    let number = number.trim();
    let value: f32 = match number {
        "" | "+" => 1.0,
        "-" => -1.0,
        n => n.parse().ok()?,
    };
    let pt = em / 10.0;
    let factor = match unit.trim() {
        "em" => em,
        "ex" => ex,
        "mu" => em / 18.0,
        "pt" => pt,
        "bp" => pt * 1.00375,
        "pc" => pt * 12.0,
        "mm" => pt * 2.845,
        "cm" => pt * 28.45,
        "in" => pt * 72.27,
        "px" => 1.0,
        _ => return None,
    };
    Some(value * factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorTable;
    use crate::config::EngineConfig;
    use crate::context::MathStyle;
    use crate::font::FixedFontMetrics;

    #[test]
    fn test_commands() {
        assert_eq!(SpaceKind::from_command(","), Some(SpaceKind::Thin));
        assert_eq!(SpaceKind::from_command("qquad"), Some(SpaceKind::QQuad));
        assert_eq!(SpaceKind::from_command("frac"), None);
        assert_eq!(SpaceKind::Hspace("1cm".into()).latex(), "\\hspace{1cm}");
        assert_eq!(SpaceKind::Normal.latex(), "\\ ");
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("2em", 16.0, 7.0), Some(32.0));
        assert_eq!(parse_length("-1.5ex", 16.0, 8.0), Some(-12.0));
        let pt = parse_length("10pt", 16.0, 7.0).unwrap();
        assert!((pt - 16.0).abs() < 1e-4);
        assert_eq!(parse_length("3 furlongs", 16.0, 7.0), None);
        assert_eq!(parse_length("em", 16.0, 7.0), Some(16.0));
    }

    #[test]
    fn test_widths() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        assert_eq!(SpaceKind::Quad.metrics(&mi).wid, 16);
        assert_eq!(SpaceKind::Thin.metrics(&mi).wid, 3);
        assert!(SpaceKind::NegThin.metrics(&mi).wid < 0);
        assert_eq!(SpaceKind::Hspace("bogus".into()).metrics(&mi).wid, 0);
    }
}

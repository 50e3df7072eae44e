//! Characters, numbers and text runs

use crate::context::{MetricsBase, MetricsInfo, PainterInfo};
use crate::dimension::Dimension;
use crate::font::FontFamily;

/// Single character in the math font
pub(crate) fn char_metrics(c: char, mi: &MetricsInfo<'_>) -> Dimension {
    let font = mi.base.font.for_char(c);
    mi.base.fm.char_dim(&font, c)
}

pub(crate) fn char_draw(c: char, pi: &mut PainterInfo<'_>, x: i32, y: i32) {
    let font = pi.base.font.for_char(c);
    let mut buf = [0u8; 4];
    pi.pain.text(x, y, c.encode_utf8(&mut buf), &font);
}

fn upright(base: &MetricsBase<'_>) -> crate::font::FontInfo {
    match base.font.family {
        FontFamily::Math => base.font.with_family(FontFamily::Roman),
        FontFamily::BoldMath => base.font.with_family(FontFamily::Bold),
        _ => base.font,
    }
}

/// Digit run, always upright
pub(crate) fn number_metrics(digits: &str, mi: &MetricsInfo<'_>) -> Dimension {
    mi.base.fm.string_dim(&upright(&mi.base), digits)
}

pub(crate) fn number_draw(digits: &str, pi: &mut PainterInfo<'_>, x: i32, y: i32) {
    let font = upright(&pi.base);
    pi.pain.text(x, y, digits, &font);
}

/// Text-mode run in the current font
pub(crate) fn text_metrics(text: &str, mi: &MetricsInfo<'_>) -> Dimension {
    mi.base.fm.string_dim(&upright(&mi.base), text)
}

pub(crate) fn text_draw(text: &str, pi: &mut PainterInfo<'_>, x: i32, y: i32) {
    if text.is_empty() {
        return;
    }
    let font = upright(&pi.base);
    pi.pain.text(x, y, text, &font);
}

//! Sub- and superscripts, with or without limits placement

use crate::context::{MetricsBase, MetricsInfo, PainterInfo, StyleContext};
use crate::data::MathData;
use crate::dimension::Dimension;
use crate::error::MathResult;
use crate::features::LatexFeatures;
use crate::inset::InsetMath;
use serde::{Deserialize, Serialize};

/// Vertical gap between limits and the nucleus
const LIMIT_GAP: i32 = 2;
/// Minimum gap between a subscript and a superscript
const SCRIPT_GAP: i32 = 2;

struct ScriptGeometry {
    nuc_x: i32,
    /// (x offset, baseline shift up) of the superscript
    sup: (i32, i32),
    /// (x offset, baseline shift down) of the subscript
    sub: (i32, i32),
    dim: Dimension,
}

/// A nucleus with optional sub- and superscript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptInset {
    nucleus: MathData,
    sub: Option<MathData>,
    sup: Option<MathData>,
    /// `Some(true)` for `\limits`, `Some(false)` for `\nolimits`
    pub limits: Option<bool>,
}

impl ScriptInset {
    pub fn new(nucleus: MathData) -> Self {
        Self {
            nucleus,
            sub: None,
            sup: None,
            limits: None,
        }
    }

    pub fn with_scripts(nucleus: MathData, sub: Option<MathData>, sup: Option<MathData>) -> Self {
        Self {
            nucleus,
            sub,
            sup,
            limits: None,
        }
    }

    pub fn nucleus(&self) -> &MathData {
        &self.nucleus
    }

    pub fn nucleus_mut(&mut self) -> &mut MathData {
        &mut self.nucleus
    }

    pub fn sub(&self) -> Option<&MathData> {
        self.sub.as_ref()
    }

    pub fn sup(&self) -> Option<&MathData> {
        self.sup.as_ref()
    }

    pub fn sub_mut(&mut self) -> Option<&mut MathData> {
        self.sub.as_mut()
    }

    pub fn sup_mut(&mut self) -> Option<&mut MathData> {
        self.sup.as_mut()
    }

    pub fn has_sub(&self) -> bool {
        self.sub.is_some()
    }

    pub fn has_sup(&self) -> bool {
        self.sup.is_some()
    }

    pub fn set_sub(&mut self, sub: Option<MathData>) {
        self.sub = sub;
    }

    pub fn set_sup(&mut self, sup: Option<MathData>) {
        self.sup = sup;
    }

    /// Nucleus followed by the present scripts, subscript first
    pub fn cells(&self) -> Vec<&MathData> {
        std::iter::once(&self.nucleus)
            .chain(self.sub.as_ref())
            .chain(self.sup.as_ref())
            .collect()
    }

    pub fn cells_mut(&mut self) -> Vec<&mut MathData> {
        std::iter::once(&mut self.nucleus)
            .chain(self.sub.as_mut())
            .chain(self.sup.as_mut())
            .collect()
    }

    /// Whether the nucleus is a single operator taking limits by default
    fn nucleus_takes_limits(&self) -> bool {
        match self.nucleus.atoms() {
            [atom] => matches!(
                atom.nucleus(),
                InsetMath::Symbol(s) if s.info().is_some_and(|i| i.takes_limits())
            ),
            _ => false,
        }
    }

    /// Whether scripts go above and below the nucleus in `base`'s style
    pub fn has_limits(&self, base: &MetricsBase<'_>) -> bool {
        match self.limits {
            Some(limits) => limits,
            None => base.style.is_display() && self.nucleus_takes_limits(),
        }
    }

    fn geometry(
        &self,
        base: &MetricsBase<'_>,
        nuc: Dimension,
        sub: Option<Dimension>,
        sup: Option<Dimension>,
    ) -> ScriptGeometry {
        if self.has_limits(base) {
            let sub_d = sub.unwrap_or_default();
            let sup_d = sup.unwrap_or_default();
            let wid = nuc.wid.max(sub_d.wid).max(sup_d.wid);
            let mut asc = nuc.asc;
            let mut des = nuc.des;
            let up = nuc.asc + LIMIT_GAP + sup_d.des;
            let down = nuc.des + LIMIT_GAP + sub_d.asc;
            if sup.is_some() {
                asc = up + sup_d.asc;
            }
            if sub.is_some() {
                des = down + sub_d.des;
            }
            return ScriptGeometry {
                nuc_x: (wid - nuc.wid) / 2,
                sup: ((wid - sup_d.wid) / 2, up),
                sub: ((wid - sub_d.wid) / 2, down),
                dim: Dimension::new(wid, asc, des),
            };
        }

        let xh = base.fm.x_height(&base.font);
        let sub_d = sub.unwrap_or_default();
        let sup_d = sup.unwrap_or_default();
        let up = (nuc.asc - xh / 2).max(sup_d.des + xh / 2);
        let mut down = (nuc.des + xh / 4).max(sub_d.asc - 4 * xh / 5);
        if sub.is_some() && sup.is_some() {
            let gap = (up - sup_d.des) - (sub_d.asc - down);
            if gap < SCRIPT_GAP {
                down += SCRIPT_GAP - gap;
            }
        }
        let mut asc = nuc.asc;
        let mut des = nuc.des;
        if sup.is_some() {
            asc = asc.max(up + sup_d.asc);
        }
        if sub.is_some() {
            des = des.max(down + sub_d.des);
        }
        let wid = nuc.wid + sub_d.wid.max(sup_d.wid) + 1;
        ScriptGeometry {
            nuc_x: 0,
            sup: (nuc.wid, up),
            sub: (nuc.wid, down),
            dim: Dimension::new(wid, asc, des),
        }
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let mut nuc = self.nucleus.metrics(mi);
        if self.nucleus.is_empty() {
            nuc = Dimension::default();
        }
        let (sub, sup) = (&mut self.sub, &mut self.sup);
        let (sub_d, sup_d) = mi.with_script_style(|mi| {
            (
                sub.as_mut().map(|c| c.metrics(mi)),
                sup.as_mut().map(|c| c.metrics(mi)),
            )
        });
        self.geometry(&mi.base, nuc, sub_d, sup_d).dim
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        let nuc = if self.nucleus.is_empty() {
            Dimension::default()
        } else {
            self.nucleus.dimension()?
        };
        let sub = self.sub.as_ref().map(MathData::dimension).transpose()?;
        let sup = self.sup.as_ref().map(MathData::dimension).transpose()?;
        let g = self.geometry(&pi.base, nuc, sub, sup);

        if !self.nucleus.is_empty() {
            self.nucleus.draw(pi, x + g.nuc_x, y)?;
        }
        pi.with_script_style(|pi| -> MathResult<()> {
            if let Some(sup) = &self.sup {
                sup.draw(pi, x + g.sup.0, y - g.sup.1)?;
            }
            if let Some(sub) = &self.sub {
                sub.draw(pi, x + g.sub.0, y + g.sub.1)?;
            }
            Ok(())
        })
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        if self.limits == Some(true) || (self.limits.is_none() && self.nucleus_takes_limits()) {
            features.add_css("limits");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorTable;
    use crate::config::EngineConfig;
    use crate::context::MathStyle;
    use crate::font::FixedFontMetrics;
    use crate::inset::SymbolInset;
    use crate::painter::RecordingPainter;

    fn cell(s: &str) -> MathData {
        s.chars().map(InsetMath::Char).collect()
    }

    fn sum() -> MathData {
        let mut cell = MathData::new();
        cell.push(InsetMath::Symbol(SymbolInset::new("sum").unwrap()));
        cell
    }

    #[test]
    fn test_superscript_raised_subscript_lowered() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let mut s = ScriptInset::with_scripts(cell("x"), Some(cell("i")), Some(cell("n")));
        let dim = s.metrics(&mut mi);
        let nuc = s.nucleus().dimension().unwrap();
        assert!(dim.asc > nuc.asc);
        assert!(dim.des > nuc.des);
        assert!(dim.wid > nuc.wid);

        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        s.draw(&mut pi, 0, 50).unwrap();
        let (xx, _) = painter.text_position("x").unwrap();
        let (nx, ny) = painter.text_position("n").unwrap();
        let (ix, iy) = painter.text_position("i").unwrap();
        assert_eq!(nx, ix);
        assert!(nx > xx);
        assert!(ny < 50 && iy > 50);
    }

    #[test]
    fn test_scripts_use_smaller_style() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let mut s = ScriptInset::with_scripts(cell("x"), None, Some(cell("x")));
        s.metrics(&mut mi);
        let nuc = s.nucleus().dimension().unwrap();
        let sup = s.sup().unwrap().dimension().unwrap();
        assert!(sup.wid < nuc.wid);
        assert_eq!(mi.base.style, MathStyle::Text);
    }

    #[test]
    fn test_limits_in_display_only() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut s = ScriptInset::with_scripts(sum(), Some(cell("i")), Some(cell("n")));

        let display = MetricsInfo::new(&fm, &config, &colors, MathStyle::Display);
        let text = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        assert!(s.has_limits(&display.base));
        assert!(!s.has_limits(&text.base));

        s.limits = Some(false);
        assert!(!s.has_limits(&display.base));
        s.limits = Some(true);
        assert!(s.has_limits(&text.base));
    }

    #[test]
    fn test_limits_are_centred() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Display);
        let mut s = ScriptInset::with_scripts(sum(), Some(cell("i")), Some(cell("n")));
        let dim = s.metrics(&mut mi);
        let nuc = s.nucleus().dimension().unwrap();
        assert_eq!(dim.wid, nuc.wid);

        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Display);
        s.draw(&mut pi, 0, 80).unwrap();
        let (nx, ny) = painter.text_position("n").unwrap();
        let (_, iy) = painter.text_position("i").unwrap();
        assert!(nx > 0);
        assert!(ny < 80 - nuc.asc);
        assert!(iy > 80 + nuc.des);
    }

    #[test]
    fn test_empty_nucleus_takes_no_space() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let mut s = ScriptInset::with_scripts(MathData::new(), None, Some(cell("2")));
        let dim = s.metrics(&mut mi);
        let sup = s.sup().unwrap().dimension().unwrap();
        assert_eq!(dim.wid, sup.wid + 1);
    }
}

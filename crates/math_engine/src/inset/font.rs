//! Font changes: `\mathbf{..}`, `\text{..}`, `\boldsymbol{..}`, ...

use crate::context::{MetricsInfo, PainterInfo, StyleContext};
use crate::data::MathData;
use crate::dimension::Dimension;
use crate::error::MathResult;
use crate::features::LatexFeatures;
use crate::font::FontFamily;
use serde::{Deserialize, Serialize};

/// Font switching commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontCommand {
    MathRm,
    MathIt,
    MathBf,
    MathSf,
    MathTt,
    MathCal,
    MathBb,
    MathFrak,
    MathNormal,
    /// amsmath `\text`
    Text,
    TextRm,
    TextIt,
    TextBf,
    TextSf,
    TextTt,
    TextNormal,
}

const COMMANDS: &[(&str, FontCommand)] = &[
    ("mathrm", FontCommand::MathRm),
    ("mathit", FontCommand::MathIt),
    ("mathbf", FontCommand::MathBf),
    ("mathsf", FontCommand::MathSf),
    ("mathtt", FontCommand::MathTt),
    ("mathcal", FontCommand::MathCal),
    ("mathbb", FontCommand::MathBb),
    ("mathfrak", FontCommand::MathFrak),
    ("mathnormal", FontCommand::MathNormal),
    ("text", FontCommand::Text),
    ("textrm", FontCommand::TextRm),
    ("textit", FontCommand::TextIt),
    ("textbf", FontCommand::TextBf),
    ("textsf", FontCommand::TextSf),
    ("texttt", FontCommand::TextTt),
    ("textnormal", FontCommand::TextNormal),
];

impl FontCommand {
    pub fn from_name(name: &str) -> Option<Self> {
        COMMANDS.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
    }

    pub fn name(&self) -> &'static str {
        COMMANDS
            .iter()
            .find(|(_, c)| c == self)
            .map(|(n, _)| *n)
            .unwrap_or("mathrm")
    }

    pub fn family(&self) -> FontFamily {
        match self {
            FontCommand::MathRm
            | FontCommand::Text
            | FontCommand::TextRm
            | FontCommand::TextNormal => FontFamily::Roman,
            FontCommand::MathIt | FontCommand::TextIt => FontFamily::Italic,
            FontCommand::MathBf | FontCommand::TextBf => FontFamily::Bold,
            FontCommand::MathSf | FontCommand::TextSf => FontFamily::SansSerif,
            FontCommand::MathTt | FontCommand::TextTt => FontFamily::Typewriter,
            FontCommand::MathCal => FontFamily::Calligraphic,
            FontCommand::MathBb => FontFamily::Blackboard,
            FontCommand::MathFrak => FontFamily::Fraktur,
            FontCommand::MathNormal => FontFamily::Math,
        }
    }

    /// Argument is LaTeX text mode
    pub fn is_text_mode(&self) -> bool {
        matches!(
            self,
            FontCommand::Text
                | FontCommand::TextRm
                | FontCommand::TextIt
                | FontCommand::TextBf
                | FontCommand::TextSf
                | FontCommand::TextTt
                | FontCommand::TextNormal
        )
    }

    fn package(&self) -> Option<&'static str> {
        match self {
            FontCommand::MathBb | FontCommand::MathFrak => Some("amssymb"),
            FontCommand::Text => Some("amsmath"),
            _ => None,
        }
    }

    /// HTML class for the alphabets plain markup has no element for
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            FontCommand::MathCal => Some("mathcal"),
            FontCommand::MathBb => Some("mathbb"),
            FontCommand::MathFrak => Some("mathfrak"),
            _ => None,
        }
    }
}

/// Cell set in a different font family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontInset {
    pub command: FontCommand,
    cell: MathData,
}

impl FontInset {
    pub fn new(command: FontCommand, cell: MathData) -> Self {
        Self { command, cell }
    }

    pub fn cell(&self) -> &MathData {
        &self.cell
    }

    pub fn cell_mut(&mut self) -> &mut MathData {
        &mut self.cell
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let cell = &mut self.cell;
        mi.with_font_family(self.command.family(), |mi| cell.metrics(mi))
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        pi.with_font_family(self.command.family(), |pi| self.cell.draw(pi, x, y))
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        if let Some(package) = self.command.package() {
            features.require(package);
        }
        if let Some(class) = self.command.css_class() {
            features.add_css(class);
        }
    }
}

/// Bold symbol commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoldSymbolKind {
    /// `\bm` from the bm package
    Bm,
    /// amsmath `\boldsymbol`
    Boldsymbol,
}

impl BoldSymbolKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bm" => Some(BoldSymbolKind::Bm),
            "boldsymbol" => Some(BoldSymbolKind::Boldsymbol),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoldSymbolKind::Bm => "bm",
            BoldSymbolKind::Boldsymbol => "boldsymbol",
        }
    }
}

/// Cell in bold math, keeping letters italic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoldSymbolInset {
    pub kind: BoldSymbolKind,
    cell: MathData,
}

impl BoldSymbolInset {
    pub fn new(kind: BoldSymbolKind, cell: MathData) -> Self {
        Self { kind, cell }
    }

    pub fn cell(&self) -> &MathData {
        &self.cell
    }

    pub fn cell_mut(&mut self) -> &mut MathData {
        &mut self.cell
    }

    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let cell = &mut self.cell;
        mi.with_font_family(FontFamily::BoldMath, |mi| cell.metrics(mi))
    }

    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        pi.with_font_family(FontFamily::BoldMath, |pi| self.cell.draw(pi, x, y))
    }

    pub fn validate(&self, features: &mut LatexFeatures) {
        features.require(match self.kind {
            BoldSymbolKind::Bm => "bm",
            BoldSymbolKind::Boldsymbol => "amsmath",
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorTable;
    use crate::config::EngineConfig;
    use crate::context::MathStyle;
    use crate::font::FixedFontMetrics;
    use crate::inset::InsetMath;
    use crate::painter::{PaintOp, RecordingPainter};

    fn cell(s: &str) -> MathData {
        s.chars().map(InsetMath::Char).collect()
    }

    fn drawn_family(inset: &InsetMath) -> FontFamily {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut inset = inset.clone();
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        inset.metrics(&mut mi);
        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        inset.draw(&mut pi, 0, 10).unwrap();
        assert_eq!(pi.base.font.family, FontFamily::Math);
        match painter.ops() {
            [PaintOp::Text { font, .. }] => font.family,
            other => panic!("unexpected ops {:?}", other),
        }
    }

    #[test]
    fn test_names_round_trip() {
        for (name, cmd) in COMMANDS {
            assert_eq!(FontCommand::from_name(name), Some(*cmd));
            assert_eq!(cmd.name(), *name);
        }
        assert!(FontCommand::from_name("mathbold").is_none());
    }

    #[test]
    fn test_family_applies_to_cell_only() {
        let bf = InsetMath::Font(FontInset::new(FontCommand::MathBf, cell("x")));
        assert_eq!(drawn_family(&bf), FontFamily::Bold);
        let bold = InsetMath::BoldSymbol(BoldSymbolInset::new(BoldSymbolKind::Bm, cell("x")));
        assert_eq!(drawn_family(&bold), FontFamily::BoldMath);
    }

    #[test]
    fn test_packages() {
        let mut f = LatexFeatures::new();
        FontInset::new(FontCommand::MathBb, MathData::new()).validate(&mut f);
        BoldSymbolInset::new(BoldSymbolKind::Bm, MathData::new()).validate(&mut f);
        assert!(f.is_required("amssymb"));
        assert!(f.is_required("bm"));
        assert!(!f.is_required("amsmath"));
    }
}

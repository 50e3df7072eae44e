//! Cells: ordered sequences of atoms
//!
//! A [`MathData`] is one argument slot of a node (a numerator, a matrix
//! cell, ...). After [`MathData::metrics`] it caches its dimension and the x
//! offset of every atom; any edit drops that cache and the geometry queries
//! fail with [`MathError::StaleLayout`] until the next metrics pass.

use crate::atom::MathAtom;
use crate::color::ColorRole;
use crate::context::{MetricsBase, MetricsInfo, PainterInfo};
use crate::dimension::Dimension;
use crate::error::{MathError, MathResult};
use crate::features::LatexFeatures;
use crate::inset::InsetMath;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

// =============================================================================
// Layout cache
// =============================================================================

/// Layout data owned by a node or cell.
///
/// The cache never survives a clone and never takes part in equality, so
/// copies always start without geometry.
pub(crate) struct Cached<T>(Option<T>);

impl<T> Cached<T> {
    pub(crate) fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub(crate) fn set(&mut self, value: T) {
        self.0 = Some(value);
    }

    pub(crate) fn clear(&mut self) {
        self.0 = None;
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.0.is_some()
    }
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> Clone for Cached<T> {
    fn clone(&self) -> Self {
        Self(None)
    }
}

impl<T> PartialEq for Cached<T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T> fmt::Debug for Cached<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_valid() { "Cached(valid)" } else { "Cached(none)" })
    }
}

#[derive(Debug)]
struct CellLayout {
    dim: Dimension,
    /// Offset of every atom boundary, `len() + 1` entries
    xs: Vec<i32>,
}

// =============================================================================
// MathData
// =============================================================================

/// An ordered, editable sequence of atoms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MathData {
    atoms: Vec<MathAtom>,
    #[serde(skip)]
    layout: Cached<CellLayout>,
}

impl MathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_atoms(atoms: Vec<MathAtom>) -> Self {
        Self {
            atoms,
            layout: Cached::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn atoms(&self) -> &[MathAtom] {
        &self.atoms
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MathAtom> {
        self.atoms.iter()
    }

    pub fn get(&self, pos: usize) -> Option<&MathAtom> {
        self.atoms.get(pos)
    }

    pub fn front(&self) -> Option<&MathAtom> {
        self.atoms.first()
    }

    pub fn back(&self) -> Option<&MathAtom> {
        self.atoms.last()
    }

    /// Mutable access to one atom; drops the cached layout
    pub fn atom_mut(&mut self, pos: usize) -> Option<&mut MathAtom> {
        self.layout.clear();
        self.atoms.get_mut(pos)
    }

    /// Mutable access to the last atom; drops the cached layout
    pub fn back_mut(&mut self) -> Option<&mut MathAtom> {
        self.layout.clear();
        self.atoms.last_mut()
    }

    /// Mutable access to all atoms; drops the cached layout
    pub fn atoms_mut(&mut self) -> &mut [MathAtom] {
        self.layout.clear();
        &mut self.atoms
    }

    pub fn into_atoms(self) -> Vec<MathAtom> {
        self.atoms
    }

    // =========================================================================
    // Edits
    // =========================================================================

    fn check_pos(&self, pos: usize) -> MathResult<()> {
        if pos > self.atoms.len() {
            return Err(MathError::InvalidStructure(format!(
                "position {} outside cell of length {}",
                pos,
                self.atoms.len()
            )));
        }
        Ok(())
    }

    pub fn insert(&mut self, pos: usize, atom: MathAtom) -> MathResult<()> {
        self.check_pos(pos)?;
        self.layout.clear();
        self.atoms.insert(pos, atom);
        Ok(())
    }

    /// Insert all atoms of `data` at `pos`
    pub fn insert_data(&mut self, pos: usize, data: MathData) -> MathResult<()> {
        self.check_pos(pos)?;
        self.layout.clear();
        self.atoms.splice(pos..pos, data.atoms);
        Ok(())
    }

    pub fn erase(&mut self, pos: usize) -> MathResult<MathAtom> {
        if pos >= self.atoms.len() {
            return Err(MathError::InvalidStructure(format!(
                "cannot erase position {} of cell with {} atoms",
                pos,
                self.atoms.len()
            )));
        }
        self.layout.clear();
        Ok(self.atoms.remove(pos))
    }

    /// Erase the atoms in `from..to`
    pub fn erase_range(&mut self, from: usize, to: usize) -> MathResult<()> {
        if from > to {
            return Err(MathError::InvalidStructure(format!(
                "empty erase range {}..{}",
                from, to
            )));
        }
        self.check_pos(to)?;
        self.layout.clear();
        self.atoms.drain(from..to);
        Ok(())
    }

    pub fn append(&mut self, data: MathData) {
        self.layout.clear();
        self.atoms.extend(data.atoms);
    }

    pub fn push_back(&mut self, atom: MathAtom) {
        self.layout.clear();
        self.atoms.push(atom);
    }

    /// Append a node
    pub fn push(&mut self, inset: InsetMath) {
        self.push_back(MathAtom::new(inset));
    }

    pub fn pop_back(&mut self) -> Option<MathAtom> {
        self.layout.clear();
        self.atoms.pop()
    }

    pub fn clear(&mut self) {
        self.layout.clear();
        self.atoms.clear();
    }

    // =========================================================================
    // Structural matching
    // =========================================================================

    /// Whether `needle` occurs at `pos`
    pub fn match_at(&self, pos: usize, needle: &MathData) -> bool {
        let end = pos + needle.len();
        end <= self.len() && self.atoms[pos..end] == needle.atoms[..]
    }

    /// First position of `needle` in this cell
    pub fn find(&self, needle: &MathData) -> Option<usize> {
        if needle.len() > self.len() {
            return None;
        }
        (0..=self.len() - needle.len()).find(|&pos| self.match_at(pos, needle))
    }

    /// Whether `needle` occurs in this cell or any nested cell
    pub fn contains(&self, needle: &MathData) -> bool {
        self.find(needle).is_some()
            || self
                .atoms
                .iter()
                .any(|atom| atom.cells().into_iter().any(|cell| cell.contains(needle)))
    }

    /// Replace every occurrence of `from` by `to`, here and in nested cells.
    ///
    /// Returns the number of replacements.
    pub fn replace(&mut self, from: &MathData, to: &MathData) -> usize {
        if from.is_empty() {
            return 0;
        }
        self.layout.clear();
        let mut count = 0;
        for atom in &mut self.atoms {
            for cell in atom.nucleus_mut().cells_mut() {
                count += cell.replace(from, to);
            }
        }
        let mut pos = 0;
        while pos + from.len() <= self.atoms.len() {
            if self.match_at(pos, from) {
                self.atoms
                    .splice(pos..pos + from.len(), to.atoms.iter().cloned());
                pos += to.len();
                count += 1;
            } else {
                pos += 1;
            }
        }
        count
    }

    // =========================================================================
    // Metrics and drawing
    // =========================================================================

    /// Lay out the cell and cache its geometry
    pub fn metrics(&mut self, mi: &mut MetricsInfo<'_>) -> Dimension {
        let mut dim = Dimension::default();
        let mut xs = Vec::with_capacity(self.atoms.len() + 1);

        if self.atoms.is_empty() {
            if mi.base.config.show_placeholders {
                dim = placeholder_dim(&mi.base);
            }
            xs.push(0);
        } else {
            let mut x = 0;
            for i in 0..self.atoms.len() {
                x -= self.kerning(i, &mi.base);
                xs.push(x);
                let d = self.atoms[i].nucleus_mut().metrics(mi);
                x += d.wid;
                dim.asc = dim.asc.max(d.asc);
                dim.des = dim.des.max(d.des);
            }
            xs.push(x);
            dim.wid = x;
        }

        tracing::trace!(atoms = self.atoms.len(), ?dim, "cell metrics");
        self.layout.set(CellLayout { dim, xs });
        dim
    }

    /// Primes hug the preceding atom
    fn kerning(&self, pos: usize, base: &MetricsBase<'_>) -> i32 {
        if pos > 0 && matches!(self.atoms[pos].nucleus(), InsetMath::Char('\'')) {
            base.em() / 8
        } else {
            0
        }
    }

    /// Draw the cell with its baseline at `y`
    pub fn draw(&self, pi: &mut PainterInfo<'_>, x: i32, y: i32) -> MathResult<()> {
        let layout = self
            .layout
            .get()
            .ok_or(MathError::StaleLayout("MathData::draw"))?;

        if self.atoms.is_empty() {
            if pi.base.config.show_placeholders && layout.dim.wid > 0 {
                let color = pi.base.role(ColorRole::Placeholder);
                pi.pain.rectangle(
                    x,
                    y - layout.dim.asc,
                    layout.dim.wid,
                    layout.dim.height(),
                    color,
                );
            }
            return Ok(());
        }

        for (atom, dx) in self.atoms.iter().zip(&layout.xs) {
            atom.draw(pi, x + dx, y)?;
        }
        Ok(())
    }

    /// Dimension from the last metrics pass
    pub fn dimension(&self) -> MathResult<Dimension> {
        self.layout
            .get()
            .map(|l| l.dim)
            .ok_or(MathError::StaleLayout("MathData::dimension"))
    }

    /// Whether the cached geometry is valid
    pub fn has_layout(&self) -> bool {
        self.layout.is_valid()
    }

    /// X offset of cursor position `pos`
    pub fn pos2x(&self, pos: usize) -> MathResult<i32> {
        let layout = self
            .layout
            .get()
            .ok_or(MathError::StaleLayout("MathData::pos2x"))?;
        layout.xs.get(pos).copied().ok_or_else(|| {
            MathError::InvalidStructure(format!(
                "position {} outside cell of length {}",
                pos,
                self.atoms.len()
            ))
        })
    }

    /// Cursor position closest to the x offset `x`
    pub fn x2pos(&self, x: i32) -> MathResult<usize> {
        let layout = self
            .layout
            .get()
            .ok_or(MathError::StaleLayout("MathData::x2pos"))?;
        let mut best = 0;
        for (pos, &px) in layout.xs.iter().enumerate() {
            if (px - x).abs() < (layout.xs[best] - x).abs() {
                best = pos;
            }
        }
        Ok(best)
    }

    /// Collect LaTeX requirements of all atoms
    pub fn validate(&self, features: &mut LatexFeatures) {
        for atom in &self.atoms {
            atom.validate(features);
        }
    }
}

fn placeholder_dim(base: &MetricsBase<'_>) -> Dimension {
    Dimension::new(
        base.fm.char_width(&base.font, 'x') + 2,
        base.fm.x_height(&base.font) + 1,
        1,
    )
}

impl Index<usize> for MathData {
    type Output = MathAtom;

    fn index(&self, pos: usize) -> &MathAtom {
        &self.atoms[pos]
    }
}

impl From<Vec<MathAtom>> for MathData {
    fn from(atoms: Vec<MathAtom>) -> Self {
        Self::from_atoms(atoms)
    }
}

impl FromIterator<MathAtom> for MathData {
    fn from_iter<I: IntoIterator<Item = MathAtom>>(iter: I) -> Self {
        Self::from_atoms(iter.into_iter().collect())
    }
}

impl FromIterator<InsetMath> for MathData {
    fn from_iter<I: IntoIterator<Item = InsetMath>>(iter: I) -> Self {
        Self::from_atoms(iter.into_iter().map(MathAtom::new).collect())
    }
}

impl<'a> IntoIterator for &'a MathData {
    type Item = &'a MathAtom;
    type IntoIter = std::slice::Iter<'a, MathAtom>;

    fn into_iter(self) -> Self::IntoIter {
        self.atoms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorTable;
    use crate::config::EngineConfig;
    use crate::context::MathStyle;
    use crate::font::FixedFontMetrics;
    use crate::inset::FracInset;
    use crate::painter::RecordingPainter;

    fn chars(s: &str) -> MathData {
        s.chars().map(InsetMath::Char).collect()
    }

    #[test]
    fn test_edits() {
        let mut cell = chars("ac");
        cell.insert(1, MathAtom::new(InsetMath::Char('b'))).unwrap();
        assert_eq!(cell, chars("abc"));
        assert!(cell.insert(9, MathAtom::new(InsetMath::Char('z'))).is_err());

        cell.insert_data(3, chars("de")).unwrap();
        assert_eq!(cell, chars("abcde"));

        cell.erase_range(1, 3).unwrap();
        assert_eq!(cell, chars("ade"));
        assert_eq!(cell.erase(0).unwrap().into_inner(), InsetMath::Char('a'));
        assert!(cell.erase(5).is_err());

        cell.append(chars("f"));
        assert_eq!(cell, chars("def"));
    }

    #[test]
    fn test_find_and_match() {
        let cell = chars("abcabc");
        assert_eq!(cell.find(&chars("ca")), Some(2));
        assert!(cell.match_at(3, &chars("abc")));
        assert!(!cell.match_at(4, &chars("abc")));
        assert_eq!(cell.find(&chars("x")), None);
    }

    #[test]
    fn test_contains_and_replace_nested() {
        let mut cell = chars("x");
        cell.push(InsetMath::Frac(FracInset::new(chars("ab"), chars("b"))));
        assert!(cell.contains(&chars("ab")));
        assert!(!cell.contains(&chars("ba")));

        let replaced = cell.replace(&chars("b"), &chars("bb"));
        assert_eq!(replaced, 2);
        assert!(cell.contains(&chars("abb")));
    }

    #[test]
    fn test_geometry_requires_metrics() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut cell = chars("xy");

        assert!(matches!(cell.pos2x(0), Err(MathError::StaleLayout(_))));

        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        let dim = cell.metrics(&mut mi);
        assert_eq!(cell.pos2x(0).unwrap(), 0);
        assert_eq!(cell.pos2x(2).unwrap(), dim.wid);
        assert_eq!(cell.x2pos(dim.wid + 50).unwrap(), 2);
        assert_eq!(cell.x2pos(-4).unwrap(), 0);

        cell.push(InsetMath::Char('z'));
        assert!(!cell.has_layout());
        let mut painter = RecordingPainter::new();
        let mut pi = PainterInfo::new(&mut painter, &fm, &config, &colors, MathStyle::Text);
        assert!(matches!(
            cell.draw(&mut pi, 0, 0),
            Err(MathError::StaleLayout(_))
        ));
    }

    #[test]
    fn test_clone_drops_layout() {
        let fm = FixedFontMetrics::new();
        let config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut cell = chars("x");
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        cell.metrics(&mut mi);
        assert!(cell.has_layout());
        let copy = cell.clone();
        assert!(!copy.has_layout());
        assert_eq!(copy, cell);
    }

    #[test]
    fn test_empty_cell_placeholder() {
        let fm = FixedFontMetrics::new();
        let mut config = EngineConfig::default();
        let colors = ColorTable::default();
        let mut cell = MathData::new();

        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        assert!(cell.metrics(&mut mi).wid > 0);

        config.show_placeholders = false;
        let mut mi = MetricsInfo::new(&fm, &config, &colors, MathStyle::Text);
        assert_eq!(cell.metrics(&mut mi), Dimension::default());
    }
}

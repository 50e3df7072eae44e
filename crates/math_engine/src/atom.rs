//! Owning handle around a single math node

use crate::inset::InsetMath;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// One node of the math tree.
///
/// Cloning deep-copies the node and all of its cells, so two cells never
/// share mutable node state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MathAtom(Box<InsetMath>);

impl MathAtom {
    pub fn new(inset: InsetMath) -> Self {
        Self(Box::new(inset))
    }

    /// Read access to the node
    pub fn nucleus(&self) -> &InsetMath {
        &self.0
    }

    /// Write access to the node
    pub fn nucleus_mut(&mut self) -> &mut InsetMath {
        &mut self.0
    }

    pub fn into_inner(self) -> InsetMath {
        *self.0
    }
}

impl Deref for MathAtom {
    type Target = InsetMath;

    fn deref(&self) -> &InsetMath {
        &self.0
    }
}

impl From<InsetMath> for MathAtom {
    fn from(inset: InsetMath) -> Self {
        Self::new(inset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MathData;
    use crate::inset::SqrtInset;

    #[test]
    fn test_clone_is_deep() {
        let mut cell = MathData::new();
        cell.push_back(MathAtom::new(InsetMath::Char('x')));
        let original = MathAtom::new(InsetMath::Sqrt(SqrtInset::new(cell)));

        let mut copy = original.clone();
        if let InsetMath::Sqrt(sqrt) = copy.nucleus_mut() {
            sqrt.cell_mut().push_back(MathAtom::new(InsetMath::Char('y')));
        }

        assert_ne!(original, copy);
        match original.nucleus() {
            InsetMath::Sqrt(sqrt) => assert_eq!(sqrt.cell().len(), 1),
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_deref_and_into_inner() {
        let atom = MathAtom::from(InsetMath::Char('a'));
        assert_eq!(atom.kind_name(), "char");
        assert_eq!(atom.into_inner(), InsetMath::Char('a'));
    }
}

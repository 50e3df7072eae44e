//! Box dimensions in pixels

use serde::{Deserialize, Serialize};

/// Ascent, descent and width of a laid out box, in pixels at the current font size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimension {
    /// Distance from the baseline to the top
    pub asc: i32,
    /// Distance from the baseline to the bottom
    pub des: i32,
    /// Horizontal extent
    pub wid: i32,
}

impl Dimension {
    pub fn new(wid: i32, asc: i32, des: i32) -> Self {
        Self { asc, des, wid }
    }

    pub fn height(&self) -> i32 {
        self.asc + self.des
    }

    /// Horizontal concatenation: widths add, ascent and descent take the maximum
    pub fn append(&mut self, other: &Dimension) {
        self.wid += other.wid;
        self.asc = self.asc.max(other.asc);
        self.des = self.des.max(other.des);
    }

    /// Enlarge to cover `other` (widths take the maximum as well)
    pub fn union(&mut self, other: &Dimension) {
        self.wid = self.wid.max(other.wid);
        self.asc = self.asc.max(other.asc);
        self.des = self.des.max(other.des);
    }

    /// Clamp ascent and descent at zero
    pub fn clamped(mut self) -> Self {
        self.asc = self.asc.max(0);
        self.des = self.des.max(0);
        self.wid = self.wid.max(0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_union() {
        let mut d = Dimension::new(10, 8, 2);
        d.append(&Dimension::new(5, 12, 1));
        assert_eq!(d, Dimension::new(15, 12, 2));
        d.union(&Dimension::new(30, 1, 6));
        assert_eq!(d, Dimension::new(30, 12, 6));
        assert_eq!(d.height(), 18);
    }

    #[test]
    fn test_clamped() {
        assert_eq!(Dimension::new(-1, -2, 3).clamped(), Dimension::new(0, 0, 3));
    }
}

//! Structuring elements for binary morphology

use sitegrade_core::{Error, Result};

/// Shape of a structuring element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StructuringElement {
    /// Square of side `2r + 1`
    Square(usize),
    /// Plus-shaped element with arms of length `r`
    Cross(usize),
    /// Cells within Euclidean distance `r` of the center
    Disk(usize),
}

impl Default for StructuringElement {
    fn default() -> Self {
        StructuringElement::Square(1)
    }
}

impl StructuringElement {
    /// Reject elements that reduce to the center cell only
    pub fn validate(&self) -> Result<()> {
        if self.radius() > 0 {
            Ok(())
        } else {
            Err(Error::invalid_parameter(
                "radius",
                0,
                "structuring element radius must be at least 1",
            ))
        }
    }

    /// Largest offset from the center along either axis
    pub fn radius(&self) -> usize {
        match *self {
            StructuringElement::Square(r)
            | StructuringElement::Cross(r)
            | StructuringElement::Disk(r) => r,
        }
    }

    /// Whether offset (dr, dc) belongs to the element
    pub fn contains(&self, dr: isize, dc: isize) -> bool {
        let r = self.radius() as isize;
        match *self {
            StructuringElement::Square(_) => dr.abs() <= r && dc.abs() <= r,
            StructuringElement::Cross(_) => (dr == 0 && dc.abs() <= r) || (dc == 0 && dr.abs() <= r),
            StructuringElement::Disk(_) => dr * dr + dc * dc <= r * r,
        }
    }

    /// (dr, dc) offsets of all member cells, center included
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let r = self.radius() as isize;
        (-r..=r)
            .flat_map(|dr| (-r..=r).map(move |dc| (dr, dc)))
            .filter(|&(dr, dc)| self.contains(dr, dc))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_counts() {
        assert_eq!(StructuringElement::Square(1).offsets().len(), 9);
        assert_eq!(StructuringElement::Cross(1).offsets().len(), 5);
        assert_eq!(StructuringElement::Disk(1).offsets().len(), 5);
        assert_eq!(StructuringElement::Disk(2).offsets().len(), 13);
    }

    #[test]
    fn test_cross_arms() {
        let cross = StructuringElement::Cross(2);
        assert!(cross.contains(0, -2) && cross.contains(2, 0));
        assert!(!cross.contains(1, 1));
    }

    #[test]
    fn test_validation() {
        assert!(StructuringElement::Square(0).validate().is_err());
        assert!(StructuringElement::Disk(0).validate().is_err());
        assert!(StructuringElement::default().validate().is_ok());
    }
}

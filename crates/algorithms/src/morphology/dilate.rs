//! Binary dilation

use sitegrade_core::raster::Mask;
use sitegrade_core::{Algorithm, Error, Result};

use super::{binary_filter, StructuringElement};

/// Parameters for binary dilation
#[derive(Debug, Clone, Default)]
pub struct DilateParams {
    /// Structuring element shape
    pub element: StructuringElement,
}

/// Dilation algorithm
#[derive(Debug, Clone, Default)]
pub struct Dilate;

impl Algorithm for Dilate {
    type Input = Mask;
    type Output = Mask;
    type Params = DilateParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Dilate"
    }

    fn description(&self) -> &'static str {
        "Binary dilation over a structuring element"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        binary_dilate(&input, &params.element)
    }
}

/// Dilate a mask: a cell becomes set when any in-grid cell under the
/// element is set.
///
/// With a [`StructuringElement::Disk`] this is a raster buffer of the set
/// region, in cells.
pub fn binary_dilate(mask: &Mask, element: &StructuringElement) -> Result<Mask> {
    binary_filter(mask, element, false)
}

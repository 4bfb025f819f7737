//! Binary erosion

use sitegrade_core::raster::Mask;
use sitegrade_core::{Algorithm, Error, Result};

use super::{binary_filter, StructuringElement};

/// Parameters for binary erosion
#[derive(Debug, Clone, Default)]
pub struct ErodeParams {
    /// Structuring element shape
    pub element: StructuringElement,
}

/// Erosion algorithm
#[derive(Debug, Clone, Default)]
pub struct Erode;

impl Algorithm for Erode {
    type Input = Mask;
    type Output = Mask;
    type Params = ErodeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Erode"
    }

    fn description(&self) -> &'static str {
        "Binary erosion over a structuring element"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        binary_erode(&input, &params.element)
    }
}

/// Erode a mask: a cell stays set only when all in-grid cells under the
/// element are set.
pub fn binary_erode(mask: &Mask, element: &StructuringElement) -> Result<Mask> {
    binary_filter(mask, element, true)
}

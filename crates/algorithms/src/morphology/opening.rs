//! Binary opening (erosion followed by dilation)

use sitegrade_core::raster::Mask;
use sitegrade_core::{Algorithm, Error, Result};

use super::{binary_dilate, binary_erode, StructuringElement};

/// Parameters for binary opening
#[derive(Debug, Clone, Default)]
pub struct OpeningParams {
    pub element: StructuringElement,
}

/// Opening algorithm
#[derive(Debug, Clone, Default)]
pub struct Opening;

impl Algorithm for Opening {
    type Input = Mask;
    type Output = Mask;
    type Params = OpeningParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Opening"
    }

    fn description(&self) -> &'static str {
        "Binary opening: erosion followed by dilation"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        binary_opening(&input, &params.element)
    }
}

/// Remove set features smaller than the element.
pub fn binary_opening(mask: &Mask, element: &StructuringElement) -> Result<Mask> {
    let eroded = binary_erode(mask, element)?;
    binary_dilate(&eroded, element)
}

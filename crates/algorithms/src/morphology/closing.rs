//! Binary closing (dilation followed by erosion)

use sitegrade_core::raster::Mask;
use sitegrade_core::{Algorithm, Error, Result};

use super::{binary_dilate, binary_erode, StructuringElement};

/// Parameters for binary closing
#[derive(Debug, Clone, Default)]
pub struct ClosingParams {
    pub element: StructuringElement,
}

/// Closing algorithm
#[derive(Debug, Clone, Default)]
pub struct Closing;

impl Algorithm for Closing {
    type Input = Mask;
    type Output = Mask;
    type Params = ClosingParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Closing"
    }

    fn description(&self) -> &'static str {
        "Binary closing: dilation followed by erosion"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        binary_closing(&input, &params.element)
    }
}

/// Bridge unset gaps narrower than the element.
pub fn binary_closing(mask: &Mask, element: &StructuringElement) -> Result<Mask> {
    let dilated = binary_dilate(mask, element)?;
    binary_erode(&dilated, element)
}

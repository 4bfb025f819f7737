//! Slope calculation from DEMs
//!
//! Horn (1981) weighted finite differences over a 3x3 neighborhood, with
//! separate east-west and north-south cell extents in meters.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use sitegrade_core::raster::Raster;
use sitegrade_core::{Algorithm, Error, Result};

use super::{horn_gradient, window3, CellSize};
use crate::maybe_rayon::*;

/// Units for slope output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeUnits {
    /// Degrees (0-90)
    #[default]
    Degrees,
    /// Percent grade, `tan(slope) * 100`
    Percent,
    /// Radians (0-π/2)
    Radians,
}

impl SlopeUnits {
    fn convert(self, radians: f64) -> f64 {
        match self {
            SlopeUnits::Degrees => radians.to_degrees(),
            SlopeUnits::Percent => radians.tan() * 100.0,
            SlopeUnits::Radians => radians,
        }
    }
}

/// Parameters for slope calculation
#[derive(Debug, Clone, Default)]
pub struct SlopeParams {
    /// Output units
    pub units: SlopeUnits,
    /// Cell extents override; derived from the grid when `None`
    pub cell_size: Option<CellSize>,
}

/// Slope algorithm
#[derive(Debug, Clone, Default)]
pub struct Slope;

impl Algorithm for Slope {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = SlopeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Slope"
    }

    fn description(&self) -> &'static str {
        "Calculate slope (rate of change of elevation) from a DEM using Horn's method"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        slope(&input, params)
    }
}

/// Calculate slope from a DEM
///
/// ```text
/// a b c
/// d e f
/// g h i
/// ```
///
/// dz/dx = ((c + 2f + i) - (a + 2d + g)) / (8 * dx)
/// dz/dy = ((a + 2b + c) - (g + 2h + i)) / (8 * dy)
/// slope = atan(sqrt(dz/dx² + dz/dy²))
///
/// Edge cells and cells next to nodata extrapolate their missing neighbors
/// (see `window3`), so every valid input cell gets a slope and a plane has
/// the same slope everywhere. Nodata cells are NaN in the output.
pub fn slope(dem: &Raster<f64>, params: SlopeParams) -> Result<Raster<f64>> {
    let (rows, cols) = dem.shape();
    let cs = params.cell_size.unwrap_or_else(|| CellSize::of(dem));
    if !cs.is_valid() {
        return Err(Error::invalid_parameter(
            "cell_size",
            format!("{}x{}", cs.dx, cs.dy),
            "cell extents must be positive",
        ));
    }

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| match window3(dem, row, col) {
                    Some(w) => {
                        let (east, north) = horn_gradient(&w, cs.dx, cs.dy);
                        params.units.convert(east.hypot(north).atan())
                    }
                    None => f64::NAN,
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let data = Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))?;
    dem.derive(data, Some(f64::NAN))
}

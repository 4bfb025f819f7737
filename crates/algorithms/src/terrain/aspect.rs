//! Aspect (downslope direction) from DEMs

use ndarray::Array2;
use sitegrade_core::raster::Raster;
use sitegrade_core::{Algorithm, Error, Result};

use super::{horn_gradient, window3, CellSize};
use crate::maybe_rayon::*;

/// Aspect value of cells too flat to have a meaningful direction
pub const FLAT_ASPECT: f64 = -1.0;

/// Parameters for aspect calculation
#[derive(Debug, Clone)]
pub struct AspectParams {
    /// Slope (degrees) below which a cell is flat
    pub flat_slope_deg: f64,
    /// Cell extents override; derived from the grid when `None`
    pub cell_size: Option<CellSize>,
}

impl Default for AspectParams {
    fn default() -> Self {
        Self {
            flat_slope_deg: 1.0,
            cell_size: None,
        }
    }
}

/// Aspect algorithm
#[derive(Debug, Clone, Default)]
pub struct Aspect;

impl Algorithm for Aspect {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = AspectParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Aspect"
    }

    fn description(&self) -> &'static str {
        "Compass bearing of the steepest descent, -1 for flat cells"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        aspect(&input, params)
    }
}

/// Calculate aspect in degrees clockwise from north (0 = N, 90 = E).
///
/// Cells with slope below `flat_slope_deg` get [`FLAT_ASPECT`]; nodata cells
/// are NaN.
pub fn aspect(dem: &Raster<f64>, params: AspectParams) -> Result<Raster<f64>> {
    let (rows, cols) = dem.shape();
    let cs = params.cell_size.unwrap_or_else(|| CellSize::of(dem));
    if !cs.is_valid() {
        return Err(Error::invalid_parameter(
            "cell_size",
            format!("{}x{}", cs.dx, cs.dy),
            "cell extents must be positive",
        ));
    }
    let flat_gradient = params.flat_slope_deg.to_radians().tan();

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| {
                    let Some(w) = window3(dem, row, col) else {
                        return f64::NAN;
                    };
                    let (east, north) = horn_gradient(&w, cs.dx, cs.dy);
                    if east.hypot(north) < flat_gradient {
                        return FLAT_ASPECT;
                    }
                    // Downslope points against the gradient
                    let bearing = (-east).atan2(-north).to_degrees();
                    if bearing < 0.0 { bearing + 360.0 } else { bearing }
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let data = Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))?;
    dem.derive(data, Some(f64::NAN))
}

/// Smallest angle between two compass bearings, in [0, 180]
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sitegrade_core::GeoTransform;

    fn dem(f: impl Fn(usize, usize) -> f64) -> Raster<f64> {
        let mut r = Raster::from_array(Array2::from_shape_fn((5, 5), |(r, c)| f(r, c)));
        r.set_transform(GeoTransform::new(0.0, 50.0, 10.0, -10.0));
        r.set_nodata(Some(f64::NAN));
        r
    }

    #[test]
    fn test_north_and_south_facing() {
        // Elevation grows toward the south, so the surface drops northward
        let north_facing = dem(|r, _| r as f64 * 5.0);
        let result = aspect(&north_facing, AspectParams::default()).unwrap();
        assert_relative_eq!(result.get(2, 2).unwrap(), 0.0, epsilon = 1e-9);

        let south_facing = dem(|r, _| 100.0 - r as f64 * 5.0);
        let result = aspect(&south_facing, AspectParams::default()).unwrap();
        assert_relative_eq!(result.get(2, 2).unwrap(), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_east_and_west_facing() {
        let east_facing = dem(|_, c| 100.0 - c as f64 * 5.0);
        let result = aspect(&east_facing, AspectParams::default()).unwrap();
        assert_relative_eq!(result.get(2, 2).unwrap(), 90.0, epsilon = 1e-9);

        let west_facing = dem(|_, c| c as f64 * 5.0);
        let result = aspect(&west_facing, AspectParams::default()).unwrap();
        assert_relative_eq!(result.get(2, 2).unwrap(), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn test_flat_cells() {
        let result = aspect(&dem(|_, c| c as f64 * 0.01), AspectParams::default()).unwrap();
        assert_eq!(result.get(2, 2).unwrap(), FLAT_ASPECT);
    }

    #[test]
    fn test_angular_difference_wraps() {
        assert_relative_eq!(angular_difference(350.0, 10.0), 20.0);
        assert_relative_eq!(angular_difference(90.0, 270.0), 180.0);
        assert_relative_eq!(angular_difference(180.0, 135.0), 45.0);
    }
}

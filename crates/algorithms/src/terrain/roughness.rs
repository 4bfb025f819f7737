//! Terrain roughness
//!
//! Mean absolute deviation of the neighborhood from the center cell, a
//! windowed variant of the Terrain Ruggedness Index (Riley et al. 1999).

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use sitegrade_core::raster::{NeighborhoodIterator, Raster};
use sitegrade_core::{Algorithm, Error, Result};

use crate::maybe_rayon::*;

/// Parameters for roughness calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoughnessParams {
    /// Window radius in cells (default 1 → 3x3)
    pub radius: usize,
}

impl Default for RoughnessParams {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

/// Roughness algorithm
#[derive(Debug, Clone, Default)]
pub struct Roughness;

impl Algorithm for Roughness {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = RoughnessParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Roughness"
    }

    fn description(&self) -> &'static str {
        "Mean absolute elevation deviation from the center cell"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        roughness(&input, params)
    }
}

/// Compute roughness in elevation units.
///
/// Nodata and out-of-grid neighbors are skipped; a valid cell with no valid
/// neighbors scores 0.
pub fn roughness(dem: &Raster<f64>, params: RoughnessParams) -> Result<Raster<f64>> {
    if params.radius == 0 {
        return Err(Error::invalid_parameter("radius", 0, "must be at least 1"));
    }
    let (rows, cols) = dem.shape();

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| {
                    let Some(center) = dem.valid(row, col) else {
                        return f64::NAN;
                    };
                    let (sum, n) = NeighborhoodIterator::square(dem, row, col, params.radius)
                        .filter(|&(_, _, v)| !dem.is_nodata(v))
                        .fold((0.0, 0usize), |(s, n), (_, _, v)| (s + (v - center).abs(), n + 1));
                    if n == 0 { 0.0 } else { sum / n as f64 }
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let data = Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))?;
    dem.derive(data, Some(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_is_smooth() {
        let dem = Raster::filled(5, 5, 7.0);
        let out = roughness(&dem, RoughnessParams::default()).unwrap();
        assert!(out.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_spike() {
        let mut dem = Raster::filled(3, 3, 0.0);
        dem.set(1, 1, 8.0).unwrap();
        let out = roughness(&dem, RoughnessParams::default()).unwrap();
        assert_relative_eq!(out.get(1, 1).unwrap(), 8.0);
        // Corner sees the spike among three in-grid neighbors
        assert_relative_eq!(out.get(0, 0).unwrap(), 8.0 / 3.0);
    }

    #[test]
    fn test_nodata_neighbors_skipped() {
        let mut dem = Raster::filled(3, 3, 1.0);
        dem.set_nodata(Some(f64::NAN));
        dem.set(0, 0, f64::NAN).unwrap();
        dem.set(2, 2, 3.0).unwrap();
        let out = roughness(&dem, RoughnessParams::default()).unwrap();
        assert!(out.get(0, 0).unwrap().is_nan());
        assert_relative_eq!(out.get(1, 1).unwrap(), 2.0 / 7.0);
    }
}

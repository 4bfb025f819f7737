//! Gaussian pre-smoothing of elevation grids
//!
//! Suppresses cell-scale noise before derivatives are taken. Nodata cells are
//! filled with the grid mean for the convolution and masked back to NaN in the
//! output, so the valid footprint of the grid never changes.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use sitegrade_core::raster::Raster;
use sitegrade_core::{Algorithm, Error, Result};

use crate::maybe_rayon::*;

/// Parameters for Gaussian smoothing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianSmoothingParams {
    /// Standard deviation in cells (default 1.0)
    pub sigma: f64,
}

impl Default for GaussianSmoothingParams {
    fn default() -> Self {
        Self { sigma: 1.0 }
    }
}

impl GaussianSmoothingParams {
    /// Kernel radius in cells, `ceil(3σ)`
    pub fn radius(&self) -> usize {
        (3.0 * self.sigma).ceil() as usize
    }
}

/// Gaussian smoothing algorithm
#[derive(Debug, Clone, Default)]
pub struct GaussianSmoothing;

impl Algorithm for GaussianSmoothing {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = GaussianSmoothingParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "GaussianSmoothing"
    }

    fn description(&self) -> &'static str {
        "Gaussian low-pass filter preserving the nodata footprint"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        gaussian_smoothing(&input, params)
    }
}

/// Smooth a DEM with a normalized Gaussian kernel.
///
/// The kernel is truncated to the grid: weights of out-of-grid taps are
/// dropped and the rest renormalized.
pub fn gaussian_smoothing(dem: &Raster<f64>, params: GaussianSmoothingParams) -> Result<Raster<f64>> {
    if !params.sigma.is_finite() || params.sigma <= 0.0 {
        return Err(Error::invalid_parameter("sigma", params.sigma, "must be positive"));
    }

    let (rows, cols) = dem.shape();
    let valid = dem.valid_mask();
    let fill = dem.statistics().mean.unwrap_or(0.0);
    let filled = dem.data().mapv(|v| if dem.is_nodata(v) { fill } else { v });

    let r = params.radius() as isize;
    let two_sigma_sq = 2.0 * params.sigma * params.sigma;
    let kernel: Vec<(isize, isize, f64)> = (-r..=r)
        .flat_map(|dr| (-r..=r).map(move |dc| (dr, dc)))
        .map(|(dr, dc)| (dr, dc, (-((dr * dr + dc * dc) as f64) / two_sigma_sq).exp()))
        .collect();

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                if !valid.get(row, col) {
                    continue;
                }
                let mut sum = 0.0;
                let mut weight = 0.0;
                for &(dr, dc, w) in &kernel {
                    let nr = row as isize + dr;
                    let nc = col as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    sum += filled[(nr as usize, nc as usize)] * w;
                    weight += w;
                }
                *out = sum / weight;
            }
            row_data
        })
        .collect();

    let data = Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))?;
    dem.derive(data, Some(f64::NAN))
}

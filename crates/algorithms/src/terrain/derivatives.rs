//! Terrain derivative bundle
//!
//! Runs smoothing (optional), slope, aspect, curvature and roughness over one
//! elevation grid with a shared cell size.

use serde::{Deserialize, Serialize};
use sitegrade_core::raster::Raster;
use sitegrade_core::{Error, Result};
use tracing::debug;

use super::{
    aspect, curvature, gaussian_smoothing, roughness, slope, AspectParams, CellSize,
    CurvatureParams, GaussianSmoothingParams, RoughnessParams, SlopeParams,
};

/// Parameters for [`compute_derivatives`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivativeParams {
    /// Gaussian pre-smoothing; disabled when `None`
    pub smoothing: Option<GaussianSmoothingParams>,
    /// Slope (degrees) below which aspect is flat
    pub flat_slope_deg: f64,
    pub roughness: RoughnessParams,
}

impl Default for DerivativeParams {
    fn default() -> Self {
        Self {
            smoothing: None,
            flat_slope_deg: 1.0,
            roughness: RoughnessParams::default(),
        }
    }
}

/// Derivative grids sharing the source DEM's shape and georeferencing.
///
/// Every grid is NaN exactly where the source is nodata.
#[derive(Debug, Clone)]
pub struct TerrainDerivatives {
    /// Degrees, >= 0
    pub slope: Raster<f64>,
    /// Degrees clockwise from north, `FLAT_ASPECT` on flat cells
    pub aspect: Raster<f64>,
    pub profile_curvature: Raster<f64>,
    pub plan_curvature: Raster<f64>,
    /// Elevation units, >= 0
    pub roughness: Raster<f64>,
    pub cell_size: CellSize,
}

/// Compute all terrain derivatives of a DEM.
pub fn compute_derivatives(dem: &Raster<f64>, params: &DerivativeParams) -> Result<TerrainDerivatives> {
    let (rows, cols) = dem.shape();
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions { width: cols, height: rows });
    }
    let cell_size = CellSize::of(dem);
    debug!(rows, cols, dx = cell_size.dx, dy = cell_size.dy, "computing terrain derivatives");

    let smoothed;
    let surface = match params.smoothing {
        Some(sp) => {
            smoothed = gaussian_smoothing(dem, sp)?;
            &smoothed
        }
        None => dem,
    };

    let slope = slope(surface, SlopeParams { cell_size: Some(cell_size), ..Default::default() })?;
    let aspect = aspect(
        surface,
        AspectParams { flat_slope_deg: params.flat_slope_deg, cell_size: Some(cell_size) },
    )?;
    let curv = curvature(surface, CurvatureParams { cell_size: Some(cell_size) })?;
    let roughness = roughness(surface, params.roughness)?;

    Ok(TerrainDerivatives {
        slope,
        aspect,
        profile_curvature: curv.profile,
        plan_curvature: curv.plan,
        roughness,
        cell_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FLAT_ASPECT;
    use ndarray::Array2;
    use sitegrade_core::GeoTransform;

    #[test]
    fn test_constant_elevation() {
        let mut dem = Raster::filled(6, 6, 250.0);
        dem.set_transform(GeoTransform::new(0.0, 60.0, 10.0, -10.0));
        let d = compute_derivatives(&dem, &DerivativeParams::default()).unwrap();
        assert!(d.slope.data().iter().all(|&v| v.abs() < 1e-9));
        assert!(d.aspect.data().iter().all(|&v| v == FLAT_ASPECT));
        assert!(d.roughness.data().iter().all(|&v| v == 0.0));
        assert_eq!(d.cell_size, CellSize::new(10.0, 10.0));
    }

    #[test]
    fn test_uniform_ramp_has_no_edge_bias() {
        // 25 degree ramp rising east
        let grade = 25f64.to_radians().tan();
        let mut dem = Raster::from_array(Array2::from_shape_fn((30, 30), |(_, c)| c as f64 * 10.0 * grade));
        dem.set_transform(GeoTransform::new(0.0, 300.0, 10.0, -10.0));
        let d = compute_derivatives(&dem, &DerivativeParams::default()).unwrap();
        for &v in d.slope.data().iter() {
            assert!((v - 25.0).abs() < 1e-9, "slope {v}");
        }
        for &v in d.aspect.data().iter() {
            assert!((v - 270.0).abs() < 1e-9, "aspect {v}");
        }
        assert!(d.profile_curvature.data().iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_nodata_footprint_shared() {
        let data = Array2::from_shape_fn((5, 5), |(r, c)| if r == 0 && c < 2 { f64::NAN } else { (r * c) as f64 });
        let mut dem = Raster::from_array(data);
        dem.set_nodata(Some(f64::NAN));
        let params = DerivativeParams { smoothing: Some(GaussianSmoothingParams::default()), ..Default::default() };
        let d = compute_derivatives(&dem, &params).unwrap();
        for grid in [&d.slope, &d.aspect, &d.profile_curvature, &d.plan_curvature, &d.roughness] {
            assert_eq!(grid.valid_mask().count(), 23);
            assert!(grid.get(0, 1).unwrap().is_nan());
        }
    }

    #[test]
    fn test_empty_grid_rejected() {
        let dem: Raster<f64> = Raster::new(0, 0);
        assert!(compute_derivatives(&dem, &DerivativeParams::default()).is_err());
    }
}

//! Profile and plan curvature from DEMs
//!
//! Second-order partial derivatives are estimated from a 3x3 neighborhood
//! (Zevenbergen & Thorne 1987), with `y` pointing north:
//!
//! ```text
//! a b c
//! d e f
//! g h i
//! ```
//!
//!   p = (f - d) / 2dx          r = (d - 2e + f) / dx²
//!   q = (b - h) / 2dy          t = (b - 2e + h) / dy²
//!   s = (c - a - i + g) / 4dxdy
//!
//!   profile = -(p²r + 2pqs + q²t) / ((p² + q²)(1 + p² + q²)^1.5)
//!   plan    = -(q²r - 2pqs + p²t) / (p² + q²)^1.5
//!
//! Positive values are convex. Both are 0 on flat cells and clamped to
//! `[-CURVATURE_LIMIT, CURVATURE_LIMIT]`.

use ndarray::Array2;
use sitegrade_core::raster::Raster;
use sitegrade_core::{Algorithm, Error, Result};

use super::{window3, CellSize};
use crate::maybe_rayon::*;

/// Magnitude bound applied to both curvature outputs
pub const CURVATURE_LIMIT: f64 = 1.0;

/// Squared gradient below which curvature is reported as 0
const FLAT_GRADIENT_SQ: f64 = 1e-10;

/// Parameters for curvature calculation
#[derive(Debug, Clone, Default)]
pub struct CurvatureParams {
    /// Cell extents override; derived from the grid when `None`
    pub cell_size: Option<CellSize>,
}

/// Profile and plan curvature grids of the same DEM
#[derive(Debug, Clone)]
pub struct CurvatureGrids {
    pub profile: Raster<f64>,
    pub plan: Raster<f64>,
}

/// Curvature algorithm
#[derive(Debug, Clone, Default)]
pub struct Curvature;

impl Algorithm for Curvature {
    type Input = Raster<f64>;
    type Output = CurvatureGrids;
    type Params = CurvatureParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Curvature"
    }

    fn description(&self) -> &'static str {
        "Profile and plan curvature from Zevenbergen-Thorne second derivatives"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        curvature(&input, params)
    }
}

fn cell_curvature(w: &[f64; 9], dx: f64, dy: f64) -> (f64, f64) {
    let [a, b, c, d, e, f, g, h, i] = *w;
    let p = (f - d) / (2.0 * dx);
    let q = (b - h) / (2.0 * dy);
    let r = (d - 2.0 * e + f) / (dx * dx);
    let t = (b - 2.0 * e + h) / (dy * dy);
    let s = (c - a - i + g) / (4.0 * dx * dy);

    let g2 = p * p + q * q;
    if g2 < FLAT_GRADIENT_SQ {
        return (0.0, 0.0);
    }
    let profile = -(p * p * r + 2.0 * p * q * s + q * q * t) / (g2 * (1.0 + g2).powf(1.5));
    let plan = -(q * q * r - 2.0 * p * q * s + p * p * t) / g2.powf(1.5);
    (clamp(profile), clamp(plan))
}

fn clamp(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(-CURVATURE_LIMIT, CURVATURE_LIMIT)
    } else {
        0.0
    }
}

/// Compute profile and plan curvature in one pass.
pub fn curvature(dem: &Raster<f64>, params: CurvatureParams) -> Result<CurvatureGrids> {
    let (rows, cols) = dem.shape();
    let cs = params.cell_size.unwrap_or_else(|| CellSize::of(dem));
    if !cs.is_valid() {
        return Err(Error::invalid_parameter(
            "cell_size",
            format!("{}x{}", cs.dx, cs.dy),
            "cell extents must be positive",
        ));
    }

    let pairs: Vec<(f64, f64)> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| match window3(dem, row, col) {
                    Some(w) => cell_curvature(&w, cs.dx, cs.dy),
                    None => (f64::NAN, f64::NAN),
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let (profile, plan): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
    let profile = Array2::from_shape_vec((rows, cols), profile)
        .map_err(|e| Error::Other(e.to_string()))?;
    let plan = Array2::from_shape_vec((rows, cols), plan)
        .map_err(|e| Error::Other(e.to_string()))?;

    Ok(CurvatureGrids {
        profile: dem.derive(profile, Some(f64::NAN))?,
        plan: dem.derive(plan, Some(f64::NAN))?,
    })
}

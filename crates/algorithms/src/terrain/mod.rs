//! Terrain analysis algorithms
//!
//! Derivatives of an elevation grid (slope, aspect, curvature, roughness),
//! pre-smoothing and vector contour extraction.

mod aspect;
mod cell_size;
mod contour;
mod curvature;
mod derivatives;
mod roughness;
mod slope;
mod smoothing;

pub use aspect::{angular_difference, aspect, Aspect, AspectParams, FLAT_ASPECT};
pub use cell_size::{CellSize, METERS_PER_DEGREE};
pub use contour::{contour_levels, contour_lines, ContourLine};
pub use curvature::{curvature, Curvature, CurvatureGrids, CurvatureParams, CURVATURE_LIMIT};
pub use derivatives::{compute_derivatives, DerivativeParams, TerrainDerivatives};
pub use roughness::{roughness, Roughness, RoughnessParams};
pub use slope::{slope, Slope, SlopeParams, SlopeUnits};
pub use smoothing::{gaussian_smoothing, GaussianSmoothing, GaussianSmoothingParams};

use sitegrade_core::raster::Raster;

/// 3x3 window around (row, col), row-major from the north-west corner.
///
/// ```text
///   a b c      [0] [1] [2]
///   d e f  ->  [3] [4] [5]
///   g h i      [6] [7] [8]
/// ```
///
/// Missing neighbors (off the grid or nodata) are extrapolated so a plane
/// keeps its exact gradient at borders: an edge neighbor mirrors its opposite
/// through the center (`2e - opposite`, or `e` when both are missing), and a
/// corner is completed from its two adjacent edge neighbors. Returns `None`
/// when the center itself is nodata.
pub(crate) fn window3(dem: &Raster<f64>, row: usize, col: usize) -> Option<[f64; 9]> {
    let e = dem.valid(row, col)?;
    let at = |k: usize| -> Option<f64> {
        let r = row as isize + k as isize / 3 - 1;
        let c = col as isize + k as isize % 3 - 1;
        if r < 0 || c < 0 {
            return None;
        }
        dem.valid(r as usize, c as usize)
    };
    let mut w = [e; 9];
    for k in [1, 3, 5, 7] {
        w[k] = match (at(k), at(8 - k)) {
            (Some(v), _) => v,
            (None, Some(opposite)) => 2.0 * e - opposite,
            (None, None) => e,
        };
    }
    // corner k sits between edges (k / 3 * 3 + 1) and (3 + k % 3)
    for k in [0, 2, 6, 8] {
        w[k] = at(k).unwrap_or(w[k / 3 * 3 + 1] + w[3 + k % 3] - e);
    }
    Some(w)
}

/// Horn (1981) gradient of a 3x3 window.
///
/// Returns `(dz/d_east, dz/d_north)` with `dx`/`dy` the cell extents in meters.
#[inline]
pub(crate) fn horn_gradient(w: &[f64; 9], dx: f64, dy: f64) -> (f64, f64) {
    let [a, b, c, d, _, f, g, h, i] = *w;
    let east = ((c + 2.0 * f + i) - (a + 2.0 * d + g)) / (8.0 * dx);
    let north = ((a + 2.0 * b + c) - (g + 2.0 * h + i)) / (8.0 * dy);
    (east, north)
}

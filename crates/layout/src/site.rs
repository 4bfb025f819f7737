//! Site preparation: boundary and exclusion rasters

use geo::Polygon;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use sitegrade_algorithms::vector::{rasterize_buffered, rasterize_polygon, validate_polygon};
use sitegrade_core::raster::{Mask, Raster};
use sitegrade_core::{Error, Result};
use tracing::debug;

/// Area to keep equipment out of, or to make roads avoid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionZone {
    pub polygon: Polygon<f64>,
    /// Extra clearance around the polygon in meters
    #[serde(default)]
    pub buffer_m: f64,
    /// `None` blocks placement and gets the steep-cell road cost; `Some(m)`
    /// only multiplies road cost by `m`
    #[serde(default)]
    pub cost_multiplier: Option<f64>,
}

impl ExclusionZone {
    pub fn hard(polygon: Polygon<f64>, buffer_m: f64) -> Self {
        Self { polygon, buffer_m, cost_multiplier: None }
    }

    pub fn soft(polygon: Polygon<f64>, buffer_m: f64, cost_multiplier: f64) -> Self {
        Self { polygon, buffer_m, cost_multiplier: Some(cost_multiplier) }
    }

    pub fn is_hard(&self) -> bool {
        self.cost_multiplier.is_none()
    }

    fn validate(&self, index: usize) -> Result<()> {
        validate_polygon(&self.polygon).map_err(|e| {
            Error::invalid_parameter("exclusion", index, format!("invalid polygon: {e}"))
        })?;
        if !self.buffer_m.is_finite() || self.buffer_m < 0.0 {
            return Err(Error::invalid_parameter("buffer_m", self.buffer_m, "must be finite and non-negative"));
        }
        if let Some(m) = self.cost_multiplier {
            if !m.is_finite() || m < 1.0 {
                return Err(Error::invalid_parameter("cost_multiplier", m, "must be at least 1"));
            }
        }
        Ok(())
    }
}

/// Boundary and exclusions rasterized onto the elevation grid
#[derive(Debug, Clone)]
pub struct Site {
    pub boundary: Polygon<f64>,
    /// Cells whose center is strictly inside the boundary
    pub boundary_mask: Mask,
    /// Cells inside a buffered hard exclusion
    pub hard_exclusions: Mask,
    /// Road cost multiplier per cell from soft zones, 1 elsewhere
    pub cost_multipliers: Raster<f64>,
}

impl Site {
    /// Validate and rasterize the site polygons onto `dem`'s grid.
    ///
    /// Fails with [`Error::InvalidBoundary`] for a degenerate boundary and
    /// [`Error::InvalidParameter`] for a malformed exclusion zone.
    pub fn prepare(
        dem: &Raster<f64>,
        boundary: &Polygon<f64>,
        exclusions: &[ExclusionZone],
    ) -> Result<Self> {
        validate_polygon(boundary)?;
        let (rows, cols) = dem.shape();
        let transform = dem.transform();
        let boundary_mask = rasterize_polygon(boundary, rows, cols, transform);

        let mut hard_exclusions = Mask::empty(rows, cols, *transform);
        let mut multipliers = Array2::<f64>::ones((rows, cols));
        for (i, zone) in exclusions.iter().enumerate() {
            zone.validate(i)?;
            let footprint = rasterize_buffered(&zone.polygon, zone.buffer_m, rows, cols, transform)?;
            match zone.cost_multiplier {
                None => hard_exclusions = hard_exclusions.or(&footprint)?,
                Some(m) => {
                    for (r, c) in footprint.cells() {
                        let cell = &mut multipliers[(r, c)];
                        *cell = (*cell).max(m);
                    }
                }
            }
        }

        debug!(
            boundary_cells = boundary_mask.count(),
            hard_excluded = hard_exclusions.count(),
            zones = exclusions.len(),
            "site prepared"
        );

        Ok(Self {
            boundary: boundary.clone(),
            boundary_mask,
            hard_exclusions,
            cost_multipliers: dem.derive(multipliers, None)?,
        })
    }

    /// Boundary cells not covered by a hard exclusion
    pub fn usable(&self) -> Result<Mask> {
        self.boundary_mask.and_not(&self.hard_exclusions)
    }
}

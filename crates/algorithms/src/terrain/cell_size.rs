//! Ground cell extents in meters

use sitegrade_core::raster::{Raster, RasterElement};

/// Meters per degree of latitude used to convert geographic cell sizes.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Cell width (`dx`, east-west) and height (`dy`, north-south) in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub dx: f64,
    pub dy: f64,
}

impl CellSize {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Cell size of a grid in meters.
    ///
    /// Projected grids are assumed to be in meters already. Geographic grids
    /// convert degrees with [`METERS_PER_DEGREE`], shrinking the east-west
    /// extent by the cosine of the grid's center latitude.
    pub fn of<T: RasterElement>(raster: &Raster<T>) -> Self {
        let gt = raster.transform();
        let (w, h) = (gt.cell_width(), gt.cell_height());
        if !raster.is_geographic() {
            return Self::new(w, h);
        }
        let (_, min_y, _, max_y) = raster.bounds();
        let lat = (0.5 * (min_y + max_y)).to_radians();
        Self::new(w * METERS_PER_DEGREE * lat.cos(), h * METERS_PER_DEGREE)
    }

    /// Cell area in square meters
    pub fn area(&self) -> f64 {
        self.dx * self.dy
    }

    /// Smaller of the two extents
    pub fn min(&self) -> f64 {
        self.dx.min(self.dy)
    }

    /// Ground length of a grid step of `dr` rows and `dc` columns
    pub fn step_length(&self, dr: isize, dc: isize) -> f64 {
        let x = dc as f64 * self.dx;
        let y = dr as f64 * self.dy;
        x.hypot(y)
    }

    /// Whether both extents are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite() && self.dx > 0.0 && self.dy > 0.0
    }
}

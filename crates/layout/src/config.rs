//! Layout engine configuration
//!
//! Every section deserializes with defaults for missing fields, so a config
//! file only needs to name what it changes.

use serde::{Deserialize, Serialize};
use sitegrade_algorithms::terrain::DerivativeParams;
use sitegrade_algorithms::vector::SimplifyParams;
use sitegrade_core::{Error, Result};

use crate::asset::AssetCatalog;

/// Suitability grid → buildable mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildableParams {
    /// Cells scoring at or above this are candidates
    pub threshold: f64,
    /// Smallest region kept, and largest hole filled, in cells
    pub min_region_cells: usize,
    /// Radius of the square element used for opening and closing
    pub element_radius: usize,
}

impl Default for BuildableParams {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            min_region_cells: 9,
            element_radius: 1,
        }
    }
}

/// Greedy placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementParams {
    /// Minimum center-to-center distance between assets
    pub min_spacing_m: f64,
    /// Slope (degrees) below which the anchor prefers to sit
    pub very_flat_slope_deg: f64,
    pub slope_weight: f64,
    pub distance_weight: f64,
    /// Sequences at least this long always contain a hub
    pub hub_required_from: usize,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            min_spacing_m: 20.0,
            very_flat_slope_deg: 3.0,
            slope_weight: 0.6,
            distance_weight: 0.4,
            hub_required_from: 3,
        }
    }
}

/// Road routing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadParams {
    /// Maximum comfortable road grade in percent
    pub max_grade_pct: f64,
    /// Cells steeper than this multiple of the grade threshold get the penalty cost
    pub steep_factor: f64,
    /// A* node expansions per road before falling back to a straight line
    pub max_iterations: usize,
}

impl Default for RoadParams {
    fn default() -> Self {
        Self {
            max_grade_pct: 10.0,
            steep_factor: 1.5,
            max_iterations: 250_000,
        }
    }
}

/// Vector terrain products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductParams {
    /// Contour spacing in elevation units
    pub contour_interval: f64,
    /// Every n-th multiple of the interval is a major contour
    pub major_every: usize,
    /// Radius of the opening applied to slope class masks
    pub cleanup_radius: usize,
    pub simplify: SimplifyParams,
}

impl Default for ProductParams {
    fn default() -> Self {
        Self {
            contour_interval: 5.0,
            major_every: 5,
            cleanup_radius: 1,
            simplify: SimplifyParams::default(),
        }
    }
}

/// Full configuration of a [`crate::LayoutEngine`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub derivatives: DerivativeParams,
    pub buildable: BuildableParams,
    pub placement: PlacementParams,
    pub roads: RoadParams,
    pub products: ProductParams,
    pub assets: AssetCatalog,
}

fn finite_positive(name: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_parameter(name, v, "must be positive"))
    }
}

fn finite_non_negative(name: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_parameter(name, v, "must be finite and non-negative"))
    }
}

impl LayoutConfig {
    /// Check every parameter range before a run
    pub fn validate(&self) -> Result<()> {
        if let Some(s) = &self.derivatives.smoothing {
            finite_positive("smoothing.sigma", s.sigma)?;
        }
        finite_non_negative("flat_slope_deg", self.derivatives.flat_slope_deg)?;
        if self.derivatives.roughness.radius == 0 {
            return Err(Error::invalid_parameter("roughness.radius", 0, "must be at least 1"));
        }

        let b = &self.buildable;
        if !(0.0..=1.0).contains(&b.threshold) {
            return Err(Error::invalid_parameter("threshold", b.threshold, "must lie in [0, 1]"));
        }
        if b.element_radius == 0 {
            return Err(Error::invalid_parameter("element_radius", 0, "must be at least 1"));
        }

        let p = &self.placement;
        finite_non_negative("min_spacing_m", p.min_spacing_m)?;
        finite_non_negative("very_flat_slope_deg", p.very_flat_slope_deg)?;
        finite_non_negative("slope_weight", p.slope_weight)?;
        finite_non_negative("distance_weight", p.distance_weight)?;

        let r = &self.roads;
        finite_positive("max_grade_pct", r.max_grade_pct)?;
        finite_positive("steep_factor", r.steep_factor)?;
        if r.max_iterations == 0 {
            return Err(Error::invalid_parameter("max_iterations", 0, "must be at least 1"));
        }

        let pr = &self.products;
        finite_positive("contour_interval", pr.contour_interval)?;
        if pr.major_every == 0 {
            return Err(Error::invalid_parameter("major_every", 0, "must be at least 1"));
        }
        finite_positive("simplify.tolerance", pr.simplify.tolerance)?;
        if pr.simplify.max_vertices < 4 {
            return Err(Error::invalid_parameter(
                "simplify.max_vertices",
                pr.simplify.max_vertices,
                "must allow at least one ring",
            ));
        }

        self.assets.validate()
    }
}

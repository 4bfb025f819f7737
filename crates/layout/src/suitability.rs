//! Per-kind suitability scoring
//!
//! Four factor scores in [0, 1] combined with normalized weights:
//!
//! - slope: 1 up to the optimal slope, linear down to 0 at the maximum
//! - aspect: `1 - angular_difference / tolerance`; flat cells and kinds
//!   without a preference score 1
//! - curvature: `1 - max(|profile|, |plan|) / max_curvature`
//! - roughness: `1 - roughness / max_roughness`

use ndarray::Array2;
use sitegrade_algorithms::terrain::{angular_difference, TerrainDerivatives, FLAT_ASPECT};
use sitegrade_core::raster::{Mask, Raster};
use sitegrade_core::Result;

use crate::asset::SuitabilityConfig;

/// Scores cells of one set of derivatives inside a boundary
pub struct SuitabilityScorer<'a> {
    derivatives: &'a TerrainDerivatives,
    boundary: &'a Mask,
}

impl<'a> SuitabilityScorer<'a> {
    pub fn new(derivatives: &'a TerrainDerivatives, boundary: &'a Mask) -> Self {
        Self { derivatives, boundary }
    }

    /// Composite suitability grid for one asset kind.
    ///
    /// Cells outside the boundary or without a slope score 0; the grid has no
    /// nodata.
    pub fn score(&self, config: &SuitabilityConfig) -> Result<Raster<f64>> {
        config.validate()?;
        let d = self.derivatives;
        let w = config.weights.normalized();

        let data = Array2::from_shape_fn(d.slope.shape(), |(r, c)| {
            let slope = d.slope.data()[(r, c)];
            if !self.boundary.get(r, c) || !slope.is_finite() {
                return 0.0;
            }
            let curvature = d.profile_curvature.data()[(r, c)]
                .abs()
                .max(d.plan_curvature.data()[(r, c)].abs());
            let composite = w.slope * slope_score(slope, config)
                + w.aspect * aspect_score(d.aspect.data()[(r, c)], config)
                + w.curvature * ratio_score(curvature, config.max_curvature)
                + w.roughness * ratio_score(d.roughness.data()[(r, c)], config.max_roughness);
            if composite.is_finite() {
                composite.clamp(0.0, 1.0)
            } else {
                0.0
            }
        });

        d.slope.derive(data, None)
    }
}

fn slope_score(slope: f64, config: &SuitabilityConfig) -> f64 {
    if slope <= config.optimal_slope_deg {
        1.0
    } else if slope >= config.max_slope_deg {
        0.0
    } else {
        1.0 - (slope - config.optimal_slope_deg) / (config.max_slope_deg - config.optimal_slope_deg)
    }
}

fn aspect_score(aspect: f64, config: &SuitabilityConfig) -> f64 {
    match config.preferred_aspect_deg {
        None => 1.0,
        Some(_) if aspect == FLAT_ASPECT || !aspect.is_finite() => 1.0,
        Some(preferred) => {
            (1.0 - angular_difference(aspect, preferred) / config.aspect_tolerance_deg).clamp(0.0, 1.0)
        }
    }
}

/// `1 - value / limit`, clipped to [0, 1]; non-finite values score 0
fn ratio_score(value: f64, limit: f64) -> f64 {
    if value.is_finite() {
        (1.0 - value / limit).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sitegrade_algorithms::terrain::CellSize;
    use sitegrade_core::GeoTransform;

    fn grid(v: f64) -> Raster<f64> {
        let mut r = Raster::filled(3, 3, v);
        r.set_transform(GeoTransform::new(0.0, 3.0, 1.0, -1.0));
        r
    }

    fn derivatives(slope: f64, aspect: f64, curvature: f64, roughness: f64) -> TerrainDerivatives {
        TerrainDerivatives {
            slope: grid(slope),
            aspect: grid(aspect),
            profile_curvature: grid(curvature),
            plan_curvature: grid(0.0),
            roughness: grid(roughness),
            cell_size: CellSize::new(1.0, 1.0),
        }
    }

    fn config() -> SuitabilityConfig {
        SuitabilityConfig {
            max_slope_deg: 10.0,
            optimal_slope_deg: 2.0,
            preferred_aspect_deg: Some(180.0),
            aspect_tolerance_deg: 90.0,
            max_curvature: 0.1,
            max_roughness: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_ideal_cell_scores_one() {
        let d = derivatives(1.0, 180.0, 0.0, 0.0);
        let boundary = Mask::full(3, 3, GeoTransform::default());
        let s = SuitabilityScorer::new(&d, &boundary).score(&config()).unwrap();
        assert!(s.data().iter().all(|&v| (v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_factor_scores() {
        let cfg = config();
        assert_relative_eq!(slope_score(6.0, &cfg), 0.5);
        assert_relative_eq!(slope_score(12.0, &cfg), 0.0);
        assert_relative_eq!(aspect_score(135.0, &cfg), 0.5);
        assert_relative_eq!(aspect_score(0.0, &cfg), 0.0);
        assert_relative_eq!(aspect_score(FLAT_ASPECT, &cfg), 1.0);
        assert_relative_eq!(ratio_score(0.05, 0.1), 0.5);
        assert_relative_eq!(ratio_score(3.0, 1.0), 0.0);
    }

    #[test]
    fn test_weighted_composite() {
        // slope 6 → 0.5, others 1; weights 0.4/0.2/0.2/0.2
        let d = derivatives(6.0, 180.0, 0.0, 0.0);
        let boundary = Mask::full(3, 3, GeoTransform::default());
        let s = SuitabilityScorer::new(&d, &boundary).score(&config()).unwrap();
        assert_relative_eq!(s.get(1, 1).unwrap(), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_outside_boundary_and_nodata_zero() {
        let mut d = derivatives(1.0, 180.0, 0.0, 0.0);
        d.slope.set(0, 0, f64::NAN).unwrap();
        let mut boundary = Mask::full(3, 3, GeoTransform::default());
        boundary.set(2, 2, false);
        let s = SuitabilityScorer::new(&d, &boundary).score(&config()).unwrap();
        assert_eq!(s.get(0, 0).unwrap(), 0.0);
        assert_eq!(s.get(2, 2).unwrap(), 0.0);
        assert!(s.get(1, 1).unwrap() > 0.99);
    }

    #[test]
    fn test_no_aspect_preference_is_neutral() {
        let d = derivatives(1.0, 0.0, 0.0, 0.0);
        let boundary = Mask::full(3, 3, GeoTransform::default());
        let cfg = SuitabilityConfig { preferred_aspect_deg: None, ..config() };
        let s = SuitabilityScorer::new(&d, &boundary).score(&cfg).unwrap();
        assert_relative_eq!(s.get(1, 1).unwrap(), 1.0, epsilon = 1e-12);
    }
}

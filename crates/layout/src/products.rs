//! Vector terrain products for display and export
//!
//! Contours, slope-class polygons and buildable-area polygons, all clipped to
//! the site boundary, plus a numeric summary of the terrain inside it.

use std::collections::BTreeMap;

use geo::{Area, MultiPolygon};
use serde::{Deserialize, Serialize};
use sitegrade_algorithms::morphology::{binary_opening, StructuringElement};
use sitegrade_algorithms::terrain::{contour_levels, contour_lines, TerrainDerivatives};
use sitegrade_algorithms::vector::{clip_lines, intersect_polygons, mask_to_polygons, simplify_to_budget};
use sitegrade_core::prelude::*;
use tracing::debug;

use crate::asset::AssetKind;
use crate::buildable::BuildableStats;
use crate::config::ProductParams;
use crate::site::Site;

/// Slope band of the heatmap
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlopeClass {
    pub label: &'static str,
    pub min_deg: f64,
    /// Exclusive upper bound; infinite for the last class
    pub max_deg: f64,
    pub color: &'static str,
}

impl SlopeClass {
    pub const ALL: [SlopeClass; 4] = [
        SlopeClass { label: "0-5", min_deg: 0.0, max_deg: 5.0, color: "#1a9850" },
        SlopeClass { label: "5-10", min_deg: 5.0, max_deg: 10.0, color: "#91cf60" },
        SlopeClass { label: "10-15", min_deg: 10.0, max_deg: 15.0, color: "#fee08b" },
        SlopeClass { label: ">15", min_deg: 15.0, max_deg: f64::INFINITY, color: "#d73027" },
    ];

    pub fn contains(&self, slope_deg: f64) -> bool {
        slope_deg >= self.min_deg && slope_deg < self.max_deg
    }
}

/// Terrain statistics inside the site boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSummary {
    pub elevation_min: Option<f64>,
    pub elevation_max: Option<f64>,
    pub elevation_mean: Option<f64>,
    pub slope_mean_deg: Option<f64>,
    pub slope_max_deg: Option<f64>,
    /// Share of boundary cells per slope class label, in percent
    pub slope_class_percent: BTreeMap<String, f64>,
    pub buildable: Vec<BuildableStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainProducts {
    pub contours: FeatureCollection,
    pub slope_heatmap: FeatureCollection,
    pub buildable_areas: FeatureCollection,
    pub summary: TerrainSummary,
}

/// Builds vector products from a prepared site
pub struct TerrainVisualizer<'a> {
    params: &'a ProductParams,
    dem: &'a Raster<f64>,
    derivatives: &'a TerrainDerivatives,
    site: &'a Site,
}

impl<'a> TerrainVisualizer<'a> {
    pub fn new(
        params: &'a ProductParams,
        dem: &'a Raster<f64>,
        derivatives: &'a TerrainDerivatives,
        site: &'a Site,
    ) -> Self {
        Self { params, dem, derivatives, site }
    }

    /// Contour lines at every multiple of the interval, clipped to the boundary.
    ///
    /// One feature per level with `elevation` and `major` properties.
    pub fn contours(&self) -> Result<FeatureCollection> {
        let stats = self.dem.statistics();
        let (Some(min), Some(max)) = (stats.min, stats.max) else {
            return Ok(FeatureCollection::new());
        };
        let interval = self.params.contour_interval;
        let levels = contour_levels(min, max, interval)?;

        let features: FeatureCollection = contour_lines(self.dem, &levels)
            .into_iter()
            .filter_map(|contour| {
                let clipped = clip_lines(&contour.lines, &self.site.boundary);
                if clipped.0.is_empty() {
                    return None;
                }
                let step = (contour.level / interval).round() as i64;
                let major = self.params.major_every > 0 && step % self.params.major_every as i64 == 0;
                Some(
                    Feature::new(clipped)
                        .with_property("elevation", contour.level)
                        .with_property("major", major),
                )
            })
            .collect();

        debug!(levels = levels.len(), features = features.len(), "contours");
        Ok(features)
    }

    /// One multipolygon feature per non-empty slope class
    pub fn slope_heatmap(&self) -> Result<FeatureCollection> {
        let slope = self.derivatives.slope.data();
        let mut features = FeatureCollection::new();
        for class in SlopeClass::ALL {
            let mask = Mask::from_fn(slope.nrows(), slope.ncols(), *self.dem.transform(), |(r, c)| {
                self.site.boundary_mask.get(r, c) && class.contains(slope[(r, c)])
            });
            let polygons = self.vectorize(&mask)?;
            if polygons.0.is_empty() {
                continue;
            }
            let area = polygons.unsigned_area();
            features.push(
                Feature::new(polygons)
                    .with_property("class", class.label)
                    .with_property("min_slope", class.min_deg)
                    .with_property("max_slope", class.max_deg)
                    .with_property("color", class.color)
                    .with_property("area", area),
            );
        }
        debug!(features = features.len(), "slope heatmap");
        Ok(features)
    }

    /// One multipolygon feature per kind with a non-empty buildable mask
    pub fn buildable_polygons(&self, buildable: &BTreeMap<AssetKind, Mask>) -> Result<FeatureCollection> {
        let mut features = FeatureCollection::new();
        for (kind, mask) in buildable {
            let polygons = self.vectorize(mask)?;
            if polygons.0.is_empty() {
                continue;
            }
            let area = polygons.unsigned_area();
            features.push(
                Feature::new(polygons)
                    .with_property("kind", kind.as_str())
                    .with_property("area", area),
            );
        }
        Ok(features)
    }

    pub fn summary(&self, buildable: &BTreeMap<AssetKind, Mask>) -> TerrainSummary {
        let boundary = &self.site.boundary_mask;
        let elevations: Vec<f64> = boundary
            .cells()
            .filter_map(|(r, c)| self.dem.valid(r, c))
            .filter(|z| z.is_finite())
            .collect();
        let slopes: Vec<f64> = boundary
            .cells()
            .map(|rc| self.derivatives.slope.data()[rc])
            .filter(|s| s.is_finite())
            .collect();

        let total = boundary.count();
        let slope_class_percent = SlopeClass::ALL
            .iter()
            .map(|class| {
                let n = slopes.iter().filter(|&&s| class.contains(s)).count();
                let pct = if total > 0 { 100.0 * n as f64 / total as f64 } else { 0.0 };
                (class.label.to_string(), pct)
            })
            .collect();

        let cell_size = self.derivatives.cell_size;
        TerrainSummary {
            elevation_min: elevations.iter().copied().reduce(f64::min),
            elevation_max: elevations.iter().copied().reduce(f64::max),
            elevation_mean: mean(&elevations),
            slope_mean_deg: mean(&slopes),
            slope_max_deg: slopes.iter().copied().reduce(f64::max),
            slope_class_percent,
            buildable: buildable
                .iter()
                .map(|(&kind, mask)| BuildableStats::of(kind, mask, cell_size))
                .collect(),
        }
    }

    /// All products for a set of buildable masks
    pub fn products(&self, buildable: &BTreeMap<AssetKind, Mask>) -> Result<TerrainProducts> {
        Ok(TerrainProducts {
            contours: self.contours()?,
            slope_heatmap: self.slope_heatmap()?,
            buildable_areas: self.buildable_polygons(buildable)?,
            summary: self.summary(buildable),
        })
    }

    /// Opening cleanup, boundary tracing, boundary intersection and simplification
    fn vectorize(&self, mask: &Mask) -> Result<MultiPolygon<f64>> {
        let cleaned = if self.params.cleanup_radius > 0 {
            binary_opening(mask, &StructuringElement::Square(self.params.cleanup_radius))?
        } else {
            mask.clone()
        };
        if cleaned.is_clear() {
            return Ok(MultiPolygon::new(Vec::new()));
        }
        let traced = mask_to_polygons(&cleaned);
        let clipped = intersect_polygons(traced, &self.site.boundary);
        Ok(simplify_to_budget(&clipped, self.params.simplify))
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

//! The layout pipeline

use std::collections::{BTreeMap, BTreeSet};

use geo::Polygon;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use sitegrade_algorithms::terrain::{compute_derivatives, TerrainDerivatives};
use sitegrade_core::raster::{Mask, Raster};
use sitegrade_core::{Error, Result};
use tracing::{debug, info, warn};

use crate::asset::AssetKind;
use crate::buildable::BuildableAreaFilter;
use crate::config::LayoutConfig;
use crate::earthwork::{CutFillResult, EarthworkEstimator};
use crate::placement::{AssetPlacer, GenerationRequest, PlacedAsset};
use crate::products::{TerrainProducts, TerrainVisualizer};
use crate::roads::{PlacedRoad, RoadRouter};
use crate::site::{ExclusionZone, Site};
use crate::suitability::SuitabilityScorer;
use crate::warning::LayoutWarning;

/// Everything a layout run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    pub assets: Vec<PlacedAsset>,
    pub roads: Vec<PlacedRoad>,
    pub cut_fill: CutFillResult,
    pub warnings: Vec<LayoutWarning>,
    pub requested_count: usize,
    pub placed_count: usize,
    pub total_capacity_kw: f64,
}

/// Runs layouts with one validated configuration
///
/// ```
/// use sitegrade_layout::{LayoutConfig, LayoutEngine};
///
/// let engine = LayoutEngine::new(LayoutConfig::default()).unwrap();
/// assert_eq!(engine.config().buildable.threshold, 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Place assets, route roads and estimate earthwork for one request.
    ///
    /// The result depends only on the inputs and `request.seed`.
    pub fn generate(
        &self,
        dem: &Raster<f64>,
        boundary: &Polygon<f64>,
        exclusions: &[ExclusionZone],
        request: &GenerationRequest,
    ) -> Result<LayoutResult> {
        request.validate()?;
        ensure_terrain(dem)?;

        let derivatives = compute_derivatives(dem, &self.config.derivatives)?;
        let site = Site::prepare(dem, boundary, exclusions)?;
        let buildable = self.buildable_masks(&derivatives, &site, request.kinds())?;

        let mut rng = ChaCha8Rng::seed_from_u64(request.seed);
        let placer = AssetPlacer::new(&self.config.placement, &self.config.assets, dem, &derivatives, &site);
        let placement = placer.place(request, &buildable, &mut rng)?;
        let mut warnings = placement.warnings;
        let assets = placement.assets;

        let router = RoadRouter::new(&self.config.roads, &derivatives, &site);
        let (roads, road_warnings) = router.connect(&assets);
        warnings.extend(road_warnings);

        let estimator = EarthworkEstimator::new(dem, derivatives.cell_size, &self.config.assets);
        let (cut_fill, pad_warnings) = estimator.estimate(&assets);
        warnings.extend(pad_warnings);

        for w in &warnings {
            warn!(warning = %w, "layout");
        }

        let total_capacity_kw: f64 = assets.iter().map(|a| a.capacity_kw).sum();
        info!(
            requested = request.requested_count,
            placed = assets.len(),
            roads = roads.len(),
            cut_m3 = cut_fill.total_cut_m3,
            fill_m3 = cut_fill.total_fill_m3,
            warnings = warnings.len(),
            "layout generated"
        );

        Ok(LayoutResult {
            placed_count: assets.len(),
            requested_count: request.requested_count,
            total_capacity_kw,
            assets,
            roads,
            cut_fill,
            warnings,
        })
    }

    /// Contours, slope heatmap, buildable polygons and summary for a site
    pub fn terrain_products(&self, dem: &Raster<f64>, boundary: &Polygon<f64>) -> Result<TerrainProducts> {
        ensure_terrain(dem)?;
        let derivatives = compute_derivatives(dem, &self.config.derivatives)?;
        let site = Site::prepare(dem, boundary, &[])?;
        let buildable = self.buildable_masks(&derivatives, &site, AssetKind::ALL)?;
        TerrainVisualizer::new(&self.config.products, dem, &derivatives, &site).products(&buildable)
    }

    fn buildable_masks(
        &self,
        derivatives: &TerrainDerivatives,
        site: &Site,
        kinds: impl IntoIterator<Item = AssetKind>,
    ) -> Result<BTreeMap<AssetKind, Mask>> {
        let scorer = SuitabilityScorer::new(derivatives, &site.boundary_mask);
        let filter = BuildableAreaFilter::new(&self.config.buildable);
        let kinds: BTreeSet<AssetKind> = kinds.into_iter().collect();

        let mut masks = BTreeMap::new();
        for kind in kinds {
            let score = scorer.score(&self.config.assets.spec(kind).suitability)?;
            let mask = filter.filter(&score)?;
            debug!(%kind, buildable = mask.count(), "buildable area");
            masks.insert(kind, mask);
        }
        Ok(masks)
    }
}

fn ensure_terrain(dem: &Raster<f64>) -> Result<()> {
    if dem.is_empty() {
        return Err(Error::TerrainUnavailable("elevation grid is empty".into()));
    }
    if dem.valid_mask().is_clear() {
        return Err(Error::TerrainUnavailable("elevation grid has no valid cells".into()));
    }
    Ok(())
}

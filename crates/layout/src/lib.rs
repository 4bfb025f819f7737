//! # sitegrade layout
//!
//! Terrain-aware equipment layout on a site: suitability scoring, buildable
//! area extraction, greedy placement, access road routing, pad earthwork
//! estimation and vector terrain products.
//!
//! ```text
//! derivatives → suitability → buildable → placement → roads → earthwork
//! ```
//!
//! Every run of [`LayoutEngine::generate`] is a pure function of its inputs and
//! the request seed. Non-fatal anomalies are reported as [`LayoutWarning`]s;
//! only missing terrain, an invalid boundary and invalid parameters are errors.

pub mod asset;
pub mod buildable;
pub mod config;
pub mod earthwork;
pub mod engine;
pub mod placement;
pub mod products;
pub mod roads;
pub mod site;
pub mod suitability;
pub mod warning;

pub use asset::{AssetCatalog, AssetKind, AssetRole, AssetSpec, CapacityRange, SuitabilityConfig, SuitabilityWeights};
pub use buildable::{BuildableAreaFilter, BuildableStats};
pub use config::{BuildableParams, LayoutConfig, PlacementParams, ProductParams, RoadParams};
pub use earthwork::{CutFillResult, EarthworkEstimator, PadEarthwork};
pub use engine::{LayoutEngine, LayoutResult};
pub use placement::{AssetPlacer, GenerationRequest, PlacedAsset, Placement, ProfileEntry};
pub use products::{SlopeClass, TerrainProducts, TerrainSummary, TerrainVisualizer};
pub use roads::{PlacedRoad, RoadRouter, STEEP_PENALTY};
pub use site::{ExclusionZone, Site};
pub use suitability::SuitabilityScorer;
pub use warning::LayoutWarning;

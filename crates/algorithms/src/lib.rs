//! # sitegrade algorithms
//!
//! Grid and geometry algorithms used by the layout engine.
//!
//! ## Algorithm Categories
//!
//! - **terrain**: cell size, smoothing, slope, aspect, curvature, roughness, contours
//! - **morphology**: binary erosion/dilation/opening/closing, connected components
//! - **vector**: polygon rasterization, mask tracing, clipping, simplification, validation

pub(crate) mod maybe_rayon;
pub mod morphology;
pub mod terrain;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::morphology::{
        binary_closing, binary_dilate, binary_erode, binary_opening, fill_small_holes,
        label_components, remove_small_components, Connectivity, StructuringElement,
    };
    pub use crate::terrain::{
        aspect, compute_derivatives, contour_levels, contour_lines, curvature,
        gaussian_smoothing, roughness, slope, CellSize, DerivativeParams, TerrainDerivatives,
    };
    pub use crate::vector::{mask_to_polygons, rasterize_polygon, validate_polygon};
    pub use sitegrade_core::prelude::*;
}

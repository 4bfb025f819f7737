//! Vector operations between grids and polygons
//!
//! - Rasterize: polygon → mask by cell-center containment or distance
//! - Trace: mask → polygons with holes along cell edges
//! - Clip: lines and polygons against a site polygon
//! - Simplify: Douglas-Peucker under a vertex budget
//! - Validate: ring sanity checks for input polygons

mod clip;
mod rasterize;
mod simplify;
mod trace;
mod validate;

pub use clip::{clip_lines, intersect_polygons};
pub use rasterize::{rasterize_buffered, rasterize_polygon};
pub use simplify::{simplify_polygons, simplify_to_budget, SimplifyParams};
pub use trace::mask_to_polygons;
pub use validate::validate_polygon;

//! # sitegrade core
//!
//! Core types and traits shared by the sitegrade crates.
//!
//! This crate provides:
//! - `Raster<T>`: generic georeferenced grid (elevation, slope, scores)
//! - `Mask`: boolean grid sharing a raster's georeferencing
//! - `GeoTransform`: affine transformation for georeferencing
//! - `Crs`: geographic vs projected coordinate handling
//! - `Feature` / `FeatureCollection`: vector products with properties
//! - The `Algorithm` trait for a consistent kernel API

pub mod crs;
pub mod error;
pub mod raster;
pub mod vector;

pub use crs::{Crs, CrsKind};
pub use error::{Error, Result};
pub use raster::{GeoTransform, Mask, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::{Crs, CrsKind};
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Mask, Raster, RasterElement};
    pub use crate::vector::{AttributeValue, Feature, FeatureCollection};
    pub use crate::Algorithm;
}

/// Core trait for grid algorithms.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}

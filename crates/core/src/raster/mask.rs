//! Boolean grids sharing a raster's georeferencing
//!
//! Boundary masks, buildable masks and exclusion masks are all `Mask`s.

use crate::error::{Error, Result};
use crate::raster::GeoTransform;
use ndarray::{Array2, Zip};

/// A georeferenced boolean grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    data: Array2<bool>,
    transform: GeoTransform,
}

impl Mask {
    /// All-false mask
    pub fn empty(rows: usize, cols: usize, transform: GeoTransform) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), false), transform)
    }

    /// All-true mask
    pub fn full(rows: usize, cols: usize, transform: GeoTransform) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), true), transform)
    }

    pub fn from_array(data: Array2<bool>, transform: GeoTransform) -> Self {
        Self { data, transform }
    }

    /// Build a mask by evaluating `f(row, col)` for every cell
    pub fn from_fn(
        rows: usize,
        cols: usize,
        transform: GeoTransform,
        f: impl FnMut((usize, usize)) -> bool,
    ) -> Self {
        Self::from_array(Array2::from_shape_fn((rows, cols), f), transform)
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn data(&self) -> &Array2<bool> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array2<bool> {
        &mut self.data
    }

    /// Value at (row, col); out-of-bounds cells read as `false`
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.data.get((row, col)).copied().unwrap_or(false)
    }

    /// Set (row, col); out-of-bounds writes are ignored
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        if let Some(cell) = self.data.get_mut((row, col)) {
            *cell = value;
        }
    }

    /// Number of true cells
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Whether no cell is set
    pub fn is_clear(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Iterate over (row, col) of true cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.data
            .indexed_iter()
            .filter_map(|(idx, &v)| v.then_some(idx))
    }

    /// Cell-wise AND
    pub fn and(&self, other: &Mask) -> Result<Mask> {
        self.combine(other, |a, b| a && b)
    }

    /// Cell-wise OR
    pub fn or(&self, other: &Mask) -> Result<Mask> {
        self.combine(other, |a, b| a || b)
    }

    /// Cell-wise `self AND NOT other`
    pub fn and_not(&self, other: &Mask) -> Result<Mask> {
        self.combine(other, |a, b| a && !b)
    }

    /// Cell-wise NOT
    pub fn inverted(&self) -> Mask {
        Mask::from_array(self.data.mapv(|v| !v), self.transform)
    }

    fn combine(&self, other: &Mask, op: impl Fn(bool, bool) -> bool) -> Result<Mask> {
        self.check_shape(other)?;
        let data = Zip::from(&self.data)
            .and(&other.data)
            .map_collect(|&a, &b| op(a, b));
        Ok(Mask::from_array(data, self.transform))
    }

    /// Fail unless `other` has the same shape
    pub fn check_shape(&self, other: &Mask) -> Result<()> {
        let (er, ec) = self.shape();
        let (ar, ac) = other.shape();
        if (er, ec) != (ar, ac) {
            return Err(Error::SizeMismatch { er, ec, ar, ac });
        }
        Ok(())
    }
}

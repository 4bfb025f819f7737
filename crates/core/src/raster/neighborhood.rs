//! Cell neighborhoods: 8-connected moves and square windows

use super::{Raster, RasterElement};

/// 8-connected moves
pub mod d8 {
    use std::f64::consts::SQRT_2;

    /// (row offset, col offset, step length in cells)
    pub const NEIGHBORS: [(isize, isize, f64); 8] = [
        (-1, -1, SQRT_2),
        (-1, 0, 1.0),
        (-1, 1, SQRT_2),
        (0, -1, 1.0),
        (0, 1, 1.0),
        (1, -1, SQRT_2),
        (1, 0, 1.0),
        (1, 1, SQRT_2),
    ];

    /// Neighbor of (row, col) at offset (dr, dc) if it falls inside a rows×cols grid
    pub fn step(
        row: usize,
        col: usize,
        dr: isize,
        dc: isize,
        rows: usize,
        cols: usize,
    ) -> Option<(usize, usize)> {
        let nr = row.checked_add_signed(dr)?;
        let nc = col.checked_add_signed(dc)?;
        (nr < rows && nc < cols).then_some((nr, nc))
    }
}

/// Values of the in-grid cells of a square window, center excluded
pub struct NeighborhoodIterator<'a, T: RasterElement> {
    raster: &'a Raster<T>,
    center_row: usize,
    center_col: usize,
    offsets: Vec<(isize, isize)>,
    index: usize,
}

impl<'a, T: RasterElement> NeighborhoodIterator<'a, T> {
    /// Window of side `2 * radius + 1` around (row, col)
    pub fn square(raster: &'a Raster<T>, row: usize, col: usize, radius: usize) -> Self {
        let r = radius as isize;
        let offsets = (-r..=r)
            .flat_map(|dr| (-r..=r).map(move |dc| (dr, dc)))
            .filter(|&offset| offset != (0, 0))
            .collect();
        Self {
            raster,
            center_row: row,
            center_col: col,
            offsets,
            index: 0,
        }
    }
}

impl<T: RasterElement> Iterator for NeighborhoodIterator<'_, T> {
    /// (row, col, value); out-of-bounds positions are skipped
    type Item = (usize, usize, T);

    fn next(&mut self) -> Option<Self::Item> {
        let (rows, cols) = self.raster.shape();
        while self.index < self.offsets.len() {
            let (dr, dc) = self.offsets[self.index];
            self.index += 1;

            if let Some((r, c)) = d8::step(self.center_row, self.center_col, dr, dc, rows, cols) {
                return Some((r, c, self.raster.data()[(r, c)]));
            }
        }
        None
    }
}

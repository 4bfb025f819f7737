//! Binary morphology on masks
//!
//! - **Erosion**: a cell stays set when every in-grid neighbor under the element is set
//! - **Dilation**: a cell becomes set when any in-grid neighbor under the element is set
//! - **Opening**: erosion then dilation (removes specks and thin spurs)
//! - **Closing**: dilation then erosion (bridges narrow gaps)
//! - **Components**: connected-component labeling, small-region removal, hole filling
//!
//! Out-of-grid neighbors are ignored rather than treated as unset, so regions
//! touching the grid edge are not eaten away by erosion.

mod closing;
mod components;
mod dilate;
mod element;
mod erode;
mod opening;

pub use closing::{binary_closing, Closing, ClosingParams};
pub use components::{
    fill_small_holes, label_components, remove_small_components, ComponentLabels, Connectivity,
};
pub use dilate::{binary_dilate, Dilate, DilateParams};
pub use element::StructuringElement;
pub use erode::{binary_erode, Erode, ErodeParams};
pub use opening::{binary_opening, Opening, OpeningParams};

use ndarray::Array2;
use sitegrade_core::raster::Mask;
use sitegrade_core::{Error, Result};

use crate::maybe_rayon::*;

/// Shared kernel of erosion and dilation.
///
/// `all == true` erodes (every in-grid neighbor set), `false` dilates
/// (any in-grid neighbor set).
fn binary_filter(mask: &Mask, element: &StructuringElement, all: bool) -> Result<Mask> {
    element.validate()?;
    let (rows, cols) = mask.shape();
    let offsets = element.offsets();
    let data = mask.data();

    let output_data: Vec<bool> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| {
                    let mut in_grid = offsets.iter().filter_map(|&(dr, dc)| {
                        let r = row as isize + dr;
                        let c = col as isize + dc;
                        (r >= 0 && c >= 0 && (r as usize) < rows && (c as usize) < cols)
                            .then(|| data[(r as usize, c as usize)])
                    });
                    if all {
                        in_grid.all(|v| v)
                    } else {
                        in_grid.any(|v| v)
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let data = Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))?;
    Ok(Mask::from_array(data, *mask.transform()))
}

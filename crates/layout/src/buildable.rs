//! Suitability grid → cleaned buildable mask

use serde::{Deserialize, Serialize};
use sitegrade_algorithms::morphology::{
    binary_closing, binary_opening, fill_small_holes, remove_small_components, Connectivity,
    StructuringElement,
};
use sitegrade_algorithms::terrain::CellSize;
use sitegrade_core::raster::{Mask, Raster};
use sitegrade_core::Result;
use tracing::debug;

use crate::asset::AssetKind;
use crate::config::BuildableParams;

/// Size of one kind's buildable area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildableStats {
    pub kind: AssetKind,
    pub cells: usize,
    pub area_m2: f64,
}

impl BuildableStats {
    pub fn of(kind: AssetKind, mask: &Mask, cell_size: CellSize) -> Self {
        let cells = mask.count();
        Self {
            kind,
            cells,
            area_m2: cells as f64 * cell_size.area(),
        }
    }
}

/// Threshold, opening, small-region removal, hole filling and closing
pub struct BuildableAreaFilter<'a> {
    params: &'a BuildableParams,
}

impl<'a> BuildableAreaFilter<'a> {
    pub fn new(params: &'a BuildableParams) -> Self {
        Self { params }
    }

    /// Cells scoring at least `threshold`, cleaned into contiguous regions.
    pub fn filter(&self, suitability: &Raster<f64>) -> Result<Mask> {
        let p = self.params;
        let element = StructuringElement::Square(p.element_radius);

        let candidates = Mask::from_array(
            suitability.data().mapv(|s| s.is_finite() && s >= p.threshold),
            *suitability.transform(),
        );
        let opened = binary_opening(&candidates, &element)?;
        let kept = remove_small_components(&opened, p.min_region_cells, Connectivity::Eight);
        let filled = fill_small_holes(&kept, p.min_region_cells);
        let closed = binary_closing(&filled, &element)?;

        debug!(
            candidates = candidates.count(),
            opened = opened.count(),
            kept = kept.count(),
            buildable = closed.count(),
            "buildable mask"
        );
        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use sitegrade_core::GeoTransform;

    fn scores(rows: usize, cols: usize, f: impl Fn(usize, usize) -> f64) -> Raster<f64> {
        let mut r = Raster::from_array(Array2::from_shape_fn((rows, cols), |(r, c)| f(r, c)));
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        r
    }

    #[test]
    fn test_uniform_high_score_keeps_everything() {
        let params = BuildableParams::default();
        let mask = BuildableAreaFilter::new(&params).filter(&scores(12, 12, |_, _| 0.9)).unwrap();
        assert_eq!(mask.count(), 144);
    }

    #[test]
    fn test_small_patches_removed() {
        // One 2x2 patch (too small) and one 5x5 block
        let s = scores(15, 15, |r, c| {
            let patch = (1..=2).contains(&r) && (1..=2).contains(&c);
            let block = (6..=10).contains(&r) && (6..=10).contains(&c);
            if patch || block { 0.8 } else { 0.1 }
        });
        let params = BuildableParams::default();
        let mask = BuildableAreaFilter::new(&params).filter(&s).unwrap();
        assert!(!mask.get(1, 1));
        assert!(mask.get(8, 8));
        assert_eq!(mask.count(), 25);
    }

    #[test]
    fn test_pinhole_filled() {
        let s = scores(10, 10, |r, c| if r == 5 && c == 5 { 0.0 } else { 0.7 });
        let params = BuildableParams::default();
        let mask = BuildableAreaFilter::new(&params).filter(&s).unwrap();
        assert!(mask.get(5, 5));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let params = BuildableParams { threshold: 0.5, ..Default::default() };
        let mask = BuildableAreaFilter::new(&params).filter(&scores(6, 6, |_, _| 0.5)).unwrap();
        assert_eq!(mask.count(), 36);
    }

    #[test]
    fn test_stats() {
        let mask = Mask::full(4, 5, GeoTransform::default());
        let stats = BuildableStats::of(AssetKind::Battery, &mask, CellSize::new(10.0, 10.0));
        assert_eq!(stats.cells, 20);
        assert_eq!(stats.area_m2, 2000.0);
    }
}

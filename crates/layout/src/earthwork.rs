//! Flat-pad cut and fill
//!
//! Each asset gets a square pad graded to its own elevation. Terrain above
//! the pad level is cut, terrain below is filled.

use serde::{Deserialize, Serialize};
use sitegrade_algorithms::terrain::CellSize;
use sitegrade_core::raster::Raster;
use tracing::debug;

use crate::asset::{AssetCatalog, AssetKind};
use crate::placement::PlacedAsset;
use crate::warning::LayoutWarning;

/// Earthwork of one asset pad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadEarthwork {
    pub asset_index: usize,
    pub kind: AssetKind,
    pub cut_m3: f64,
    pub fill_m3: f64,
    /// Pad cells with a valid elevation
    pub valid_cells: usize,
}

/// Earthwork of a whole layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CutFillResult {
    pub total_cut_m3: f64,
    pub total_fill_m3: f64,
    /// Cut minus fill
    pub net_m3: f64,
    pub breakdown: Vec<PadEarthwork>,
}

pub struct EarthworkEstimator<'a> {
    dem: &'a Raster<f64>,
    cell_size: CellSize,
    catalog: &'a AssetCatalog,
}

impl<'a> EarthworkEstimator<'a> {
    pub fn new(dem: &'a Raster<f64>, cell_size: CellSize, catalog: &'a AssetCatalog) -> Self {
        Self { dem, cell_size, catalog }
    }

    /// Side of the pad window in cells, always odd
    pub fn pad_cells(&self, kind: AssetKind) -> usize {
        let mean_cell = (self.cell_size.dx + self.cell_size.dy) / 2.0;
        let n = (self.catalog.spec(kind).pad_size_m / mean_cell).round();
        let n = if n.is_finite() && n >= 1.0 { n as usize } else { 1 };
        if n % 2 == 0 {
            n + 1
        } else {
            n
        }
    }

    /// Cut and fill of one pad
    pub fn pad(&self, asset_index: usize, asset: &PlacedAsset) -> PadEarthwork {
        let (rows, cols) = self.dem.shape();
        let half = self.pad_cells(asset.kind) / 2;
        let r0 = asset.row.saturating_sub(half);
        let r1 = (asset.row + half).min(rows.saturating_sub(1));
        let c0 = asset.col.saturating_sub(half);
        let c1 = (asset.col + half).min(cols.saturating_sub(1));
        let cell_area = self.cell_size.area();

        let mut cut = 0.0;
        let mut fill = 0.0;
        let mut valid_cells = 0;
        for r in r0..=r1.max(r0) {
            for c in c0..=c1.max(c0) {
                let Some(z) = self.dem.valid(r, c) else {
                    continue;
                };
                let delta = z - asset.elevation;
                if !delta.is_finite() {
                    continue;
                }
                valid_cells += 1;
                if delta > 0.0 {
                    cut += delta * cell_area;
                } else {
                    fill -= delta * cell_area;
                }
            }
        }

        PadEarthwork {
            asset_index,
            kind: asset.kind,
            cut_m3: finite_or_zero(cut),
            fill_m3: finite_or_zero(fill),
            valid_cells,
        }
    }

    /// Cut and fill of every pad; totals are sums of the breakdown in order
    pub fn estimate(&self, assets: &[PlacedAsset]) -> (CutFillResult, Vec<LayoutWarning>) {
        let mut result = CutFillResult::default();
        let mut warnings = Vec::new();
        if self.dem.is_empty() {
            return (result, warnings);
        }

        for (i, asset) in assets.iter().enumerate() {
            let pad = self.pad(i, asset);
            if pad.valid_cells == 0 {
                warnings.push(LayoutWarning::EmptyPad { asset_index: i, kind: asset.kind });
            }
            result.total_cut_m3 += pad.cut_m3;
            result.total_fill_m3 += pad.fill_m3;
            result.breakdown.push(pad);
        }
        result.net_m3 = result.total_cut_m3 - result.total_fill_m3;

        debug!(
            pads = result.breakdown.len(),
            cut_m3 = result.total_cut_m3,
            fill_m3 = result.total_fill_m3,
            "earthwork estimated"
        );
        (result, warnings)
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use sitegrade_core::GeoTransform;

    fn dem(data: Array2<f64>) -> Raster<f64> {
        let mut r = Raster::from_array(data);
        r.set_transform(GeoTransform::new(0.0, 100.0, 2.0, -2.0));
        r.set_nodata(Some(f64::NAN));
        r
    }

    fn asset(kind: AssetKind, row: usize, col: usize, elevation: f64) -> PlacedAsset {
        PlacedAsset {
            kind,
            capacity_kw: 1.0,
            x: 0.0,
            y: 0.0,
            elevation,
            slope_deg: 0.0,
            footprint_width_m: 1.0,
            footprint_length_m: 1.0,
            row,
            col,
        }
    }

    fn catalog(pad_size_m: f64) -> AssetCatalog {
        let mut catalog = AssetCatalog::default();
        catalog.spec_mut(AssetKind::Inverter).pad_size_m = pad_size_m;
        catalog
    }

    #[test]
    fn test_pad_cells_odd() {
        let cat = catalog(6.0);
        let est_dem = dem(Array2::zeros((5, 5)));
        let est = EarthworkEstimator::new(&est_dem, CellSize::new(2.0, 2.0), &cat);
        assert_eq!(est.pad_cells(AssetKind::Inverter), 3);
        let cat = catalog(8.0);
        let est = EarthworkEstimator::new(&est_dem, CellSize::new(2.0, 2.0), &cat);
        assert_eq!(est.pad_cells(AssetKind::Inverter), 5);
        let cat = catalog(0.5);
        let est = EarthworkEstimator::new(&est_dem, CellSize::new(2.0, 2.0), &cat);
        assert_eq!(est.pad_cells(AssetKind::Inverter), 1);
    }

    #[test]
    fn test_flat_terrain_no_earthwork() {
        let cat = catalog(6.0);
        let d = dem(Array2::from_elem((10, 10), 100.0));
        let est = EarthworkEstimator::new(&d, CellSize::new(2.0, 2.0), &cat);
        let (result, warnings) = est.estimate(&[asset(AssetKind::Inverter, 5, 5, 100.0)]);
        assert!(warnings.is_empty());
        assert_eq!(result.total_cut_m3, 0.0);
        assert_eq!(result.total_fill_m3, 0.0);
        assert_eq!(result.breakdown[0].valid_cells, 9);
    }

    #[test]
    fn test_cut_and_fill_volumes() {
        // Row r has elevation 100 + r; a 3x3 pad at row 5 sits at 105
        let cat = catalog(6.0);
        let d = dem(Array2::from_shape_fn((10, 10), |(r, _)| 100.0 + r as f64));
        let est = EarthworkEstimator::new(&d, CellSize::new(2.0, 2.0), &cat);
        let (result, _) = est.estimate(&[asset(AssetKind::Inverter, 5, 5, 105.0)]);
        // One row 1 m above and one row 1 m below, 3 cells of 4 m² each
        assert_relative_eq!(result.total_cut_m3, 12.0);
        assert_relative_eq!(result.total_fill_m3, 12.0);
        assert_relative_eq!(result.net_m3, 0.0);
    }

    #[test]
    fn test_window_clipped_at_edge() {
        let cat = catalog(6.0);
        let d = dem(Array2::from_elem((4, 4), 10.0));
        let est = EarthworkEstimator::new(&d, CellSize::new(2.0, 2.0), &cat);
        assert_eq!(est.pad(0, &asset(AssetKind::Inverter, 0, 0, 9.0)).valid_cells, 4);
        let pad = est.pad(0, &asset(AssetKind::Inverter, 3, 3, 9.0));
        assert_eq!(pad.valid_cells, 4);
        assert_relative_eq!(pad.cut_m3, 16.0);
    }

    #[test]
    fn test_empty_pad_warns() {
        let cat = catalog(2.0);
        let mut data = Array2::from_elem((5, 5), 1.0);
        data[(2, 2)] = f64::NAN;
        let d = dem(data);
        let est = EarthworkEstimator::new(&d, CellSize::new(2.0, 2.0), &cat);
        let (result, warnings) = est.estimate(&[
            asset(AssetKind::Inverter, 2, 2, 0.0),
            asset(AssetKind::Inverter, 0, 0, 0.0),
        ]);
        assert_eq!(
            warnings,
            vec![LayoutWarning::EmptyPad { asset_index: 0, kind: AssetKind::Inverter }]
        );
        assert_eq!(result.breakdown[0].cut_m3, 0.0);
        assert_relative_eq!(result.breakdown[1].cut_m3, 4.0);
    }

    #[test]
    fn test_totals_are_breakdown_sums() {
        let cat = AssetCatalog::default();
        let d = dem(Array2::from_shape_fn((40, 40), |(r, c)| ((r * 7 + c * 3) % 11) as f64 * 0.37));
        let est = EarthworkEstimator::new(&d, CellSize::new(2.0, 2.0), &cat);
        let assets = vec![
            asset(AssetKind::Battery, 10, 10, 1.3),
            asset(AssetKind::Inverter, 30, 5, 2.0),
            asset(AssetKind::Transformer, 20, 33, 0.4),
        ];
        let (result, _) = est.estimate(&assets);
        let cut: f64 = result.breakdown.iter().map(|p| p.cut_m3).sum();
        let fill: f64 = result.breakdown.iter().map(|p| p.fill_m3).sum();
        assert_eq!(result.total_cut_m3, cut);
        assert_eq!(result.total_fill_m3, fill);
    }
}

//! Greedy asset placement
//!
//! A sequence of asset kinds is drawn from the request profile, ordered by
//! role, and placed one at a time. The first placed asset anchors the layout
//! on the flattest part of the site; every later asset minimizes a blend of
//! normalized slope and normalized distance to the anchor. Placed assets
//! block a spacing disc around themselves.

use std::collections::{BTreeMap, BTreeSet};

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sitegrade_algorithms::terrain::{CellSize, TerrainDerivatives};
use sitegrade_core::raster::{Mask, Raster};
use sitegrade_core::{Error, Result};
use tracing::debug;

use crate::asset::{AssetCatalog, AssetKind};
use crate::config::PlacementParams;
use crate::site::Site;
use crate::warning::LayoutWarning;

/// One entry of the equipment mix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub kind: AssetKind,
    /// Relative draw weight
    pub weight: f64,
}

impl ProfileEntry {
    pub fn new(kind: AssetKind, weight: f64) -> Self {
        Self { kind, weight }
    }
}

/// What to place and how much capacity to aim for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub target_capacity_kw: f64,
    pub requested_count: usize,
    pub profile: Vec<ProfileEntry>,
    /// Seed of every random draw in the run
    #[serde(default)]
    pub seed: u64,
}

impl GenerationRequest {
    pub fn validate(&self) -> Result<()> {
        if !self.target_capacity_kw.is_finite() || self.target_capacity_kw <= 0.0 {
            return Err(Error::invalid_parameter(
                "target_capacity_kw",
                self.target_capacity_kw,
                "must be positive",
            ));
        }
        if self.requested_count == 0 {
            return Err(Error::invalid_parameter("requested_count", 0, "must be at least 1"));
        }
        if self.profile.is_empty() {
            return Err(Error::invalid_parameter("profile", "[]", "needs at least one entry"));
        }
        for entry in &self.profile {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(Error::invalid_parameter(
                    "profile.weight",
                    entry.weight,
                    "must be finite and non-negative",
                ));
            }
        }
        if self.profile.iter().map(|e| e.weight).sum::<f64>() <= 0.0 {
            return Err(Error::invalid_parameter("profile", "weights", "sum to zero"));
        }
        Ok(())
    }

    /// Kinds that can appear in a drawn sequence
    pub fn kinds(&self) -> BTreeSet<AssetKind> {
        let mut kinds: BTreeSet<_> = self
            .profile
            .iter()
            .filter(|e| e.weight > 0.0)
            .map(|e| e.kind)
            .collect();
        kinds.insert(AssetKind::Substation);
        kinds
    }
}

/// An asset placed on the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedAsset {
    pub kind: AssetKind,
    pub capacity_kw: f64,
    /// Cell center in the elevation grid's coordinate reference
    pub x: f64,
    pub y: f64,
    pub elevation: f64,
    pub slope_deg: f64,
    pub footprint_width_m: f64,
    pub footprint_length_m: f64,
    pub row: usize,
    pub col: usize,
}

/// Output of [`AssetPlacer::place`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Placement {
    pub assets: Vec<PlacedAsset>,
    pub warnings: Vec<LayoutWarning>,
}

/// Places assets on buildable cells of a prepared site
pub struct AssetPlacer<'a> {
    params: &'a PlacementParams,
    catalog: &'a AssetCatalog,
    dem: &'a Raster<f64>,
    derivatives: &'a TerrainDerivatives,
    site: &'a Site,
}

impl<'a> AssetPlacer<'a> {
    pub fn new(
        params: &'a PlacementParams,
        catalog: &'a AssetCatalog,
        dem: &'a Raster<f64>,
        derivatives: &'a TerrainDerivatives,
        site: &'a Site,
    ) -> Self {
        Self { params, catalog, dem, derivatives, site }
    }

    /// Draw `requested_count` kinds from the profile and order them for placement.
    ///
    /// Long enough sequences without a hub get their first draw replaced by a
    /// substation. Ordering is stable: hubs, infrastructure, support, then
    /// area-filling kinds.
    pub fn draw_sequence<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        rng: &mut R,
    ) -> Result<Vec<AssetKind>> {
        let weights = WeightedIndex::new(request.profile.iter().map(|e| e.weight))
            .map_err(|e| Error::invalid_parameter("profile", "weights", e.to_string()))?;

        let mut sequence: Vec<AssetKind> = (0..request.requested_count)
            .map(|_| request.profile[weights.sample(rng)].kind)
            .collect();

        if sequence.len() >= self.params.hub_required_from && !sequence.iter().any(|k| k.is_hub()) {
            sequence[0] = AssetKind::Substation;
        }

        sequence.sort_by_key(|k| (k.role().placement_rank(), !k.is_hub()));
        Ok(sequence)
    }

    /// Place a drawn sequence.
    ///
    /// `buildable` holds one mask per kind; a kind without a mask has no
    /// buildable cells. Kinds that find no available cell are skipped with a
    /// [`LayoutWarning::NoBuildableCells`].
    pub fn place<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        buildable: &BTreeMap<AssetKind, Mask>,
        rng: &mut R,
    ) -> Result<Placement> {
        request.validate()?;
        let sequence = self.draw_sequence(request, rng)?;
        let usable = self.site.usable()?;
        let (rows, cols) = self.dem.shape();
        let cell = self.derivatives.cell_size;
        let baseline_kw = request.target_capacity_kw / request.requested_count as f64;

        let mut blocked = Mask::empty(rows, cols, *self.dem.transform());
        let mut placement = Placement::default();

        for (index, &kind) in sequence.iter().enumerate() {
            let spec = self.catalog.spec(kind);
            let candidates = match buildable.get(&kind) {
                Some(mask) => self.available(mask, &usable, &blocked, spec.suitability.max_slope_deg)?,
                None => Vec::new(),
            };

            let chosen = match placement.assets.first() {
                None => self.anchor_cell(&candidates, rng),
                Some(anchor) => self.nearest_flat_cell(&candidates, (anchor.row, anchor.col), rng),
            };
            let Some((row, col)) = chosen else {
                placement.warnings.push(LayoutWarning::NoBuildableCells { kind, sequence_index: index });
                continue;
            };

            let c = &spec.capacity;
            let drawn = if c.max_kw > c.min_kw { rng.gen_range(c.min_kw..=c.max_kw) } else { c.min_kw };
            let capacity_kw = round1(drawn * baseline_kw / c.reference_kw);

            let (x, y) = self.dem.pixel_to_geo(col, row);
            placement.assets.push(PlacedAsset {
                kind,
                capacity_kw: sanitize(capacity_kw),
                x,
                y,
                elevation: sanitize(self.dem.data()[(row, col)]),
                slope_deg: sanitize(self.derivatives.slope.data()[(row, col)]),
                footprint_width_m: spec.footprint_width_m,
                footprint_length_m: spec.footprint_length_m,
                row,
                col,
            });
            block_spacing(&mut blocked, (row, col), self.params.min_spacing_m, cell);
        }

        debug!(
            drawn = sequence.len(),
            placed = placement.assets.len(),
            skipped = placement.warnings.len(),
            "assets placed"
        );
        Ok(placement)
    }

    /// Cells where `kind` may go right now, in row-major order
    fn available(
        &self,
        buildable: &Mask,
        usable: &Mask,
        blocked: &Mask,
        max_slope_deg: f64,
    ) -> Result<Vec<(usize, usize)>> {
        let free = buildable.and(usable)?.and_not(blocked)?;
        let slope = self.derivatives.slope.data();
        Ok(free
            .cells()
            .filter(|&(r, c)| {
                let s = slope[(r, c)];
                s.is_finite() && s <= max_slope_deg
            })
            .collect())
    }

    /// Cell nearest to the centroid of the very flat candidates, or the
    /// flattest candidate when none is very flat
    fn anchor_cell<R: Rng + ?Sized>(
        &self,
        candidates: &[(usize, usize)],
        rng: &mut R,
    ) -> Option<(usize, usize)> {
        let slope = self.derivatives.slope.data();
        let flat: Vec<(usize, usize)> = candidates
            .iter()
            .copied()
            .filter(|&(r, c)| slope[(r, c)] < self.params.very_flat_slope_deg)
            .collect();

        if flat.is_empty() {
            return pick_min(candidates, |&(r, c)| slope[(r, c)], rng);
        }

        let n = flat.len() as f64;
        let centroid_r = flat.iter().map(|&(r, _)| r as f64).sum::<f64>() / n;
        let centroid_c = flat.iter().map(|&(_, c)| c as f64).sum::<f64>() / n;
        let cell = self.derivatives.cell_size;
        pick_min(
            &flat,
            |&(r, c)| {
                let dy = (r as f64 - centroid_r) * cell.dy;
                let dx = (c as f64 - centroid_c) * cell.dx;
                dx * dx + dy * dy
            },
            rng,
        )
    }

    /// Minimum of the weighted normalized slope and anchor distance
    fn nearest_flat_cell<R: Rng + ?Sized>(
        &self,
        candidates: &[(usize, usize)],
        anchor: (usize, usize),
        rng: &mut R,
    ) -> Option<(usize, usize)> {
        if candidates.is_empty() {
            return None;
        }
        let slope = self.derivatives.slope.data();
        let cell = self.derivatives.cell_size;
        let slopes: Vec<f64> = candidates.iter().map(|&rc| slope[rc]).collect();
        let distances: Vec<f64> = candidates
            .iter()
            .map(|&rc| distance_m(rc, anchor, cell))
            .collect();

        let slope_norm = normalizer(&slopes);
        let dist_norm = normalizer(&distances);
        let costs: Vec<f64> = slopes
            .iter()
            .zip(&distances)
            .map(|(&s, &d)| self.params.slope_weight * slope_norm(s) + self.params.distance_weight * dist_norm(d))
            .collect();

        let best = pick_min(&(0..candidates.len()).collect::<Vec<_>>(), |&i| costs[i], rng)?;
        Some(candidates[best])
    }
}

/// Item with the smallest key; exact ties go to the RNG
fn pick_min<T: Copy, R: Rng + ?Sized>(items: &[T], key: impl Fn(&T) -> f64, rng: &mut R) -> Option<T> {
    let mut best = f64::INFINITY;
    let mut ties: Vec<T> = Vec::new();
    for item in items {
        let k = key(item);
        if k < best {
            best = k;
            ties.clear();
            ties.push(*item);
        } else if k == best {
            ties.push(*item);
        }
    }
    match ties.len() {
        0 => None,
        1 => Some(ties[0]),
        n => Some(ties[rng.gen_range(0..n)]),
    }
}

/// Min-max normalization over `values`; a zero range maps everything to 0
fn normalizer(values: &[f64]) -> impl Fn(f64) -> f64 {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    move |v| if range > 0.0 { (v - min) / range } else { 0.0 }
}

fn distance_m(a: (usize, usize), b: (usize, usize), cell: CellSize) -> f64 {
    cell.step_length(a.0 as isize - b.0 as isize, a.1 as isize - b.1 as isize)
}

fn block_spacing(blocked: &mut Mask, center: (usize, usize), spacing_m: f64, cell: CellSize) {
    let (rows, cols) = blocked.shape();
    let reach_r = ((spacing_m / cell.dy).ceil() as usize).min(rows);
    let reach_c = ((spacing_m / cell.dx).ceil() as usize).min(cols);
    let r0 = center.0.saturating_sub(reach_r);
    let r1 = center.0.saturating_add(reach_r).min(rows - 1);
    let c0 = center.1.saturating_sub(reach_c);
    let c1 = center.1.saturating_add(reach_c).min(cols - 1);
    for r in r0..=r1 {
        for c in c0..=c1 {
            if distance_m((r, c), center, cell) < spacing_m {
                blocked.set(r, c, true);
            }
        }
    }
    // the asset's own cell is taken even with zero spacing
    blocked.set(center.0, center.1, true);
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sitegrade_algorithms::terrain::{compute_derivatives, DerivativeParams};
    use sitegrade_core::GeoTransform;

    struct Fixture {
        dem: Raster<f64>,
        derivatives: TerrainDerivatives,
        site: Site,
        params: PlacementParams,
        catalog: AssetCatalog,
    }

    fn fixture(size: usize) -> Fixture {
        let mut dem = Raster::filled(size, size, 100.0);
        let extent = size as f64 * 10.0;
        dem.set_transform(GeoTransform::new(0.0, extent, 10.0, -10.0));
        let derivatives = compute_derivatives(&dem, &DerivativeParams::default()).unwrap();
        let boundary = polygon![
            (x: 0.0, y: 0.0), (x: extent, y: 0.0), (x: extent, y: extent), (x: 0.0, y: extent)
        ];
        let site = Site::prepare(&dem, &boundary, &[]).unwrap();
        Fixture {
            dem,
            derivatives,
            site,
            params: PlacementParams::default(),
            catalog: AssetCatalog::default(),
        }
    }

    impl Fixture {
        fn placer(&self) -> AssetPlacer<'_> {
            AssetPlacer::new(&self.params, &self.catalog, &self.dem, &self.derivatives, &self.site)
        }

        fn full_masks(&self, request: &GenerationRequest) -> BTreeMap<AssetKind, Mask> {
            let (rows, cols) = self.dem.shape();
            request
                .kinds()
                .into_iter()
                .map(|k| (k, Mask::full(rows, cols, *self.dem.transform())))
                .collect()
        }
    }

    fn request(count: usize, profile: Vec<ProfileEntry>) -> GenerationRequest {
        GenerationRequest { target_capacity_kw: 1000.0, requested_count: count, profile, seed: 7 }
    }

    #[test]
    fn test_hub_injected() {
        let f = fixture(10);
        let req = request(5, vec![ProfileEntry::new(AssetKind::SolarArray, 1.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let seq = f.placer().draw_sequence(&req, &mut rng).unwrap();
        assert_eq!(seq.len(), 5);
        assert_eq!(seq[0], AssetKind::Substation);
        assert!(seq[1..].iter().all(|&k| k == AssetKind::SolarArray));
    }

    #[test]
    fn test_short_sequence_keeps_draws() {
        let f = fixture(10);
        let req = request(2, vec![ProfileEntry::new(AssetKind::Inverter, 1.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let seq = f.placer().draw_sequence(&req, &mut rng).unwrap();
        assert_eq!(seq, vec![AssetKind::Inverter, AssetKind::Inverter]);
    }

    #[test]
    fn test_sequence_ordered_by_role() {
        let f = fixture(10);
        let req = request(
            20,
            vec![
                ProfileEntry::new(AssetKind::SolarArray, 1.0),
                ProfileEntry::new(AssetKind::Battery, 1.0),
                ProfileEntry::new(AssetKind::Transformer, 1.0),
                ProfileEntry::new(AssetKind::Substation, 1.0),
            ],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let seq = f.placer().draw_sequence(&req, &mut rng).unwrap();
        assert!(seq[0].is_hub());
        let ranks: Vec<_> = seq.iter().map(|k| k.role().placement_rank()).collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_spacing_and_capacity() {
        let f = fixture(30);
        let req = request(6, vec![ProfileEntry::new(AssetKind::Inverter, 1.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(req.seed);
        let placement = f.placer().place(&req, &f.full_masks(&req), &mut rng).unwrap();

        assert_eq!(placement.assets.len(), 6);
        assert!(placement.warnings.is_empty());
        for (i, a) in placement.assets.iter().enumerate() {
            for b in &placement.assets[i + 1..] {
                assert!((a.x - b.x).hypot(a.y - b.y) >= f.params.min_spacing_m);
            }
            // baseline 1000/6 kW, scaled from the kind's range around its reference
            let spec = f.catalog.spec(a.kind).capacity;
            let lo = spec.min_kw * (1000.0 / 6.0) / spec.reference_kw;
            let hi = spec.max_kw * (1000.0 / 6.0) / spec.reference_kw;
            assert!(a.capacity_kw >= lo - 0.05 && a.capacity_kw <= hi + 0.05);
            assert_eq!(a.capacity_kw, round1(a.capacity_kw));
        }
    }

    #[test]
    fn test_block_spacing_window_clamped() {
        let transform = GeoTransform::new(0.0, 50.0, 10.0, -10.0);
        let mut blocked = Mask::empty(5, 5, transform);
        block_spacing(&mut blocked, (4, 4), 1.0e300, CellSize::new(10.0, 10.0));
        assert_eq!(blocked.count(), 25);

        let mut blocked = Mask::empty(5, 5, transform);
        block_spacing(&mut blocked, (2, 2), 15.0, CellSize::new(10.0, 10.0));
        // diagonals are 14.1 m away, two cells out is 20 m
        assert_eq!(blocked.count(), 9);
    }

    #[test]
    fn test_anchor_at_flat_centroid() {
        let f = fixture(11);
        let req = request(1, vec![ProfileEntry::new(AssetKind::Substation, 1.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let placement = f.placer().place(&req, &f.full_masks(&req), &mut rng).unwrap();
        let anchor = &placement.assets[0];
        assert_eq!((anchor.row, anchor.col), (5, 5));
    }

    #[test]
    fn test_missing_mask_warns() {
        let f = fixture(10);
        let req = request(3, vec![ProfileEntry::new(AssetKind::Battery, 1.0)]);
        let mut masks = f.full_masks(&req);
        masks.remove(&AssetKind::Battery);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let placement = f.placer().place(&req, &masks, &mut rng).unwrap();
        assert_eq!(placement.assets.len(), 1);
        assert_eq!(placement.assets[0].kind, AssetKind::Substation);
        assert_eq!(placement.warnings.len(), 2);
        assert!(matches!(
            placement.warnings[0],
            LayoutWarning::NoBuildableCells { kind: AssetKind::Battery, .. }
        ));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let f = fixture(20);
        let req = request(
            8,
            vec![ProfileEntry::new(AssetKind::Battery, 2.0), ProfileEntry::new(AssetKind::Inverter, 1.0)],
        );
        let masks = f.full_masks(&req);
        let a = f.placer().place(&req, &masks, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        let b = f.placer().place(&req, &masks, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_request() {
        let mut req = request(0, vec![ProfileEntry::new(AssetKind::Battery, 1.0)]);
        assert!(req.validate().is_err());
        req.requested_count = 2;
        req.profile = vec![ProfileEntry::new(AssetKind::Battery, 0.0)];
        assert!(req.validate().is_err());
        req.profile = vec![ProfileEntry::new(AssetKind::Battery, 1.0)];
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_pick_min_breaks_ties_within_set() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..20 {
            let v = pick_min(&[3, 1, 1, 2], |&x| x as f64, &mut rng).unwrap();
            assert_eq!(v, 1);
        }
        assert_eq!(pick_min::<u8, _>(&[], |_| 0.0, &mut rng), None);
    }
}

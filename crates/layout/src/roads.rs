//! Access roads: slope cost surface and A* routing
//!
//! Every non-hub asset is connected to the first placed asset by the cheapest
//! 8-connected path over a cost surface that grows with the square of slope
//! relative to the maximum road grade.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geo::{Coord, LineString};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use sitegrade_algorithms::terrain::TerrainDerivatives;
use sitegrade_core::raster::{d8, Raster};
use tracing::debug;

use crate::config::RoadParams;
use crate::placement::PlacedAsset;
use crate::site::Site;
use crate::warning::LayoutWarning;

/// Cost of a cell too steep to build on, inside a hard exclusion, or without data
pub const STEEP_PENALTY: f64 = 1.0e4;

/// Road between two placed assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedRoad {
    /// Index of the hub in the asset list
    pub from: usize,
    /// Index of the connected asset
    pub to: usize,
    pub path: LineString<f64>,
    pub length_m: f64,
    pub max_grade_pct: f64,
    pub avg_grade_pct: f64,
    /// The path search ran out of budget and the road is a straight segment
    pub fallback: bool,
}

/// State in the open set (min-heap via reversed ordering)
#[derive(Debug, Clone, PartialEq)]
struct State {
    f: f64,
    g: f64,
    row: usize,
    col: usize,
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; deeper nodes first on equal f
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.g.partial_cmp(&other.g).unwrap_or(Ordering::Equal))
            .then_with(|| other.row.cmp(&self.row))
            .then_with(|| other.col.cmp(&self.col))
    }
}

/// Routes roads over a site
pub struct RoadRouter<'a> {
    params: &'a RoadParams,
    slope: &'a Raster<f64>,
    cell_m: f64,
    cost: Array2<f64>,
}

impl<'a> RoadRouter<'a> {
    /// Build the cost surface from slope and the site's exclusion zones
    pub fn new(params: &'a RoadParams, derivatives: &'a TerrainDerivatives, site: &Site) -> Self {
        let threshold = (params.max_grade_pct / 100.0).atan().to_degrees();
        let steep = params.steep_factor * threshold;
        let multipliers = site.cost_multipliers.data();
        let hard = site.hard_exclusions.data();

        let cost = Array2::from_shape_fn(derivatives.slope.shape(), |(r, c)| {
            let slope = derivatives.slope.data()[(r, c)];
            if hard[(r, c)] || !slope.is_finite() || slope > steep {
                return STEEP_PENALTY;
            }
            let base = 1.0 + (slope / threshold).powi(2);
            (base * multipliers[(r, c)]).min(STEEP_PENALTY)
        });

        let cell = derivatives.cell_size;
        Self {
            params,
            slope: &derivatives.slope,
            cell_m: (cell.dx + cell.dy) / 2.0,
            cost,
        }
    }

    /// Per-cell traversal cost
    pub fn cost_surface(&self) -> &Array2<f64> {
        &self.cost
    }

    /// Cheapest 8-connected cell path from `start` to `goal`, both inclusive.
    ///
    /// Entering a cell costs its surface value, times √2 on diagonals. Returns
    /// `None` when the expansion budget runs out.
    pub fn find_path(&self, start: (usize, usize), goal: (usize, usize)) -> Option<Vec<(usize, usize)>> {
        let (rows, cols) = self.cost.dim();
        let idx = |r: usize, c: usize| r * cols + c;
        let heuristic = |r: usize, c: usize| {
            let dr = r as f64 - goal.0 as f64;
            let dc = c as f64 - goal.1 as f64;
            dr.hypot(dc)
        };

        let mut g_score = vec![f64::INFINITY; rows * cols];
        let mut came_from = vec![usize::MAX; rows * cols];
        let mut closed = vec![false; rows * cols];
        let mut heap = BinaryHeap::new();

        g_score[idx(start.0, start.1)] = 0.0;
        heap.push(State { f: heuristic(start.0, start.1), g: 0.0, row: start.0, col: start.1 });

        let mut expansions = 0usize;
        while let Some(State { g, row, col, .. }) = heap.pop() {
            let here = idx(row, col);
            if closed[here] || g > g_score[here] {
                continue;
            }
            if (row, col) == goal {
                return Some(reconstruct(&came_from, here, cols));
            }
            closed[here] = true;
            expansions += 1;
            if expansions > self.params.max_iterations {
                debug!(expansions, ?start, ?goal, "path search budget exhausted");
                return None;
            }

            for &(dr, dc, step) in &d8::NEIGHBORS {
                let Some((nr, nc)) = d8::step(row, col, dr, dc, rows, cols) else {
                    continue;
                };
                let next = idx(nr, nc);
                if closed[next] {
                    continue;
                }
                let tentative = g + self.cost[(nr, nc)] * step;
                if tentative < g_score[next] {
                    g_score[next] = tentative;
                    came_from[next] = here;
                    heap.push(State { f: tentative + heuristic(nr, nc), g: tentative, row: nr, col: nc });
                }
            }
        }
        None
    }

    /// Star network from the first asset to every other one
    pub fn connect(&self, assets: &[PlacedAsset]) -> (Vec<PlacedRoad>, Vec<LayoutWarning>) {
        let mut roads = Vec::new();
        let mut warnings = Vec::new();
        let Some(hub) = assets.first() else {
            return (roads, warnings);
        };

        for (i, asset) in assets.iter().enumerate().skip(1) {
            let road = match self.find_path((hub.row, hub.col), (asset.row, asset.col)) {
                Some(cells) => {
                    let path = self.cells_to_line(&cells);
                    self.road(0, i, path, &cells, false)
                }
                None => {
                    warnings.push(LayoutWarning::StraightLineFallback { asset_index: i, kind: asset.kind });
                    let cells = bresenham((hub.row, hub.col), (asset.row, asset.col));
                    let path = LineString::from(vec![(hub.x, hub.y), (asset.x, asset.y)]);
                    self.road(0, i, path, &cells, true)
                }
            };
            roads.push(road);
        }

        debug!(roads = roads.len(), fallbacks = warnings.len(), "roads routed");
        (roads, warnings)
    }

    fn road(&self, from: usize, to: usize, path: LineString<f64>, cells: &[(usize, usize)], fallback: bool) -> PlacedRoad {
        let grades: Vec<f64> = cells
            .iter()
            .map(|&rc| self.slope.data()[rc])
            .filter(|s| s.is_finite())
            .map(|s| s.to_radians().tan() * 100.0)
            .filter(|g| g.is_finite())
            .collect();
        let max_grade_pct = grades.iter().copied().fold(0.0, f64::max);
        let avg_grade_pct = if grades.is_empty() {
            0.0
        } else {
            grades.iter().sum::<f64>() / grades.len() as f64
        };

        PlacedRoad {
            from,
            to,
            path,
            length_m: cells.len() as f64 * self.cell_m,
            max_grade_pct,
            avg_grade_pct,
            fallback,
        }
    }

    fn cells_to_line(&self, cells: &[(usize, usize)]) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = cells
            .iter()
            .map(|&(r, c)| {
                let (x, y) = self.slope.pixel_to_geo(c, r);
                Coord { x, y }
            })
            .collect();
        if coords.len() == 1 {
            coords.push(coords[0]);
        }
        LineString::new(coords)
    }
}

fn reconstruct(came_from: &[usize], goal: usize, cols: usize) -> Vec<(usize, usize)> {
    let mut path = vec![(goal / cols, goal % cols)];
    let mut current = goal;
    while came_from[current] != usize::MAX {
        current = came_from[current];
        path.push((current / cols, current % cols));
    }
    path.reverse();
    path
}

/// Grid cells on the segment between two cells, endpoints included
fn bresenham(from: (usize, usize), to: (usize, usize)) -> Vec<(usize, usize)> {
    let (mut r, mut c) = (from.0 as isize, from.1 as isize);
    let (r1, c1) = (to.0 as isize, to.1 as isize);
    let dr = (r1 - r).abs();
    let dc = (c1 - c).abs();
    let sr = if r < r1 { 1 } else { -1 };
    let sc = if c < c1 { 1 } else { -1 };
    let mut err = dc - dr;
    let mut cells = Vec::with_capacity((dr.max(dc) + 1) as usize);

    loop {
        cells.push((r as usize, c as usize));
        if r == r1 && c == c1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dr {
            err -= dr;
            c += sc;
        }
        if e2 < dc {
            err += dc;
            r += sr;
        }
    }
    cells
}

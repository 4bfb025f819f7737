//! Vector contour extraction
//!
//! Marching squares over the lattice of cell centers. Crossing points are
//! linearly interpolated along lattice edges, segments are stitched into
//! polylines through their shared edges, and the result is mapped to world
//! coordinates with the grid's transform.
//!
//! Saddle squares (two diagonal corners above the level) are resolved with the
//! mean of the four corners.

use std::collections::HashMap;

use geo::{Coord, LineString};
use sitegrade_core::raster::Raster;
use sitegrade_core::{Error, Result};

/// Polylines of one contour level, in world coordinates
#[derive(Debug, Clone)]
pub struct ContourLine {
    pub level: f64,
    pub lines: Vec<LineString<f64>>,
}

/// Contour levels `ceil(min/interval)·interval, …` up to and including `max`.
pub fn contour_levels(min: f64, max: f64, interval: f64) -> Result<Vec<f64>> {
    if !interval.is_finite() || interval <= 0.0 {
        return Err(Error::invalid_parameter("interval", interval, "must be positive"));
    }
    if !min.is_finite() || !max.is_finite() || max < min {
        return Ok(Vec::new());
    }
    let first = (min / interval).ceil() as i64;
    let last = (max / interval).floor() as i64;
    Ok((first..=last).map(|k| k as f64 * interval).collect())
}

/// Lattice edge between two adjacent cell centers.
///
/// `H(r, c)` joins (r, c)-(r, c+1); `V(r, c)` joins (r, c)-(r+1, c).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Edge {
    H(usize, usize),
    V(usize, usize),
}

/// Extract contour polylines for each level.
///
/// Squares with a nodata corner produce no segments. Polylines collapsing to
/// a single point are dropped, and levels without any crossing are returned
/// with an empty `lines`.
pub fn contour_lines(dem: &Raster<f64>, levels: &[f64]) -> Vec<ContourLine> {
    levels
        .iter()
        .map(|&level| ContourLine {
            level,
            lines: trace_level(dem, level),
        })
        .collect()
}

fn trace_level(dem: &Raster<f64>, level: f64) -> Vec<LineString<f64>> {
    let (rows, cols) = dem.shape();
    if rows < 2 || cols < 2 {
        return Vec::new();
    }

    let mut segments: Vec<(Edge, Edge)> = Vec::new();
    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            let corners = (
                dem.valid(r, c),
                dem.valid(r, c + 1),
                dem.valid(r + 1, c + 1),
                dem.valid(r + 1, c),
            );
            let (Some(tl), Some(tr), Some(br), Some(bl)) = corners else {
                continue;
            };
            let case = ((tl >= level) as u8) << 3
                | ((tr >= level) as u8) << 2
                | ((br >= level) as u8) << 1
                | (bl >= level) as u8;

            let top = Edge::H(r, c);
            let bottom = Edge::H(r + 1, c);
            let left = Edge::V(r, c);
            let right = Edge::V(r, c + 1);
            let center_above = (tl + tr + br + bl) / 4.0 >= level;

            match case {
                0 | 15 => {}
                1 | 14 => segments.push((left, bottom)),
                2 | 13 => segments.push((bottom, right)),
                3 | 12 => segments.push((left, right)),
                4 | 11 => segments.push((top, right)),
                6 | 9 => segments.push((top, bottom)),
                7 | 8 => segments.push((left, top)),
                5 => {
                    if center_above {
                        segments.push((left, top));
                        segments.push((bottom, right));
                    } else {
                        segments.push((top, right));
                        segments.push((left, bottom));
                    }
                }
                10 => {
                    if center_above {
                        segments.push((top, right));
                        segments.push((left, bottom));
                    } else {
                        segments.push((left, top));
                        segments.push((bottom, right));
                    }
                }
                _ => unreachable!("case index is four bits"),
            }
        }
    }

    stitch(&segments)
        .into_iter()
        .map(|chain| {
            chain
                .into_iter()
                .map(|edge| crossing(dem, edge, level))
                .collect::<LineString<f64>>()
        })
        .filter(|ls| ls.0.iter().any(|c| *c != ls.0[0]))
        .collect()
}

/// World coordinate where `level` crosses a lattice edge.
fn crossing(dem: &Raster<f64>, edge: Edge, level: f64) -> Coord<f64> {
    let ((r0, c0), (r1, c1)) = match edge {
        Edge::H(r, c) => ((r, c), (r, c + 1)),
        Edge::V(r, c) => ((r, c), (r + 1, c)),
    };
    let z0 = dem.data()[(r0, c0)];
    let z1 = dem.data()[(r1, c1)];
    let t = if (z1 - z0).abs() > f64::EPSILON { ((level - z0) / (z1 - z0)).clamp(0.0, 1.0) } else { 0.5 };
    let col = c0 as f64 + 0.5 + t * (c1 as f64 - c0 as f64);
    let row = r0 as f64 + 0.5 + t * (r1 as f64 - r0 as f64);
    let (x, y) = dem.transform().fractional_to_geo(col, row);
    Coord { x, y }
}

/// Join segments sharing a lattice edge into chains of edges.
///
/// Open chains start from edges used by a single segment; what remains are
/// closed rings, which repeat their first edge at the end.
fn stitch(segments: &[(Edge, Edge)]) -> Vec<Vec<Edge>> {
    let mut touching: HashMap<Edge, Vec<usize>> = HashMap::new();
    for (i, &(a, b)) in segments.iter().enumerate() {
        touching.entry(a).or_default().push(i);
        touching.entry(b).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut chains = Vec::new();

    let walk = |start_seg: usize, start_edge: Edge, used: &mut Vec<bool>| -> Vec<Edge> {
        let mut chain = vec![start_edge];
        let mut seg = start_seg;
        let mut at = start_edge;
        loop {
            used[seg] = true;
            let (a, b) = segments[seg];
            let next = if a == at { b } else { a };
            chain.push(next);
            at = next;
            let follow = touching
                .get(&at)
                .and_then(|segs| segs.iter().copied().find(|&s| !used[s]));
            match follow {
                Some(s) => seg = s,
                None => break,
            }
        }
        chain
    };

    // Sorted so output order does not depend on hash iteration
    let mut ends: Vec<Edge> = touching
        .iter()
        .filter(|(_, segs)| segs.len() == 1)
        .map(|(&e, _)| e)
        .collect();
    ends.sort_by_key(edge_order);
    for edge in ends {
        let seg = touching[&edge][0];
        if !used[seg] {
            chains.push(walk(seg, edge, &mut used));
        }
    }
    for seg in 0..segments.len() {
        if !used[seg] {
            chains.push(walk(seg, segments[seg].0, &mut used));
        }
    }
    chains
}

fn edge_order(e: &Edge) -> (usize, usize, u8) {
    match *e {
        Edge::H(r, c) => (r, c, 0),
        Edge::V(r, c) => (r, c, 1),
    }
}

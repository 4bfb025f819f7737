//! Polygon sanity checks

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, Coord, Line, Polygon};
use sitegrade_core::{Error, Result};

/// Check that a polygon's exterior ring is usable as a site boundary.
///
/// Fails with [`Error::InvalidBoundary`] when the ring has non-finite
/// coordinates, fewer than three distinct vertices, zero area, or crosses
/// itself.
pub fn validate_polygon(polygon: &Polygon<f64>) -> Result<()> {
    let ring = &polygon.exterior().0;
    if ring.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(Error::InvalidBoundary("non-finite coordinate".into()));
    }

    let mut vertices: Vec<Coord<f64>> = Vec::with_capacity(ring.len());
    for &c in ring {
        if vertices.last() != Some(&c) {
            vertices.push(c);
        }
    }
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    if vertices.len() < 3 {
        return Err(Error::InvalidBoundary(format!(
            "{} distinct vertices, need at least 3",
            vertices.len()
        )));
    }

    let (min_x, max_x, min_y, max_y) = vertices.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(a, b, c, d), v| (a.min(v.x), b.max(v.x), c.min(v.y), d.max(v.y)),
    );
    let extent = (max_x - min_x).max(max_y - min_y);
    let area = Polygon::new(polygon.exterior().clone(), vec![]).unsigned_area();
    if !(area > 1e-12 * extent * extent) {
        return Err(Error::InvalidBoundary("ring has zero area".into()));
    }

    let n = vertices.len();
    let segments: Vec<Line<f64>> = (0..n)
        .map(|i| Line::new(vertices[i], vertices[(i + 1) % n]))
        .collect();
    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(segments[i], segments[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(_) => {
                    return Err(Error::InvalidBoundary(format!(
                        "ring crosses itself between edges {i} and {j}"
                    )));
                }
            }
        }
    }
    Ok(())
}

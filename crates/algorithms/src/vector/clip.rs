//! Clipping against a site polygon

use geo::{BooleanOps, BoundingRect, Intersects, LineString, MultiLineString, MultiPolygon, Polygon};

/// Keep the parts of `lines` inside `boundary`.
///
/// Lines whose bounding box misses the boundary are dropped before the
/// boolean clip; empty pieces are discarded.
pub fn clip_lines(lines: &[LineString<f64>], boundary: &Polygon<f64>) -> MultiLineString<f64> {
    let Some(extent) = boundary.bounding_rect() else {
        return MultiLineString::new(Vec::new());
    };
    let candidates: Vec<LineString<f64>> = lines
        .iter()
        .filter(|ls| ls.bounding_rect().is_some_and(|r| r.intersects(&extent)))
        .cloned()
        .collect();
    if candidates.is_empty() {
        return MultiLineString::new(Vec::new());
    }
    let clipped = boundary.clip(&MultiLineString::new(candidates), false);
    MultiLineString::new(clipped.0.into_iter().filter(|ls| ls.0.len() >= 2).collect())
}

/// Intersection of `polygons` with `boundary`
pub fn intersect_polygons(polygons: Vec<Polygon<f64>>, boundary: &Polygon<f64>) -> MultiPolygon<f64> {
    if polygons.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    let subject = MultiPolygon::new(polygons);
    let clip = MultiPolygon::new(vec![boundary.clone()]);
    subject.intersection(&clip)
}

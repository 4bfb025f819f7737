//! Douglas-Peucker simplification under a vertex budget

use geo::{CoordsIter, LineString, MultiPolygon, Polygon, Simplify};
use serde::{Deserialize, Serialize};

/// Parameters for budgeted simplification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyParams {
    /// First tolerance tried, in CRS units
    pub tolerance: f64,
    /// Vertex budget of the whole multipolygon
    pub max_vertices: usize,
}

impl Default for SimplifyParams {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            max_vertices: 5000,
        }
    }
}

/// Doublings of the tolerance tried before giving up on the budget
const MAX_DOUBLINGS: usize = 32;

/// Simplify every ring of every polygon with tolerance `tolerance`.
///
/// Rings collapsing below four coordinates are dropped; a polygon whose
/// exterior collapses is dropped with its holes.
pub fn simplify_polygons(mp: &MultiPolygon<f64>, tolerance: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(
        mp.0.iter()
            .filter_map(|p| simplify_polygon(p, tolerance))
            .collect(),
    )
}

fn simplify_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Option<Polygon<f64>> {
    let exterior = polygon.exterior().simplify(&tolerance);
    if exterior.0.len() < 4 {
        return None;
    }
    let interiors: Vec<LineString<f64>> = polygon
        .interiors()
        .iter()
        .map(|ring| ring.simplify(&tolerance))
        .filter(|ring| ring.0.len() >= 4)
        .collect();
    Some(Polygon::new(exterior, interiors))
}

/// Simplify, doubling the tolerance until the vertex count fits the budget.
///
/// Returns the input unchanged when it already fits. If the budget is still
/// exceeded after the last doubling, the coarsest attempt is returned.
pub fn simplify_to_budget(mp: &MultiPolygon<f64>, params: SimplifyParams) -> MultiPolygon<f64> {
    if mp.coords_count() <= params.max_vertices {
        return mp.clone();
    }
    let mut tolerance = params.tolerance.max(f64::EPSILON);
    let mut attempt = simplify_polygons(mp, tolerance);
    for _ in 0..MAX_DOUBLINGS {
        if attempt.coords_count() <= params.max_vertices {
            break;
        }
        tolerance *= 2.0;
        attempt = simplify_polygons(mp, tolerance);
    }
    attempt
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    /// Circle-like polygon with `n` vertices
    fn circle(n: usize, radius: f64) -> MultiPolygon<f64> {
        let ring: Vec<Coord<f64>> = (0..n)
            .map(|i| {
                let a = i as f64 / n as f64 * std::f64::consts::TAU;
                Coord { x: radius * a.cos(), y: radius * a.sin() }
            })
            .collect();
        MultiPolygon::new(vec![Polygon::new(LineString::new(ring), vec![])])
    }

    #[test]
    fn test_within_budget_unchanged() {
        let mp = circle(20, 10.0);
        let out = simplify_to_budget(&mp, SimplifyParams { tolerance: 1.0, max_vertices: 100 });
        assert_eq!(out, mp);
    }

    #[test]
    fn test_budget_enforced() {
        let mp = circle(400, 100.0);
        let out = simplify_to_budget(&mp, SimplifyParams { tolerance: 0.01, max_vertices: 50 });
        assert!(out.coords_count() <= 50);
        assert_eq!(out.0.len(), 1);
    }

    #[test]
    fn test_collapsed_rings_dropped() {
        let mp = circle(8, 0.1);
        let out = simplify_polygons(&mp, 10.0);
        assert!(out.0.is_empty());
    }
}

//! Mask to polygon tracing
//!
//! Boundary edges between set and unset cells are collected as directed
//! unit edges on the lattice of cell corners, with the set cell on the right
//! (rows grow downward). Following them yields closed rings: shells run one
//! way and holes the other, which the sign of the ring area tells apart.
//! Holes are then attached to the smallest shell enclosing them.
//!
//! Where two set cells touch only at a corner the walk turns toward the cell
//! it is already bounding, so diagonal neighbors become separate polygons
//! touching at a vertex.

use std::collections::HashMap;

use geo::{Area, Contains, Coord, LineString, Polygon};
use sitegrade_core::raster::Mask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dir {
    East,
    South,
    West,
    North,
}

impl Dir {
    fn delta(self) -> (i64, i64) {
        match self {
            Dir::East => (1, 0),
            Dir::South => (0, 1),
            Dir::West => (-1, 0),
            Dir::North => (0, -1),
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn right(self) -> Dir {
        match self {
            Dir::East => Dir::South,
            Dir::South => Dir::West,
            Dir::West => Dir::North,
            Dir::North => Dir::East,
        }
    }

    fn left(self) -> Dir {
        self.right().right().right()
    }
}

/// Corner position (col, row)
type Vertex = (i64, i64);

struct Ring {
    vertices: Vec<Vertex>,
    /// Twice the signed area in (col, row) space; positive for shells
    area2: i64,
    /// Center of an unset cell just outside the first edge
    probe: Coord<f64>,
}

/// Trace the set regions of a mask into world-coordinate polygons.
///
/// Collinear vertices are dropped, so a rectangular region yields a
/// four-corner ring.
pub fn mask_to_polygons(mask: &Mask) -> Vec<Polygon<f64>> {
    let rings = trace_rings(mask);
    let (shells, holes): (Vec<Ring>, Vec<Ring>) = rings.into_iter().partition(|r| r.area2 > 0);

    let shell_polys: Vec<Polygon<f64>> = shells
        .iter()
        .map(|s| Polygon::new(pixel_ring(&s.vertices), vec![]))
        .collect();

    let mut interiors: Vec<Vec<&Ring>> = vec![Vec::new(); shells.len()];
    for hole in &holes {
        let owner = shell_polys
            .iter()
            .enumerate()
            .filter(|(_, poly)| poly.contains(&hole.probe))
            .min_by(|(a, _), (b, _)| shells[*a].area2.cmp(&shells[*b].area2))
            .map(|(i, _)| i);
        if let Some(i) = owner {
            interiors[i].push(hole);
        }
    }

    let transform = *mask.transform();
    let to_world = |vertices: &[Vertex]| -> LineString<f64> {
        vertices
            .iter()
            .map(|&(x, y)| {
                let (wx, wy) = transform.fractional_to_geo(x as f64, y as f64);
                Coord { x: wx, y: wy }
            })
            .collect()
    };

    shells
        .iter()
        .zip(interiors)
        .map(|(shell, holes)| {
            Polygon::new(
                to_world(&shell.vertices),
                holes.iter().map(|h| to_world(&h.vertices)).collect(),
            )
        })
        .filter(|p| p.unsigned_area() > 0.0)
        .collect()
}

fn pixel_ring(vertices: &[Vertex]) -> LineString<f64> {
    vertices
        .iter()
        .map(|&(x, y)| Coord { x: x as f64, y: y as f64 })
        .collect()
}

fn trace_rings(mask: &Mask) -> Vec<Ring> {
    let (rows, cols) = mask.shape();
    let set = |r: i64, c: i64| {
        r >= 0 && c >= 0 && (r as usize) < rows && (c as usize) < cols && mask.get(r as usize, c as usize)
    };

    let mut edges: Vec<(Vertex, Dir)> = Vec::new();
    for (row, col) in mask.cells() {
        let (r, c) = (row as i64, col as i64);
        if !set(r - 1, c) {
            edges.push(((c, r), Dir::East));
        }
        if !set(r, c + 1) {
            edges.push(((c + 1, r), Dir::South));
        }
        if !set(r + 1, c) {
            edges.push(((c + 1, r + 1), Dir::West));
        }
        if !set(r, c - 1) {
            edges.push(((c, r + 1), Dir::North));
        }
    }

    let mut outgoing: HashMap<Vertex, [Option<usize>; 4]> = HashMap::new();
    for (i, &(from, dir)) in edges.iter().enumerate() {
        outgoing.entry(from).or_insert([None; 4])[dir.index()] = Some(i);
    }

    let mut used = vec![false; edges.len()];
    let mut rings = Vec::new();

    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        let mut path: Vec<usize> = Vec::new();
        let mut current = start;
        loop {
            used[current] = true;
            path.push(current);
            let (from, dir) = edges[current];
            let (dx, dy) = dir.delta();
            let to = (from.0 + dx, from.1 + dy);
            let Some(out) = outgoing.get(&to) else {
                break;
            };
            let next = [dir.right(), dir, dir.left()]
                .into_iter()
                .filter_map(|d| out[d.index()])
                .find(|&e| e == start || !used[e]);
            match next {
                Some(e) if e == start => break,
                Some(e) => current = e,
                None => break,
            }
        }
        if let Some(ring) = build_ring(&edges, &path) {
            rings.push(ring);
        }
    }
    rings
}

fn build_ring(edges: &[(Vertex, Dir)], path: &[usize]) -> Option<Ring> {
    if path.len() < 4 {
        return None;
    }
    let n = path.len();
    let mut vertices: Vec<Vertex> = (0..n)
        .filter(|&k| edges[path[k]].1 != edges[path[(k + n - 1) % n]].1)
        .map(|k| edges[path[k]].0)
        .collect();
    if vertices.len() < 4 {
        return None;
    }
    let area2 = (0..vertices.len())
        .map(|i| {
            let (x0, y0) = vertices[i];
            let (x1, y1) = vertices[(i + 1) % vertices.len()];
            x0 * y1 - x1 * y0
        })
        .sum();
    vertices.push(vertices[0]);

    let (from, dir) = edges[path[0]];
    let (dx, dy) = dir.delta();
    // Unset side is to the left of travel: (dy, -dx)
    let probe = Coord {
        x: from.0 as f64 + 0.5 * dx as f64 + 0.5 * dy as f64,
        y: from.1 as f64 + 0.5 * dy as f64 - 0.5 * dx as f64,
    };
    Some(Ring { vertices, area2, probe })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sitegrade_core::GeoTransform;

    fn mask_from(rows: &[&str]) -> Mask {
        let transform = GeoTransform::new(0.0, rows.len() as f64, 1.0, -1.0);
        Mask::from_fn(rows.len(), rows[0].len(), transform, |(r, c)| rows[r].as_bytes()[c] == b'#')
    }

    #[test]
    fn test_rectangle_has_four_corners() {
        let mask = mask_from(&["....", ".##.", ".##.", "...."]);
        let polys = mask_to_polygons(&mask);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].exterior().0.len(), 5);
        assert_relative_eq!(polys[0].unsigned_area(), 4.0);
    }

    #[test]
    fn test_ring_with_hole() {
        let mask = mask_from(&["###", "#.#", "###"]);
        let polys = mask_to_polygons(&mask);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].interiors().len(), 1);
        assert_relative_eq!(polys[0].unsigned_area(), 8.0);
    }

    #[test]
    fn test_island_inside_hole() {
        let mask = mask_from(&["#####", "#...#", "#.#.#", "#...#", "#####"]);
        let mut polys = mask_to_polygons(&mask);
        polys.sort_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()));
        assert_eq!(polys.len(), 2);
        assert_relative_eq!(polys[0].unsigned_area(), 1.0);
        assert!(polys[0].interiors().is_empty());
        assert_eq!(polys[1].interiors().len(), 1);
        assert_relative_eq!(polys[1].unsigned_area(), 16.0);
    }

    #[test]
    fn test_diagonal_cells_are_separate() {
        let mask = mask_from(&["#.", ".#"]);
        let polys = mask_to_polygons(&mask);
        assert_eq!(polys.len(), 2);
        for p in &polys {
            assert_relative_eq!(p.unsigned_area(), 1.0);
        }
    }

    #[test]
    fn test_world_coordinates() {
        let transform = GeoTransform::new(100.0, 200.0, 10.0, -10.0);
        let mut mask = Mask::empty(3, 3, transform);
        mask.set(1, 1, true);
        let polys = mask_to_polygons(&mask);
        let xs: Vec<f64> = polys[0].exterior().0.iter().map(|c| c.x).collect();
        let ys: Vec<f64> = polys[0].exterior().0.iter().map(|c| c.y).collect();
        assert_relative_eq!(xs.iter().cloned().fold(f64::INFINITY, f64::min), 110.0);
        assert_relative_eq!(ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 190.0);
        assert_relative_eq!(polys[0].unsigned_area(), 100.0);
    }

    #[test]
    fn test_empty_mask() {
        let mask = mask_from(&["...", "..."]);
        assert!(mask_to_polygons(&mask).is_empty());
    }
}

//! Connected components of binary masks
//!
//! Labeling uses an explicit stack flood fill, so large regions never recurse.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use sitegrade_core::raster::Mask;

/// Neighbor rule for connectivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Edge-sharing neighbors only
    Four,
    /// Edge- and corner-sharing neighbors
    #[default]
    Eight,
}

impl Connectivity {
    fn offsets(self) -> &'static [(isize, isize)] {
        const FOUR: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
        const EIGHT: [(isize, isize); 8] =
            [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];
        match self {
            Connectivity::Four => &FOUR,
            Connectivity::Eight => &EIGHT,
        }
    }
}

/// Component labeling of a mask
#[derive(Debug, Clone)]
pub struct ComponentLabels {
    /// 0 for unset cells, otherwise the 1-based component label
    pub labels: Array2<u32>,
    /// Cell count of component `label - 1`
    pub sizes: Vec<usize>,
    /// Whether component `label - 1` has a cell on the grid border
    pub touches_edge: Vec<bool>,
}

impl ComponentLabels {
    /// Number of components
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    /// Size of the component holding `label`
    pub fn size_of(&self, label: u32) -> usize {
        match label {
            0 => 0,
            l => self.sizes[l as usize - 1],
        }
    }
}

/// Label the set cells of a mask into connected components.
///
/// Labels are assigned in row-major order of each component's first cell.
pub fn label_components(mask: &Mask, connectivity: Connectivity) -> ComponentLabels {
    let (rows, cols) = mask.shape();
    let mut labels = Array2::<u32>::zeros((rows, cols));
    let mut sizes = Vec::new();
    let mut touches_edge = Vec::new();
    let mut stack = Vec::new();
    let on_edge = |r: usize, c: usize| r == 0 || c == 0 || r + 1 == rows || c + 1 == cols;

    for (r0, c0) in mask.cells() {
        if labels[(r0, c0)] != 0 {
            continue;
        }
        let label = sizes.len() as u32 + 1;
        let mut size = 0usize;
        let mut edge = false;
        labels[(r0, c0)] = label;
        stack.push((r0, c0));

        while let Some((r, c)) = stack.pop() {
            size += 1;
            edge |= on_edge(r, c);
            for &(dr, dc) in connectivity.offsets() {
                let nr = r as isize + dr;
                let nc = c as isize + dc;
                if nr < 0 || nc < 0 || nr as usize >= rows || nc as usize >= cols {
                    continue;
                }
                let (nr, nc) = (nr as usize, nc as usize);
                if mask.get(nr, nc) && labels[(nr, nc)] == 0 {
                    labels[(nr, nc)] = label;
                    stack.push((nr, nc));
                }
            }
        }

        sizes.push(size);
        touches_edge.push(edge);
    }

    ComponentLabels { labels, sizes, touches_edge }
}

/// Clear components with fewer than `min_cells` cells.
pub fn remove_small_components(mask: &Mask, min_cells: usize, connectivity: Connectivity) -> Mask {
    if min_cells <= 1 {
        return mask.clone();
    }
    let comps = label_components(mask, connectivity);
    let data = comps.labels.mapv(|l| l != 0 && comps.size_of(l) >= min_cells);
    Mask::from_array(data, *mask.transform())
}

/// Set the cells of holes smaller than `max_cells`.
///
/// A hole is a 4-connected component of unset cells that does not touch the
/// grid border; border-touching gaps are open to the outside and kept.
pub fn fill_small_holes(mask: &Mask, max_cells: usize) -> Mask {
    let gaps = label_components(&mask.inverted(), Connectivity::Four);
    let data = ndarray::Zip::from(mask.data())
        .and(&gaps.labels)
        .map_collect(|&set, &l| {
            set || (l != 0 && !gaps.touches_edge[l as usize - 1] && gaps.size_of(l) < max_cells)
        });
    Mask::from_array(data, *mask.transform())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitegrade_core::GeoTransform;

    fn mask_from(rows: &[&str]) -> Mask {
        let n = rows.len();
        let m = rows[0].len();
        Mask::from_fn(n, m, GeoTransform::default(), |(r, c)| rows[r].as_bytes()[c] == b'#')
    }

    #[test]
    fn test_diagonal_cells_join_only_with_eight() {
        let mask = mask_from(&["#..", ".#.", "..#"]);
        assert_eq!(label_components(&mask, Connectivity::Eight).count(), 1);
        assert_eq!(label_components(&mask, Connectivity::Four).count(), 3);
    }

    #[test]
    fn test_labels_and_sizes() {
        let mask = mask_from(&["##...", "##..#", "....#"]);
        let comps = label_components(&mask, Connectivity::Eight);
        assert_eq!(comps.sizes, vec![4, 2]);
        assert_eq!(comps.labels[(0, 0)], 1);
        assert_eq!(comps.labels[(2, 4)], 2);
        assert_eq!(comps.touches_edge, vec![true, true]);
    }

    #[test]
    fn test_remove_small_components() {
        let mask = mask_from(&["###....", "###...#", "###....", "......."]);
        let out = remove_small_components(&mask, 9, Connectivity::Eight);
        assert_eq!(out.count(), 9);
        assert!(!out.get(1, 6));
    }

    #[test]
    fn test_fill_small_holes_skips_border_gaps() {
        let mask = mask_from(&[
            "#######",
            "#..####",
            "#..####",
            "#######",
            "###...#",
            "###...#",
        ]);
        let out = fill_small_holes(&mask, 9);
        // Enclosed 2x2 hole filled, border-touching notch kept
        assert!(out.get(1, 1) && out.get(2, 2));
        assert!(!out.get(4, 4));
    }

    #[test]
    fn test_large_holes_are_kept() {
        let mut mask = Mask::full(7, 7, GeoTransform::default());
        for r in 1..6 {
            for c in 1..6 {
                mask.set(r, c, false);
            }
        }
        let out = fill_small_holes(&mask, 9);
        assert_eq!(out, mask);
    }
}

//! Polygon rasterization

use geo::{BoundingRect, Contains, Coord, EuclideanDistance, Point, Polygon};
use sitegrade_core::raster::{GeoTransform, Mask};
use sitegrade_core::{Error, Result};

/// Mask of the cells whose center lies strictly inside `polygon`.
///
/// Centers exactly on the polygon boundary are outside.
pub fn rasterize_polygon(
    polygon: &Polygon<f64>,
    rows: usize,
    cols: usize,
    transform: &GeoTransform,
) -> Mask {
    let mut mask = Mask::empty(rows, cols, *transform);
    burn(&mut mask, polygon);
    mask
}

fn burn(mask: &mut Mask, polygon: &Polygon<f64>) {
    let Some(bbox) = polygon.bounding_rect() else {
        return;
    };
    let transform = *mask.transform();
    let (rows, cols) = mask.shape();
    for row in 0..rows {
        for col in 0..cols {
            let (x, y) = transform.pixel_to_geo(col, row);
            if x < bbox.min().x || x > bbox.max().x || y < bbox.min().y || y > bbox.max().y {
                continue;
            }
            if polygon.contains(&Coord { x, y }) {
                mask.set(row, col, true);
            }
        }
    }
}

/// Mask of the cells whose center lies within `distance` of `polygon`.
///
/// The distance is measured from the polygon itself, so a polygon smaller
/// than one cell still marks every center inside its buffer. Centers inside
/// or on the polygon are at distance zero.
pub fn rasterize_buffered(
    polygon: &Polygon<f64>,
    distance: f64,
    rows: usize,
    cols: usize,
    transform: &GeoTransform,
) -> Result<Mask> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(Error::invalid_parameter("distance", distance, "must be finite and non-negative"));
    }
    let mut mask = Mask::empty(rows, cols, *transform);
    let Some(bbox) = polygon.bounding_rect() else {
        return Ok(mask);
    };
    let (min, max) = (bbox.min(), bbox.max());
    for row in 0..rows {
        for col in 0..cols {
            let (x, y) = transform.pixel_to_geo(col, row);
            if x < min.x - distance || x > max.x + distance || y < min.y - distance || y > max.y + distance {
                continue;
            }
            if Point::new(x, y).euclidean_distance(polygon) <= distance {
                mask.set(row, col, true);
            }
        }
    }
    Ok(mask)
}

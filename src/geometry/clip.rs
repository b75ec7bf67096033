//! Boundary clipping on top of `geo`'s boolean operations
//!
//! The DC boundary arrives as one or more polygons; everything that leaves
//! the load stage is clipped against their union so downstream joins only
//! ever see in-boundary geometry.

use geo::{BooleanOps, Intersects};
use geo_types::{MultiLineString, MultiPolygon, Point};

/// Union a set of polygons into a single clip mask
///
/// Returns an empty MultiPolygon when the input is empty; callers treat
/// that as "no boundary, keep everything".
pub fn union_all(polygons: &[MultiPolygon<f64>]) -> MultiPolygon<f64> {
    let mut iter = polygons.iter();
    let Some(first) = iter.next() else {
        return MultiPolygon(vec![]);
    };
    iter.fold(first.clone(), |acc, mp| acc.union(mp))
}

/// Clip linework to a polygon mask, keeping only the inside parts
pub fn clip_lines(mask: &MultiPolygon<f64>, lines: &MultiLineString<f64>) -> MultiLineString<f64> {
    if mask.0.is_empty() {
        return lines.clone();
    }
    mask.clip(lines, false)
}

/// Whether a point falls on or inside the mask
pub fn point_within(mask: &MultiPolygon<f64>, point: &Point<f64>) -> bool {
    if mask.0.is_empty() {
        return true;
    }
    mask.intersects(point)
}

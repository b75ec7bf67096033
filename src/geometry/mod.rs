//! Geometric primitives for the alignment pipeline
//!
//! Projection math lives in [`projection`]; boundary clipping in [`clip`].
//! This module adds the small shape-coercion helpers the typed layers share:
//! every dataset arrives as a mixed bag of geometry types and the extractors
//! only want one of them.

pub mod clip;
pub mod projection;

use geo_types::{Geometry, MultiLineString, MultiPolygon, Point};

/// Coerce a geometry into its linear parts, if it has any
///
/// LineStrings and MultiLineStrings pass through; everything else is None.
pub fn as_lines(geometry: &Geometry<f64>) -> Option<MultiLineString<f64>> {
    match geometry {
        Geometry::LineString(ls) => Some(MultiLineString(vec![ls.clone()])),
        Geometry::MultiLineString(mls) => Some(mls.clone()),
        _ => None,
    }
}

/// Coerce a geometry into its polygonal parts, if it has any
pub fn as_polygons(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        _ => None,
    }
}

/// Explode a geometry into individual points
///
/// MultiPoints are flattened the way the original transit prep explodes
/// them; non-point geometries yield an empty vector and get dropped.
pub fn explode_points(geometry: &Geometry<f64>) -> Vec<Point<f64>> {
    match geometry {
        Geometry::Point(p) => vec![*p],
        Geometry::MultiPoint(mp) => mp.0.clone(),
        _ => Vec::new(),
    }
}

/// Whether a geometry carries no coordinates at all
pub fn is_empty(geometry: &Geometry<f64>) -> bool {
    match geometry {
        Geometry::Point(_) => false,
        Geometry::Line(_) => false,
        Geometry::LineString(ls) => ls.0.is_empty(),
        Geometry::Polygon(p) => p.exterior().0.is_empty(),
        Geometry::MultiPoint(mp) => mp.0.is_empty(),
        Geometry::MultiLineString(mls) => mls.0.iter().all(|ls| ls.0.is_empty()),
        Geometry::MultiPolygon(mp) => mp.0.iter().all(|p| p.exterior().0.is_empty()),
        Geometry::GeometryCollection(gc) => gc.0.iter().all(is_empty),
        Geometry::Rect(_) => false,
        Geometry::Triangle(_) => false,
    }
}

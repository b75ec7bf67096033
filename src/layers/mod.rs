//! Dataset layer model
//!
//! A [`GeoLayer`] is the in-memory form of one GeoJSON dataset: cleaned
//! features tagged with the CRS they are currently expressed in. Typed
//! extractors ([`parking`], [`traffic`], [`transit`], [`tracts`],
//! [`boundary`]) turn the generic layer into domain records, tolerating the
//! attribute quirks the source data actually has.

pub mod boundary;
pub mod loader;
pub mod parking;
pub mod tracts;
pub mod traffic;
pub mod transit;

use crate::geometry::projection::{self, Crs};
use geo_types::Geometry;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One feature: geometry plus its raw GeoJSON properties
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub geometry: Geometry<f64>,
    pub properties: Map<String, Value>,
}

/// A named dataset with a known CRS
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLayer {
    pub name: String,
    pub crs: Crs,
    pub features: Vec<GeoFeature>,
}

impl GeoLayer {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Reproject every feature into the target CRS
    pub fn reproject(&self, to: Crs) -> GeoLayer {
        if self.crs == to {
            return self.clone();
        }
        GeoLayer {
            name: self.name.clone(),
            crs: to,
            features: self
                .features
                .iter()
                .map(|f| GeoFeature {
                    geometry: projection::reproject(&f.geometry, self.crs, to),
                    properties: f.properties.clone(),
                })
                .collect(),
        }
    }

    /// Count features by geometry type, for dataset inspection
    pub fn geometry_type_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for feature in &self.features {
            let name = match feature.geometry {
                Geometry::Point(_) => "Point",
                Geometry::Line(_) => "Line",
                Geometry::LineString(_) => "LineString",
                Geometry::Polygon(_) => "Polygon",
                Geometry::MultiPoint(_) => "MultiPoint",
                Geometry::MultiLineString(_) => "MultiLineString",
                Geometry::MultiPolygon(_) => "MultiPolygon",
                Geometry::GeometryCollection(_) => "GeometryCollection",
                Geometry::Rect(_) => "Rect",
                Geometry::Triangle(_) => "Triangle",
            };
            *counts.entry(name).or_insert(0) += 1;
        }
        counts
    }
}

/// Look up a string property under any of the candidate keys
///
/// Source datasets are inconsistent about casing (`AADT` vs `aadt`), so
/// extractors pass every spelling they have seen.
pub fn prop_str<'a>(props: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| props.get(*k).and_then(Value::as_str))
}

/// Look up a numeric property, coercing numeric strings
///
/// Non-numeric values behave like the original's `to_numeric(errors="coerce")`
/// and come back as None.
pub fn prop_f64(props: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| match props.get(*k) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Look up an integer property, truncating floats and coercing strings
pub fn prop_i64(props: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    prop_f64(props, keys).map(|v| v as i64)
}

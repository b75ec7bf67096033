//! Census tract extraction
//!
//! Tracts are the join target: a GEOID-keyed set of polygons. Features
//! without a GEOID cannot be aggregated against and are dropped with a
//! warning, as are non-polygonal geometries.

use crate::geometry;
use crate::layers::{prop_str, GeoLayer};
use geo_types::MultiPolygon;
use tracing::warn;

/// One census tract
#[derive(Debug, Clone, PartialEq)]
pub struct Tract {
    /// Census Bureau GEOID, the stable tract key
    pub geoid: String,
    pub polygons: MultiPolygon<f64>,
}

/// Extract tracts, dropping features without a GEOID or polygon geometry
pub fn extract(layer: &GeoLayer) -> (Vec<Tract>, usize) {
    let mut tracts = Vec::with_capacity(layer.len());
    let mut dropped = 0;

    for feature in &layer.features {
        let Some(polygons) = geometry::as_polygons(&feature.geometry) else {
            dropped += 1;
            continue;
        };
        let Some(geoid) = prop_str(&feature.properties, &["GEOID", "geoid", "GEOID20"]) else {
            warn!(layer = %layer.name, "dropping tract without GEOID");
            dropped += 1;
            continue;
        };
        tracts.push(Tract {
            geoid: geoid.to_string(),
            polygons,
        });
    }

    (tracts, dropped)
}

//! Traffic volume segment extraction
//!
//! Road segments carry an AADT (annual average daily traffic) count under
//! either `AADT` or `aadt`; non-numeric values are coerced to zero, as in
//! the original cleaning step.

use crate::geometry;
use crate::layers::{prop_f64, GeoLayer};
use geo_types::MultiLineString;

/// One road segment with its traffic volume
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficSegment {
    /// Annual average daily traffic
    pub aadt: f64,
    pub lines: MultiLineString<f64>,
}

/// Extract traffic segments, dropping non-linear geometries
pub fn extract(layer: &GeoLayer) -> (Vec<TrafficSegment>, usize) {
    let mut segments = Vec::with_capacity(layer.len());
    let mut dropped = 0;

    for feature in &layer.features {
        let Some(lines) = geometry::as_lines(&feature.geometry) else {
            dropped += 1;
            continue;
        };
        segments.push(TrafficSegment {
            aadt: prop_f64(&feature.properties, &["AADT", "aadt"]).unwrap_or(0.0),
            lines,
        });
    }

    (segments, dropped)
}

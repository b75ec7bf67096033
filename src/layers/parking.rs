//! Parking zone segment extraction
//!
//! Parking zones arrive as curb-side linework with restriction attributes.
//! Missing attributes get the same defaults the original prep applied:
//! "Unknown" restriction, zero hours, zero cars.

use crate::geometry;
use crate::layers::{prop_i64, prop_str, GeoLayer};
use geo_types::MultiLineString;

/// One curb segment with its restriction attributes
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingSegment {
    /// Residential permit zone label, when present
    pub zone: Option<String>,
    /// Restriction type from PARKINGGROUP
    pub restriction: String,
    /// Unrestricted hours per week
    pub unrestricted_hours: i64,
    /// Estimated curb capacity in cars
    pub estimated_max_cars: i64,
    pub lines: MultiLineString<f64>,
}

/// Extract parking segments, dropping non-linear geometries
///
/// Returns the segments and the count of dropped features.
pub fn extract(layer: &GeoLayer) -> (Vec<ParkingSegment>, usize) {
    let mut segments = Vec::with_capacity(layer.len());
    let mut dropped = 0;

    for feature in &layer.features {
        let Some(lines) = geometry::as_lines(&feature.geometry) else {
            dropped += 1;
            continue;
        };
        let props = &feature.properties;
        segments.push(ParkingSegment {
            zone: prop_str(props, &["ZONE", "zone"]).map(str::to_string),
            restriction: prop_str(props, &["PARKINGGROUP", "parkinggroup"])
                .unwrap_or("Unknown")
                .to_string(),
            unrestricted_hours: prop_i64(
                props,
                &["UNRESTRICTED_HOURS_PER_WEEK", "unrestricted_hours_per_week"],
            )
            .unwrap_or(0),
            estimated_max_cars: prop_i64(props, &["ESTIMATED_MAX_CARS", "estimated_max_cars"])
                .unwrap_or(0),
            lines,
        });
    }

    (segments, dropped)
}

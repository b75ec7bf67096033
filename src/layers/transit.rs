//! Public transportation stop extraction
//!
//! Stops arrive as points or multipoints; multipoints are exploded into one
//! stop per coordinate sharing the parent's attributes, and anything that is
//! not a point gets dropped. The `TYPE` attribute distinguishes metro
//! stations from bus stops; every other value is treated as Other.

use crate::geometry;
use crate::layers::{prop_i64, prop_str, GeoLayer};
use geo_types::Point;

/// Transit mode as published in the source data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitMode {
    MetroStation,
    BusStop,
    Other,
}

impl TransitMode {
    /// Parse the TYPE attribute; unknown values are Other
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "METRO STATION" => TransitMode::MetroStation,
            "BUS STOP" => TransitMode::BusStop,
            _ => TransitMode::Other,
        }
    }
}

/// One transit stop
#[derive(Debug, Clone, PartialEq)]
pub struct TransitStop {
    pub name: String,
    pub mode: TransitMode,
    /// Number of lines serving the stop (metro stations only in practice)
    pub num_lines: i64,
    /// Line names, e.g. "red, orange"
    pub lines: String,
    pub point: Point<f64>,
}

/// Extract transit stops, exploding multipoints and dropping other shapes
pub fn extract(layer: &GeoLayer) -> (Vec<TransitStop>, usize) {
    let mut stops = Vec::with_capacity(layer.len());
    let mut dropped = 0;

    for feature in &layer.features {
        let points = geometry::explode_points(&feature.geometry);
        if points.is_empty() {
            dropped += 1;
            continue;
        }
        let props = &feature.properties;
        let name = prop_str(props, &["NAME", "name"])
            .unwrap_or("Unknown")
            .to_string();
        let mode = prop_str(props, &["TYPE", "type"])
            .map(TransitMode::parse)
            .unwrap_or(TransitMode::Other);
        let num_lines = prop_i64(props, &["NUM_LINES", "num_lines"]).unwrap_or(1);
        let lines = prop_str(props, &["LINE", "line"])
            .unwrap_or("Unknown")
            .to_string();

        for point in points {
            stops.push(TransitStop {
                name: name.clone(),
                mode,
                num_lines,
                lines: lines.clone(),
                point,
            });
        }
    }

    (stops, dropped)
}

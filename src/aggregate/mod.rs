//! Per-tract metric aggregation
//!
//! Takes the allocations produced by the join stage and folds them into one
//! [`TractMetrics`] row per tract. Weighted means use clipped length as the
//! weight; a tract that accumulated no length reports 0 rather than NaN.
//! Every tract appears in the output, including ones nothing intersected.

use crate::join::{LineAllocations, TractIndex};
use crate::layers::parking::ParkingSegment;
use crate::layers::traffic::TrafficSegment;
use crate::layers::transit::{TransitMode, TransitStop};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Aggregated metrics for one census tract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TractMetrics {
    pub geoid: String,
    /// Clipped parking curb length inside the tract, meters
    pub parking_length_m: f64,
    /// Estimated curb capacity, allocated by length fraction
    pub parking_estimated_max_cars: f64,
    /// Length-weighted mean of unrestricted hours per week
    pub parking_unrestricted_hours_mean: f64,
    /// Distinct residential permit zones touching the tract
    pub parking_zone_count: u64,
    /// Distinct restriction groups on the tract's curb
    pub parking_restriction_kinds: u64,
    /// Clipped road length inside the tract, meters
    pub road_length_m: f64,
    /// Length-weighted mean AADT over roads in the tract
    pub aadt_weighted_mean: f64,
    pub metro_station_count: u64,
    /// Total lines served by the tract's metro stations
    pub metro_line_count: u64,
    /// Distinct metro line names serving the tract, comma-joined
    pub metro_lines: String,
    pub bus_stop_count: u64,
    pub other_stop_count: u64,
}

#[derive(Debug, Clone, Default)]
struct TractAccumulator {
    parking_length_m: f64,
    parking_cars: f64,
    parking_hours_weighted: f64,
    parking_zones: BTreeSet<String>,
    parking_restrictions: BTreeSet<String>,
    road_length_m: f64,
    aadt_weighted: f64,
    metro_stations: u64,
    metro_line_total: u64,
    metro_line_names: BTreeSet<String>,
    bus_stops: u64,
    other_stops: u64,
}

/// Folds per-feature allocations into per-tract accumulators
#[derive(Debug)]
pub struct Aggregator {
    accumulators: Vec<TractAccumulator>,
}

impl Aggregator {
    /// One accumulator per tract in the index
    pub fn new(tract_count: usize) -> Self {
        Self {
            accumulators: vec![TractAccumulator::default(); tract_count],
        }
    }

    /// Fold a parking segment's allocations
    pub fn add_parking(&mut self, segment: &ParkingSegment, allocations: &LineAllocations) {
        for alloc in &allocations.allocations {
            let acc = &mut self.accumulators[alloc.tract_idx];
            acc.parking_length_m += alloc.clipped_length_m;
            acc.parking_cars += segment.estimated_max_cars as f64 * alloc.fraction;
            acc.parking_hours_weighted +=
                segment.unrestricted_hours as f64 * alloc.clipped_length_m;
            if let Some(zone) = &segment.zone {
                acc.parking_zones.insert(zone.clone());
            }
            acc.parking_restrictions.insert(segment.restriction.clone());
        }
    }

    /// Fold a traffic segment's allocations
    pub fn add_traffic(&mut self, segment: &TrafficSegment, allocations: &LineAllocations) {
        for alloc in &allocations.allocations {
            let acc = &mut self.accumulators[alloc.tract_idx];
            acc.road_length_m += alloc.clipped_length_m;
            acc.aadt_weighted += segment.aadt * alloc.clipped_length_m;
        }
    }

    /// Count a transit stop assigned to a tract
    pub fn add_stop(&mut self, stop: &TransitStop, tract_idx: usize) {
        let acc = &mut self.accumulators[tract_idx];
        match stop.mode {
            TransitMode::MetroStation => {
                acc.metro_stations += 1;
                acc.metro_line_total += stop.num_lines.max(0) as u64;
                for name in stop.lines.split(',') {
                    let name = name.trim();
                    if !name.is_empty() && !name.eq_ignore_ascii_case("unknown") {
                        acc.metro_line_names.insert(name.to_string());
                    }
                }
            }
            TransitMode::BusStop => acc.bus_stops += 1,
            TransitMode::Other => acc.other_stops += 1,
        }
    }

    /// Produce the final metric rows, in tract index order
    pub fn finalize(self, index: &TractIndex) -> Vec<TractMetrics> {
        self.accumulators
            .into_iter()
            .enumerate()
            .map(|(tract_idx, acc)| {
                let parking_hours_mean = weighted_mean(acc.parking_hours_weighted, acc.parking_length_m);
                let aadt_mean = weighted_mean(acc.aadt_weighted, acc.road_length_m);
                TractMetrics {
                    geoid: index.get(tract_idx).geoid.clone(),
                    parking_length_m: acc.parking_length_m,
                    parking_estimated_max_cars: acc.parking_cars,
                    parking_unrestricted_hours_mean: parking_hours_mean,
                    parking_zone_count: acc.parking_zones.len() as u64,
                    parking_restriction_kinds: acc.parking_restrictions.len() as u64,
                    road_length_m: acc.road_length_m,
                    aadt_weighted_mean: aadt_mean,
                    metro_station_count: acc.metro_stations,
                    metro_line_count: acc.metro_line_total,
                    metro_lines: acc
                        .metro_line_names
                        .into_iter()
                        .collect::<Vec<_>>()
                        .join(", "),
                    bus_stop_count: acc.bus_stops,
                    other_stop_count: acc.other_stops,
                }
            })
            .collect()
    }
}

/// Weighted mean that degrades to 0 for an empty weight sum
fn weighted_mean(weighted_sum: f64, weight: f64) -> f64 {
    if weight > f64::EPSILON {
        weighted_sum / weight
    } else {
        0.0
    }
}

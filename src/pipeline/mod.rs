//! Pipeline orchestration
//!
//! Runs the six stages in order: load, reproject, clip, join, aggregate,
//! write. Each run gets an id and produces a [`PipelineReport`] with enough
//! counters to explain where every feature went.

use crate::aggregate::{Aggregator, TractMetrics};
use crate::config::PipelineConfig;
use crate::error::AlignResult;
use crate::geometry::clip;
use crate::geometry::projection::Crs;
use crate::join::{allocate_lines, assign_point, TractIndex};
use crate::layers::loader::{load_layer, LoadStats};
use crate::layers::{boundary, parking, tracts, traffic, transit, GeoLayer};
use crate::stage_span;
use chrono::{DateTime, Utc};
use geo_types::MultiPolygon;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Per-layer load accounting
#[derive(Debug, Clone, Serialize)]
pub struct LayerReport {
    pub features: usize,
    pub source_epsg: u32,
    #[serde(flatten)]
    pub dropped: LoadStats,
}

/// Accounting for one linear feature class after clip + join
#[derive(Debug, Clone, Default, Serialize)]
pub struct LinearClassReport {
    /// Segments that survived extraction
    pub segments: usize,
    /// Features whose geometry was not linework
    pub skipped_geometry: usize,
    /// Segments clipped away entirely by the boundary
    pub outside_boundary: usize,
    /// Segments (inside the boundary) touching no tract
    pub unallocated_segments: usize,
    /// Length touching no tract, meters
    pub unallocated_length_m: f64,
}

/// Accounting for the transit point class
#[derive(Debug, Clone, Default, Serialize)]
pub struct StopClassReport {
    pub stops: usize,
    pub skipped_geometry: usize,
    pub outside_boundary: usize,
    pub unassigned: usize,
}

/// Full run report
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub working_epsg: u32,
    pub layers: BTreeMap<String, LayerReport>,
    pub tract_count: usize,
    pub parking: Option<LinearClassReport>,
    pub traffic: Option<LinearClassReport>,
    pub transit: Option<StopClassReport>,
}

impl PipelineReport {
    fn new(working_epsg: u32) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            working_epsg,
            layers: BTreeMap::new(),
            tract_count: 0,
            parking: None,
            traffic: None,
            transit: None,
        }
    }
}

/// Result of a completed run
#[derive(Debug)]
pub struct PipelineOutcome {
    pub report: PipelineReport,
    pub metrics: Vec<TractMetrics>,
}

/// The alignment pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Execute all stages and write the configured outputs
    pub fn run(&self) -> AlignResult<PipelineOutcome> {
        let working_crs = Crs::from_epsg(self.config.projection.working_epsg)?;
        let output_crs = Crs::from_epsg(self.config.projection.output_epsg)?;
        let mut report = PipelineReport::new(working_crs.epsg());
        info!(run_id = %report.run_id, "starting alignment run");

        // Stage 1+2: load and reproject the required layers
        let boundary_layer =
            self.load_into(&self.config.datasets.boundary, "boundary", working_crs, &mut report)?;
        let tract_layer = self.load_into(
            &self.config.datasets.census_tracts,
            "census_tracts",
            working_crs,
            &mut report,
        )?;

        // Stage 3 precursor: the clip mask
        let mask = boundary::extract(&boundary_layer)?;

        // Stage 4 precursor: the tract index
        let (tract_list, dropped_tracts) = tracts::extract(&tract_layer);
        if dropped_tracts > 0 {
            warn!(dropped = dropped_tracts, "dropped unusable tract features");
        }
        if tract_list.is_empty() {
            warn!("census tract layer yielded no usable tracts; metrics will be empty");
        }
        let index = TractIndex::build(tract_list);
        report.tract_count = index.len();

        let mut aggregator = Aggregator::new(index.len());

        // Stages 3-5 per feature class
        if let Some(path) = &self.config.datasets.parking_zones {
            let layer = self.load_into(path, "parking_zones", working_crs, &mut report)?;
            report.parking = Some(self.join_parking(&layer, &mask, &index, &mut aggregator));
        }
        if let Some(path) = &self.config.datasets.traffic {
            let layer = self.load_into(path, "traffic", working_crs, &mut report)?;
            report.traffic = Some(self.join_traffic(&layer, &mask, &index, &mut aggregator));
        }
        if let Some(path) = &self.config.datasets.transit {
            let layer = self.load_into(path, "transit", working_crs, &mut report)?;
            report.transit = Some(self.join_transit(&layer, &mask, &index, &mut aggregator));
        }

        let metrics = aggregator.finalize(&index);

        // Stage 6: outputs
        {
            let _span = stage_span!(stage = "write").entered();
            crate::output::write_metrics_geojson(
                &self.config.output.metrics_geojson,
                &index,
                &metrics,
                working_crs,
                output_crs,
            )?;
            crate::output::write_metrics_csv(&self.config.output.metrics_csv, &metrics)?;
        }

        report.finished_at = Some(Utc::now());
        if let Some(report_path) = &self.config.output.report_json {
            crate::output::write_report_json(report_path, &report)?;
        }

        info!(
            run_id = %report.run_id,
            tracts = report.tract_count,
            "alignment run complete"
        );
        Ok(PipelineOutcome { report, metrics })
    }

    /// Load one dataset, record its counters, and reproject to the working CRS
    fn load_into(
        &self,
        path: &Path,
        name: &str,
        working_crs: Crs,
        report: &mut PipelineReport,
    ) -> AlignResult<GeoLayer> {
        let _span = stage_span!(stage = "load", layer = name).entered();
        let loaded = load_layer(path, name)?;
        report.layers.insert(
            name.to_string(),
            LayerReport {
                features: loaded.layer.len(),
                source_epsg: loaded.layer.crs.epsg(),
                dropped: loaded.stats,
            },
        );
        Ok(loaded.layer.reproject(working_crs))
    }

    fn join_parking(
        &self,
        layer: &GeoLayer,
        mask: &MultiPolygon<f64>,
        index: &TractIndex,
        aggregator: &mut Aggregator,
    ) -> LinearClassReport {
        let _span = stage_span!(stage = "join", layer = "parking_zones").entered();
        let (segments, skipped_geometry) = parking::extract(layer);
        let mut class_report = LinearClassReport {
            segments: segments.len(),
            skipped_geometry,
            ..Default::default()
        };

        for segment in &segments {
            let clipped = clip::clip_lines(mask, &segment.lines);
            if clipped.0.iter().all(|ls| ls.0.is_empty()) {
                class_report.outside_boundary += 1;
                continue;
            }
            let allocations = allocate_lines(index, &clipped);
            if allocations.is_unallocated() {
                class_report.unallocated_segments += 1;
            }
            class_report.unallocated_length_m += allocations.unallocated_length_m;
            aggregator.add_parking(segment, &allocations);
        }

        debug!(
            segments = class_report.segments,
            outside_boundary = class_report.outside_boundary,
            "parking join done"
        );
        class_report
    }

    fn join_traffic(
        &self,
        layer: &GeoLayer,
        mask: &MultiPolygon<f64>,
        index: &TractIndex,
        aggregator: &mut Aggregator,
    ) -> LinearClassReport {
        let _span = stage_span!(stage = "join", layer = "traffic").entered();
        let (segments, skipped_geometry) = traffic::extract(layer);
        let mut class_report = LinearClassReport {
            segments: segments.len(),
            skipped_geometry,
            ..Default::default()
        };

        for segment in &segments {
            let clipped = clip::clip_lines(mask, &segment.lines);
            if clipped.0.iter().all(|ls| ls.0.is_empty()) {
                class_report.outside_boundary += 1;
                continue;
            }
            let allocations = allocate_lines(index, &clipped);
            if allocations.is_unallocated() {
                class_report.unallocated_segments += 1;
            }
            class_report.unallocated_length_m += allocations.unallocated_length_m;
            aggregator.add_traffic(segment, &allocations);
        }

        debug!(
            segments = class_report.segments,
            outside_boundary = class_report.outside_boundary,
            "traffic join done"
        );
        class_report
    }

    fn join_transit(
        &self,
        layer: &GeoLayer,
        mask: &MultiPolygon<f64>,
        index: &TractIndex,
        aggregator: &mut Aggregator,
    ) -> StopClassReport {
        let _span = stage_span!(stage = "join", layer = "transit").entered();
        let (stops, skipped_geometry) = transit::extract(layer);
        let mut class_report = StopClassReport {
            stops: stops.len(),
            skipped_geometry,
            ..Default::default()
        };

        for stop in &stops {
            if !clip::point_within(mask, &stop.point) {
                class_report.outside_boundary += 1;
                continue;
            }
            match assign_point(index, &stop.point) {
                Some(tract_idx) => aggregator.add_stop(stop, tract_idx),
                None => class_report.unassigned += 1,
            }
        }

        debug!(
            stops = class_report.stops,
            unassigned = class_report.unassigned,
            "transit join done"
        );
        class_report
    }
}

//! Output writers for tract metrics
//!
//! Two views of the same result: a GeoJSON FeatureCollection carrying tract
//! polygons with metric properties (reprojected to the display CRS), and a
//! flat CSV for spreadsheet work. The run report is plain JSON.

use crate::aggregate::TractMetrics;
use crate::error::{AlignError, AlignResult};
use crate::geometry::projection::{self, Crs};
use crate::join::TractIndex;
use geojson::{Feature, FeatureCollection, GeoJson};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Write tract polygons with metric properties as GeoJSON
///
/// `from` is the CRS the tract geometry is currently in (the working CRS);
/// `to` is the display CRS for the file.
pub fn write_metrics_geojson(
    path: &Path,
    index: &TractIndex,
    metrics: &[TractMetrics],
    from: Crs,
    to: Crs,
) -> AlignResult<()> {
    if metrics.len() != index.len() {
        return Err(AlignError::internal(format!(
            "metrics rows ({}) do not match tract count ({})",
            metrics.len(),
            index.len()
        )));
    }

    let features = metrics
        .iter()
        .enumerate()
        .map(|(tract_idx, row)| {
            let geometry: geo_types::Geometry<f64> = index.get(tract_idx).polygons.clone().into();
            let reprojected = projection::reproject(&geometry, from, to);
            let properties = match serde_json::to_value(row) {
                Ok(serde_json::Value::Object(map)) => Some(map),
                _ => None,
            };
            Ok(Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&reprojected))),
                id: None,
                properties,
                foreign_members: None,
            })
        })
        .collect::<AlignResult<Vec<Feature>>>()?;

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };

    std::fs::write(path, GeoJson::from(collection).to_string())?;
    info!(path = %path.display(), tracts = metrics.len(), "wrote metrics GeoJSON");
    Ok(())
}

/// Write the metric rows as CSV
pub fn write_metrics_csv(path: &Path, metrics: &[TractMetrics]) -> AlignResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in metrics {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .map_err(|e| AlignError::output_write(e.to_string()))?;
    info!(path = %path.display(), rows = metrics.len(), "wrote metrics CSV");
    Ok(())
}

/// Write any serializable report as pretty JSON
pub fn write_report_json<R: Serialize>(path: &Path, report: &R) -> AlignResult<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| AlignError::output_write(e.to_string()))?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "wrote run report");
    Ok(())
}

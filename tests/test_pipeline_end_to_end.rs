//! End-to-end pipeline tests
//!
//! Builds a tiny synthetic scene near DC in WGS84 - two adjacent tracts, a
//! boundary, and a handful of features - runs the full pipeline, and checks
//! the written outputs. Horizontal lines at constant latitude keep the
//! Mercator length split exact, so the 50/50 allocations can be asserted
//! tightly.

use curbalign::config::PipelineConfig;
use curbalign::pipeline::Pipeline;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Two tracts side by side: A spans lon [-77.10, -77.05], B spans
/// [-77.05, -77.00], both lat [38.90, 38.95].
const TRACTS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature",
     "properties": {"GEOID": "11001000100"},
     "geometry": {"type": "Polygon", "coordinates": [[
       [-77.10, 38.90], [-77.05, 38.90], [-77.05, 38.95], [-77.10, 38.95], [-77.10, 38.90]
     ]]}},
    {"type": "Feature",
     "properties": {"GEOID": "11001000200"},
     "geometry": {"type": "Polygon", "coordinates": [[
       [-77.05, 38.90], [-77.00, 38.90], [-77.00, 38.95], [-77.05, 38.95], [-77.05, 38.90]
     ]]}}
  ]
}"#;

/// Boundary covering both tracts exactly
const BOUNDARY: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {},
     "geometry": {"type": "Polygon", "coordinates": [[
       [-77.10, 38.90], [-77.00, 38.90], [-77.00, 38.95], [-77.10, 38.95], [-77.10, 38.90]
     ]]}}
  ]
}"#;

/// One segment split 50/50 between the tracts, one outside the boundary
const PARKING: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature",
     "properties": {"PARKINGGROUP": "RPP Zone 2", "UNRESTRICTED_HOURS_PER_WEEK": 100,
                    "ESTIMATED_MAX_CARS": 20, "ZONE": "2"},
     "geometry": {"type": "LineString", "coordinates": [
       [-77.09, 38.92], [-77.01, 38.92]
     ]}},
    {"type": "Feature",
     "properties": {"PARKINGGROUP": "No Parking", "ESTIMATED_MAX_CARS": 5},
     "geometry": {"type": "LineString", "coordinates": [
       [-77.09, 38.80], [-77.01, 38.80]
     ]}}
  ]
}"#;

/// One road fully inside tract A
const TRAFFIC: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature",
     "properties": {"AADT": 12000},
     "geometry": {"type": "LineString", "coordinates": [
       [-77.09, 38.93], [-77.06, 38.93]
     ]}}
  ]
}"#;

/// A metro station in A, a bus stop in B, a bus stop outside the boundary
const TRANSIT: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature",
     "properties": {"NAME": "Test Station", "TYPE": "METRO STATION", "NUM_LINES": 2, "LINE": "red, blue"},
     "geometry": {"type": "Point", "coordinates": [-77.07, 38.92]}},
    {"type": "Feature",
     "properties": {"NAME": "Stop 1", "TYPE": "BUS STOP"},
     "geometry": {"type": "Point", "coordinates": [-77.02, 38.91]}},
    {"type": "Feature",
     "properties": {"NAME": "Far Stop", "TYPE": "BUS STOP"},
     "geometry": {"type": "Point", "coordinates": [-76.50, 38.91]}}
  ]
}"#;

const EMPTY_LAYER: &str = r#"{"type": "FeatureCollection", "features": []}"#;

struct Scene {
    _dir: TempDir,
    config: PipelineConfig,
}

fn build_scene() -> Scene {
    let dir = TempDir::new().unwrap();
    let write = |name: &str, content: &str| {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    };

    let boundary = write("boundary.geojson", BOUNDARY);
    let tracts = write("tracts.geojson", TRACTS);
    let parking = write("parking.geojson", PARKING);
    let traffic = write("traffic.geojson", TRAFFIC);
    let transit = write("transit.geojson", TRANSIT);

    let config_toml = format!(
        r#"
[datasets]
boundary = {boundary:?}
census_tracts = {tracts:?}
parking_zones = {parking:?}
traffic = {traffic:?}
transit = {transit:?}

[output]
metrics_geojson = {geojson_out:?}
metrics_csv = {csv_out:?}
report_json = {report_out:?}
"#,
        boundary = boundary,
        tracts = tracts,
        parking = parking,
        traffic = traffic,
        transit = transit,
        geojson_out = dir.path().join("metrics.geojson"),
        csv_out = dir.path().join("metrics.csv"),
        report_out = dir.path().join("report.json"),
    );
    let config_path = dir.path().join("curbalign.toml");
    fs::write(&config_path, config_toml).unwrap();

    let config = PipelineConfig::load_from_file(&config_path).unwrap();
    Scene { _dir: dir, config }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_run_produces_all_outputs() {
    let scene = build_scene();
    let geojson_path = scene.config.output.metrics_geojson.clone();
    let csv_path = scene.config.output.metrics_csv.clone();
    let report_path = scene.config.output.report_json.clone().unwrap();

    let outcome = Pipeline::new(scene.config).run().unwrap();

    assert_eq!(outcome.metrics.len(), 2);
    assert!(geojson_path.exists());
    assert!(csv_path.exists());
    assert!(report_path.exists());
}

#[test]
fn test_parking_split_between_tracts() {
    let scene = build_scene();
    let outcome = Pipeline::new(scene.config).run().unwrap();

    let a = outcome
        .metrics
        .iter()
        .find(|m| m.geoid == "11001000100")
        .unwrap();
    let b = outcome
        .metrics
        .iter()
        .find(|m| m.geoid == "11001000200")
        .unwrap();

    // The 20-car segment runs -77.09 to -77.01 at constant latitude: the
    // tract boundary at -77.05 splits it exactly in half.
    assert!((a.parking_estimated_max_cars - 10.0).abs() < 1e-6);
    assert!((b.parking_estimated_max_cars - 10.0).abs() < 1e-6);
    assert!((a.parking_length_m - b.parking_length_m).abs() < 1e-6);
    assert!(a.parking_length_m > 1_000.0, "expected kilometers of curb");
    assert!((a.parking_unrestricted_hours_mean - 100.0).abs() < 1e-6);
    // Zone "2" touches both tracts; the No Parking segment never enters
    assert_eq!(a.parking_zone_count, 1);
    assert_eq!(b.parking_zone_count, 1);
    assert_eq!(a.parking_restriction_kinds, 1);
}

#[test]
fn test_traffic_stays_in_one_tract() {
    let scene = build_scene();
    let outcome = Pipeline::new(scene.config).run().unwrap();

    let a = outcome
        .metrics
        .iter()
        .find(|m| m.geoid == "11001000100")
        .unwrap();
    let b = outcome
        .metrics
        .iter()
        .find(|m| m.geoid == "11001000200")
        .unwrap();

    assert!(a.road_length_m > 0.0);
    assert!((a.aadt_weighted_mean - 12000.0).abs() < 1e-6);
    assert_eq!(b.road_length_m, 0.0);
    assert_eq!(b.aadt_weighted_mean, 0.0);
}

#[test]
fn test_transit_counts_and_boundary_filter() {
    let scene = build_scene();
    let outcome = Pipeline::new(scene.config).run().unwrap();

    let a = outcome
        .metrics
        .iter()
        .find(|m| m.geoid == "11001000100")
        .unwrap();
    let b = outcome
        .metrics
        .iter()
        .find(|m| m.geoid == "11001000200")
        .unwrap();

    assert_eq!(a.metro_station_count, 1);
    assert_eq!(a.metro_line_count, 2);
    assert_eq!(a.metro_lines, "blue, red");
    assert_eq!(a.bus_stop_count, 0);
    assert_eq!(b.bus_stop_count, 1);
    assert_eq!(b.metro_lines, "");

    let transit_report = outcome.report.transit.unwrap();
    assert_eq!(transit_report.stops, 3);
    assert_eq!(transit_report.outside_boundary, 1);
    assert_eq!(transit_report.unassigned, 0);
}

#[test]
fn test_report_accounts_for_boundary_clipping() {
    let scene = build_scene();
    let outcome = Pipeline::new(scene.config).run().unwrap();

    let parking_report = outcome.report.parking.unwrap();
    assert_eq!(parking_report.segments, 2);
    // The lat-38.80 segment lies entirely south of the boundary
    assert_eq!(parking_report.outside_boundary, 1);
    assert_eq!(parking_report.unallocated_segments, 0);

    assert_eq!(outcome.report.tract_count, 2);
    assert!(outcome.report.finished_at.is_some());
    assert_eq!(outcome.report.working_epsg, 3857);
}

#[test]
fn test_written_geojson_is_wgs84_with_properties() {
    let scene = build_scene();
    let geojson_path = scene.config.output.metrics_geojson.clone();
    Pipeline::new(scene.config).run().unwrap();

    let value = read_json(&geojson_path);
    let features = value["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);

    for feature in features {
        let geoid = feature["properties"]["geoid"].as_str().unwrap();
        assert!(geoid.starts_with("11001"));
        // Output coordinates are back in lon/lat range
        let first_ring = &feature["geometry"]["coordinates"][0];
        let lon = first_ring[0][0].as_f64().unwrap();
        let lat = first_ring[0][1].as_f64().unwrap();
        assert!((-78.0..-76.0).contains(&lon), "lon was {lon}");
        assert!((38.0..40.0).contains(&lat), "lat was {lat}");
    }
}

#[test]
fn test_written_csv_has_one_row_per_tract() {
    let scene = build_scene();
    let csv_path = scene.config.output.metrics_csv.clone();
    Pipeline::new(scene.config).run().unwrap();

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let rows: Vec<curbalign::TractMetrics> =
        reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 2);
    let geoids: Vec<&str> = rows.iter().map(|r| r.geoid.as_str()).collect();
    assert!(geoids.contains(&"11001000100"));
    assert!(geoids.contains(&"11001000200"));
}

#[test]
fn test_run_without_optional_layers() {
    let scene = build_scene();
    let mut config = scene.config;
    config.datasets.parking_zones = None;
    config.datasets.transit = None;

    let outcome = Pipeline::new(config).run().unwrap();
    assert!(outcome.report.parking.is_none());
    assert!(outcome.report.transit.is_none());
    assert!(outcome.report.traffic.is_some());
    assert_eq!(outcome.metrics.len(), 2);
}

#[test]
fn test_empty_feature_layer_flows_through() {
    let scene = build_scene();
    let parking_path = scene.config.datasets.parking_zones.clone().unwrap();
    fs::write(&parking_path, EMPTY_LAYER).unwrap();

    let outcome = Pipeline::new(scene.config).run().unwrap();

    let parking_report = outcome.report.parking.unwrap();
    assert_eq!(parking_report.segments, 0);
    assert_eq!(parking_report.outside_boundary, 0);
    assert_eq!(outcome.metrics.len(), 2);
    assert!(outcome.metrics.iter().all(|m| m.parking_length_m == 0.0));
    // The other layers still aggregate normally
    assert!(outcome.metrics.iter().any(|m| m.road_length_m > 0.0));
}

#[test]
fn test_empty_tract_layer_yields_empty_metrics() {
    let scene = build_scene();
    fs::write(&scene.config.datasets.census_tracts, EMPTY_LAYER).unwrap();
    let geojson_path = scene.config.output.metrics_geojson.clone();
    let csv_path = scene.config.output.metrics_csv.clone();

    let outcome = Pipeline::new(scene.config).run().unwrap();

    assert!(outcome.metrics.is_empty());
    assert_eq!(outcome.report.tract_count, 0);
    // The in-boundary parking segment had nowhere to go
    let parking_report = outcome.report.parking.unwrap();
    assert_eq!(parking_report.unallocated_segments, 1);
    let transit_report = outcome.report.transit.unwrap();
    assert_eq!(transit_report.unassigned, 2);

    assert!(csv_path.exists());
    let value = read_json(&geojson_path);
    assert!(value["features"].as_array().unwrap().is_empty());
}

#[test]
fn test_missing_dataset_file_fails_cleanly() {
    let scene = build_scene();
    let mut config = scene.config;
    config.datasets.census_tracts = std::path::PathBuf::from("/nonexistent/tracts.geojson");

    let result = Pipeline::new(config).run();
    assert!(result.is_err());
}

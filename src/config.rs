//! Pipeline configuration loaded from TOML
//!
//! Describes where the raw GeoJSON layers live, which planar CRS to compute
//! in, and where the tract-level outputs go.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    pub datasets: DatasetsSection,
    #[serde(default)]
    pub projection: ProjectionSection,
    pub output: OutputSection,
}

/// Input dataset paths
///
/// The boundary and census tract layers are required; the three feature
/// layers are optional so partial runs (e.g. traffic only) stay cheap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetsSection {
    /// DC boundary polygon(s); unioned before clipping
    pub boundary: PathBuf,
    /// Census tract polygons carrying GEOID
    pub census_tracts: PathBuf,
    /// Parking zone segments (lines)
    pub parking_zones: Option<PathBuf>,
    /// Traffic volume segments (lines with AADT)
    pub traffic: Option<PathBuf>,
    /// Public transportation stops (points)
    pub transit: Option<PathBuf>,
}

/// Projection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectionSection {
    /// Planar CRS used for all distance math (default: Web Mercator)
    #[serde(default = "default_working_epsg")]
    pub working_epsg: u32,
    /// CRS the tract-metrics GeoJSON is written in (default: WGS84)
    #[serde(default = "default_output_epsg")]
    pub output_epsg: u32,
}

fn default_working_epsg() -> u32 {
    3857
}

fn default_output_epsg() -> u32 {
    4326
}

impl Default for ProjectionSection {
    fn default() -> Self {
        Self {
            working_epsg: default_working_epsg(),
            output_epsg: default_output_epsg(),
        }
    }
}

/// Output file paths
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSection {
    /// Tract polygons with aggregated metric properties
    pub metrics_geojson: PathBuf,
    /// Flat table of the same metrics
    pub metrics_csv: PathBuf,
    /// Run report (stage counts, drop counts)
    pub report_json: Option<PathBuf>,
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PipelineConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !crate::geometry::projection::Crs::is_supported(self.projection.working_epsg) {
            return Err(ConfigError::InvalidConfig(format!(
                "Unsupported working CRS: EPSG:{}",
                self.projection.working_epsg
            )));
        }
        if !crate::geometry::projection::Crs::is_supported(self.projection.output_epsg) {
            return Err(ConfigError::InvalidConfig(format!(
                "Unsupported output CRS: EPSG:{}",
                self.projection.output_epsg
            )));
        }
        if self.datasets.parking_zones.is_none()
            && self.datasets.traffic.is_none()
            && self.datasets.transit.is_none()
        {
            return Err(ConfigError::InvalidConfig(
                "At least one feature layer (parking_zones, traffic, transit) is required"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Create a test configuration for unit testing
    #[cfg(test)]
    pub fn test_config() -> Self {
        let toml_content = r#"
[datasets]
boundary = "data/dc_boundary.geojson"
census_tracts = "data/census_tracts.geojson"
parking_zones = "data/parking_zones.geojson"
traffic = "data/traffic.geojson"
transit = "data/transit.geojson"

[output]
metrics_geojson = "out/tract_metrics.geojson"
metrics_csv = "out/tract_metrics.csv"
"#;
        toml::from_str(toml_content).expect("Test config should parse")
    }
}

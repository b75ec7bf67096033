//! curbalign - tract alignment for DC curb and mobility data
//!
//! Aligns parking, public-transit, and traffic datasets to census-tract
//! geographies for Washington, DC, producing tract-level aggregate metrics
//! for exploratory visualization.
//!
//! # Overview
//!
//! The crate is a batch pipeline of six stages:
//! - Load raw GeoJSON layers, dropping features without usable geometry
//! - Reproject everything to a common planar CRS (EPSG:3857)
//! - Clip linear and point features to the DC boundary
//! - Spatially join features against census tract polygons, allocating
//!   linear features proportionally to clipped length per tract
//! - Aggregate metrics per tract (lengths, weighted means, stop counts)
//! - Write tract-metrics GeoJSON, CSV, and a run report
//!
//! # Quick Start
//!
//! ```no_run
//! use curbalign::config::PipelineConfig;
//! use curbalign::pipeline::Pipeline;
//! use std::path::Path;
//!
//! let config = PipelineConfig::load_from_file(Path::new("curbalign.toml"))?;
//! let outcome = Pipeline::new(config).run()?;
//! println!("aggregated {} tracts", outcome.metrics.len());
//! # Ok::<(), curbalign::error::AlignError>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod geometry;
pub mod join;
pub mod layers;
pub mod observability;
pub mod output;
pub mod pipeline;

pub use aggregate::TractMetrics;
pub use config::PipelineConfig;
pub use error::{AlignError, AlignResult};
pub use geometry::projection::Crs;
pub use pipeline::{Pipeline, PipelineOutcome, PipelineReport};

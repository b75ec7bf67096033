//! Crate-wide error types for the tract alignment pipeline
//!
//! Maps I/O, parsing, and geometry failures to a single error enum so the
//! pipeline stages can propagate them with `?`.

use thiserror::Error;

/// Main error type for alignment pipeline operations
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("Failed to read dataset file: {0}")]
    DatasetRead(#[from] std::io::Error),

    #[error("Failed to parse GeoJSON: {0}")]
    GeoJsonParse(#[from] geojson::Error),

    #[error("Invalid geometry in {layer}: {message}")]
    InvalidGeometry { layer: String, message: String },

    #[error("Unsupported coordinate reference system: EPSG:{epsg}")]
    UnsupportedCrs { epsg: u32 },

    #[error("Output write failed: {message}")]
    OutputWrite { message: String },

    #[error("CSV write failed: {0}")]
    CsvWrite(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AlignError {
    /// Create an invalid-geometry error for a named layer
    pub fn invalid_geometry<L: Into<String>, M: Into<String>>(layer: L, message: M) -> Self {
        Self::InvalidGeometry {
            layer: layer.into(),
            message: message.into(),
        }
    }

    /// Create an output write error
    pub fn output_write<S: Into<String>>(message: S) -> Self {
        Self::OutputWrite {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type for alignment pipeline operations
pub type AlignResult<T> = Result<T, AlignError>;

//! DC boundary extraction
//!
//! The boundary dataset may carry several polygons (the boundary-stone area
//! file does); they are unioned into a single clip mask before use.

use crate::error::{AlignError, AlignResult};
use crate::geometry::{self, clip};
use crate::layers::GeoLayer;
use geo_types::MultiPolygon;

/// Union all polygonal features in the layer into one clip mask
///
/// Errors when the layer holds no polygonal geometry at all: clipping
/// against nothing would silently keep the whole region.
pub fn extract(layer: &GeoLayer) -> AlignResult<MultiPolygon<f64>> {
    let polygons: Vec<MultiPolygon<f64>> = layer
        .features
        .iter()
        .filter_map(|f| geometry::as_polygons(&f.geometry))
        .collect();

    if polygons.is_empty() {
        return Err(AlignError::invalid_geometry(
            layer.name.clone(),
            "boundary layer contains no polygons",
        ));
    }

    Ok(clip::union_all(&polygons))
}

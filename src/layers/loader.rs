//! GeoJSON dataset loading
//!
//! Loading a layer means parsing the file, dropping features without usable
//! geometry, and working out what CRS the coordinates are in. RFC 7946 says
//! GeoJSON is always WGS84, but the DC open-data exports predate it: some
//! carry a legacy `crs` member, some are silently projected. When no CRS is
//! declared we infer one from the coordinate bounds, exactly as the original
//! cleaning scripts did.

use crate::error::AlignResult;
use crate::geometry;
use crate::geometry::projection::{Crs, MERCATOR_MAX_M};
use crate::layers::{GeoFeature, GeoLayer};
use geo::BoundingRect;
use geojson::GeoJson;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, warn};

/// Counters for features removed during cleaning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LoadStats {
    /// Features with no geometry member
    pub dropped_missing: usize,
    /// Features whose geometry had no coordinates
    pub dropped_empty: usize,
    /// Features whose geometry could not be converted
    pub dropped_invalid: usize,
}

impl LoadStats {
    pub fn total_dropped(&self) -> usize {
        self.dropped_missing + self.dropped_empty + self.dropped_invalid
    }
}

/// A cleaned layer plus its cleaning counters
#[derive(Debug, Clone)]
pub struct LoadedLayer {
    pub layer: GeoLayer,
    pub stats: LoadStats,
}

/// Load and clean one GeoJSON dataset
pub fn load_layer(path: &Path, name: &str) -> AlignResult<LoadedLayer> {
    let content = std::fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;

    let mut stats = LoadStats::default();
    let mut features = Vec::new();
    let mut declared_crs = None;

    match geojson {
        GeoJson::FeatureCollection(fc) => {
            declared_crs = fc
                .foreign_members
                .as_ref()
                .and_then(parse_legacy_crs_member);
            for feature in fc.features {
                push_feature(
                    feature.geometry,
                    feature.properties.unwrap_or_default(),
                    name,
                    &mut features,
                    &mut stats,
                );
            }
        }
        GeoJson::Feature(feature) => {
            push_feature(
                feature.geometry,
                feature.properties.unwrap_or_default(),
                name,
                &mut features,
                &mut stats,
            );
        }
        GeoJson::Geometry(g) => {
            push_feature(Some(g), Map::new(), name, &mut features, &mut stats);
        }
    }

    let crs = match declared_crs {
        Some(crs) => crs,
        None => infer_crs_from_bounds(&features),
    };

    debug!(
        layer = name,
        features = features.len(),
        dropped = stats.total_dropped(),
        crs = crs.epsg(),
        "loaded layer"
    );

    Ok(LoadedLayer {
        layer: GeoLayer {
            name: name.to_string(),
            crs,
            features,
        },
        stats,
    })
}

fn push_feature(
    geometry: Option<geojson::Geometry>,
    properties: Map<String, Value>,
    layer: &str,
    features: &mut Vec<GeoFeature>,
    stats: &mut LoadStats,
) {
    let Some(gj_geometry) = geometry else {
        stats.dropped_missing += 1;
        return;
    };
    let geometry = match geo_types::Geometry::<f64>::try_from(&gj_geometry) {
        Ok(g) => g,
        Err(e) => {
            warn!(layer, error = %e, "dropping unconvertible geometry");
            stats.dropped_invalid += 1;
            return;
        }
    };
    if geometry::is_empty(&geometry) {
        stats.dropped_empty += 1;
        return;
    }
    features.push(GeoFeature {
        geometry,
        properties,
    });
}

/// Parse a legacy `crs` foreign member like
/// `{"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}}`
fn parse_legacy_crs_member(members: &Map<String, Value>) -> Option<Crs> {
    let name = members
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()?;
    // CRS84 spells WGS84 differently
    if name.contains("CRS84") {
        return Some(Crs::Wgs84);
    }
    let code: u32 = name.rsplit(':').find(|s| !s.is_empty())?.parse().ok()?;
    Crs::from_epsg(code).ok()
}

/// Infer a CRS from coordinate bounds, mirroring the original heuristic:
/// lon/lat-shaped bounds mean WGS84, Web-Mercator-sized magnitudes mean
/// EPSG:3857, anything larger is assumed to be the local UTM zone.
fn infer_crs_from_bounds(features: &[GeoFeature]) -> Crs {
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for feature in features {
        if let Some(rect) = feature.geometry.bounding_rect() {
            let (minx, miny) = (rect.min().x, rect.min().y);
            let (maxx, maxy) = (rect.max().x, rect.max().y);
            bounds = Some(match bounds {
                None => (minx, miny, maxx, maxy),
                Some((a, b, c, d)) => (a.min(minx), b.min(miny), c.max(maxx), d.max(maxy)),
            });
        }
    }
    let Some((minx, miny, maxx, maxy)) = bounds else {
        return Crs::Wgs84;
    };

    let in_lonlat = (-180.0..=180.0).contains(&minx)
        && (-180.0..=180.0).contains(&maxx)
        && (-90.0..=90.0).contains(&miny)
        && (-90.0..=90.0).contains(&maxy);
    if in_lonlat {
        return Crs::Wgs84;
    }

    let max_abs = minx.abs().max(miny.abs()).max(maxx.abs()).max(maxy.abs());
    if max_abs <= MERCATOR_MAX_M {
        Crs::WebMercator
    } else {
        Crs::Utm18N
    }
}

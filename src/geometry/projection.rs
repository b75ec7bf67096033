//! Coordinate reference systems and reprojection
//!
//! Three CRSs cover every dataset this pipeline sees: WGS84 geographic
//! coordinates (EPSG:4326), Web Mercator for planar distance math
//! (EPSG:3857), and NAD83 / UTM zone 18N (EPSG:26918), the projected CRS
//! DC agencies publish in. Transforms between the projected systems route
//! through geographic coordinates.

use crate::error::{AlignError, AlignResult};
use geo::MapCoords;
use geo_types::{Coord, Geometry};
use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;

/// Spherical Mercator earth radius in meters (also the GRS80 semi-major axis)
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Extent of the Web Mercator plane: |x|, |y| <= this value
pub const MERCATOR_MAX_M: f64 = 20_037_508.342_789_244;

// GRS80 ellipsoid (NAD83) for the UTM transform
const GRS80_F: f64 = 1.0 / 298.257_222_101;
const UTM_SCALE: f64 = 0.9996;
const UTM_FALSE_EASTING_M: f64 = 500_000.0;
/// Central meridian of UTM zone 18N, in degrees
const UTM18_LON0_DEG: f64 = -75.0;

/// Coordinate reference systems supported by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// Geographic lon/lat degrees, EPSG:4326
    Wgs84,
    /// Web Mercator meters, EPSG:3857
    WebMercator,
    /// NAD83 / UTM zone 18N meters, EPSG:26918
    Utm18N,
}

impl Crs {
    /// Look up a CRS by EPSG code
    pub fn from_epsg(epsg: u32) -> AlignResult<Self> {
        match epsg {
            4326 => Ok(Crs::Wgs84),
            3857 => Ok(Crs::WebMercator),
            26918 => Ok(Crs::Utm18N),
            _ => Err(AlignError::UnsupportedCrs { epsg }),
        }
    }

    /// EPSG code of this CRS
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
            Crs::Utm18N => 26918,
        }
    }

    /// Whether an EPSG code maps to a supported CRS
    pub fn is_supported(epsg: u32) -> bool {
        Self::from_epsg(epsg).is_ok()
    }
}

/// Project a WGS84 lon/lat coordinate onto the Web Mercator plane
fn wgs84_to_mercator(c: Coord<f64>) -> Coord<f64> {
    let lat = c.y.clamp(-89.9999, 89.9999).to_radians();
    Coord {
        x: EARTH_RADIUS_M * c.x.to_radians(),
        y: EARTH_RADIUS_M * (FRAC_PI_4 + lat / 2.0).tan().ln(),
    }
}

/// Invert the spherical Mercator projection back to lon/lat degrees
fn mercator_to_wgs84(c: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (c.x / EARTH_RADIUS_M).to_degrees(),
        y: (2.0 * (c.y / EARTH_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees(),
    }
}

/// Meridional arc length M(phi) on the GRS80 ellipsoid (Snyder eq. 3-21)
fn meridional_arc(phi: f64, e2: f64) -> f64 {
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    EARTH_RADIUS_M
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

/// Project a WGS84 lon/lat coordinate into UTM zone 18N (Snyder eq. 8-9..8-13)
fn wgs84_to_utm18(c: Coord<f64>) -> Coord<f64> {
    let e2 = GRS80_F * (2.0 - GRS80_F);
    let ep2 = e2 / (1.0 - e2);
    let phi = c.y.to_radians();
    let lam = c.x.to_radians();
    let lam0 = UTM18_LON0_DEG.to_radians();

    let sin_phi = phi.sin();
    let cos_phi = phi.cos();
    let n = EARTH_RADIUS_M / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = phi.tan().powi(2);
    let cc = ep2 * cos_phi * cos_phi;
    let a = (lam - lam0) * cos_phi;
    let m = meridional_arc(phi, e2);

    let x = UTM_SCALE
        * n
        * (a + (1.0 - t + cc) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * cc - 58.0 * ep2) * a.powi(5) / 120.0)
        + UTM_FALSE_EASTING_M;
    let y = UTM_SCALE
        * (m + n
            * phi.tan()
            * (a * a / 2.0
                + (5.0 - t + 9.0 * cc + 4.0 * cc * cc) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * cc - 330.0 * ep2) * a.powi(6) / 720.0));

    Coord { x, y }
}

/// Invert UTM zone 18N back to lon/lat degrees (Snyder eq. 8-17..8-25)
fn utm18_to_wgs84(c: Coord<f64>) -> Coord<f64> {
    let e2 = GRS80_F * (2.0 - GRS80_F);
    let ep2 = e2 / (1.0 - e2);
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    let m = c.y / UTM_SCALE;
    let mu = m / (EARTH_RADIUS_M * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    // Footpoint latitude
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let c1 = ep2 * cos_phi1 * cos_phi1;
    let t1 = phi1.tan().powi(2);
    let n1 = EARTH_RADIUS_M / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let r1 = EARTH_RADIUS_M * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = (c.x - UTM_FALSE_EASTING_M) / (n1 * UTM_SCALE);

    let phi = phi1
        - (n1 * phi1.tan() / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                    - 252.0 * ep2
                    - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);
    let lam = UTM18_LON0_DEG.to_radians()
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                * d.powi(5)
                / 120.0)
            / cos_phi1;

    Coord {
        x: lam.to_degrees(),
        y: phi.to_degrees(),
    }
}

/// Transform a single coordinate between CRSs
pub fn transform_coord(c: Coord<f64>, from: Crs, to: Crs) -> Coord<f64> {
    if from == to {
        return c;
    }
    // Route every pair through geographic coordinates
    let geographic = match from {
        Crs::Wgs84 => c,
        Crs::WebMercator => mercator_to_wgs84(c),
        Crs::Utm18N => utm18_to_wgs84(c),
    };
    match to {
        Crs::Wgs84 => geographic,
        Crs::WebMercator => wgs84_to_mercator(geographic),
        Crs::Utm18N => wgs84_to_utm18(geographic),
    }
}

/// Reproject a whole geometry between CRSs
pub fn reproject(geometry: &Geometry<f64>, from: Crs, to: Crs) -> Geometry<f64> {
    if from == to {
        return geometry.clone();
    }
    geometry.map_coords(|c| transform_coord(c, from, to))
}

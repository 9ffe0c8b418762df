//! Spatial math: Web Mercator projection and geodesic lengths.

use crate::models::PathCoord;
use geo::{Coord, Distance, Geodesic, Length, LineString, Point};

/// Sphere radius used by EPSG:3857.
pub const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator square.
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Project a lon/lat coordinate (degrees) to Web Mercator meters.
pub fn to_web_mercator(lon: f64, lat: f64) -> Coord<f64> {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = WEB_MERCATOR_RADIUS_M * lon.to_radians();
    let y = WEB_MERCATOR_RADIUS_M
        * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
            .tan()
            .ln();
    Coord { x, y }
}

/// Inverse of [`to_web_mercator`]: Web Mercator meters back to lon/lat degrees.
pub fn from_web_mercator(x: f64, y: f64) -> Coord<f64> {
    let lon = (x / WEB_MERCATOR_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / WEB_MERCATOR_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2)
        .to_degrees();
    Coord { x: lon, y: lat }
}

/// Geodesic (WGS84 ellipsoid) distance between two lon/lat coordinates, in meters.
pub fn geodesic_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Geodesic.distance(Point::from(a), Point::from(b))
}

/// Geodesic length of a lon/lat polyline, in meters. Elevation is ignored.
pub fn geodesic_length(coords: &[PathCoord]) -> f64 {
    if coords.len() < 2 {
        return 0.0;
    }
    let line: LineString<f64> = coords.iter().map(PathCoord::xy).collect();
    Geodesic.length(&line)
}

//! Core data models for path computation.

use crate::error::{PathError, Result};
use geo::{Coord, LineString, Point};
use geojson::{GeoJson, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A user-specified point with an explicit chain position and identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    /// Ordering key, unique within a chain and >= 1.
    pub position: u32,
    /// External identifier echoed back as `from_id` / `to_id`.
    pub id: i64,
    pub point: Point<f64>,
}

impl Waypoint {
    pub fn new(position: u32, id: i64, x: f64, y: f64) -> Self {
        Self {
            position,
            id,
            point: Point::new(x, y),
        }
    }
}

/// Travel mode, also handed opaquely to the road graph provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    /// Continuity is enforced across the whole chain.
    #[default]
    Pedestrian,
    /// Continuity is enforced within each segment only.
    Vehicle,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Pedestrian => "pedestrian",
            TravelMode::Vehicle => "vehicle",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pedestrian" => Ok(TravelMode::Pedestrian),
            "vehicle" => Ok(TravelMode::Vehicle),
            other => Err(format!("unknown travel mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationMode {
    Enabled,
    #[default]
    Disabled,
}

impl ElevationMode {
    pub fn is_enabled(&self) -> bool {
        matches!(self, ElevationMode::Enabled)
    }
}

impl fmt::Display for ElevationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ElevationMode::Enabled => "enabled",
            ElevationMode::Disabled => "disabled",
        })
    }
}

impl FromStr for ElevationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enabled" => Ok(ElevationMode::Enabled),
            "disabled" => Ok(ElevationMode::Disabled),
            other => Err(format!("unknown elevation mode '{}'", other)),
        }
    }
}

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn to_rect(&self) -> geo::Rect<f64> {
        geo::Rect::new(
            Coord {
                x: self.min_x,
                y: self.min_y,
            },
            Coord {
                x: self.max_x,
                y: self.max_y,
            },
        )
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Exact-match key for an `(x, y)` coordinate.
///
/// Equality is bitwise, so `0.0` and `-0.0` are distinct keys and two
/// coordinates that differ in the last ulp never collapse. Callers must hand
/// back exactly the values they were given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordKey(u64, u64);

impl CoordKey {
    pub fn new(x: f64, y: f64) -> Self {
        Self(x.to_bits(), y.to_bits())
    }
}

impl From<Coord<f64>> for CoordKey {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.x, coord.y)
    }
}

/// A flattened path coordinate, optionally carrying an elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathCoord {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl PathCoord {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            elevation: None,
        }
    }

    pub fn with_elevation(x: f64, y: f64, elevation: f64) -> Self {
        Self {
            x,
            y,
            elevation: Some(elevation),
        }
    }

    pub fn key(&self) -> CoordKey {
        CoordKey::new(self.x, self.y)
    }

    pub fn xy(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }

    /// GeoJSON position: `[x, y]` or `[x, y, elevation]`.
    pub fn position(&self) -> Vec<f64> {
        match self.elevation {
            Some(z) => vec![self.x, self.y, z],
            None => vec![self.x, self.y],
        }
    }
}

impl From<Coord<f64>> for PathCoord {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.x, coord.y)
    }
}

/// Identifier of a road edge, unique per graph build.
pub type EdgeIdentifier = String;

/// The routed path between two consecutive waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub from_id: i64,
    pub to_id: i64,
    /// One line per traversed edge, in traversal order.
    pub path_geom: Vec<LineString<f64>>,
    pub path_ids: Vec<EdgeIdentifier>,
    /// Filled by the stitcher, elevation-substituted by the assembler.
    pub coords_flatten_path: Vec<PathCoord>,
}

impl PathSegment {
    pub fn new(
        from_id: i64,
        to_id: i64,
        path_geom: Vec<LineString<f64>>,
        path_ids: Vec<EdgeIdentifier>,
    ) -> Self {
        Self {
            from_id,
            to_id,
            path_geom,
            path_ids,
            coords_flatten_path: Vec::new(),
        }
    }

    pub fn first_coord(&self) -> Option<PathCoord> {
        self.coords_flatten_path.first().copied()
    }

    pub fn last_coord(&self) -> Option<PathCoord> {
        self.coords_flatten_path.last().copied()
    }
}

/// Waypoints validated and sorted by position.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointChain {
    waypoints: Vec<Waypoint>,
}

impl WaypointChain {
    /// Validate and order waypoints. Positions must be >= 1 and unique, and
    /// at least two waypoints are needed to form a segment.
    pub fn new(mut waypoints: Vec<Waypoint>) -> Result<Self> {
        if waypoints.is_empty() {
            return Err(PathError::EmptyWaypoints);
        }
        let mut seen = HashSet::with_capacity(waypoints.len());
        for (index, waypoint) in waypoints.iter().enumerate() {
            if waypoint.position < 1 {
                return Err(PathError::InvalidWaypoint {
                    index,
                    reason: "position must be >= 1".to_string(),
                });
            }
            if !waypoint.point.x().is_finite() || !waypoint.point.y().is_finite() {
                return Err(PathError::InvalidWaypoint {
                    index,
                    reason: "coordinates must be finite".to_string(),
                });
            }
            if !seen.insert(waypoint.position) {
                return Err(PathError::DuplicatePosition(waypoint.position));
            }
        }
        if waypoints.len() < 2 {
            return Err(PathError::TooFewWaypoints(waypoints.len()));
        }
        waypoints.sort_by_key(|waypoint| waypoint.position);
        Ok(Self { waypoints })
    }

    /// Parse a GeoJSON FeatureCollection of point features carrying
    /// integer `position` and `id` properties.
    pub fn from_geojson_str(input: &str) -> Result<Self> {
        let geojson: GeoJson = input
            .parse()
            .map_err(|err: geojson::Error| PathError::InvalidGeoJson(err.to_string()))?;
        let collection = match geojson {
            GeoJson::FeatureCollection(collection) => collection,
            _ => {
                return Err(PathError::InvalidGeoJson(
                    "expected a FeatureCollection".to_string(),
                ))
            }
        };

        let mut waypoints = Vec::with_capacity(collection.features.len());
        for (index, feature) in collection.features.iter().enumerate() {
            let invalid = |reason: &str| PathError::InvalidWaypoint {
                index,
                reason: reason.to_string(),
            };

            let point = match feature.geometry.as_ref().map(|geometry| &geometry.value) {
                Some(geojson::Value::Point(position)) if position.len() >= 2 => {
                    Point::new(position[0], position[1])
                }
                Some(_) => return Err(invalid("geometry must be a Point")),
                None => return Err(invalid("missing geometry")),
            };

            let position = feature
                .property("position")
                .and_then(json_integer)
                .ok_or_else(|| invalid("missing or non-integer 'position'"))?;
            let position = u32::try_from(position).map_err(|_| invalid("'position' out of range"))?;
            let id = feature
                .property("id")
                .and_then(json_integer)
                .ok_or_else(|| invalid("missing or non-integer 'id'"))?;

            waypoints.push(Waypoint { position, id, point });
        }

        Self::new(waypoints)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn points(&self) -> Vec<Point<f64>> {
        self.waypoints.iter().map(|waypoint| waypoint.point).collect()
    }

    /// Consecutive `(start, end)` pairs in chain order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Waypoint, &Waypoint)> {
        self.waypoints.windows(2).map(|pair| (&pair[0], &pair[1]))
    }
}

/// Accepts `3` and `3.0`, rejects `3.5` and strings.
fn json_integer(value: &JsonValue) -> Option<i64> {
    if let Some(int) = value.as_i64() {
        return Some(int);
    }
    let float = value.as_f64()?;
    if float.fract() == 0.0 && float.is_finite() && float.abs() < i64::MAX as f64 {
        Some(float as i64)
    } else {
        None
    }
}

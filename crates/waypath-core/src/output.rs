//! Output assembly: cumulative distances, elevation and GeoJSON collections.

use crate::elevation::ElevationIndex;
use crate::error::{PathError, Result};
use crate::models::{PathCoord, PathSegment};
use crate::spatial::{geodesic_distance, geodesic_length};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use serde::Serialize;

/// Elevation reported for points when enrichment is disabled.
pub const ELEVATION_SENTINEL: f64 = -9999.0;

/// The two collections produced by a run.
#[derive(Debug, Clone, Serialize)]
pub struct PathOutput {
    /// One point per flattened coordinate, with `elevation` and `distance`.
    pub points: FeatureCollection,
    /// One line per segment, with `from_id`, `to_id` and `length`.
    pub lines: FeatureCollection,
    #[serde(skip)]
    pub total_length_m: f64,
}

/// Replace every flattened coordinate with its elevation-enriched form.
/// A coordinate the index does not know is a tracking bug, not a provider failure.
pub fn apply_elevation(segments: &mut [PathSegment], index: &ElevationIndex) -> Result<()> {
    for segment in segments.iter_mut() {
        for coord in segment.coords_flatten_path.iter_mut() {
            let enriched = index
                .get(coord.x, coord.y)
                .ok_or(PathError::ElevationLookup {
                    x: coord.x,
                    y: coord.y,
                })?;
            *coord = *enriched;
        }
    }
    Ok(())
}

/// Build the point and line collections from stitched segments.
///
/// A point's `distance` is the geodesic length from the start of its segment
/// plus the running total of every previous segment, so the very first point
/// is at 0 and a segment's first point repeats the previous segment's last
/// distance.
pub fn assemble(segments: &[PathSegment], elevation_enabled: bool) -> PathOutput {
    let point_count = segments.iter().map(|s| s.coords_flatten_path.len()).sum();
    let mut points = Vec::with_capacity(point_count);
    let mut lines = Vec::with_capacity(segments.len());
    let mut offset = 0.0;

    for segment in segments {
        let coords = &segment.coords_flatten_path;
        let mut along = 0.0;
        for (index, coord) in coords.iter().enumerate() {
            if index > 0 {
                along += geodesic_distance(coords[index - 1].xy(), coord.xy());
            }
            let elevation = if elevation_enabled {
                coord.elevation.unwrap_or(ELEVATION_SENTINEL)
            } else {
                ELEVATION_SENTINEL
            };
            points.push(point_feature(coord, elevation, offset + along));
        }
        offset += along;

        lines.push(line_feature(segment, geodesic_length(coords)));
    }

    tracing::debug!(
        "Assembled {} points and {} lines ({:.1} m)",
        points.len(),
        lines.len(),
        offset
    );

    PathOutput {
        points: collection(points),
        lines: collection(lines),
        total_length_m: offset,
    }
}

fn point_feature(coord: &PathCoord, elevation: f64, distance: f64) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("elevation".to_string(), JsonValue::from(elevation));
    properties.insert("distance".to_string(), JsonValue::from(distance));
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(coord.position()))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn line_feature(segment: &PathSegment, length: f64) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("from_id".to_string(), JsonValue::from(segment.from_id));
    properties.insert("to_id".to_string(), JsonValue::from(segment.to_id));
    properties.insert("length".to_string(), JsonValue::from(length));
    let positions = segment
        .coords_flatten_path
        .iter()
        .map(PathCoord::position)
        .collect();
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(positions))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

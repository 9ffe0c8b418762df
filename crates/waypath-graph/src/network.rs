//! Road network loaded from a GeoJSON file of line features.

use crate::error::GraphError;
use geo::{BoundingRect, Coord, Intersects, LineString};
use geojson::{Feature, GeoJson, JsonValue};
use std::path::Path;
use waypath_core::{BoundingBox, EdgeIdentifier, TravelMode};

/// One road edge as stored in the network file.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadEdge {
    pub identifier: EdgeIdentifier,
    pub geometry: LineString<f64>,
    /// Only honored for vehicle routing.
    pub oneway: bool,
    /// Modes allowed on this edge; `None` allows every mode.
    pub modes: Option<Vec<TravelMode>>,
}

impl RoadEdge {
    pub fn new(identifier: impl Into<EdgeIdentifier>, geometry: LineString<f64>) -> Self {
        Self {
            identifier: identifier.into(),
            geometry,
            oneway: false,
            modes: None,
        }
    }

    pub fn allows(&self, mode: TravelMode) -> bool {
        self.modes
            .as_ref()
            .map_or(true, |modes| modes.contains(&mode))
    }

    pub fn start(&self) -> Coord<f64> {
        self.geometry.0[0]
    }

    pub fn end(&self) -> Coord<f64> {
        self.geometry.0[self.geometry.0.len() - 1]
    }
}

/// Every edge of a road network file.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    edges: Vec<RoadEdge>,
}

impl RoadNetwork {
    pub fn new(edges: Vec<RoadEdge>) -> Self {
        Self { edges }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_geojson_str(&raw)
    }

    /// Parse LineString / MultiLineString features. `topo_uuid` names the
    /// edge (the feature index is used when absent); multi-part features get
    /// one edge per part, suffixed `_<part>`.
    pub fn from_geojson_str(input: &str) -> Result<Self, GraphError> {
        let collection = match input.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(collection) => collection,
            _ => return Err(GraphError::NotACollection),
        };

        let mut edges = Vec::with_capacity(collection.features.len());
        for (index, feature) in collection.features.iter().enumerate() {
            let invalid = |reason: &str| GraphError::InvalidFeature {
                index,
                reason: reason.to_string(),
            };

            let identifier = match feature.property("topo_uuid") {
                Some(JsonValue::String(id)) => id.clone(),
                Some(JsonValue::Number(id)) => id.to_string(),
                Some(_) => return Err(invalid("'topo_uuid' must be a string or number")),
                None => index.to_string(),
            };
            let oneway = match feature.property("oneway") {
                Some(JsonValue::Bool(oneway)) => *oneway,
                Some(JsonValue::Null) | None => false,
                Some(_) => return Err(invalid("'oneway' must be a boolean")),
            };
            let modes = parse_modes(feature).map_err(|reason| invalid(&reason))?;

            let lines = match feature.geometry.as_ref().map(|geometry| &geometry.value) {
                Some(geojson::Value::LineString(positions)) => vec![positions],
                Some(geojson::Value::MultiLineString(parts)) => parts.iter().collect(),
                Some(_) => return Err(invalid("geometry must be a LineString or MultiLineString")),
                None => return Err(invalid("missing geometry")),
            };
            let multi_part = lines.len() > 1;

            for (part, positions) in lines.into_iter().enumerate() {
                let geometry: LineString<f64> = positions
                    .iter()
                    .filter(|position| position.len() >= 2)
                    .map(|position| Coord {
                        x: position[0],
                        y: position[1],
                    })
                    .collect();
                if geometry.0.len() < 2 {
                    tracing::warn!("Skipping road feature {} part {}: fewer than 2 positions", index, part);
                    continue;
                }
                let identifier = if multi_part {
                    format!("{}_{}", identifier, part)
                } else {
                    identifier.clone()
                };
                edges.push(RoadEdge {
                    identifier,
                    geometry,
                    oneway,
                    modes: modes.clone(),
                });
            }
        }

        tracing::debug!("Loaded road network with {} edges", edges.len());
        Ok(Self { edges })
    }

    pub fn edges(&self) -> &[RoadEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges usable in `mode` whose bounds touch `bbox`.
    pub fn clip(&self, bbox: &BoundingBox, mode: TravelMode) -> Vec<RoadEdge> {
        let area = bbox.to_rect();
        self.edges
            .iter()
            .filter(|edge| edge.allows(mode))
            .filter(|edge| {
                edge.geometry
                    .bounding_rect()
                    .is_some_and(|rect| rect.intersects(&area))
            })
            .cloned()
            .collect()
    }
}

fn parse_modes(feature: &Feature) -> Result<Option<Vec<TravelMode>>, String> {
    let Some(value) = feature.property("modes") else {
        return Ok(None);
    };
    let JsonValue::Array(items) = value else {
        return Err("'modes' must be an array of strings".to_string());
    };
    items
        .iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| "'modes' must be an array of strings".to_string())
                .and_then(str::parse::<TravelMode>)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> RoadNetwork {
        let input = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature",
                  "properties": { "topo_uuid": "main", "oneway": true },
                  "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [0.01, 0.0]] } },
                { "type": "Feature",
                  "properties": { "topo_uuid": 42, "modes": ["pedestrian"] },
                  "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [0.0, 0.01]] } },
                { "type": "Feature",
                  "properties": {},
                  "geometry": { "type": "MultiLineString", "coordinates": [
                      [[5.0, 5.0], [5.1, 5.0]],
                      [[5.1, 5.0], [5.2, 5.0]]
                  ] } }
            ]
        })
        .to_string();
        RoadNetwork::from_geojson_str(&input).unwrap()
    }

    #[test]
    fn parses_identifiers_and_flags() {
        let network = network();
        let ids: Vec<&str> = network.edges().iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["main", "42", "2_0", "2_1"]);
        assert!(network.edges()[0].oneway);
        assert!(network.edges()[1].allows(TravelMode::Pedestrian));
        assert!(!network.edges()[1].allows(TravelMode::Vehicle));
    }

    #[test]
    fn clip_filters_by_area_and_mode() {
        let network = network();
        let bbox = BoundingBox {
            min_x: -0.001,
            min_y: -0.001,
            max_x: 0.02,
            max_y: 0.02,
        };
        let pedestrian = network.clip(&bbox, TravelMode::Pedestrian);
        assert_eq!(pedestrian.len(), 2);
        let vehicle = network.clip(&bbox, TravelMode::Vehicle);
        assert_eq!(vehicle.len(), 1);
        assert_eq!(vehicle[0].identifier, "main");
    }

    #[test]
    fn point_geometry_is_rejected() {
        let input = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [0, 0]}}
        ]}"#;
        assert!(matches!(
            RoadNetwork::from_geojson_str(input),
            Err(GraphError::InvalidFeature { index: 0, .. })
        ));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let input = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"modes": ["boat"]},
             "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}
        ]}"#;
        assert!(matches!(
            RoadNetwork::from_geojson_str(input),
            Err(GraphError::InvalidFeature { index: 0, .. })
        ));
    }
}

//! [`RoadGraphProvider`] backed by a [`RoadNetwork`] loaded from disk.

use crate::error::GraphError;
use crate::graph::RoutableGraph;
use crate::network::RoadNetwork;
use crate::snap::attach_points;
use geo::Point;
use std::path::Path;
use waypath_core::{BoundingBox, RoadGraphProvider, TravelMode};

/// Serves per-run graphs clipped from one preloaded road network.
#[derive(Debug, Clone)]
pub struct GeoJsonRoadProvider {
    network: RoadNetwork,
}

impl GeoJsonRoadProvider {
    pub fn new(network: RoadNetwork) -> Self {
        Self { network }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        Ok(Self::new(RoadNetwork::from_path(path)?))
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }
}

impl RoadGraphProvider for GeoJsonRoadProvider {
    type Graph = RoutableGraph;
    type Error = GraphError;

    fn roads_from_bbox(
        &self,
        bbox: &BoundingBox,
        additional_points: &[Point<f64>],
        mode: TravelMode,
    ) -> Result<RoutableGraph, GraphError> {
        let mut edges = self.network.clip(bbox, mode);
        if edges.is_empty() {
            return Err(GraphError::EmptyNetwork { mode });
        }
        let clipped = edges.len();

        attach_points(&mut edges, additional_points)?;
        let graph = RoutableGraph::build(&edges, mode);

        tracing::info!(
            "Road graph ready: {} of {} edges in area, {} after inserting {} points",
            clipped,
            self.network.len(),
            edges.len(),
            additional_points.len()
        );
        Ok(graph)
    }
}

//! Segment router: one shortest-path query per consecutive waypoint pair.

use crate::error::{PathError, Result};
use crate::models::{BoundingBox, EdgeIdentifier, PathSegment, TravelMode, WaypointChain};
use geo::{LineString, Point};

/// Vertex handle inside a [`RoadGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// Edge handle inside a [`RoadGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// A routable road network with named vertices and weighted edges.
pub trait RoadGraph {
    /// Exact-geometry vertex lookup.
    fn vertex_for(&self, point: &Point<f64>) -> Option<VertexId>;

    /// Edges of the cheapest path from `source` to `target`, in traversal
    /// order, using the graph's own edge weights. Empty when unreachable.
    fn shortest_path(&self, source: VertexId, target: VertexId) -> Vec<EdgeId>;

    fn edge_identifier(&self, edge: EdgeId) -> Option<EdgeIdentifier>;

    /// Geometry row for an edge identifier. The first row wins when several
    /// share an identifier.
    fn edge_geometry(&self, identifier: &str) -> Option<LineString<f64>>;
}

/// Builds a [`RoadGraph`] covering a bounding box.
pub trait RoadGraphProvider {
    type Graph: RoadGraph;
    type Error: std::fmt::Display;

    /// `additional_points` must come back as vertices of the returned graph.
    fn roads_from_bbox(
        &self,
        bbox: &BoundingBox,
        additional_points: &[Point<f64>],
        mode: TravelMode,
    ) -> std::result::Result<Self::Graph, Self::Error>;
}

/// Route every consecutive waypoint pair. N waypoints yield N-1 segments
/// whose geometry is in edge-traversal order, not yet continuity-checked.
pub fn route_segments<G>(graph: &G, chain: &WaypointChain) -> Result<Vec<PathSegment>>
where
    G: RoadGraph + ?Sized,
{
    let mut segments = Vec::with_capacity(chain.len().saturating_sub(1));

    for (start, end) in chain.pairs() {
        let source = graph
            .vertex_for(&start.point)
            .ok_or(PathError::VertexNotFound {
                waypoint_id: start.id,
            })?;
        let target = graph
            .vertex_for(&end.point)
            .ok_or(PathError::VertexNotFound { waypoint_id: end.id })?;

        let edges = graph.shortest_path(source, target);
        if edges.is_empty() {
            return Err(PathError::NoPathFound {
                from_id: start.id,
                to_id: end.id,
            });
        }

        let mut path_ids = Vec::with_capacity(edges.len());
        let mut path_geom = Vec::with_capacity(edges.len());
        for edge in edges {
            let identifier = graph
                .edge_identifier(edge)
                .ok_or(PathError::EdgeIdentifierMissing(edge.0))?;
            let geometry = graph
                .edge_geometry(&identifier)
                .ok_or_else(|| PathError::EdgeGeometryMissing(identifier.clone()))?;
            path_geom.push(geometry);
            path_ids.push(identifier);
        }

        tracing::debug!(
            "Routed {} -> {} over {} edges",
            start.id,
            end.id,
            path_ids.len()
        );
        segments.push(PathSegment::new(start.id, end.id, path_geom, path_ids));
    }

    Ok(segments)
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory graph used by unit tests across the crate.

    use super::*;
    use crate::models::CoordKey;
    use std::collections::{BTreeMap, BinaryHeap, HashMap};
    use std::cmp::Reverse;

    /// Undirected graph whose vertices are line endpoints and whose edges are
    /// the lines themselves, weighted by point count.
    #[derive(Debug, Default)]
    pub struct FakeGraph {
        vertices: HashMap<CoordKey, VertexId>,
        edges: Vec<(VertexId, VertexId, String, f64)>,
        geometry: BTreeMap<String, LineString<f64>>,
    }

    impl FakeGraph {
        pub fn new() -> Self {
            Self::default()
        }

        fn vertex(&mut self, x: f64, y: f64) -> VertexId {
            let next = VertexId(self.vertices.len());
            *self.vertices.entry(CoordKey::new(x, y)).or_insert(next)
        }

        /// Add an edge stored with the given orientation.
        pub fn edge(mut self, id: &str, coords: &[(f64, f64)]) -> Self {
            let first = coords[0];
            let last = coords[coords.len() - 1];
            let a = self.vertex(first.0, first.1);
            let b = self.vertex(last.0, last.1);
            let weight = coords.len() as f64;
            self.edges.push((a, b, id.to_string(), weight));
            self.geometry
                .insert(id.to_string(), LineString::from(coords.to_vec()));
            self
        }
    }

    impl RoadGraph for FakeGraph {
        fn vertex_for(&self, point: &Point<f64>) -> Option<VertexId> {
            self.vertices.get(&CoordKey::new(point.x(), point.y())).copied()
        }

        fn shortest_path(&self, source: VertexId, target: VertexId) -> Vec<EdgeId> {
            let mut best: HashMap<VertexId, (u64, Option<(VertexId, EdgeId)>)> = HashMap::new();
            let mut heap = BinaryHeap::new();
            best.insert(source, (0, None));
            heap.push(Reverse((0u64, source)));
            while let Some(Reverse((cost, vertex))) = heap.pop() {
                if vertex == target {
                    break;
                }
                if best.get(&vertex).is_some_and(|(known, _)| cost > *known) {
                    continue;
                }
                for (index, (a, b, _, weight)) in self.edges.iter().enumerate() {
                    let next = if *a == vertex {
                        *b
                    } else if *b == vertex {
                        *a
                    } else {
                        continue;
                    };
                    let next_cost = cost + *weight as u64;
                    if best.get(&next).map_or(true, |(known, _)| next_cost < *known) {
                        best.insert(next, (next_cost, Some((vertex, EdgeId(index)))));
                        heap.push(Reverse((next_cost, next)));
                    }
                }
            }

            let mut path = Vec::new();
            let mut cursor = target;
            while let Some((_, Some((previous, edge)))) = best.get(&cursor) {
                path.push(*edge);
                cursor = *previous;
            }
            if cursor != source {
                return Vec::new();
            }
            path.reverse();
            path
        }

        fn edge_identifier(&self, edge: EdgeId) -> Option<EdgeIdentifier> {
            self.edges.get(edge.0).map(|(_, _, id, _)| id.clone())
        }

        fn edge_geometry(&self, identifier: &str) -> Option<LineString<f64>> {
            self.geometry.get(identifier).cloned()
        }
    }
}

//! Routable petgraph built from road edges.

use crate::network::RoadEdge;
use geo::{Coord, Geodesic, Length, LineString, Point};
use ordered_float::OrderedFloat;
use petgraph::algo::astar;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use waypath_core::{CoordKey, EdgeId, EdgeIdentifier, RoadGraph, TravelMode, VertexId};

/// Edge data in the road graph.
#[derive(Debug, Clone)]
struct EdgeData {
    identifier: EdgeIdentifier,
    /// Geodesic length in meters.
    weight_m: f64,
}

/// Directed road graph. Vertices are edge endpoints keyed by exact coordinate;
/// two-way roads get an edge in each direction sharing one identifier.
pub struct RoutableGraph {
    graph: DiGraph<Coord<f64>, EdgeData>,
    coord_to_node: HashMap<CoordKey, NodeIndex>,
    geometry: HashMap<EdgeIdentifier, LineString<f64>>,
}

impl RoutableGraph {
    pub fn build(edges: &[RoadEdge], mode: TravelMode) -> Self {
        let mut network = Self {
            graph: DiGraph::with_capacity(edges.len() + 1, edges.len() * 2),
            coord_to_node: HashMap::with_capacity(edges.len() + 1),
            geometry: HashMap::with_capacity(edges.len()),
        };

        for edge in edges {
            let from = network.get_or_create_node(edge.start());
            let to = network.get_or_create_node(edge.end());
            let data = EdgeData {
                identifier: edge.identifier.clone(),
                weight_m: Geodesic.length(&edge.geometry),
            };

            let one_direction = edge.oneway && mode == TravelMode::Vehicle;
            if !one_direction {
                network.graph.add_edge(to, from, data.clone());
            }
            network.graph.add_edge(from, to, data);

            match network.geometry.entry(edge.identifier.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(edge.geometry.clone());
                }
                Entry::Occupied(existing) if *existing.get() != edge.geometry => {
                    tracing::warn!(
                        "Edge identifier {} is used by more than one road, keeping the first geometry",
                        edge.identifier
                    );
                }
                Entry::Occupied(_) => {}
            }
        }

        tracing::debug!(
            "Built {} graph with {} nodes and {} edges",
            mode,
            network.graph.node_count(),
            network.graph.edge_count()
        );
        network
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn get_or_create_node(&mut self, coord: Coord<f64>) -> NodeIndex {
        let key = CoordKey::from(coord);
        if let Some(&idx) = self.coord_to_node.get(&key) {
            idx
        } else {
            let idx = self.graph.add_node(coord);
            self.coord_to_node.insert(key, idx);
            idx
        }
    }
}

impl RoadGraph for RoutableGraph {
    fn vertex_for(&self, point: &Point<f64>) -> Option<VertexId> {
        self.coord_to_node
            .get(&CoordKey::from(point.0))
            .map(|idx| VertexId(idx.index()))
    }

    fn shortest_path(&self, source: VertexId, target: VertexId) -> Vec<EdgeId> {
        let start = NodeIndex::new(source.0);
        let end = NodeIndex::new(target.0);
        if start == end {
            return Vec::new();
        }

        // A* with zero heuristic (equivalent to Dijkstra, but returns full path)
        let Some((_, nodes)) = astar(
            &self.graph,
            start,
            |n| n == end,
            |e| OrderedFloat(e.weight().weight_m),
            |_| OrderedFloat(0.0),
        ) else {
            return Vec::new();
        };

        // Parallel edges between the same nodes: take the cheapest, as A* did.
        nodes
            .windows(2)
            .filter_map(|pair| {
                self.graph
                    .edges_connecting(pair[0], pair[1])
                    .min_by_key(|edge| OrderedFloat(edge.weight().weight_m))
                    .map(|edge| EdgeId(edge.id().index()))
            })
            .collect()
    }

    fn edge_identifier(&self, edge: EdgeId) -> Option<EdgeIdentifier> {
        self.graph
            .edge_weight(EdgeIndex::new(edge.0))
            .map(|data| data.identifier.clone())
    }

    fn edge_geometry(&self, identifier: &str) -> Option<LineString<f64>> {
        self.geometry.get(identifier).cloned()
    }
}

//! Waypath Graph - road graph provider backed by a GeoJSON road network
//!
//! Clips the network to the run's bounding box, inserts the waypoints as
//! vertices and routes with petgraph.

pub mod error;
pub mod graph;
pub mod network;
pub mod provider;
pub mod snap;

pub use error::GraphError;
pub use graph::RoutableGraph;
pub use network::{RoadEdge, RoadNetwork};
pub use provider::GeoJsonRoadProvider;

//! Waypoint insertion: make every requested point a vertex of the network.

use crate::error::GraphError;
use crate::network::RoadEdge;
use geo::{Closest, ClosestPoint, Coord, Distance, Haversine, Line, LineString, Point};
use ordered_float::OrderedFloat;

/// Nearest location on the network to a point.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Projection {
    edge: usize,
    segment: usize,
    at: Coord<f64>,
    distance_m: f64,
}

/// Attach each point to the network.
///
/// A point already at an edge endpoint is left alone. Otherwise the nearest
/// edge is split at the projected location into `<id>#0` and `<id>#1` and,
/// when the point lies off the road, a two-vertex connector edge
/// `connector_<n>` joins it to the split.
pub fn attach_points(edges: &mut Vec<RoadEdge>, points: &[Point<f64>]) -> Result<(), GraphError> {
    for (index, point) in points.iter().enumerate() {
        let target = point.0;
        if edges
            .iter()
            .any(|edge| edge.start() == target || edge.end() == target)
        {
            continue;
        }

        let projection = nearest_projection(edges, point).ok_or(GraphError::Unattached {
            x: point.x(),
            y: point.y(),
        })?;

        if let Some((head, tail)) = split_edge(&edges[projection.edge], projection.segment, projection.at) {
            edges[projection.edge] = head;
            edges.push(tail);
        }

        if projection.at != target {
            tracing::debug!(
                "Connecting point {} to the network over {:.1} m",
                index,
                projection.distance_m
            );
            edges.push(RoadEdge::new(
                format!("connector_{}", index),
                LineString::new(vec![target, projection.at]),
            ));
        }
    }
    Ok(())
}

fn nearest_projection(edges: &[RoadEdge], point: &Point<f64>) -> Option<Projection> {
    edges
        .iter()
        .enumerate()
        .flat_map(|(edge_index, edge)| {
            edge.geometry
                .lines()
                .enumerate()
                .filter_map(move |(segment, line)| {
                    project(&line, point).map(|at| Projection {
                        edge: edge_index,
                        segment,
                        at,
                        distance_m: Haversine.distance(*point, Point::from(at)),
                    })
                })
        })
        .min_by_key(|projection| OrderedFloat(projection.distance_m))
}

fn project(line: &Line<f64>, point: &Point<f64>) -> Option<Coord<f64>> {
    match line.closest_point(point) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => Some(p.0),
        Closest::Indeterminate => None,
    }
}

/// Split `edge` at `at`, which lies on line `segment`. Returns `None` when
/// `at` is one of the edge's endpoints.
fn split_edge(edge: &RoadEdge, segment: usize, at: Coord<f64>) -> Option<(RoadEdge, RoadEdge)> {
    let coords = &edge.geometry.0;

    let mut head: Vec<Coord<f64>> = coords[..=segment].to_vec();
    if head.last() != Some(&at) {
        head.push(at);
    }
    let mut tail: Vec<Coord<f64>> = Vec::with_capacity(coords.len() - segment);
    if coords[segment + 1] != at {
        tail.push(at);
    }
    tail.extend_from_slice(&coords[segment + 1..]);

    if head.len() < 2 || tail.len() < 2 {
        return None;
    }

    let piece = |suffix: usize, geometry: Vec<Coord<f64>>| RoadEdge {
        identifier: format!("{}#{}", edge.identifier, suffix),
        geometry: LineString::new(geometry),
        oneway: edge.oneway,
        modes: edge.modes.clone(),
    };
    Some((piece(0, head), piece(1, tail)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: &str, coords: &[(f64, f64)]) -> RoadEdge {
        RoadEdge::new(id, LineString::from(coords.to_vec()))
    }

    #[test]
    fn endpoint_points_are_untouched() {
        let mut edges = vec![edge("a", &[(0.0, 0.0), (1.0, 0.0)])];
        attach_points(&mut edges, &[Point::new(1.0, 0.0)]).unwrap();
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn point_on_interior_vertex_splits_there() {
        let mut edges = vec![edge("a", &[(0.0, 0.0), (0.5, 0.0), (1.0, 0.0)])];
        attach_points(&mut edges, &[Point::new(0.5, 0.0)]).unwrap();

        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].identifier, "a#0");
        assert_eq!(edges[0].geometry, LineString::from(vec![(0.0, 0.0), (0.5, 0.0)]));
        assert_eq!(edges[1].identifier, "a#1");
        assert_eq!(edges[1].geometry, LineString::from(vec![(0.5, 0.0), (1.0, 0.0)]));
    }

    #[test]
    fn off_road_point_gets_connector() {
        let mut edges = vec![
            edge("a", &[(0.0, 0.0), (0.001, 0.0)]),
            edge("b", &[(0.0, 1.0), (0.001, 1.0)]),
        ];
        attach_points(&mut edges, &[Point::new(0.0005, 0.0001)]).unwrap();

        let ids: Vec<&str> = edges.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["a#0", "b", "a#1", "connector_0"]);

        let connector = &edges[3];
        assert_eq!(connector.start(), Coord { x: 0.0005, y: 0.0001 });
        assert_eq!(connector.end(), edges[0].end());
        assert_eq!(edges[0].end(), edges[2].start());
    }

    #[test]
    fn split_names_do_not_clash_with_multi_part_roads() {
        // "a_0" / "a_1" are what a two-part MultiLineString "a" loads as.
        let mut edges = vec![
            edge("a", &[(0.0, 0.0), (0.5, 0.0), (1.0, 0.0)]),
            edge("a_0", &[(0.0, 1.0), (1.0, 1.0)]),
            edge("a_1", &[(1.0, 1.0), (2.0, 1.0)]),
        ];
        attach_points(&mut edges, &[Point::new(0.5, 0.0)]).unwrap();

        let mut ids: Vec<&str> = edges.iter().map(|e| e.identifier.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids, vec!["a#0", "a#1", "a_0", "a_1"]);
    }

    #[test]
    fn empty_network_cannot_attach() {
        let mut edges = Vec::new();
        assert!(matches!(
            attach_points(&mut edges, &[Point::new(0.0, 0.0)]),
            Err(GraphError::Unattached { .. })
        ));
    }
}

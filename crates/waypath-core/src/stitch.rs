//! Path stitching: orient per-edge geometry so consecutive parts share
//! endpoints, then flatten each segment into one ordered coordinate list.

use crate::error::{PathError, Result};
use crate::models::{PathCoord, PathSegment, TravelMode};
use geo::{Coord, LineString};

/// Fill `coords_flatten_path` on every segment.
///
/// Pedestrian chains are kept continuous end to end starting at `origin`, the
/// first waypoint: when a segment does not start where the previous one ended
/// (or at `origin` for the first segment), its first part is reversed.
/// Vehicle chains only get continuity inside each segment.
pub fn stitch_segments(
    segments: &mut [PathSegment],
    mode: TravelMode,
    origin: Coord<f64>,
) -> Result<()> {
    match mode {
        TravelMode::Pedestrian => stitch_continuous(segments, origin),
        TravelMode::Vehicle => {
            for (index, segment) in segments.iter_mut().enumerate() {
                let parts = merge_continuous(&segment.path_geom, index, false)?;
                segment.coords_flatten_path = flatten(&parts);
                segment.path_geom = parts;
            }
            Ok(())
        }
    }
}

fn stitch_continuous(segments: &mut [PathSegment], origin: Coord<f64>) -> Result<()> {
    let mut last = origin;

    for (index, segment) in segments.iter_mut().enumerate() {
        if let Some(first) = segment.path_geom.first_mut() {
            if first.0.first() != Some(&last) {
                tracing::debug!(
                    "Segment {} -> {}: reversing first part to join {:?}",
                    segment.from_id,
                    segment.to_id,
                    last
                );
                first.0.reverse();
            }
        }

        let parts = merge_continuous(&segment.path_geom, index, true)?;
        let coords = flatten(&parts);
        if let Some(tail) = coords.last() {
            last = tail.xy();
        }
        segment.coords_flatten_path = coords;
        segment.path_geom = parts;
    }

    Ok(())
}

/// Orient `parts` so each one starts where the previous one ends.
///
/// With `anchored` the first part keeps its orientation. Otherwise it is
/// flipped when only its start touches the second part. Empty parts are
/// dropped. A part touching neither end of the chain so far is an error.
pub fn merge_continuous(
    parts: &[LineString<f64>],
    segment_index: usize,
    anchored: bool,
) -> Result<Vec<LineString<f64>>> {
    let mut remaining = parts
        .iter()
        .enumerate()
        .filter(|(_, part)| !part.0.is_empty());

    let Some((_, first)) = remaining.next() else {
        return Err(PathError::EmptySegment(segment_index));
    };

    let mut merged = vec![first.clone()];
    let mut tail = last_coord(first);
    let mut first_pending = !anchored;

    for (part_index, part) in remaining {
        let start = part.0[0];
        let end = last_coord(part);

        if first_pending {
            first_pending = false;
            let head = merged[0].0[0];
            if tail != start && tail != end && (head == start || head == end) {
                merged[0].0.reverse();
                tail = head;
            }
        }

        if start == tail {
            merged.push(part.clone());
            tail = end;
        } else if end == tail {
            let mut reversed = part.clone();
            reversed.0.reverse();
            merged.push(reversed);
            tail = start;
        } else {
            return Err(PathError::Discontinuous {
                segment_index,
                part_index,
            });
        }
    }

    Ok(merged)
}

/// Concatenate oriented parts, keeping each shared joint once.
pub fn flatten(parts: &[LineString<f64>]) -> Vec<PathCoord> {
    let mut coords: Vec<PathCoord> = Vec::with_capacity(parts.iter().map(|p| p.0.len()).sum());
    for part in parts {
        let skip = match (coords.last(), part.0.first()) {
            (Some(tail), Some(head)) if tail.xy() == *head => 1,
            _ => 0,
        };
        coords.extend(part.0.iter().skip(skip).copied().map(PathCoord::from));
    }
    coords
}

fn last_coord(line: &LineString<f64>) -> Coord<f64> {
    line.0[line.0.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(coords: &[(f64, f64)]) -> LineString<f64> {
        LineString::from(coords.to_vec())
    }

    fn xy(coords: &[PathCoord]) -> Vec<(f64, f64)> {
        coords.iter().map(|c| (c.x, c.y)).collect()
    }

    fn segment(from_id: i64, to_id: i64, parts: Vec<LineString<f64>>) -> PathSegment {
        let ids = (0..parts.len()).map(|i| format!("{}-{}", from_id, i)).collect();
        PathSegment::new(from_id, to_id, parts, ids)
    }

    #[test]
    fn merge_reverses_backward_parts() {
        let parts = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(2.0, 0.0), (1.0, 0.0)]),
            line(&[(2.0, 0.0), (3.0, 0.0)]),
        ];
        let merged = merge_continuous(&parts, 0, false).unwrap();
        assert_eq!(
            xy(&flatten(&merged)),
            vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]
        );
    }

    #[test]
    fn merge_flips_first_part_when_only_its_start_connects() {
        let parts = vec![
            line(&[(1.0, 0.0), (0.0, 0.0)]),
            line(&[(1.0, 0.0), (2.0, 0.0)]),
        ];
        let merged = merge_continuous(&parts, 0, false).unwrap();
        assert_eq!(
            xy(&flatten(&merged)),
            vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]
        );
    }

    #[test]
    fn anchored_merge_keeps_first_part() {
        let parts = vec![
            line(&[(1.0, 0.0), (0.0, 0.0)]),
            line(&[(1.0, 0.0), (2.0, 0.0)]),
        ];
        assert!(matches!(
            merge_continuous(&parts, 4, true),
            Err(PathError::Discontinuous {
                segment_index: 4,
                part_index: 1
            })
        ));
    }

    #[test]
    fn disjoint_parts_are_rejected() {
        let parts = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(5.0, 5.0), (6.0, 5.0)]),
        ];
        assert!(matches!(
            merge_continuous(&parts, 0, false),
            Err(PathError::Discontinuous { part_index: 1, .. })
        ));
    }

    #[test]
    fn empty_segment_is_rejected() {
        assert!(matches!(
            merge_continuous(&[], 2, false),
            Err(PathError::EmptySegment(2))
        ));
    }

    #[test]
    fn pedestrian_segments_share_endpoints() {
        // Second segment's first edge is stored backwards relative to travel.
        let mut segments = vec![
            segment(
                1,
                2,
                vec![
                    line(&[(0.0, 0.0), (1.0, 0.0)]),
                    line(&[(1.0, 0.0), (1.0, 1.0)]),
                ],
            ),
            segment(
                2,
                3,
                vec![
                    line(&[(2.0, 1.0), (1.0, 1.0)]),
                    line(&[(2.0, 1.0), (2.0, 2.0)]),
                ],
            ),
            segment(3, 4, vec![line(&[(2.0, 3.0), (2.0, 2.0)])]),
        ];

        stitch_segments(&mut segments, TravelMode::Pedestrian, Coord { x: 0.0, y: 0.0 }).unwrap();

        for pair in segments.windows(2) {
            assert_eq!(pair[0].last_coord(), pair[1].first_coord());
        }
        assert_eq!(
            xy(&segments[1].coords_flatten_path),
            vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0)]
        );
        assert_eq!(
            xy(&segments[2].coords_flatten_path),
            vec![(2.0, 2.0), (2.0, 3.0)]
        );
        // Ids follow the chain regardless of geometry reversal.
        let ids: Vec<(i64, i64)> = segments.iter().map(|s| (s.from_id, s.to_id)).collect();
        assert_eq!(ids, vec![(1, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn first_segment_is_oriented_from_origin() {
        // Both edges of the first leg are stored against travel.
        let mut segments = vec![
            segment(1, 2, vec![line(&[(1.0, 0.0), (0.0, 0.0)])]),
            segment(
                2,
                3,
                vec![
                    line(&[(1.0, 0.0), (2.0, 0.0)]),
                    line(&[(2.0, 0.0), (3.0, 0.0)]),
                ],
            ),
        ];

        stitch_segments(&mut segments, TravelMode::Pedestrian, Coord { x: 0.0, y: 0.0 })
            .unwrap();

        assert_eq!(
            xy(&segments[0].coords_flatten_path),
            vec![(0.0, 0.0), (1.0, 0.0)]
        );
        assert_eq!(
            xy(&segments[1].coords_flatten_path),
            vec![(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]
        );
        assert_eq!(segments[0].last_coord(), segments[1].first_coord());
    }

    #[test]
    fn vehicle_segments_are_merged_independently() {
        let mut segments = vec![
            segment(1, 2, vec![line(&[(0.0, 0.0), (1.0, 0.0)])]),
            segment(2, 3, vec![line(&[(2.0, 0.0), (1.0, 0.0)])]),
        ];

        stitch_segments(&mut segments, TravelMode::Vehicle, Coord { x: 0.0, y: 0.0 }).unwrap();

        // No cross-segment reversal in vehicle mode.
        assert_eq!(
            xy(&segments[1].coords_flatten_path),
            vec![(2.0, 0.0), (1.0, 0.0)]
        );
    }

    #[test]
    fn flatten_keeps_joints_once() {
        let parts = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(1.0, 0.0), (2.0, 0.0)]),
        ];
        assert_eq!(flatten(&parts).len(), 3);
    }
}

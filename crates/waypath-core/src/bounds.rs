//! Padded bounding area for the road graph fetch.

use crate::error::{PathError, Result};
use crate::models::BoundingBox;
use crate::spatial::{from_web_mercator, to_web_mercator};
use geo::Point;

/// Limits applied when deriving the graph fetch area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaLimits {
    /// Buffer around every waypoint, in Web Mercator meters.
    pub buffer_m: f64,
    /// Maximum diagonal of the buffered box, in Web Mercator meters.
    pub max_diagonal_m: f64,
}

impl Default for AreaLimits {
    fn default() -> Self {
        Self {
            buffer_m: 500.0,
            max_diagonal_m: 10_000.0,
        }
    }
}

/// Buffer every waypoint in Web Mercator, union the bounds and reject areas
/// whose diagonal exceeds the limit. Returns the buffered box in degrees.
pub fn prepare_bounds(points: &[Point<f64>], limits: &AreaLimits) -> Result<BoundingBox> {
    if points.is_empty() {
        return Err(PathError::EmptyWaypoints);
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for point in points {
        let projected = to_web_mercator(point.x(), point.y());
        min_x = min_x.min(projected.x - limits.buffer_m);
        min_y = min_y.min(projected.y - limits.buffer_m);
        max_x = max_x.max(projected.x + limits.buffer_m);
        max_y = max_y.max(projected.y + limits.buffer_m);
    }

    let diagonal_m = (max_x - min_x).hypot(max_y - min_y);
    if diagonal_m > limits.max_diagonal_m {
        return Err(PathError::AreaTooLarge {
            diagonal_m,
            limit_m: limits.max_diagonal_m,
        });
    }

    let lower = from_web_mercator(min_x, min_y);
    let upper = from_web_mercator(max_x, max_y);
    let bbox = BoundingBox {
        min_x: lower.x,
        min_y: lower.y,
        max_x: upper.x,
        max_y: upper.y,
    };
    tracing::debug!(
        "Prepared bounding box {:?} (diagonal {:.0} m)",
        bbox,
        diagonal_m
    );
    Ok(bbox)
}

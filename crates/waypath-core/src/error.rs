//! Error taxonomy for a path computation run.

use thiserror::Error;

/// Failures reported by an elevation provider or the batch client driving it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElevationError {
    /// The service answered with a non-success status. This is the only
    /// failure the batch client retries.
    #[error("elevation service returned HTTP {0}")]
    Status(u16),

    #[error("elevation request failed: {0}")]
    Transport(String),

    #[error("elevation response could not be decoded: {0}")]
    Decode(String),

    #[error("elevation service still failing after {attempts} attempts (last HTTP {last_status})")]
    RetriesExhausted { attempts: u32, last_status: u16 },
}

impl ElevationError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ElevationError::Status(_))
    }
}

/// Every way a run can fail. There is no partial-result mode: any error aborts the run.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("no waypoints were supplied")]
    EmptyWaypoints,

    #[error("waypoint feature {index} is invalid: {reason}")]
    InvalidWaypoint { index: usize, reason: String },

    #[error("waypoint position {0} appears more than once")]
    DuplicatePosition(u32),

    #[error("at least 2 waypoints are required, got {0}")]
    TooFewWaypoints(usize),

    #[error("invalid GeoJSON input: {0}")]
    InvalidGeoJson(String),

    #[error("area diagonal of {diagonal_m:.0} m exceeds the {limit_m:.0} m limit, reduce the path area")]
    AreaTooLarge { diagonal_m: f64, limit_m: f64 },

    #[error("road graph provider failed: {0}")]
    Graph(String),

    #[error("waypoint {waypoint_id} is not a vertex of the road graph")]
    VertexNotFound { waypoint_id: i64 },

    #[error("no path found between waypoints {from_id} and {to_id}")]
    NoPathFound { from_id: i64, to_id: i64 },

    #[error("edge {0} has no identifier in the road graph")]
    EdgeIdentifierMissing(usize),

    #[error("edge identifier {0} has no geometry in the road graph")]
    EdgeGeometryMissing(String),

    #[error("segment {segment_index}: part {part_index} does not connect to the preceding parts")]
    Discontinuous {
        segment_index: usize,
        part_index: usize,
    },

    #[error("segment {0} has no geometry to flatten")]
    EmptySegment(usize),

    #[error("coordinate ({x}, {y}) is missing from the elevation index")]
    ElevationLookup { x: f64, y: f64 },

    #[error(transparent)]
    Elevation(#[from] ElevationError),

    #[error("elevation is enabled but no elevation provider was configured")]
    ElevationProviderMissing,
}

pub type Result<T, E = PathError> = std::result::Result<T, E>;

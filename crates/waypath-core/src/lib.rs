//! Waypath core: stitches an ordered waypoint chain into one continuous road
//! path annotated with cumulative distance and optional elevation.
//!
//! The road graph and the elevation service are collaborators behind the
//! [`RoadGraphProvider`] / [`RoadGraph`] and [`ElevationProvider`] traits.

pub mod bounds;
pub mod elevation;
pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod router;
pub mod spatial;
pub mod stitch;

pub use bounds::{prepare_bounds, AreaLimits};
pub use elevation::{
    fetch_elevation_index, ElevationIndex, ElevationProvider, ElevationSample, RetryPolicy,
    MAX_LOCATIONS_PER_REQUEST,
};
pub use error::{ElevationError, PathError, Result};
pub use models::{
    BoundingBox, CoordKey, EdgeIdentifier, ElevationMode, PathCoord, PathSegment, TravelMode,
    Waypoint, WaypointChain,
};
pub use output::{apply_elevation, assemble, PathOutput, ELEVATION_SENTINEL};
pub use pipeline::ComputePath;
pub use router::{route_segments, EdgeId, RoadGraph, RoadGraphProvider, VertexId};
pub use stitch::{flatten, merge_continuous, stitch_segments};

//! Road network loading and graph build errors.

use thiserror::Error;
use waypath_core::TravelMode;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("failed to read road network: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid road network GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("road network must be a FeatureCollection")]
    NotACollection,

    #[error("road feature {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },

    #[error("no {mode} roads intersect the requested area")]
    EmptyNetwork { mode: TravelMode },

    #[error("point ({x}, {y}) could not be attached to the road network")]
    Unattached { x: f64, y: f64 },
}

//! Run driver: bounding area, graph fetch, routing, stitching, elevation, output.

use crate::bounds::{prepare_bounds, AreaLimits};
use crate::elevation::{fetch_elevation_index, ElevationProvider, RetryPolicy};
use crate::error::{PathError, Result};
use crate::models::{ElevationMode, TravelMode, WaypointChain};
use crate::output::{apply_elevation, assemble, PathOutput};
use crate::router::{route_segments, RoadGraphProvider};
use crate::stitch::stitch_segments;

/// One path computation over a waypoint chain.
#[derive(Debug, Clone)]
pub struct ComputePath {
    chain: WaypointChain,
    mode: TravelMode,
    elevation_mode: ElevationMode,
    area_limits: AreaLimits,
    retry_policy: RetryPolicy,
}

impl ComputePath {
    pub fn new(chain: WaypointChain, mode: TravelMode, elevation_mode: ElevationMode) -> Self {
        Self {
            chain,
            mode,
            elevation_mode,
            area_limits: AreaLimits::default(),
            retry_policy: RetryPolicy::unbounded(),
        }
    }

    pub fn area_limits(mut self, limits: AreaLimits) -> Self {
        self.area_limits = limits;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn chain(&self) -> &WaypointChain {
        &self.chain
    }

    /// Compute the path. `elevation` is only consulted when elevation is enabled.
    pub fn run<P>(
        &self,
        graph_provider: &P,
        elevation: Option<&dyn ElevationProvider>,
    ) -> Result<PathOutput>
    where
        P: RoadGraphProvider + ?Sized,
    {
        tracing::info!(
            "Computing {} path over {} waypoints (elevation {})",
            self.mode,
            self.chain.len(),
            self.elevation_mode
        );

        let elevation = match (self.elevation_mode, elevation) {
            (ElevationMode::Enabled, None) => return Err(PathError::ElevationProviderMissing),
            (ElevationMode::Enabled, Some(provider)) => Some(provider),
            (ElevationMode::Disabled, _) => None,
        };

        let points = self.chain.points();
        let bbox = prepare_bounds(&points, &self.area_limits)?;

        let graph = graph_provider
            .roads_from_bbox(&bbox, &points, self.mode)
            .map_err(|err| PathError::Graph(err.to_string()))?;

        let origin = self
            .chain
            .waypoints()
            .first()
            .map(|waypoint| waypoint.point.0)
            .ok_or(PathError::EmptyWaypoints)?;
        let mut segments = route_segments(&graph, &self.chain)?;
        stitch_segments(&mut segments, self.mode, origin)?;

        if let Some(provider) = elevation {
            let coords = segments
                .iter()
                .flat_map(|segment| segment.coords_flatten_path.iter());
            let index = fetch_elevation_index(provider, coords, &self.retry_policy)?;
            apply_elevation(&mut segments, &index)?;
        }

        let output = assemble(&segments, elevation.is_some());
        tracing::info!(
            "Computed {} segments, {} points, {:.1} m",
            output.lines.features.len(),
            output.points.features.len(),
            output.total_length_m
        );
        Ok(output)
    }
}

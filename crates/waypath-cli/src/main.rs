//! waypath - compute a continuous road path through ordered waypoints

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waypath_core::{
    AreaLimits, ComputePath, ElevationMode, ElevationProvider, RetryPolicy, TravelMode,
    WaypointChain,
};
use waypath_elevation::OpenTopoClient;
use waypath_graph::GeoJsonRoadProvider;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Waypoints GeoJSON (points with `position` and `id` properties)
    #[arg(long)]
    input: PathBuf,

    /// Road network GeoJSON (lines with `topo_uuid` properties)
    #[arg(long)]
    roads: PathBuf,

    /// Travel mode: pedestrian or vehicle
    #[arg(long, default_value = "pedestrian")]
    mode: TravelMode,

    /// Elevation enrichment: enabled or disabled
    #[arg(long, default_value = "disabled")]
    elevation: ElevationMode,

    /// Write the point collection here instead of stdout
    #[arg(long, requires = "lines_out")]
    points_out: Option<PathBuf>,

    /// Write the line collection here instead of stdout
    #[arg(long, requires = "points_out")]
    lines_out: Option<PathBuf>,

    /// Elevation API base URL (overrides WAYPATH_ELEVATION_URL)
    #[arg(long)]
    elevation_url: Option<String>,

    /// Give up on an elevation chunk after this many attempts
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Pause between elevation retries, in milliseconds
    #[arg(long, default_value_t = 0)]
    retry_delay_ms: u64,

    /// Maximum bounding box diagonal in meters
    #[arg(long, default_value_t = 10_000.0)]
    max_area_m: f64,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid GeoJSON.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("waypath=info".parse()?)
                .add_directive("waypath_core=info".parse()?)
                .add_directive("waypath_graph=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(url) = args.elevation_url.clone() {
        config.elevation_url = url;
    }
    if args.max_attempts.is_some() {
        config.elevation_max_attempts = args.max_attempts;
    }

    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("reading waypoints from {}", args.input.display()))?;
    let chain = WaypointChain::from_geojson_str(&raw).context("parsing waypoints")?;

    let provider = GeoJsonRoadProvider::from_path(&args.roads)
        .with_context(|| format!("loading road network from {}", args.roads.display()))?;

    let elevation_client = match args.elevation {
        ElevationMode::Enabled => Some(
            OpenTopoClient::new(config.elevation_client_config())
                .context("building elevation client")?,
        ),
        ElevationMode::Disabled => None,
    };

    let policy = retry_policy(config.elevation_max_attempts, args.retry_delay_ms);

    let run = ComputePath::new(chain, args.mode, args.elevation)
        .area_limits(AreaLimits {
            max_diagonal_m: args.max_area_m,
            ..AreaLimits::default()
        })
        .retry_policy(policy);

    let output = run
        .run(
            &provider,
            elevation_client
                .as_ref()
                .map(|client| client as &dyn ElevationProvider),
        )
        .context("computing path")?;

    match (&args.points_out, &args.lines_out) {
        (Some(points_path), Some(lines_path)) => {
            write_json(points_path, &output.points)?;
            write_json(lines_path, &output.lines)?;
            tracing::info!(
                "Wrote {} and {}",
                points_path.display(),
                lines_path.display()
            );
        }
        _ => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, &output)?;
            writeln!(handle)?;
        }
    }

    Ok(())
}

fn retry_policy(max_attempts: Option<u32>, delay_ms: u64) -> RetryPolicy {
    match max_attempts {
        Some(attempts) => RetryPolicy::limited(attempts),
        None => RetryPolicy::unbounded(),
    }
    .with_delay(Duration::from_millis(delay_ms))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn output_files_go_together() {
        let result = Args::try_parse_from([
            "waypath",
            "--input",
            "w.geojson",
            "--roads",
            "r.geojson",
            "--points-out",
            "p.geojson",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn modes_parse_from_flags() {
        let args = Args::try_parse_from([
            "waypath",
            "--input",
            "w.geojson",
            "--roads",
            "r.geojson",
            "--mode",
            "vehicle",
            "--elevation",
            "enabled",
        ])
        .unwrap();
        assert_eq!(args.mode, TravelMode::Vehicle);
        assert_eq!(args.elevation, ElevationMode::Enabled);
        assert_eq!(args.max_attempts, None);
        assert_eq!(args.retry_delay_ms, 0);
    }

    #[test]
    fn retries_do_not_pause_unless_asked() {
        let args = Args::try_parse_from([
            "waypath",
            "--input",
            "w.geojson",
            "--roads",
            "r.geojson",
        ])
        .unwrap();
        assert_eq!(
            retry_policy(args.max_attempts, args.retry_delay_ms),
            RetryPolicy::unbounded()
        );

        let policy = retry_policy(Some(3), 250);
        assert_eq!(policy.max_attempts, Some(3));
        assert_eq!(policy.delay, Duration::from_millis(250));
    }
}

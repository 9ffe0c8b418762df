//! Elevation batch client.
//!
//! Deduplicates coordinates, looks them up in chunks against an
//! [`ElevationProvider`] and merges the answers into an [`ElevationIndex`].
//! Non-success statuses are retried per [`RetryPolicy`]; by default the
//! client blocks until the provider answers.

use crate::error::{ElevationError, Result};
use crate::models::{CoordKey, PathCoord};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Maximum number of locations per provider call.
pub const MAX_LOCATIONS_PER_REQUEST: usize = 99;

/// One answered location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationSample {
    pub lng: f64,
    pub lat: f64,
    pub elevation: f64,
}

/// A service able to answer elevation lookups for a batch of `(x, y)` coordinates.
pub trait ElevationProvider {
    /// Look up one chunk. Coordinates are `(lng, lat)` in degrees.
    fn lookup(&self, locations: &[(f64, f64)]) -> Result<Vec<ElevationSample>, ElevationError>;
}

impl<P: ElevationProvider + ?Sized> ElevationProvider for &P {
    fn lookup(&self, locations: &[(f64, f64)]) -> Result<Vec<ElevationSample>, ElevationError> {
        (**self).lookup(locations)
    }
}

/// How often a chunk is retried after a non-success status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    /// Total attempts per chunk; `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Pause between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Retry forever with no pause.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Give up after `max_attempts` attempts (at least one is always made).
    pub fn limited(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn allows(&self, attempts_made: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts_made < max)
    }
}

/// Mapping from an exact `(x, y)` coordinate to its elevation-enriched form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElevationIndex {
    entries: HashMap<CoordKey, PathCoord>,
}

impl ElevationIndex {
    pub fn get(&self, x: f64, y: f64) -> Option<&PathCoord> {
        self.entries.get(&CoordKey::new(x, y))
    }

    pub fn insert(&mut self, sample: ElevationSample) {
        self.entries.insert(
            CoordKey::new(sample.lng, sample.lat),
            PathCoord::with_elevation(sample.lng, sample.lat, sample.elevation),
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Unique `(x, y)` pairs in first-seen order.
pub fn unique_locations<'a>(coords: impl IntoIterator<Item = &'a PathCoord>) -> Vec<(f64, f64)> {
    let mut seen = HashSet::new();
    coords
        .into_iter()
        .filter(|coord| seen.insert(coord.key()))
        .map(|coord| (coord.x, coord.y))
        .collect()
}

/// Look up elevation for every unique coordinate and return the merged index.
/// An empty input makes no provider call.
pub fn fetch_elevation_index<'a, P>(
    provider: &P,
    coords: impl IntoIterator<Item = &'a PathCoord>,
    policy: &RetryPolicy,
) -> Result<ElevationIndex>
where
    P: ElevationProvider + ?Sized,
{
    let locations = unique_locations(coords);
    let mut index = ElevationIndex::default();
    if locations.is_empty() {
        return Ok(index);
    }

    let chunk_count = locations.len().div_ceil(MAX_LOCATIONS_PER_REQUEST);
    tracing::debug!(
        "Fetching elevation for {} unique coordinates in {} chunks",
        locations.len(),
        chunk_count
    );

    for (chunk_index, chunk) in locations.chunks(MAX_LOCATIONS_PER_REQUEST).enumerate() {
        let samples = lookup_with_retry(provider, chunk, policy)?;
        tracing::debug!(
            "Elevation chunk {}/{}: {} samples",
            chunk_index + 1,
            chunk_count,
            samples.len()
        );
        for sample in samples {
            index.insert(sample);
        }
    }

    Ok(index)
}

fn lookup_with_retry<P>(
    provider: &P,
    chunk: &[(f64, f64)],
    policy: &RetryPolicy,
) -> Result<Vec<ElevationSample>, ElevationError>
where
    P: ElevationProvider + ?Sized,
{
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        match provider.lookup(chunk) {
            Ok(samples) => return Ok(samples),
            Err(ElevationError::Status(status)) => {
                if !policy.allows(attempts) {
                    return Err(ElevationError::RetriesExhausted {
                        attempts,
                        last_status: status,
                    });
                }
                tracing::warn!(
                    "Elevation provider HTTP {} (attempt {}), retrying chunk of {}",
                    status,
                    attempts,
                    chunk.len()
                );
                if !policy.delay.is_zero() {
                    std::thread::sleep(policy.delay);
                }
            }
            Err(err) => return Err(err),
        }
    }
}

//! Waypath Elevation - OpenTopoData API client
//!
//! Implements [`waypath_core::ElevationProvider`] over blocking HTTP.

pub mod client;

pub use client::{OpenTopoClient, OpenTopoConfig, DEFAULT_BASE_URL};

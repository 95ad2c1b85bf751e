//! Celestrak catalog fetcher
//!
//! Retrieves raw TLE text for a catalog group from the Celestrak GP API.

mod client;

pub use client::{CatalogFetcher, CelestrakClient, validate_group};

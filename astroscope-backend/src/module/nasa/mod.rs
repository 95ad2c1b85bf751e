//! NASA open data clients
//!
//! Thin wrappers over api.nasa.gov: DONKI space weather events, NeoWs
//! near-Earth objects, EPIC Earth imagery, InSight Mars weather and APOD.

mod client;
mod types;

pub use client::{NasaClient, space_weather_window};
pub use types::{ApodData, DonkiEvent, EpicImage, EpicImageData, NeoDateRange, SpaceWeatherData};

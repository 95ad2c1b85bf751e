//! Dashboard request handling
//!
//! Composes the catalog fetcher, the TLE decoder, the NASA clients and the
//! summarizer, and dispatches summary requests by kind.
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::celestrak::CatalogFetcher;
use super::error::FetchError;
use super::nasa::{ApodData, EpicImageData, NasaClient, NeoDateRange, SpaceWeatherData};
use super::summary::{Summarizer, SummaryError, SummaryRequest, SummaryResponse, parse_response, template_for};
use super::tle::{DecodedCatalog, decode_catalog};

/// Longest DONKI window a caller may ask for
const MAX_SPACE_WEATHER_DAYS: u32 = 30;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no data available: {0}")]
    NoData(String),

    #[error("could not fetch data: {0}")]
    Upstream(#[source] FetchError),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error("failed to serialize prompt data: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<FetchError> for HandlerError {
    fn from(err: FetchError) -> Self {
        match err {
            e if e.is_invalid_request() => HandlerError::InvalidRequest(e.to_string()),
            FetchError::NoData { message, .. } => HandlerError::NoData(message),
            e => HandlerError::Upstream(e),
        }
    }
}

/// Decoded catalog of one Celestrak group
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogReport {
    pub group: String,
    pub fetched_at: DateTime<Utc>,
    /// "N of M records parsed"
    pub parsed: String,
    #[serde(flatten)]
    pub catalog: DecodedCatalog,
}

/// A summary with its id and generation time
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEnvelope {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub result: SummaryResponse,
}

pub struct DashboardHandler {
    catalog: Arc<dyn CatalogFetcher>,
    nasa: NasaClient,
    summarizer: Arc<dyn Summarizer>,
    default_group: String,
    space_weather_days: u32,
}

impl DashboardHandler {
    pub fn new(
        catalog: Arc<dyn CatalogFetcher>,
        nasa: NasaClient,
        summarizer: Arc<dyn Summarizer>,
        default_group: impl Into<String>,
        space_weather_days: u32,
    ) -> Self {
        Self {
            catalog,
            nasa,
            summarizer,
            default_group: default_group.into(),
            space_weather_days,
        }
    }

    pub fn default_group(&self) -> &str {
        &self.default_group
    }

    /// Fetch and decode a Celestrak group
    pub async fn catalog(&self, group: &str) -> Result<CatalogReport, HandlerError> {
        let raw = self.catalog.fetch_group(group).await?;
        let catalog = self.decode_text(&raw);

        tracing::info!("TLE group '{}': {}", group, catalog.summary_line());

        Ok(CatalogReport {
            group: group.to_string(),
            fetched_at: Utc::now(),
            parsed: catalog.summary_line(),
            catalog,
        })
    }

    /// Decode pasted TLE text
    pub fn decode_text(&self, raw: &str) -> DecodedCatalog {
        let catalog = decode_catalog(raw);

        for failure in &catalog.failures {
            tracing::debug!("Skipping TLE record: {}", failure);
        }
        if catalog.records.is_empty() && !catalog.failures.is_empty() {
            tracing::warn!(
                "No TLE record could be decoded ({} rejected)",
                catalog.failure_count()
            );
        }

        catalog
    }

    pub async fn space_weather(&self, days: Option<u32>) -> Result<SpaceWeatherData, HandlerError> {
        let days = self.space_weather_days(days)?;
        Ok(self.nasa.recent_space_weather(days).await)
    }

    pub async fn neo_feed(&self, start_date: &str, end_date: &str) -> Result<Value, HandlerError> {
        let range = NeoDateRange::parse(start_date, end_date).map_err(HandlerError::InvalidRequest)?;
        Ok(self.nasa.neo_feed(range).await?)
    }

    pub async fn epic_images(&self) -> Result<Vec<EpicImageData>, HandlerError> {
        Ok(self.nasa.latest_epic_images().await?)
    }

    pub async fn apod(&self) -> Result<ApodData, HandlerError> {
        Ok(self.nasa.apod().await?)
    }

    /// Gather the data for `request`, run it through the model and parse the result.
    pub async fn summarize(&self, request: SummaryRequest) -> Result<SummaryEnvelope, HandlerError> {
        let kind = request.kind();
        tracing::info!("Summary requested: {}", kind);

        let vars = match request {
            SummaryRequest::SpaceWeather { days } => self.space_weather_vars(days).await?,
            SummaryRequest::Tle { group, tle_data } => self.tle_vars(group, tle_data).await?,
            SummaryRequest::Neo { start_date, end_date } => self.neo_vars(&start_date, &end_date).await?,
            SummaryRequest::MarsWeather {} => self.mars_weather_vars().await?,
        };

        let borrowed: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let prompt = template_for(kind).render(&borrowed);

        let text = self.summarizer.complete(&prompt).await?;
        let result = parse_response(kind, &text)?;

        Ok(SummaryEnvelope {
            id: Uuid::now_v7(),
            generated_at: Utc::now(),
            result,
        })
    }

    fn space_weather_days(&self, days: Option<u32>) -> Result<u32, HandlerError> {
        let days = days.unwrap_or(self.space_weather_days);
        if (1..=MAX_SPACE_WEATHER_DAYS).contains(&days) {
            Ok(days)
        } else {
            Err(HandlerError::InvalidRequest(format!(
                "days must be between 1 and {}, got {}",
                MAX_SPACE_WEATHER_DAYS, days
            )))
        }
    }

    async fn space_weather_vars(&self, days: Option<u32>) -> Result<Vec<(&'static str, String)>, HandlerError> {
        let data = self.space_weather(days).await?;
        Ok(vec![
            ("startDate", data.start_date.to_string()),
            ("endDate", data.end_date.to_string()),
            ("solarFlareData", serde_json::to_string_pretty(&data.flr)?),
            ("cmeData", serde_json::to_string_pretty(&data.cme)?),
            ("geomagneticStormData", serde_json::to_string_pretty(&data.gst)?),
        ])
    }

    /// Pasted text wins over a group; with neither, the default group is fetched.
    async fn tle_vars(
        &self,
        group: Option<String>,
        tle_data: Option<String>,
    ) -> Result<Vec<(&'static str, String)>, HandlerError> {
        let raw = match tle_data.filter(|t| !t.trim().is_empty()) {
            Some(text) => text,
            None => {
                let group = group.unwrap_or_else(|| self.default_group.clone());
                self.catalog.fetch_group(&group).await?
            }
        };

        let catalog = self.decode_text(&raw);
        if catalog.records.is_empty() {
            // Nothing decoded; let the model see the raw text
            return Ok(vec![("dataLabel", "TLE data".to_string()), ("tleData", raw)]);
        }

        Ok(vec![
            (
                "dataLabel",
                format!("Decoded TLE records ({})", catalog.summary_line()),
            ),
            ("tleData", serde_json::to_string_pretty(&catalog.records)?),
        ])
    }

    async fn neo_vars(&self, start_date: &str, end_date: &str) -> Result<Vec<(&'static str, String)>, HandlerError> {
        let feed = self.neo_feed(start_date, end_date).await?;
        Ok(vec![
            ("startDate", start_date.trim().to_string()),
            ("endDate", end_date.trim().to_string()),
            ("neoData", serde_json::to_string_pretty(&feed)?),
        ])
    }

    async fn mars_weather_vars(&self) -> Result<Vec<(&'static str, String)>, HandlerError> {
        let weather = self.nasa.insight_weather().await?;

        let has_sols = weather
            .get("sol_keys")
            .and_then(Value::as_array)
            .is_some_and(|keys| !keys.is_empty());
        if !has_sols {
            return Err(HandlerError::NoData(
                "No Mars weather data could be retrieved.".to_string(),
            ));
        }

        Ok(vec![("marsWeatherData", serde_json::to_string_pretty(&weather)?)])
    }
}

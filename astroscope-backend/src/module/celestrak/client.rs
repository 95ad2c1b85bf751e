//! Celestrak GP catalog client for fetching TLE text by group
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::CelestrakConfig;
use crate::module::error::FetchError;

const SOURCE: &str = "Celestrak";

/// Plain-text notices Celestrak serves with HTTP 200 instead of catalog data
const NO_DATA_NOTICES: &[&str] = &["No GP data found", "Invalid query"];

/// Source of raw TLE catalog text
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    /// Fetch the raw TLE text of a catalog group, e.g. "stations" or "starlink"
    async fn fetch_group(&self, group: &str) -> Result<String, FetchError>;
}

pub struct CelestrakClient {
    client: Client,
    base_url: String,
}

impl CelestrakClient {
    pub fn new(config: &CelestrakConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("astroscope-backend/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::http(SOURCE))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl CatalogFetcher for CelestrakClient {
    async fn fetch_group(&self, group: &str) -> Result<String, FetchError> {
        validate_group(group)?;

        tracing::debug!("Fetching TLE group '{}' from {}", group, self.base_url);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("GROUP", group), ("FORMAT", "tle")])
            .send()
            .await
            .map_err(FetchError::http(SOURCE))?;

        let status = response.status();
        let body = response.text().await.map_err(FetchError::http(SOURCE))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                source_name: SOURCE,
                status: status.as_u16(),
                message: body.trim().chars().take(200).collect(),
            });
        }

        check_catalog_body(group, body)
    }
}

/// Group names go straight into the query string; keep them to a safe alphabet.
pub fn validate_group(group: &str) -> Result<(), FetchError> {
    let valid = !group.is_empty()
        && group.len() <= 64
        && group
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(FetchError::InvalidGroup(group.to_string()))
    }
}

fn check_catalog_body(group: &str, body: String) -> Result<String, FetchError> {
    let trimmed = body.trim();

    if trimmed.is_empty() {
        return Err(FetchError::NoData {
            source_name: SOURCE,
            message: format!("empty catalog for group '{}'", group),
        });
    }

    if let Some(notice) = NO_DATA_NOTICES.iter().find(|n| trimmed.starts_with(**n)) {
        return Err(FetchError::NoData {
            source_name: SOURCE,
            message: format!("{} (group '{}')", notice, group),
        });
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_group() {
        assert!(validate_group("stations").is_ok());
        assert!(validate_group("gps-ops").is_ok());
        assert!(validate_group("last_30_days").is_ok());

        assert!(matches!(validate_group(""), Err(FetchError::InvalidGroup(_))));
        assert!(validate_group("stations&FORMAT=json").is_err());
        assert!(validate_group("../etc").is_err());
    }

    #[test]
    fn test_check_catalog_body() {
        let ok = check_catalog_body("stations", "ISS (ZARYA)\n1 ...\n2 ...\n".to_string());
        assert!(ok.is_ok());

        let notice = check_catalog_body("nope", "No GP data found\n".to_string());
        assert!(matches!(notice, Err(FetchError::NoData { .. })));

        let empty = check_catalog_body("stations", "  \n".to_string());
        assert!(matches!(empty, Err(FetchError::NoData { .. })));
    }

    #[tokio::test]
    #[ignore] // Requires network connection
    async fn test_fetch_stations() {
        let client = CelestrakClient::new(&CelestrakConfig::default()).unwrap();
        let text = client.fetch_group("stations").await.unwrap();
        assert!(text.contains("ISS"));
    }
}

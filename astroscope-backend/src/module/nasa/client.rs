//! NASA open API client (DONKI, NeoWs, EPIC, InSight, APOD)
use chrono::{Days, NaiveDate, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::types::{
    ApodData, DonkiEvent, EpicImage, EpicImageData, NeoDateRange, SpaceWeatherData,
};
use crate::config::NasaConfig;
use crate::module::error::FetchError;

const DONKI: &str = "NASA DONKI";
const NEOWS: &str = "NASA NeoWs";
const EPIC: &str = "NASA EPIC";
const INSIGHT: &str = "NASA InSight";
const PLANETARY: &str = "NASA Planetary";

/// Body keys the NASA APIs use for error text, in lookup order
const ERROR_MESSAGE_KEYS: &[&str] = &["error_message", "msg"];

/// Shared client for the api.nasa.gov family of endpoints
#[derive(Clone)]
pub struct NasaClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl NasaClient {
    pub fn new(config: &NasaConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::http("NASA"))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a JSON document, attaching the API key and query parameters.
    async fn get_json<T: DeserializeOwned>(
        &self,
        source_name: &'static str,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = self.url(path);
        tracing::debug!("GET {} ({})", url, source_name);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(FetchError::http(source_name))?;

        let status = response.status();
        let body = response.text().await.map_err(FetchError::http(source_name))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                source_name,
                status: status.as_u16(),
                message: extract_error_message(&body)
                    .unwrap_or_else(|| format!("request failed with status {}", status.as_u16())),
            });
        }

        serde_json::from_str(&body).map_err(FetchError::parse(source_name))
    }

    // ============ DONKI ============

    pub async fn donki_events(
        &self,
        event: DonkiEvent,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Value, FetchError> {
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        self.get_json(
            DONKI,
            &format!("DONKI/{}", event.endpoint()),
            &[("startDate", start.as_str()), ("endDate", end.as_str())],
        )
        .await
    }

    /// Fetch CME, GST and FLR events for the last `days` days concurrently.
    ///
    /// A failing feed is logged and reported as an empty list so the other two still
    /// reach the summary.
    pub async fn recent_space_weather(&self, days: u32) -> SpaceWeatherData {
        let (start, end) = space_weather_window(Utc::now().date_naive(), days);

        let (cme, gst, flr) = tokio::join!(
            self.donki_or_empty(DonkiEvent::Cme, start, end),
            self.donki_or_empty(DonkiEvent::Gst, start, end),
            self.donki_or_empty(DonkiEvent::Flr, start, end),
        );

        SpaceWeatherData {
            start_date: start,
            end_date: end,
            cme,
            gst,
            flr,
        }
    }

    async fn donki_or_empty(&self, event: DonkiEvent, start: NaiveDate, end: NaiveDate) -> Value {
        match self.donki_events(event, start, end).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to fetch DONKI {} data: {}", event.endpoint(), e);
                Value::Array(Vec::new())
            }
        }
    }

    // ============ NeoWs ============

    pub async fn neo_feed(&self, range: NeoDateRange) -> Result<Value, FetchError> {
        let start = range.start.format("%Y-%m-%d").to_string();
        let end = range.end.format("%Y-%m-%d").to_string();
        self.get_json(
            NEOWS,
            "neo/rest/v1/feed",
            &[("start_date", start.as_str()), ("end_date", end.as_str())],
        )
        .await
    }

    pub async fn neo_lookup(&self, asteroid_id: &str) -> Result<Value, FetchError> {
        if asteroid_id.is_empty() || !asteroid_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(FetchError::InvalidRequest(format!(
                "asteroid id must be numeric, got '{}'",
                asteroid_id
            )));
        }
        self.get_json(NEOWS, &format!("neo/rest/v1/neo/{}", asteroid_id), &[])
            .await
    }

    pub async fn neo_browse(&self) -> Result<Value, FetchError> {
        self.get_json(NEOWS, "neo/rest/v1/neo/browse", &[]).await
    }

    // ============ EPIC ============

    pub async fn recent_epic_images(&self) -> Result<Vec<EpicImage>, FetchError> {
        self.get_json(EPIC, "EPIC/api/natural/images", &[]).await
    }

    /// Archive URL of the PNG rendition of an EPIC image
    pub fn epic_image_url(&self, image: &EpicImage) -> Option<String> {
        let acquired = image.acquired_at()?;
        Some(format!(
            "{}?api_key={}",
            self.url(&format!(
                "EPIC/archive/natural/{}/png/{}.png",
                acquired.format("%Y/%m/%d"),
                image.image
            )),
            self.api_key
        ))
    }

    /// Latest EPIC images with display dates and archive URLs.
    ///
    /// Entries with an unreadable acquisition date are skipped.
    pub async fn latest_epic_images(&self) -> Result<Vec<EpicImageData>, FetchError> {
        let images = self.recent_epic_images().await?;

        Ok(images
            .iter()
            .filter_map(|img| {
                let acquired = img.acquired_at();
                let image_url = self.epic_image_url(img);
                match (acquired, image_url) {
                    (Some(acquired), Some(image_url)) => Some(EpicImageData {
                        caption: img.caption.clone(),
                        date: acquired.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
                        image_url,
                    }),
                    _ => {
                        tracing::warn!("Skipping EPIC image with bad date: {:?}", img.date);
                        None
                    }
                }
            })
            .collect())
    }

    // ============ InSight / APOD ============

    pub async fn insight_weather(&self) -> Result<Value, FetchError> {
        self.get_json(
            INSIGHT,
            "insight_weather/",
            &[("feedtype", "json"), ("ver", "1.0")],
        )
        .await
    }

    pub async fn apod(&self) -> Result<ApodData, FetchError> {
        self.get_json(PLANETARY, "planetary/apod", &[]).await
    }
}

/// `[today - days, today]`
pub fn space_weather_window(today: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    let start = today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(today);
    (start, today)
}

/// Pull a human-readable message out of a NASA error body.
///
/// api.nasa.gov gateway errors nest the text under `error.message`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    ERROR_MESSAGE_KEYS
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .or_else(|| value.pointer("/error/message").and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde_json::json;

    fn client_for(base_url: &str) -> NasaClient {
        NasaClient::new(&NasaConfig {
            api_key: "TEST_KEY".to_string(),
            base_url: base_url.to_string(),
            ..NasaConfig::default()
        })
        .unwrap()
    }

    /// Serve `app` on an ephemeral local port and return its base URL
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_space_weather_window() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let (start, end) = space_weather_window(today, 3);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
        assert_eq!(end, today);
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"error_message":"Date Format Exception"}"#).as_deref(),
            Some("Date Format Exception")
        );
        assert_eq!(
            extract_error_message(r#"{"msg":"No data for date"}"#).as_deref(),
            Some("No data for date")
        );
        assert_eq!(
            extract_error_message(r#"{"error":{"code":"OVER_RATE_LIMIT","message":"slow down"}}"#)
                .as_deref(),
            Some("slow down")
        );
        assert_eq!(extract_error_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_epic_image_url() {
        let client = client_for("https://api.nasa.gov/");
        let image = EpicImage {
            image: "epic_1b_20240516001751".to_string(),
            caption: "This image was taken by NASA's EPIC camera".to_string(),
            date: "2024-05-16 00:13:03".to_string(),
        };
        assert_eq!(
            client.epic_image_url(&image).unwrap(),
            "https://api.nasa.gov/EPIC/archive/natural/2024/05/16/png/epic_1b_20240516001751.png?api_key=TEST_KEY"
        );
    }

    #[tokio::test]
    async fn test_latest_epic_images() {
        let app = Router::new().route(
            "/EPIC/api/natural/images",
            get(|| async {
                Json(json!([
                    {"image": "epic_1b_20240516001751", "caption": "Earth", "date": "2024-05-16 00:13:03", "version": "03"},
                    {"image": "broken", "caption": "Bad", "date": "yesterday"}
                ]))
            }),
        );
        let client = client_for(&serve(app).await);

        let images = client.latest_epic_images().await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].caption, "Earth");
        assert_eq!(images[0].date, "Thu, 16 May 2024 00:13:03 GMT");
        assert!(images[0].image_url.ends_with("/png/epic_1b_20240516001751.png?api_key=TEST_KEY"));
    }

    #[tokio::test]
    async fn test_neo_feed_error_message() {
        let app = Router::new().route(
            "/neo/rest/v1/feed",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"code": 400, "error_message": "Date Format Exception"})),
                )
            }),
        );
        let client = client_for(&serve(app).await);
        let range = NeoDateRange::parse("2024-05-10", "2024-05-12").unwrap();

        match client.neo_feed(range).await {
            Err(FetchError::Status { status, message, .. }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Date Format Exception");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_space_weather_tolerates_failing_feed() {
        let app = Router::new()
            .route("/DONKI/CME", get(|| async { Json(json!([{"activityID": "cme-1"}])) }))
            .route("/DONKI/GST", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/DONKI/FLR", get(|| async { Json(json!([])) }));
        let client = client_for(&serve(app).await);

        let data = client.recent_space_weather(3).await;
        assert_eq!(data.cme[0]["activityID"], "cme-1");
        assert_eq!(data.gst, json!([]));
        assert_eq!(data.flr, json!([]));
    }

    #[tokio::test]
    async fn test_neo_lookup_rejects_non_numeric_id() {
        let client = client_for("http://127.0.0.1:9");
        let result = client.neo_lookup("../browse").await;
        assert!(matches!(result, Err(FetchError::InvalidRequest(_))));
    }
}

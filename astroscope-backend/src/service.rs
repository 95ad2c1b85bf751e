use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::module::handler::{DashboardHandler, HandlerError};
use crate::module::summary::SummaryRequest;

/// Shared state for all routes
pub type AppState = Arc<DashboardHandler>;

/// Build the HTTP API router
pub fn router(handler: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/tle", get(default_catalog))
        .route("/api/tle/decode", post(decode_tle))
        .route("/api/tle/{group}", get(catalog))
        .route("/api/space-weather", get(space_weather))
        .route("/api/neo", get(neo_feed))
        .route("/api/epic", get(epic_images))
        .route("/api/apod", get(apod))
        .route("/api/summarize", post(summarize))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

/// JSON error body with a status derived from the handler error
pub struct ApiError(HandlerError);

impl From<HandlerError> for ApiError {
    fn from(err: HandlerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            HandlerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            HandlerError::NoData(_) => StatusCode::NOT_FOUND,
            HandlerError::Upstream(_) | HandlerError::Summary(_) => StatusCode::BAD_GATEWAY,
            HandlerError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::warn!("Request rejected: {}", self.0);
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn default_catalog(State(handler): State<AppState>) -> ApiResult<impl serde::Serialize> {
    let group = handler.default_group().to_string();
    Ok(Json(handler.catalog(&group).await?))
}

async fn catalog(
    State(handler): State<AppState>,
    Path(group): Path<String>,
) -> ApiResult<impl serde::Serialize> {
    Ok(Json(handler.catalog(&group).await?))
}

/// Body is the raw catalog text
async fn decode_tle(State(handler): State<AppState>, body: String) -> impl IntoResponse {
    Json(handler.decode_text(&body))
}

#[derive(Debug, Deserialize)]
struct SpaceWeatherQuery {
    days: Option<u32>,
}

async fn space_weather(
    State(handler): State<AppState>,
    Query(query): Query<SpaceWeatherQuery>,
) -> ApiResult<impl serde::Serialize> {
    Ok(Json(handler.space_weather(query.days).await?))
}

#[derive(Debug, Deserialize)]
struct NeoQuery {
    start_date: String,
    end_date: String,
}

async fn neo_feed(
    State(handler): State<AppState>,
    Query(query): Query<NeoQuery>,
) -> ApiResult<impl serde::Serialize> {
    Ok(Json(handler.neo_feed(&query.start_date, &query.end_date).await?))
}

async fn epic_images(State(handler): State<AppState>) -> ApiResult<impl serde::Serialize> {
    Ok(Json(handler.epic_images().await?))
}

async fn apod(State(handler): State<AppState>) -> ApiResult<impl serde::Serialize> {
    Ok(Json(handler.apod().await?))
}

async fn summarize(
    State(handler): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> ApiResult<impl serde::Serialize> {
    Ok(Json(handler.summarize(request).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::handler::test_support::{FakeSummarizer, ISS_TLE, handler_with};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    const TLE_REPLY: &str = r#"{"orbitalPositions": "Low Earth orbit"}"#;

    fn app() -> Router {
        router(Arc::new(handler_with(Arc::new(FakeSummarizer::new(TLE_REPLY)))))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_catalog_route() {
        let (status, body) = send(app(), get("/api/tle/stations")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"][0]["name"], "ISS (ZARYA)");
        assert_eq!(body["records"][0]["epoch"], "2024-05-16 22:00:21 UTC");
        assert_eq!(body["parsed"], "1 of 1 records parsed");
    }

    #[tokio::test]
    async fn test_default_catalog_route() {
        let (status, body) = send(app(), get("/api/tle")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["group"], "stations");
    }

    #[tokio::test]
    async fn test_catalog_route_errors() {
        let (status, body) = send(app(), get("/api/tle/starlink")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("starlink"));

        let (status, _) = send(app(), get("/api/tle/bad%20group")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_decode_route_partial_batch() {
        let text = format!("{}\nJUNK\nline one\nline two\n", ISS_TLE);
        let request = Request::builder()
            .method("POST")
            .uri("/api/tle/decode")
            .header("content-type", "text/plain")
            .body(Body::from(text))
            .unwrap();

        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"].as_array().unwrap().len(), 1);
        assert_eq!(body["failures"][0]["name"], "JUNK");
        assert_eq!(body["failures"][0]["class"], "structural");
    }

    #[tokio::test]
    async fn test_summarize_route() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/summarize")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"kind": "tle", "group": "stations"}"#))
            .unwrap();

        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["kind"], "tle");
        assert_eq!(body["result"]["orbitalPositions"], "Low Earth orbit");
        assert!(body["id"].is_string());
    }

    #[tokio::test]
    async fn test_neo_route_rejects_bad_range() {
        let (status, body) = send(app(), get("/api/neo?start_date=2024-05-10&end_date=2024-04-01")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("before start date"));
    }
}

use astroscope_backend::config::AppConfig;
use astroscope_backend::module::celestrak::CelestrakClient;
use astroscope_backend::module::handler::DashboardHandler;
use astroscope_backend::module::nasa::NasaClient;
use astroscope_backend::module::summary::LlmSummarizer;
use astroscope_backend::service;

use anyhow::{Context, Result};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config_path = AppConfig::default_path();
    let config = AppConfig::load_or_default(&config_path)?;

    // Initialize logging
    let _logging_guard = astroscope_backend::logging::init_logging(
        &config.log_dir,
        "astroscope-backend",
        &config.log_level,
    )?;

    tracing::info!("AstroScope backend starting...");
    tracing::info!("Configuration: {}", config_path);

    let catalog = CelestrakClient::new(&config.celestrak).context("Failed to build Celestrak client")?;
    let nasa = NasaClient::new(&config.nasa).context("Failed to build NASA client")?;
    let summarizer =
        LlmSummarizer::new(config.summarizer.clone()).context("Failed to build summarizer client")?;
    tracing::info!(
        "Summarizer: model '{}' at {}",
        config.summarizer.model,
        config.summarizer.base_url
    );

    let handler = DashboardHandler::new(
        Arc::new(catalog),
        nasa,
        Arc::new(summarizer),
        config.celestrak.default_group.clone(),
        config.nasa.space_weather_days,
    );
    let app = service::router(Arc::new(handler));

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

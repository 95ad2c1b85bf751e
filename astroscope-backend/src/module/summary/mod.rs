//! Summarization service
//!
//! A registry of summary kinds (space weather, TLE, NEO, Mars weather), each with
//! its own input shape, prompt template and output shape, plus the [`Summarizer`]
//! seam to the external language model.

mod client;
mod prompt;
mod types;

pub use client::{LlmSummarizer, Summarizer, SummaryError};
pub use prompt::{
    MARS_WEATHER_TEMPLATE, NEO_TEMPLATE, Prompt, PromptTemplate, SPACE_WEATHER_TEMPLATE,
    TLE_TEMPLATE, parse_output, parse_response, render, template_for,
};
pub use types::{
    CloseApproach, LargestObject, MarsWeatherSummary, NeoSummary, RiskLevel, SolWeather,
    SpaceWeatherSummary, SummaryKind, SummaryRequest, SummaryResponse, TleSummary,
};

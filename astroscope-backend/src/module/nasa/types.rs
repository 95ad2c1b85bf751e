//! NASA open API data types

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// DONKI event feeds used for the space weather summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DonkiEvent {
    /// Coronal mass ejections
    Cme,
    /// Geomagnetic storms
    Gst,
    /// Solar flares
    Flr,
}

impl DonkiEvent {
    pub fn endpoint(&self) -> &'static str {
        match self {
            DonkiEvent::Cme => "CME",
            DonkiEvent::Gst => "GST",
            DonkiEvent::Flr => "FLR",
        }
    }
}

/// Raw DONKI events for a date window, one JSON array per feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceWeatherData {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cme: serde_json::Value,
    pub gst: serde_json::Value,
    pub flr: serde_json::Value,
}

/// Inclusive date window for a NeoWs feed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeoDateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl NeoDateRange {
    /// NeoWs rejects feed windows longer than seven days
    pub const MAX_SPAN_DAYS: i64 = 7;

    /// Parse and validate a `YYYY-MM-DD` pair.
    pub fn parse(start: &str, end: &str) -> Result<Self, String> {
        let start = parse_date("start date", start)?;
        let end = parse_date("end date", end)?;

        if end < start {
            return Err(format!("end date {} is before start date {}", end, start));
        }
        let span = (end - start).num_days();
        if span > Self::MAX_SPAN_DAYS {
            return Err(format!(
                "date range spans {} days, at most {} allowed",
                span,
                Self::MAX_SPAN_DAYS
            ));
        }

        Ok(Self { start, end })
    }
}

fn parse_date(label: &str, value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("{} must be in YYYY-MM-DD format, got '{}'", label, value))
}

/// One entry of the EPIC `natural/images` listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpicImage {
    /// Image file stem, e.g. "epic_1b_20240516001751"
    pub image: String,
    pub caption: String,
    /// Acquisition time, e.g. "2024-05-16 00:13:03"
    pub date: String,
}

impl EpicImage {
    pub fn acquired_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, "%Y-%m-%d %H:%M:%S").ok()
    }
}

/// EPIC image prepared for display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicImageData {
    pub caption: String,
    /// UTC string, e.g. "Thu, 16 May 2024 00:13:03 GMT"
    pub date: String,
    pub image_url: String,
}

/// Astronomy Picture of the Day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApodData {
    pub title: String,
    pub explanation: String,
    pub url: String,
    #[serde(default)]
    pub hdurl: Option<String>,
    /// "image" or "video"
    pub media_type: String,
    pub date: String,
    #[serde(default)]
    pub copyright: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neo_date_range() {
        let range = NeoDateRange::parse("2024-05-10", "2024-05-17").unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());

        assert!(NeoDateRange::parse("2024-05-10", "2024-05-18").is_err());
        assert!(NeoDateRange::parse("2024-05-10", "2024-05-09").is_err());
        assert!(NeoDateRange::parse("10/05/2024", "2024-05-12").is_err());
    }

    #[test]
    fn test_epic_acquired_at() {
        let image = EpicImage {
            image: "epic_1b_20240516001751".to_string(),
            caption: "caption".to_string(),
            date: "2024-05-16 00:13:03".to_string(),
        };
        assert_eq!(
            image.acquired_at().unwrap().to_string(),
            "2024-05-16 00:13:03"
        );
    }
}

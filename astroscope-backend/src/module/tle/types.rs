//! TLE catalog data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One undecoded record: the name line and the two element lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub name: &'a str,
    pub line1: &'a str,
    pub line2: &'a str,
}

impl RawRecord<'_> {
    pub fn to_owned_record(&self) -> OwnedRawRecord {
        OwnedRawRecord {
            name: self.name.to_string(),
            line1: self.line1.to_string(),
            line2: self.line2.to_string(),
        }
    }
}

/// Owned copy of a [`RawRecord`], kept on failures so callers can show what was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedRawRecord {
    pub name: String,
    pub line1: String,
    pub line2: String,
}

/// A decoded satellite record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteRecord {
    /// Trimmed name line, e.g. "ISS (ZARYA)"
    pub name: String,
    /// NORAD catalog number
    pub norad_id: u32,
    /// Inclination in degrees, [0, 180]
    pub inclination: f64,
    /// Eccentricity, [0, 1)
    pub eccentricity: f64,
    /// Revolutions per day
    pub mean_motion: f64,
    /// Element set epoch, rendered as "2024-05-16 22:00:21 UTC"
    #[serde(with = "epoch_format")]
    pub epoch: DateTime<Utc>,
}

/// Broad class of a decode failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Line layout is wrong (prefix, length, encoding)
    Structural,
    /// A field did not parse, is out of range, or the ids disagree
    Field,
}

/// Why a record was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeReason {
    #[error("line {line} does not start with \"{line} \"")]
    BadLinePrefix { line: u8 },

    #[error("line {line} is {len} characters long, expected at least {min}")]
    LineTooShort { line: u8, len: usize, min: usize },

    #[error("line {line} contains non-ASCII characters")]
    NonAscii { line: u8 },

    #[error("field '{field}' has invalid value '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("field '{field}' value {value} is out of range")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("NORAD id mismatch: line 1 has {line1}, line 2 has {line2}")]
    NoradIdMismatch { line1: u32, line2: u32 },
}

impl DecodeReason {
    pub fn class(&self) -> FailureClass {
        match self {
            DecodeReason::BadLinePrefix { .. }
            | DecodeReason::LineTooShort { .. }
            | DecodeReason::NonAscii { .. } => FailureClass::Structural,
            DecodeReason::InvalidField { .. }
            | DecodeReason::OutOfRange { .. }
            | DecodeReason::NoradIdMismatch { .. } => FailureClass::Field,
        }
    }
}

/// A rejected record together with its reason
#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to decode '{}': {reason}", .record.name)]
pub struct DecodeFailure {
    pub record: OwnedRawRecord,
    pub reason: DecodeReason,
}

impl DecodeFailure {
    pub fn class(&self) -> FailureClass {
        self.reason.class()
    }
}

/// Serialized shape of a [`DecodeFailure`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureView<'a> {
    name: &'a str,
    class: FailureClass,
    reason: String,
}

impl Serialize for DecodeFailure {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FailureView {
            name: &self.record.name,
            class: self.class(),
            reason: self.reason.to_string(),
        }
        .serialize(serializer)
    }
}

/// Result of decoding a whole catalog
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedCatalog {
    /// Successfully decoded records in input order
    pub records: Vec<SatelliteRecord>,
    /// Rejected records in input order
    pub failures: Vec<DecodeFailure>,
}

impl DecodedCatalog {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Number of complete triples seen
    pub fn total(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// "N of M records parsed"
    pub fn summary_line(&self) -> String {
        format!("{} of {} records parsed", self.records.len(), self.total())
    }
}

/// Serde helpers for the "YYYY-MM-DD HH:MM:SS UTC" epoch format
pub mod epoch_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

    pub fn serialize<S: Serializer>(epoch: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&epoch.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

//! TLE catalog parser
//!
//! Splits raw catalog text (as served by Celestrak with `FORMAT=tle`) into
//! three-line records and decodes the fixed-width fields of each one.
//! Bad records are collected as [`DecodeFailure`]s and never abort the batch.

use std::iter::FusedIterator;
use std::str::{FromStr, Lines};

use super::epoch;
use super::types::{DecodeFailure, DecodeReason, DecodedCatalog, RawRecord, SatelliteRecord};

/// Minimum length of an element line
pub const MIN_LINE_LEN: usize = 69;

const ECCENTRICITY_DIGITS: usize = 7;

/// Lazy iterator over the three-line records of a catalog.
///
/// Blank lines are skipped. A trailing group of fewer than three lines is dropped.
#[derive(Debug, Clone)]
pub struct RecordSplitter<'a> {
    lines: Lines<'a>,
}

impl<'a> RecordSplitter<'a> {
    fn next_line(&mut self) -> Option<&'a str> {
        self.lines.by_ref().map(str::trim).find(|line| !line.is_empty())
    }
}

impl<'a> Iterator for RecordSplitter<'a> {
    type Item = RawRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.next_line()?;
        let line1 = self.next_line()?;
        let line2 = self.next_line()?;
        Some(RawRecord { name, line1, line2 })
    }
}

impl FusedIterator for RecordSplitter<'_> {}

/// Split raw catalog text into `(name, line1, line2)` triples in document order.
pub fn split_records(raw: &str) -> RecordSplitter<'_> {
    RecordSplitter { lines: raw.lines() }
}

/// Decode one three-line record.
pub fn decode_record(name: &str, line1: &str, line2: &str) -> Result<SatelliteRecord, DecodeFailure> {
    let raw = RawRecord { name, line1, line2 };
    decode_fields(&raw).map_err(|reason| DecodeFailure {
        record: raw.to_owned_record(),
        reason,
    })
}

/// Split and decode a whole catalog, keeping successes and failures in input order.
pub fn decode_catalog(raw: &str) -> DecodedCatalog {
    let mut catalog = DecodedCatalog::default();

    for record in split_records(raw) {
        match decode_record(record.name, record.line1, record.line2) {
            Ok(decoded) => catalog.records.push(decoded),
            Err(failure) => catalog.failures.push(failure),
        }
    }

    catalog
}

fn decode_fields(raw: &RawRecord<'_>) -> Result<SatelliteRecord, DecodeReason> {
    let line1 = check_line(raw.line1, 1)?;
    let line2 = check_line(raw.line2, 2)?;

    let id1: u32 = parse_integer("norad_id", columns(line1, 3, 7))?;
    let id2: u32 = parse_integer("norad_id", columns(line2, 3, 7))?;
    if id1 != id2 {
        return Err(DecodeReason::NoradIdMismatch { line1: id1, line2: id2 });
    }

    let inclination = parse_decimal("inclination", columns(line2, 9, 16))?;
    if !(0.0..=180.0).contains(&inclination) {
        return Err(DecodeReason::OutOfRange { field: "inclination", value: inclination });
    }

    let eccentricity = parse_eccentricity(columns(line2, 27, 33))?;

    let mean_motion = parse_decimal("mean_motion", columns(line2, 53, 63))?;
    if mean_motion <= 0.0 {
        return Err(DecodeReason::OutOfRange { field: "mean_motion", value: mean_motion });
    }

    let yy: u32 = parse_integer("epoch_year", columns(line1, 19, 20))?;
    let day_field = columns(line1, 21, 32);
    let day = parse_decimal("epoch_day", day_field)?;
    let epoch = epoch::from_day_of_year(epoch::full_year(yy), day).ok_or_else(|| {
        DecodeReason::InvalidField {
            field: "epoch_day",
            value: day_field.trim().to_string(),
        }
    })?;

    Ok(SatelliteRecord {
        name: clean_name(raw.name),
        norad_id: id1,
        inclination,
        eccentricity,
        mean_motion,
        epoch,
    })
}

/// Check the line-number marker, encoding and length of an element line.
fn check_line(line: &str, number: u8) -> Result<&str, DecodeReason> {
    let line = line.trim_end();
    let marker = [b'0' + number, b' '];

    if !line.as_bytes().starts_with(&marker) {
        return Err(DecodeReason::BadLinePrefix { line: number });
    }
    if !line.is_ascii() {
        return Err(DecodeReason::NonAscii { line: number });
    }
    if line.len() < MIN_LINE_LEN {
        return Err(DecodeReason::LineTooShort {
            line: number,
            len: line.len(),
            min: MIN_LINE_LEN,
        });
    }

    Ok(line)
}

/// 1-indexed, inclusive column range. Callers have checked the line via [`check_line`].
fn columns(line: &str, first: usize, last: usize) -> &str {
    &line[first - 1..last]
}

/// Name lines in 3LE catalogs carry a leading "0 " marker.
fn clean_name(name: &str) -> String {
    let name = name.trim();
    name.strip_prefix("0 ").unwrap_or(name).trim().to_string()
}

fn invalid(field: &'static str, raw: &str) -> DecodeReason {
    DecodeReason::InvalidField {
        field,
        value: raw.trim().to_string(),
    }
}

fn parse_integer<T: FromStr>(field: &'static str, raw: &str) -> Result<T, DecodeReason> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(field, raw));
    }
    digits.parse().map_err(|_| invalid(field, raw))
}

/// Plain fixed-point decimal such as "51.6416" or "15.49501224".
fn parse_decimal(field: &'static str, raw: &str) -> Result<f64, DecodeReason> {
    let text = raw.trim();
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);

    let well_formed = !unsigned.is_empty()
        && unsigned.bytes().any(|b| b.is_ascii_digit())
        && unsigned.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && unsigned.bytes().filter(|&b| b == b'.').count() <= 1;
    if !well_formed {
        return Err(invalid(field, raw));
    }

    text.parse::<f64>().map_err(|_| invalid(field, raw))
}

/// Seven digits with an implied leading "0.".
///
/// Short fields are left-padded with zeros and long ones truncated to seven digits.
fn parse_eccentricity(raw: &str) -> Result<f64, DecodeReason> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("eccentricity", raw));
    }

    let digits = &digits[..digits.len().min(ECCENTRICITY_DIGITS)];
    let normalized = format!("0.{:0>width$}", digits, width = ECCENTRICITY_DIGITS);
    normalized.parse().map_err(|_| invalid("eccentricity", raw))
}

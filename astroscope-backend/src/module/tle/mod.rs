//! Two-line element (TLE) catalog decoding
//!
//! Turns raw catalog text into [`SatelliteRecord`]s. The decoder is pure and
//! stateless; fetching the text is the job of `module::celestrak`.

mod epoch;
mod parser;
mod types;

pub use epoch::{CENTURY_PIVOT, from_day_of_year, full_year};
pub use parser::{MIN_LINE_LEN, RecordSplitter, decode_catalog, decode_record, split_records};
pub use types::{
    DecodeFailure, DecodeReason, DecodedCatalog, FailureClass, OwnedRawRecord, RawRecord,
    SatelliteRecord, epoch_format,
};

pub mod celestrak;
pub mod error;
pub mod handler;
pub mod nasa;
pub mod summary;
pub mod tle;

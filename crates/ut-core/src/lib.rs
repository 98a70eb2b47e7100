//! Core domain logic for usage statistics.
//!
//! This crate contains the storage-independent parts of a usage report:
//! - Range resolution: named periods and free-text bounds to time windows
//! - Day splitting: walking a date span one calendar day at a time
//! - Aggregation: shares of the filtered total, ordering and capping
//! - Formatting: pretty, simple and JSON renderers

pub mod days;
pub mod format;
pub mod range;
pub mod stats;

pub use days::{DaySpan, Days};
pub use format::{OutputFormat, UnknownFormat, render};
pub use range::{Period, RangeError, TimeRange};
pub use stats::{GroupBy, GroupTotal, StatEntry, StatsOptions, UnknownGroupBy, build_result_set};

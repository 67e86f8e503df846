//! Core data structures for indexed series.

mod series;

pub use series::{DataPoint, Series};
pub(crate) use series::{offset_time, time_overflow};

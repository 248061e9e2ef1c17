//! Core types for the range engine.
//!
//! This module provides the fundamental value types shared by the range model,
//! the tick grid and the selection set: exact fixed-point time, closed
//! intervals, and the error type for caller-supplied ranges.
//! All time values are TimeValue (10^-8 units, eight fractional digits).

pub mod error;
pub mod interval;
pub mod time;

// Re-export core data structures for easier access.
pub use error::RangeError;
pub use interval::Interval;
pub use time::{format_clock, format_timecode, ParseTimeError, TimeValue};

//! Closed `[start, end]` interval on the timeline.

use serde::{Deserialize, Serialize};

use crate::core::error::RangeError;
use crate::core::time::TimeValue;

/// A span of timeline time with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: TimeValue,
    pub end: TimeValue,
}

impl Interval {
    /// Create an interval without validation. Callers guarantee `start <= end`.
    pub const fn new(start: TimeValue, end: TimeValue) -> Self {
        Self { start, end }
    }

    /// Create a non-empty interval, rejecting `start >= end`
    pub fn try_new(start: TimeValue, end: TimeValue) -> Result<Self, RangeError> {
        if start >= end {
            return Err(RangeError::invalid(start, end, start, end));
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> TimeValue {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if a position is within this interval (inclusive on both ends)
    pub fn contains(&self, value: TimeValue) -> bool {
        value >= self.start && value <= self.end
    }

    pub fn contains_interval(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Intervals share some non-zero span. Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn touches_or_overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn clamp_value(&self, value: TimeValue) -> TimeValue {
        value.clamp(self.start, self.end)
    }

    /// Part of this interval inside `bounds`, if any non-empty part remains
    pub fn clamp_to(&self, bounds: &Interval) -> Option<Interval> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        (start < end).then_some(Interval { start, end })
    }
}

impl From<(TimeValue, TimeValue)> for Interval {
    fn from((start, end): (TimeValue, TimeValue)) -> Self {
        Interval::new(start, end)
    }
}

impl From<Interval> for (TimeValue, TimeValue) {
    fn from(interval: Interval) -> Self {
        (interval.start, interval.end)
    }
}

//! Set of disjoint selected intervals for multi-select timelines.
//!
//! Inserting a span unions it into the set, merging every interval it touches.
//! Removing a span cuts it out, trimming or splitting the intervals it crosses.
//! Intervals are kept sorted by start and never overlap or touch.

use tracing::debug;

use crate::core::error::{validate_window, RangeError};
use crate::core::interval::Interval;
use crate::core::time::TimeValue;

/// What an insert or remove did to the stored intervals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Unchanged,
    Added(Interval),
    Removed(Vec<Interval>),
    Replaced {
        removed: Vec<Interval>,
        added: Vec<Interval>,
    },
}

impl SelectionChange {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, SelectionChange::Unchanged)
    }

    pub fn removed(&self) -> &[Interval] {
        match self {
            SelectionChange::Removed(removed)
            | SelectionChange::Replaced { removed, .. } => removed,
            _ => &[],
        }
    }

    pub fn added(&self) -> &[Interval] {
        match self {
            SelectionChange::Added(added) => std::slice::from_ref(added),
            SelectionChange::Replaced { added, .. } => added,
            _ => &[],
        }
    }

    fn from_parts(removed: Vec<Interval>, added: Vec<Interval>) -> Self {
        match (removed.is_empty(), added.len()) {
            (true, 0) => SelectionChange::Unchanged,
            (true, 1) => SelectionChange::Added(added[0]),
            (false, 0) => SelectionChange::Removed(removed),
            _ => SelectionChange::Replaced { removed, added },
        }
    }
}

/// Disjoint selected intervals inside global bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    bounds: Interval,
    intervals: Vec<Interval>, // Sorted by start
}

impl SelectionSet {
    /// Create an empty set for spans inside `bounds`
    pub fn new(bounds: Interval) -> Self {
        Self {
            bounds,
            intervals: Vec::new(),
        }
    }

    /// Build a set by inserting each interval in turn
    pub fn from_intervals<I>(bounds: Interval, intervals: I) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = Interval>,
    {
        let mut set = Self::new(bounds);
        for interval in intervals {
            set.insert(interval.start, interval.end)?;
        }
        Ok(set)
    }

    pub fn bounds(&self) -> Interval {
        self.bounds
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Whether `value` is inside any selected interval
    pub fn contains(&self, value: TimeValue) -> bool {
        self.intervals.iter().any(|interval| interval.contains(value))
    }

    /// Selected intervals sharing some span with `window`
    pub fn intervals_in(&self, window: Interval) -> Vec<Interval> {
        self.intervals
            .iter()
            .filter(|interval| interval.overlaps(&window))
            .copied()
            .collect()
    }

    /// Total selected time
    pub fn total_duration(&self) -> TimeValue {
        self.intervals
            .iter()
            .fold(TimeValue::ZERO, |total, interval| total + interval.duration())
    }

    fn validate(&self, start: TimeValue, end: TimeValue) -> Result<Interval, RangeError> {
        validate_window(start, end, self.bounds.start, self.bounds.end)?;
        Ok(Interval::new(start, end))
    }

    /// Add `[start, end]` to the selection.
    ///
    /// Intervals crossing or touching either edge are absorbed and intervals
    /// inside the (extended) span are replaced by it. Rejects empty or
    /// out-of-bounds spans before touching anything.
    pub fn insert(
        &mut self,
        start: TimeValue,
        end: TimeValue,
    ) -> Result<SelectionChange, RangeError> {
        let requested = self.validate(start, end)?;

        if self.intervals.iter().any(|existing| existing.contains_interval(&requested)) {
            return Ok(SelectionChange::Unchanged);
        }

        let mut merged = requested;
        let mut removed = Vec::new();

        // Left edge falls inside an existing interval
        if let Some(index) = self
            .intervals
            .iter()
            .position(|existing| existing.start < merged.start && merged.start <= existing.end)
        {
            let existing = self.intervals.remove(index);
            merged.start = existing.start;
            removed.push(existing);
        }

        // Right edge falls inside an existing interval
        if let Some(index) = self
            .intervals
            .iter()
            .position(|existing| existing.start <= merged.end && merged.end < existing.end)
        {
            let existing = self.intervals.remove(index);
            merged.end = existing.end;
            removed.push(existing);
        }

        self.intervals.retain(|existing| {
            if merged.contains_interval(existing) {
                removed.push(*existing);
                false
            } else {
                true
            }
        });

        let at = self.intervals.partition_point(|existing| existing.start < merged.start);
        self.intervals.insert(at, merged);
        removed.sort_by_key(|interval| interval.start);

        debug!(
            start = %merged.start,
            end = %merged.end,
            merged = removed.len(),
            "selection inserted"
        );
        Ok(SelectionChange::from_parts(removed, vec![merged]))
    }

    /// Cut `[start, end]` out of the selection.
    ///
    /// Intervals inside the span are dropped, an interval holding the whole
    /// span is split in two, and intervals crossing one edge are trimmed back
    /// to that edge. Rejects empty or out-of-bounds spans before touching
    /// anything.
    pub fn remove(
        &mut self,
        start: TimeValue,
        end: TimeValue,
    ) -> Result<SelectionChange, RangeError> {
        let span = self.validate(start, end)?;

        let mut removed = Vec::new();
        let mut added = Vec::new();
        let mut kept = Vec::with_capacity(self.intervals.len() + 1);

        for existing in self.intervals.drain(..) {
            let pieces: Vec<Interval> = if span.contains_interval(&existing) {
                Vec::new()
            } else if existing.contains_interval(&span) {
                [
                    Interval::new(existing.start, span.start),
                    Interval::new(span.end, existing.end),
                ]
                .into_iter()
                .filter(|piece| !piece.is_empty())
                .collect()
            } else if existing.start < span.start && span.start < existing.end {
                vec![Interval::new(existing.start, span.start)]
            } else if existing.start < span.end && span.end < existing.end {
                vec![Interval::new(span.end, existing.end)]
            } else {
                kept.push(existing);
                continue;
            };

            removed.push(existing);
            added.extend(pieces.iter().copied());
            kept.extend(pieces);
        }
        self.intervals = kept;

        if !removed.is_empty() {
            debug!(
                start = %span.start,
                end = %span.end,
                removed = removed.len(),
                added = added.len(),
                "selection removed"
            );
        }
        Ok(SelectionChange::from_parts(removed, added))
    }

    /// Drop every interval
    pub fn clear(&mut self) -> SelectionChange {
        let removed = std::mem::take(&mut self.intervals);
        SelectionChange::from_parts(removed, Vec::new())
    }

    /// Move the global bounds, clipping intervals to them
    pub fn set_bounds(&mut self, bounds: Interval) -> SelectionChange {
        self.bounds = bounds;

        let mut removed = Vec::new();
        let mut added = Vec::new();
        let mut kept = Vec::with_capacity(self.intervals.len());
        for existing in self.intervals.drain(..) {
            match existing.clamp_to(&bounds) {
                Some(clipped) if clipped == existing => kept.push(existing),
                Some(clipped) => {
                    removed.push(existing);
                    added.push(clipped);
                    kept.push(clipped);
                }
                None => removed.push(existing),
            }
        }
        self.intervals = kept;
        SelectionChange::from_parts(removed, added)
    }
}

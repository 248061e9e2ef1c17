//! Pure reconciliation of range state.
//!
//! Every edit to the range goes through [`reconcile`], which takes the settled
//! state plus one edit and returns the next settled state. Nothing is mutated
//! while the cascade runs, so coupled fields cannot re-enter each other.

use tracing::{debug, warn};

use crate::core::time::TimeValue;

/// The seven observable fields of a range model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Start,
    End,
    Position,
    ZoomStart,
    ZoomEnd,
    SelectionStart,
    SelectionEnd,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Start,
        Field::End,
        Field::Position,
        Field::ZoomStart,
        Field::ZoomEnd,
        Field::SelectionStart,
        Field::SelectionEnd,
    ];

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of fields whose value actually moved during one edit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes(u8);

impl Changes {
    pub const NONE: Changes = Changes(0);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, field: Field) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn insert(&mut self, field: Field) {
        self.0 |= field.bit();
    }

    pub fn union(self, other: Changes) -> Changes {
        Changes(self.0 | other.0)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the selection moved at either end
    pub fn selection_changed(self) -> bool {
        self.contains(Field::SelectionStart) || self.contains(Field::SelectionEnd)
    }

    /// Whether the visible window moved at either end
    pub fn zoom_changed(self) -> bool {
        self.contains(Field::ZoomStart) || self.contains(Field::ZoomEnd)
    }

    pub fn iter(self) -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(move |field| self.contains(*field))
    }
}

impl FromIterator<Field> for Changes {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let mut changes = Changes::NONE;
        for field in iter {
            changes.insert(field);
        }
        changes
    }
}

/// One requested change to the range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Start(TimeValue),
    End(TimeValue),
    /// Both outer bounds at once; `start <= end` is checked by the caller
    Bounds(TimeValue, TimeValue),
    Position(TimeValue),
    ZoomStart(TimeValue),
    ZoomEnd(TimeValue),
    /// Both visible bounds at once; `start < end` is checked by the caller
    Window(TimeValue, TimeValue),
    SelectionStart(Option<TimeValue>),
    SelectionEnd(Option<TimeValue>),
    Selection(Option<(TimeValue, TimeValue)>),
    /// Replace everything with possibly unsettled values (snapshot restore)
    Restore(RangeState),
}

/// Which visible bound the caller moved, deciding which one yields when the
/// window gets narrower than the minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZoomAnchor {
    /// Zoom start moved: keep zoom end where it is if possible
    Start,
    /// Zoom end moved: keep zoom start where it is if possible
    End,
    /// Outer bounds or whole window moved: keep zoom start if possible
    Outer,
}

/// Settled values of a range model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeState {
    pub start: TimeValue,
    pub end: TimeValue,
    pub position: TimeValue,
    pub zoom_start: TimeValue,
    pub zoom_end: TimeValue,
    /// Both selection ends are present or both are absent
    pub selection: Option<(TimeValue, TimeValue)>,
}

impl RangeState {
    pub fn new(start: TimeValue, end: TimeValue) -> Self {
        Self {
            start,
            end,
            position: start,
            zoom_start: start,
            zoom_end: end,
            selection: None,
        }
    }

    /// Fields that differ between `self` and `next`
    pub fn diff(&self, next: &RangeState) -> Changes {
        let mut changes = Changes::NONE;
        if self.start != next.start {
            changes.insert(Field::Start);
        }
        if self.end != next.end {
            changes.insert(Field::End);
        }
        if self.position != next.position {
            changes.insert(Field::Position);
        }
        if self.zoom_start != next.zoom_start {
            changes.insert(Field::ZoomStart);
        }
        if self.zoom_end != next.zoom_end {
            changes.insert(Field::ZoomEnd);
        }
        if self.selection.map(|s| s.0) != next.selection.map(|s| s.0) {
            changes.insert(Field::SelectionStart);
        }
        if self.selection.map(|s| s.1) != next.selection.map(|s| s.1) {
            changes.insert(Field::SelectionEnd);
        }
        changes
    }

    /// Check every ordering invariant of a settled range
    pub fn satisfies_invariants(&self, minimum_visible_range: TimeValue) -> bool {
        let ordered = self.start <= self.end
            && self.start <= self.position
            && self.position <= self.end
            && self.start <= self.zoom_start
            && self.zoom_start <= self.zoom_end
            && self.zoom_end <= self.end;
        let wide_enough = self.end - self.start < minimum_visible_range
            || self.zoom_end - self.zoom_start >= minimum_visible_range;
        let selection_inside = match self.selection {
            Some((from, to)) => self.start <= from && from <= to && to <= self.end,
            None => true,
        };
        ordered && wide_enough && selection_inside
    }
}

/// Apply one edit and run the corrective cascade for it.
///
/// Outer bound edits run: other bound, selection, zoom, position, in that
/// order. Zoom, position and selection edits only settle their own fields.
pub fn reconcile(state: RangeState, edit: Edit, minimum_visible_range: TimeValue) -> RangeState {
    let mut next = state;

    match edit {
        Edit::Start(value) => {
            next.start = value;
            if next.end < value {
                next.end = value;
            }
            settle_outer(&mut next, minimum_visible_range);
        }
        Edit::End(value) => {
            next.end = value;
            if next.start > value {
                next.start = value;
            }
            settle_outer(&mut next, minimum_visible_range);
        }
        Edit::Bounds(start, end) => {
            next.start = start;
            next.end = end.max(start);
            settle_outer(&mut next, minimum_visible_range);
        }
        Edit::Position(value) => {
            next.position = value.clamp(next.start, next.end);
        }
        Edit::ZoomStart(value) => {
            next.zoom_start = value;
            settle_zoom(&mut next, minimum_visible_range, ZoomAnchor::Start);
        }
        Edit::ZoomEnd(value) => {
            next.zoom_end = value;
            settle_zoom(&mut next, minimum_visible_range, ZoomAnchor::End);
        }
        Edit::Window(start, end) => {
            next.zoom_start = start;
            next.zoom_end = end.max(start);
            settle_zoom(&mut next, minimum_visible_range, ZoomAnchor::Outer);
        }
        Edit::SelectionStart(None) | Edit::SelectionEnd(None) | Edit::Selection(None) => {
            next.selection = None;
        }
        Edit::SelectionStart(Some(value)) => {
            let value = value.clamp(next.start, next.end);
            next.selection = Some(match next.selection {
                Some((_, to)) => (value, to.max(value)),
                None => (value, value),
            });
        }
        Edit::SelectionEnd(Some(value)) => {
            let value = value.clamp(next.start, next.end);
            next.selection = Some(match next.selection {
                Some((from, _)) => (from.min(value), value),
                None => (value, value),
            });
        }
        Edit::Selection(Some((from, to))) => {
            next.selection = Some((from, to));
            settle_selection(&mut next);
        }
        Edit::Restore(raw) => {
            next = raw;
            if next.end < next.start {
                std::mem::swap(&mut next.start, &mut next.end);
            }
            if next.zoom_end < next.zoom_start {
                std::mem::swap(&mut next.zoom_start, &mut next.zoom_end);
            }
            settle_outer(&mut next, minimum_visible_range);
        }
    }

    next
}

fn settle_outer(state: &mut RangeState, minimum_visible_range: TimeValue) {
    settle_selection(state);
    settle_zoom(state, minimum_visible_range, ZoomAnchor::Outer);
    state.position = state.position.clamp(state.start, state.end);
}

/// Clamp the selection into the outer bounds; an inverted pair collapses onto
/// its start rather than ever inverting.
fn settle_selection(state: &mut RangeState) {
    if let Some((from, to)) = state.selection {
        let from = from.clamp(state.start, state.end);
        let to = to.clamp(state.start, state.end).max(from);
        state.selection = Some((from, to));
    }
}

fn settle_zoom(state: &mut RangeState, minimum_visible_range: TimeValue, anchor: ZoomAnchor) {
    let (lower, upper) = (state.start, state.end);
    let requested = (state.zoom_start, state.zoom_end);
    let mut zoom_start = state.zoom_start.clamp(lower, upper);
    let mut zoom_end = state.zoom_end.clamp(lower, upper);

    if upper - lower < minimum_visible_range {
        // Outer range cannot hold the minimum window: show all of it
        if requested != (lower, upper) {
            warn!(
                start = %lower,
                end = %upper,
                minimum = %minimum_visible_range,
                "range narrower than minimum visible range, showing the whole range"
            );
        }
        zoom_start = lower;
        zoom_end = upper;
    } else if zoom_end - zoom_start < minimum_visible_range {
        // Measure the room left; bound + minimum saturates near the limits
        match anchor {
            ZoomAnchor::Start => {
                if zoom_end - lower < minimum_visible_range {
                    zoom_start = lower;
                    zoom_end = lower + minimum_visible_range;
                } else {
                    zoom_start = zoom_end - minimum_visible_range;
                }
            }
            ZoomAnchor::End | ZoomAnchor::Outer => {
                if upper - zoom_start < minimum_visible_range {
                    zoom_end = upper;
                    zoom_start = upper - minimum_visible_range;
                } else {
                    zoom_end = zoom_start + minimum_visible_range;
                }
            }
        }
        debug!(
            zoom_start = %zoom_start,
            zoom_end = %zoom_end,
            "visible window widened to minimum visible range"
        );
    }

    state.zoom_start = zoom_start;
    state.zoom_end = zoom_end;
}

//! Range model: outer bounds, visible window, position and selection.
//!
//! Every setter stores the requested value, runs the corrective cascade for
//! that field and reports which fields actually moved. Callers use the
//! returned [`Changes`] to decide which notifications to raise.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::core::error::{validate_window, RangeError};
use crate::core::interval::Interval;
use crate::core::time::TimeValue;
use crate::range::reconcile::{reconcile, Changes, Edit, RangeState};

/// Flat persisted form of a range model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSnapshot {
    pub start: TimeValue,
    pub end: TimeValue,
    pub position: TimeValue,
    pub zoom_start: TimeValue,
    pub zoom_end: TimeValue,
    #[serde(default)]
    pub selection_start: Option<TimeValue>,
    #[serde(default)]
    pub selection_end: Option<TimeValue>,
}

/// Bounded timeline range with a visible window, a position and an optional
/// selected span.
///
/// Invariants after every call:
/// - `start <= position <= end`
/// - `start <= zoom_start <= zoom_end <= end`
/// - `zoom_end - zoom_start >= minimum_visible_range` whenever the outer
///   range is at least that wide
/// - the selection is absent, or `start <= from <= to <= end`
#[derive(Debug, Clone)]
pub struct RangeModel {
    state: RangeState,
    minimum_visible_range: TimeValue,
}

impl RangeModel {
    /// Create a range `[0, 10]` fully visible, position 0, no selection
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        let mut model = Self {
            state: RangeState::new(config.default_start, config.default_start),
            minimum_visible_range: config.minimum_visible_range,
        };
        model.apply(Edit::Bounds(config.default_start, config.default_end));
        model.apply(Edit::Window(config.default_start, config.default_end));
        model
    }

    pub fn start(&self) -> TimeValue {
        self.state.start
    }

    pub fn end(&self) -> TimeValue {
        self.state.end
    }

    pub fn position(&self) -> TimeValue {
        self.state.position
    }

    pub fn zoom_start(&self) -> TimeValue {
        self.state.zoom_start
    }

    pub fn zoom_end(&self) -> TimeValue {
        self.state.zoom_end
    }

    pub fn selection_start(&self) -> Option<TimeValue> {
        self.state.selection.map(|(from, _)| from)
    }

    pub fn selection_end(&self) -> Option<TimeValue> {
        self.state.selection.map(|(_, to)| to)
    }

    pub fn selection(&self) -> Option<(TimeValue, TimeValue)> {
        self.state.selection
    }

    pub fn minimum_visible_range(&self) -> TimeValue {
        self.minimum_visible_range
    }

    /// Copy of the settled values, safe to hand to other threads
    pub fn state(&self) -> RangeState {
        self.state
    }

    pub fn bounds(&self) -> Interval {
        Interval::new(self.state.start, self.state.end)
    }

    pub fn visible_window(&self) -> Interval {
        Interval::new(self.state.zoom_start, self.state.zoom_end)
    }

    pub fn duration(&self) -> TimeValue {
        self.state.end - self.state.start
    }

    pub fn visible_duration(&self) -> TimeValue {
        self.state.zoom_end - self.state.zoom_start
    }

    pub fn is_visible(&self, value: TimeValue) -> bool {
        self.visible_window().contains(value)
    }

    /// Run one edit through reconciliation and commit the result
    fn apply(&mut self, edit: Edit) -> Changes {
        let next = reconcile(self.state, edit, self.minimum_visible_range);
        debug_assert!(
            next.satisfies_invariants(self.minimum_visible_range),
            "reconciliation left an invalid range: {:?}",
            next
        );

        let changes = self.state.diff(&next);
        if !changes.is_empty() {
            debug!(?edit, fields = ?changes.iter().collect::<Vec<_>>(), "range reconciled");
        }
        self.state = next;
        changes
    }

    /// Move the outer start; `end` follows if it would fall below
    pub fn set_start(&mut self, value: TimeValue) -> Changes {
        self.apply(Edit::Start(value))
    }

    /// Move the outer end; `start` follows if it would rise above
    pub fn set_end(&mut self, value: TimeValue) -> Changes {
        self.apply(Edit::End(value))
    }

    pub fn set_position(&mut self, value: TimeValue) -> Changes {
        self.apply(Edit::Position(value))
    }

    pub fn set_zoom_start(&mut self, value: TimeValue) -> Changes {
        self.apply(Edit::ZoomStart(value))
    }

    pub fn set_zoom_end(&mut self, value: TimeValue) -> Changes {
        self.apply(Edit::ZoomEnd(value))
    }

    /// `None` clears the whole selection. Setting a start while nothing is
    /// selected creates a point selection.
    pub fn set_selection_start(&mut self, value: Option<TimeValue>) -> Changes {
        self.apply(Edit::SelectionStart(value))
    }

    /// `None` clears the whole selection. Setting an end while nothing is
    /// selected creates a point selection.
    pub fn set_selection_end(&mut self, value: Option<TimeValue>) -> Changes {
        self.apply(Edit::SelectionEnd(value))
    }

    pub fn clear_selection(&mut self) -> Changes {
        self.apply(Edit::Selection(None))
    }

    /// Replace both outer bounds. Rejects `start >= end`.
    pub fn set_range(
        &mut self,
        start: TimeValue,
        end: TimeValue,
    ) -> Result<Changes, RangeError> {
        validate_window(start, end, TimeValue::MIN, TimeValue::MAX)?;
        Ok(self.apply(Edit::Bounds(start, end)))
    }

    /// Show exactly `[start, end]`, widened to the minimum visible range if
    /// needed. Rejects empty, inverted or out-of-range windows.
    pub fn set_visible_window(
        &mut self,
        start: TimeValue,
        end: TimeValue,
    ) -> Result<Changes, RangeError> {
        validate_window(start, end, self.state.start, self.state.end)?;
        Ok(self.apply(Edit::Window(start, end)))
    }

    /// Select exactly `[start, end]`. Rejects empty, inverted or
    /// out-of-range spans.
    pub fn set_selection(
        &mut self,
        start: TimeValue,
        end: TimeValue,
    ) -> Result<Changes, RangeError> {
        validate_window(start, end, self.state.start, self.state.end)?;
        Ok(self.apply(Edit::Selection(Some((start, end)))))
    }

    /// Shift the visible window by `delta`, keeping its width and stopping at
    /// the outer bounds.
    pub fn pan_window(&mut self, delta: TimeValue) -> Changes {
        let width = self.visible_duration();
        let latest_start = self.state.end - width;
        let start = (self.state.zoom_start + delta).clamp(self.state.start, latest_start);
        self.apply(Edit::Window(start, start + width))
    }

    /// Scale the visible window to `percent` of its width around `focus`.
    ///
    /// `focus` keeps its relative place in the window (clamped into it first),
    /// so zooming around the pointer keeps the pointer over the same time.
    /// 100 leaves the width alone, 50 zooms in twice, 200 zooms out twice.
    pub fn zoom_window(&mut self, percent: u32, focus: TimeValue) -> Changes {
        let width = self.visible_duration();
        let available = self.duration();
        if width.is_zero() {
            return Changes::NONE;
        }

        let floor = self.minimum_visible_range.min(available);
        let new_width = width
            .mul_ratio(i64::from(percent.max(1)), 100)
            .clamp(floor, available);

        let focus = focus.clamp(self.state.zoom_start, self.state.zoom_end);
        let lead = (focus - self.state.zoom_start).mul_ratio(new_width.units(), width.units());
        let start = (focus - lead).clamp(self.state.start, self.state.end - new_width);
        self.apply(Edit::Window(start, start + new_width))
    }

    pub fn snapshot(&self) -> RangeSnapshot {
        RangeSnapshot {
            start: self.state.start,
            end: self.state.end,
            position: self.state.position,
            zoom_start: self.state.zoom_start,
            zoom_end: self.state.zoom_end,
            selection_start: self.selection_start(),
            selection_end: self.selection_end(),
        }
    }

    /// Load persisted values. Out-of-order or out-of-range values are settled
    /// the same way setter input is; a half-present selection is dropped.
    pub fn restore(&mut self, snapshot: &RangeSnapshot) -> Changes {
        let selection = match (snapshot.selection_start, snapshot.selection_end) {
            (Some(from), Some(to)) => Some((from.min(to), from.max(to))),
            _ => None,
        };
        self.apply(Edit::Restore(RangeState {
            start: snapshot.start,
            end: snapshot.end,
            position: snapshot.position,
            zoom_start: snapshot.zoom_start,
            zoom_end: snapshot.zoom_end,
            selection,
        }))
    }
}

impl Default for RangeModel {
    fn default() -> Self {
        Self::new()
    }
}

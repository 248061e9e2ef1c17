//! Timeline engine composing the range model, multi-selection and tick grid.
//!
//! A host control drives one `TimelineEngine`: setters in response to input,
//! `layout` once per redraw, `snap` before committing a dragged value.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::core::error::RangeError;
use crate::core::interval::Interval;
use crate::core::time::TimeValue;
use crate::range::{Changes, Field, RangeModel, RangeSnapshot};
use crate::selection::{SelectionChange, SelectionSet};
use crate::snap::SnapEngine;
use crate::ticks::{Tick, TickGrid, TickIntervalSelector, TickLayout};

/// Persisted timeline: range fields plus the selected `(start, end)` pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub range: RangeSnapshot,
    #[serde(default)]
    pub selections: Vec<(TimeValue, TimeValue)>,
}

/// What one outer-bound edit changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineChanges {
    pub range: Changes,
    pub selections: SelectionChange,
}

/// Main timeline structure.
///
/// The selection set's global bounds always follow the range model's outer
/// bounds.
#[derive(Debug, Clone)]
pub struct TimelineEngine {
    config: EngineConfig,
    range: RangeModel,
    selections: SelectionSet,
    ticks: TickIntervalSelector,
}

impl TimelineEngine {
    /// Create a timeline from validated settings
    pub fn new(config: EngineConfig) -> Result<Self, RangeError> {
        config.validate()?;
        let range = RangeModel::with_config(&config);
        let selections = SelectionSet::new(range.bounds());
        let ticks = TickIntervalSelector::from_config(&config);

        Ok(Self {
            config,
            range,
            selections,
            ticks,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn range(&self) -> &RangeModel {
        &self.range
    }

    pub fn selections(&self) -> &SelectionSet {
        &self.selections
    }

    pub fn ticks(&self) -> &TickIntervalSelector {
        &self.ticks
    }

    /// Carry moved outer bounds over to the selection set
    fn follow_bounds(&mut self, range: Changes) -> TimelineChanges {
        let selections = if range.contains(Field::Start) || range.contains(Field::End) {
            self.selections.set_bounds(self.range.bounds())
        } else {
            SelectionChange::Unchanged
        };
        TimelineChanges { range, selections }
    }

    pub fn set_range(
        &mut self,
        start: TimeValue,
        end: TimeValue,
    ) -> Result<TimelineChanges, RangeError> {
        let changes = self.range.set_range(start, end)?;
        Ok(self.follow_bounds(changes))
    }

    pub fn set_start(&mut self, value: TimeValue) -> TimelineChanges {
        let changes = self.range.set_start(value);
        self.follow_bounds(changes)
    }

    pub fn set_end(&mut self, value: TimeValue) -> TimelineChanges {
        let changes = self.range.set_end(value);
        self.follow_bounds(changes)
    }

    pub fn set_position(&mut self, value: TimeValue) -> Changes {
        self.range.set_position(value)
    }

    pub fn set_zoom_start(&mut self, value: TimeValue) -> Changes {
        self.range.set_zoom_start(value)
    }

    pub fn set_zoom_end(&mut self, value: TimeValue) -> Changes {
        self.range.set_zoom_end(value)
    }

    pub fn set_visible_window(
        &mut self,
        start: TimeValue,
        end: TimeValue,
    ) -> Result<Changes, RangeError> {
        self.range.set_visible_window(start, end)
    }

    pub fn pan_window(&mut self, delta: TimeValue) -> Changes {
        self.range.pan_window(delta)
    }

    pub fn zoom_window(&mut self, percent: u32, focus: TimeValue) -> Changes {
        self.range.zoom_window(percent, focus)
    }

    pub fn set_selection_start(&mut self, value: Option<TimeValue>) -> Changes {
        self.range.set_selection_start(value)
    }

    pub fn set_selection_end(&mut self, value: Option<TimeValue>) -> Changes {
        self.range.set_selection_end(value)
    }

    /// Move the position, optionally onto the nearest frame boundary
    pub fn seek(&mut self, value: TimeValue, snap_to_frame: bool) -> Changes {
        let target = if snap_to_frame {
            SnapEngine::with_frame_rate(&self.range, self.config.frames_per_second)
                .snap_to_frame(value, false)
        } else {
            value
        };
        self.range.set_position(target)
    }

    /// Snap to the minor step of the current tick level, or to one frame
    /// before the first layout pass
    pub fn snap(&self, value: TimeValue, must_stay_visible: bool) -> TimeValue {
        let engine = SnapEngine::with_frame_rate(&self.range, self.config.frames_per_second);
        match self.ticks.current() {
            Some(level) => engine.snap_to_level(value, must_stay_visible, level),
            None => engine.snap_to_frame(value, must_stay_visible),
        }
    }

    /// Pick the tick level for this redraw
    pub fn layout<F>(&mut self, pixels_per_unit: F) -> Option<TickLayout>
    where
        F: Fn(TimeValue) -> f64,
    {
        self.ticks.select(pixels_per_unit)
    }

    /// Pick the tick level for a control showing the visible window across
    /// `width` pixels
    pub fn layout_for_width(&mut self, width: f64) -> Option<TickLayout> {
        let visible = self.range.visible_duration().to_seconds();
        let pixels_per_second = if visible > 0.0 { width / visible } else { 0.0 };
        self.layout(move |duration: TimeValue| duration.to_seconds() * pixels_per_second)
    }

    /// Ticks of the current level inside the visible window
    pub fn visible_ticks(&self) -> Vec<Tick> {
        match self.ticks.current() {
            Some(level) => TickGrid::ticks(level, self.range.visible_window()),
            None => Vec::new(),
        }
    }

    pub fn select_span(
        &mut self,
        start: TimeValue,
        end: TimeValue,
    ) -> Result<SelectionChange, RangeError> {
        self.selections.insert(start, end)
    }

    pub fn deselect_span(
        &mut self,
        start: TimeValue,
        end: TimeValue,
    ) -> Result<SelectionChange, RangeError> {
        self.selections.remove(start, end)
    }

    pub fn clear_selections(&mut self) -> SelectionChange {
        self.selections.clear()
    }

    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            range: self.range.snapshot(),
            selections: self
                .selections
                .iter()
                .map(|interval| (interval.start, interval.end))
                .collect(),
        }
    }

    /// Load persisted state. Selected spans outside the restored bounds are
    /// clipped; spans that vanish entirely are dropped.
    pub fn restore(&mut self, snapshot: &TimelineSnapshot) {
        self.range.restore(&snapshot.range);

        let bounds = self.range.bounds();
        let mut selections = SelectionSet::new(bounds);
        for &(start, end) in &snapshot.selections {
            let requested = Interval::new(start.min(end), start.max(end));
            let Some(clipped) = requested.clamp_to(&bounds) else {
                debug!(start = %start, end = %end, "dropping persisted selection outside range");
                continue;
            };
            if let Err(err) = selections.insert(clipped.start, clipped.end) {
                debug!(
                    start = %start,
                    end = %end,
                    error = %err,
                    "dropping invalid persisted selection"
                );
            }
        }
        self.selections = selections;
    }

    pub fn to_json(&self) -> Result<String, RangeError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    pub fn restore_json(&mut self, json: &str) -> Result<(), RangeError> {
        let snapshot: TimelineSnapshot = serde_json::from_str(json)?;
        self.restore(&snapshot);
        Ok(())
    }
}

impl Default for TimelineEngine {
    fn default() -> Self {
        let config = EngineConfig::default();
        let range = RangeModel::with_config(&config);
        Self {
            selections: SelectionSet::new(range.bounds()),
            ticks: TickIntervalSelector::from_config(&config),
            range,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticks::TickKind;

    fn t(text: &str) -> TimeValue {
        text.parse().unwrap()
    }

    #[test]
    fn test_timeline_creation() {
        let timeline = TimelineEngine::default();
        assert_eq!(timeline.range().position(), t("0"));
        assert_eq!(timeline.range().duration(), t("10"));
        assert!(timeline.selections().is_empty());
        assert!(timeline.ticks().current().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            frames_per_second: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(TimelineEngine::new(config), Err(RangeError::Config(_))));
    }

    #[test]
    fn test_shrinking_range_clips_selections() {
        let mut timeline = TimelineEngine::default();
        timeline.select_span(t("2"), t("4")).unwrap();
        timeline.select_span(t("7"), t("9")).unwrap();

        let changes = timeline.set_end(t("8"));
        assert!(changes.range.contains(Field::End));
        assert_eq!(changes.selections.removed(), &[Interval::new(t("7"), t("9"))]);
        assert_eq!(
            timeline.selections().intervals(),
            &[Interval::new(t("2"), t("4")), Interval::new(t("7"), t("8"))]
        );

        // Growing the range again widens the allowed area for new spans
        timeline.set_range(t("0"), t("20")).unwrap();
        assert!(timeline.select_span(t("15"), t("18")).is_ok());
    }

    #[test]
    fn test_unmoved_bound_leaves_selections() {
        let mut timeline = TimelineEngine::default();
        timeline.select_span(t("2"), t("4")).unwrap();
        let changes = timeline.set_start(t("0"));
        assert!(changes.range.is_empty());
        assert!(changes.selections.is_unchanged());
    }

    #[test]
    fn test_seek_snaps_to_frame() {
        let mut timeline = TimelineEngine::default();
        timeline.seek(t("1.01"), true);
        assert_eq!(timeline.range().position(), t("1"));
        timeline.seek(t("1.01"), false);
        assert_eq!(timeline.range().position(), t("1.01"));
    }

    #[test]
    fn test_layout_and_snap() {
        let mut timeline = TimelineEngine::default();
        // 10 visible seconds across 1200px: 120 px/s picks 3-frame minor ticks
        let layout = timeline.layout_for_width(1200.0).unwrap();
        assert!(layout.changed);
        assert_eq!(layout.level.minor, t("0.1"));
        assert_eq!(timeline.snap(t("4.26"), false), t("4.3"));

        let ticks = timeline.visible_ticks();
        assert_eq!(ticks.len(), 101);
        assert_eq!(ticks.iter().filter(|tick| tick.kind == TickKind::Major).count(), 11);
    }

    #[test]
    fn test_json_round_trip() {
        let mut timeline = TimelineEngine::default();
        timeline.set_range(t("-5"), t("65.5")).unwrap();
        timeline.set_visible_window(t("10"), t("30")).unwrap();
        timeline.set_position(t("12.5"));
        timeline.set_selection_start(Some(t("11")));
        timeline.set_selection_end(Some(t("14")));
        timeline.select_span(t("1"), t("3")).unwrap();
        timeline.select_span(t("40"), t("41.25")).unwrap();

        let json = timeline.to_json().unwrap();
        let mut restored = TimelineEngine::default();
        restored.restore_json(&json).unwrap();

        assert_eq!(restored.range().state(), timeline.range().state());
        assert_eq!(restored.selections().intervals(), timeline.selections().intervals());
    }

    #[test]
    fn test_restore_clips_out_of_range_spans() {
        let mut timeline = TimelineEngine::default();
        let snapshot = TimelineSnapshot {
            range: RangeSnapshot {
                start: t("0"),
                end: t("10"),
                position: t("0"),
                zoom_start: t("0"),
                zoom_end: t("10"),
                selection_start: None,
                selection_end: None,
            },
            selections: vec![(t("8"), t("12")), (t("20"), t("30")), (t("3"), t("1"))],
        };
        timeline.restore(&snapshot);
        assert_eq!(
            timeline.selections().intervals(),
            &[Interval::new(t("1"), t("3")), Interval::new(t("8"), t("10"))]
        );
    }

    #[test]
    fn test_json_round_trip_at_limits() {
        let mut timeline = TimelineEngine::default();
        timeline.set_start(TimeValue::MIN);
        timeline.set_end(TimeValue::MAX);
        timeline.select_span(TimeValue::MIN, t("-1.5")).unwrap();

        let json = timeline.to_json().unwrap();
        let mut restored = TimelineEngine::default();
        restored.restore_json(&json).unwrap();

        assert_eq!(restored.range().start(), TimeValue::MIN);
        assert_eq!(restored.range().state(), timeline.range().state());
        assert_eq!(
            restored.selections().intervals(),
            &[Interval::new(TimeValue::MIN, t("-1.5"))]
        );
    }

    #[test]
    fn test_restore_json_rejects_garbage() {
        let mut timeline = TimelineEngine::default();
        assert!(matches!(timeline.restore_json("{ not json"), Err(RangeError::Json(_))));
    }
}

//! Snapping values onto the tick grid.
//!
//! A value rounds to the nearer grid point; an exact tie goes to the point
//! with the larger magnitude. With `must_stay_visible` the result is kept
//! inside the visible window of the range model.

use tracing::warn;

use crate::core::interval::Interval;
use crate::core::time::TimeValue;
use crate::range::RangeModel;
use crate::ticks::TickIntervalLevel;

/// Round `value` to the nearest multiple of `interval`.
/// Non-positive intervals leave the value untouched.
pub fn snap_to_grid(value: TimeValue, interval: TimeValue) -> TimeValue {
    if !interval.is_positive() {
        warn!(interval = %interval, "snap interval must be positive");
        return value;
    }

    let magnitude = value.abs();
    let toward = magnitude % interval;
    if toward.is_zero() {
        return value;
    }
    let away = interval - toward;
    let snapped = if toward < away { magnitude - toward } else { magnitude + away };

    if value.is_negative() {
        -snapped
    } else {
        snapped
    }
}

/// Snap to the grid, then pull the result back into `window`.
///
/// A target left of the window moves to the first grid point at or after the
/// window start; one right of it moves to the last grid point at or before the
/// window end. When the window holds no grid point at all, the value is only
/// clamped into the window.
pub fn snap_within(value: TimeValue, interval: TimeValue, window: Interval) -> TimeValue {
    let natural = snap_to_grid(value, interval);
    if window.contains(natural) {
        return natural;
    }
    if !interval.is_positive() {
        return window.clamp_value(value);
    }

    let boundary_tick = if natural < window.start {
        window.start.ceil_to(interval)
    } else {
        window.end.floor_to(interval)
    };
    if window.contains(boundary_tick) {
        boundary_tick
    } else {
        window.clamp_value(value)
    }
}

/// Snaps candidate values against a range model's visible window
pub struct SnapEngine<'a> {
    model: &'a RangeModel,
    frames_per_second: u32,
}

impl<'a> SnapEngine<'a> {
    pub fn new(model: &'a RangeModel) -> Self {
        Self::with_frame_rate(model, 30)
    }

    pub fn with_frame_rate(model: &'a RangeModel, frames_per_second: u32) -> Self {
        Self {
            model,
            frames_per_second: frames_per_second.max(1),
        }
    }

    pub fn snap(
        &self,
        value: TimeValue,
        must_stay_visible: bool,
        interval: TimeValue,
    ) -> TimeValue {
        if must_stay_visible {
            snap_within(value, interval, self.model.visible_window())
        } else {
            snap_to_grid(value, interval)
        }
    }

    /// Snap to the minor step of a tick level
    pub fn snap_to_level(
        &self,
        value: TimeValue,
        must_stay_visible: bool,
        level: &TickIntervalLevel,
    ) -> TimeValue {
        self.snap(value, must_stay_visible, level.minor)
    }

    /// Snap to the nearest frame boundary.
    ///
    /// Frames are counted by index rather than by adding up a rounded frame
    /// duration, so frame 30 at 30 fps is exactly one second.
    pub fn snap_to_frame(&self, value: TimeValue, must_stay_visible: bool) -> TimeValue {
        let fps = self.frames_per_second;
        let frame = TimeValue::from_frames(value.nearest_frame(fps), fps);
        let window = self.model.visible_window();
        if !must_stay_visible || window.contains(frame) {
            return frame;
        }

        let edge = if frame < window.start {
            let index = window.start.to_frame_index(fps);
            let floor = TimeValue::from_frames(index, fps);
            if floor < window.start {
                TimeValue::from_frames(index + 1, fps)
            } else {
                floor
            }
        } else {
            TimeValue::from_frames(window.end.to_frame_index(fps), fps)
        };
        if window.contains(edge) {
            edge
        } else {
            window.clamp_value(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(text: &str) -> TimeValue {
        text.parse().unwrap()
    }

    #[test]
    fn test_snap_nearest() {
        assert_eq!(snap_to_grid(t("7.3"), t("0.5")), t("7.5"));
        assert_eq!(snap_to_grid(t("7.2"), t("0.5")), t("7"));
        assert_eq!(snap_to_grid(t("7.5"), t("0.5")), t("7.5"));
        assert_eq!(snap_to_grid(t("0"), t("0.5")), t("0"));
    }

    #[test]
    fn test_snap_tie_goes_away_from_zero() {
        assert_eq!(snap_to_grid(t("7.25"), t("0.5")), t("7.5"));
        assert_eq!(snap_to_grid(t("-7.25"), t("0.5")), t("-7.5"));
    }

    #[test]
    fn test_snap_negative_values() {
        assert_eq!(snap_to_grid(t("-7.3"), t("0.5")), t("-7.5"));
        assert_eq!(snap_to_grid(t("-7.2"), t("0.5")), t("-7"));
    }

    #[test]
    fn test_snap_invalid_interval() {
        assert_eq!(snap_to_grid(t("7.3"), TimeValue::ZERO), t("7.3"));
        assert_eq!(snap_to_grid(t("7.3"), t("-1")), t("7.3"));
    }

    #[test]
    fn test_snap_within_window() {
        let window = Interval::new(t("2.2"), t("6.7"));
        assert_eq!(snap_within(t("4.1"), t("0.5"), window), t("4"));
        // Natural target 2 is left of the window
        assert_eq!(snap_within(t("2.1"), t("0.5"), window), t("2.5"));
        // Natural target 7 is right of the window
        assert_eq!(snap_within(t("6.9"), t("0.5"), window), t("6.5"));
        assert_eq!(snap_within(t("100"), t("0.5"), window), t("6.5"));
    }

    #[test]
    fn test_snap_within_window_without_grid_points() {
        let window = Interval::new(t("0.2"), t("0.4"));
        assert_eq!(snap_within(t("5"), TimeValue::ONE, window), t("0.4"));
        assert_eq!(snap_within(t("0.3"), TimeValue::ONE, window), t("0.3"));
    }

    #[test]
    fn test_engine_uses_visible_window() {
        let mut model = RangeModel::new();
        model.set_visible_window(t("3"), t("5")).unwrap();
        let engine = SnapEngine::new(&model);
        assert_eq!(engine.snap(t("7.3"), false, t("0.5")), t("7.5"));
        assert_eq!(engine.snap(t("7.3"), true, t("0.5")), t("5"));
        assert_eq!(engine.snap(t("1"), true, t("2")), t("4"));
    }

    #[test]
    fn test_snap_to_frame() {
        let model = RangeModel::new();
        let engine = SnapEngine::with_frame_rate(&model, 25);
        assert_eq!(engine.snap_to_frame(t("1.01"), false), t("1"));
        assert_eq!(engine.snap_to_frame(t("1.03"), false), t("1.04"));
    }

    #[test]
    fn test_snap_to_frame_lands_on_whole_seconds() {
        let mut model = RangeModel::new();
        let engine = SnapEngine::with_frame_rate(&model, 30);
        assert_eq!(engine.snap_to_frame(t("1.01"), false), t("1"));
        assert_eq!(engine.snap_to_frame(t("0.02"), false), t("0.03333333"));
        assert_eq!(engine.snap_to_frame(t("0.01"), false), t("0"));

        model.set_visible_window(t("2.01"), t("4.99")).unwrap();
        let engine = SnapEngine::with_frame_rate(&model, 30);
        assert_eq!(engine.snap_to_frame(t("1"), true), t("2.03333333"));
        assert_eq!(engine.snap_to_frame(t("9"), true), t("4.96666667"));
        assert_eq!(engine.snap_to_frame(t("3"), true), t("3"));
    }

    #[test]
    fn test_snap_to_level() {
        let model = RangeModel::new();
        let engine = SnapEngine::new(&model);
        let level = TickIntervalLevel {
            major: TimeValue::from_secs(60),
            minor: TimeValue::from_secs(5),
            divisor: 5,
            subdivisions: 12,
        };
        assert_eq!(engine.snap_to_level(t("7.4"), false, &level), t("5"));
        assert_eq!(engine.snap_to_level(t("7.5"), false, &level), t("10"));
        assert_eq!(engine.snap_to_level(t("9"), true, &level), t("10"));
        assert_eq!(engine.snap_to_level(t("12.6"), true, &level), t("10"));
    }

    #[test]
    fn test_snap_is_idempotent() {
        let mut model = RangeModel::new();
        model.set_range(t("-20"), t("20")).unwrap();
        model.set_visible_window(t("-3.7"), t("4.15")).unwrap();
        let engine = SnapEngine::new(&model);

        let intervals = [t("0.25"), t("0.3"), t("0.5"), t("1"), t("3"), t("7"), t("0.03333333")];
        for interval in intervals {
            for n in -400..=400 {
                let value = TimeValue::from_millis(n * 37);
                for visible in [false, true] {
                    let once = engine.snap(value, visible, interval);
                    let twice = engine.snap(once, visible, interval);
                    assert_eq!(twice, once, "{} @ {}", value, interval);
                    if visible {
                        assert!(model.is_visible(once));
                    }
                }
            }
        }
    }
}

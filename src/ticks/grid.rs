//! Tick positions inside the visible window for a chosen level.

use tracing::warn;

use crate::core::interval::Interval;
use crate::core::time::{format_clock, format_timecode, TimeValue};
use crate::ticks::table::TickIntervalLevel;

/// Upper bound on ticks produced for one window
pub const MAX_TICKS: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickKind {
    Major,
    Minor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub value: TimeValue,
    pub kind: TickKind,
}

/// Enumerates tick positions for a level
pub struct TickGrid;

impl TickGrid {
    /// Ticks inside `window` (inclusive), ascending.
    ///
    /// Minor ticks are placed by index inside each major step, so they line up
    /// exactly with major ticks even when the minor step is not exactly
    /// representable (e.g. one frame at 30 fps).
    pub fn ticks(level: &TickIntervalLevel, window: Interval) -> Vec<Tick> {
        let mut ticks = Vec::new();
        if !level.major.is_positive() || level.subdivisions == 0 || window.is_empty() {
            return ticks;
        }

        let subdivisions = i64::from(level.subdivisions);
        let mut major = window.start.floor_to(level.major);
        while major <= window.end {
            for index in 0..subdivisions {
                let value = major + level.major.mul_ratio(index, subdivisions);
                if value > window.end {
                    break;
                }
                if value < window.start {
                    continue;
                }
                if ticks.len() == MAX_TICKS {
                    warn!(limit = MAX_TICKS, minor = %level.minor, "tick grid truncated");
                    return ticks;
                }
                let kind = if index == 0 { TickKind::Major } else { TickKind::Minor };
                ticks.push(Tick { value, kind });
            }
            major += level.major;
        }
        ticks
    }

    /// Only the major ticks inside `window`
    pub fn major_ticks(level: &TickIntervalLevel, window: Interval) -> Vec<TimeValue> {
        Self::ticks(level, window)
            .into_iter()
            .filter(|tick| tick.kind == TickKind::Major)
            .map(|tick| tick.value)
            .collect()
    }

    /// Label for a tick: timecode while minor steps are sub-second, wall
    /// clock otherwise
    pub fn label(tick: &Tick, level: &TickIntervalLevel, fps: u32) -> String {
        if level.minor < TimeValue::ONE {
            format_timecode(tick.value, fps)
        } else {
            format_clock(tick.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticks::table::TickIntervalTable;

    fn t(text: &str) -> TimeValue {
        text.parse().unwrap()
    }

    fn window(start: &str, end: &str) -> Interval {
        Interval::new(t(start), t(end))
    }

    #[test]
    fn test_ticks_half_seconds() {
        let level = TickIntervalLevel {
            major: TimeValue::ONE,
            minor: t("0.5"),
            divisor: 15,
            subdivisions: 2,
        };
        let ticks = TickGrid::ticks(&level, window("0.2", "2"));
        let values: Vec<TimeValue> = ticks.iter().map(|tick| tick.value).collect();
        assert_eq!(values, vec![t("0.5"), t("1"), t("1.5"), t("2")]);
        assert_eq!(ticks[1].kind, TickKind::Major);
        assert_eq!(ticks[0].kind, TickKind::Minor);
        assert_eq!(TickGrid::major_ticks(&level, window("0.2", "2")), vec![t("1"), t("2")]);
    }

    #[test]
    fn test_frame_ticks_align_with_seconds() {
        let table = TickIntervalTable::for_frame_rate(30);
        let level = table.finest().unwrap();
        let ticks = TickGrid::ticks(level, window("0", "2"));
        // 60 frames plus the tick at 2s
        assert_eq!(ticks.len(), 61);
        assert_eq!(ticks[30].value, TimeValue::ONE);
        assert_eq!(ticks[30].kind, TickKind::Major);
        assert_eq!(ticks[1].value, t("0.03333333"));
    }

    #[test]
    fn test_negative_window() {
        let level = TickIntervalLevel {
            major: TimeValue::from_secs(10),
            minor: TimeValue::from_secs(5),
            divisor: 5,
            subdivisions: 2,
        };
        let values: Vec<TimeValue> = TickGrid::ticks(&level, window("-12", "3"))
            .into_iter()
            .map(|tick| tick.value)
            .collect();
        assert_eq!(values, vec![t("-10"), t("-5"), t("0")]);
    }

    #[test]
    fn test_tick_cap() {
        let level = TickIntervalLevel {
            major: TimeValue::ONE,
            minor: TimeValue::from_units(1_000),
            divisor: 1,
            subdivisions: 100_000,
        };
        assert_eq!(TickGrid::ticks(&level, window("0", "10")).len(), MAX_TICKS);
    }

    #[test]
    fn test_labels() {
        let frame_level = TickIntervalTable::for_frame_rate(30).finest().copied().unwrap();
        let tick = Tick {
            value: t("61.5"),
            kind: TickKind::Major,
        };
        assert_eq!(TickGrid::label(&tick, &frame_level, 30), "00:01:01:15");

        let minute_level = TickIntervalLevel {
            major: TimeValue::from_secs(60),
            minor: TimeValue::from_secs(10),
            divisor: 10,
            subdivisions: 6,
        };
        assert_eq!(TickGrid::label(&tick, &minute_level, 30), "00:01:01.500");
    }
}

//! Tick interval table built from calendar-like subdivisions.
//!
//! Each subdivision unit (a major step and how many finer sub-units it holds)
//! contributes one level per integer divisor of its count. With 30 fps the
//! frame unit yields minor ticks every 1, 2, 3, 5, 6, 10, 15 and 30 frames.

use tracing::warn;

use crate::core::time::{constants, TimeValue};

/// A major step and the number of finer sub-units it is divided into,
/// e.g. one second holding `fps` frames, or one minute holding 60 seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubdivisionUnit {
    pub major_unit: TimeValue,
    pub count: u32,
}

impl SubdivisionUnit {
    pub fn new(major_unit: TimeValue, count: u32) -> Self {
        Self { major_unit, count }
    }
}

/// One granularity of grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickIntervalLevel {
    /// Distance between major ticks
    pub major: TimeValue,
    /// Distance between minor ticks
    pub minor: TimeValue,
    /// Sub-units of the parent unit covered by one minor tick
    pub divisor: u32,
    /// Minor ticks per major tick
    pub subdivisions: u32,
}

/// Levels ordered from finest to coarsest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickIntervalTable {
    levels: Vec<TickIntervalLevel>,
}

/// Integer divisors of `n`, ascending. Zero has none.
pub fn divisors(n: u32) -> Vec<u32> {
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut candidate: u32 = 1;
    while u64::from(candidate) * u64::from(candidate) <= u64::from(n) {
        if n % candidate == 0 {
            small.push(candidate);
            if candidate != n / candidate {
                large.push(n / candidate);
            }
        }
        candidate += 1;
    }
    small.extend(large.into_iter().rev());
    small
}

impl TickIntervalTable {
    /// Build levels from units given finest first.
    ///
    /// For a unit `(major_unit, count)` every divisor `d` of `count` becomes a
    /// level with minor step `major_unit * d / count`.
    pub fn build(units: &[SubdivisionUnit]) -> Self {
        let mut levels = Vec::new();
        for unit in units {
            if unit.count == 0 || !unit.major_unit.is_positive() {
                warn!(
                    major_unit = %unit.major_unit,
                    count = unit.count,
                    "skipping empty subdivision unit"
                );
                continue;
            }
            for divisor in divisors(unit.count) {
                levels.push(TickIntervalLevel {
                    major: unit.major_unit,
                    minor: unit
                        .major_unit
                        .mul_ratio(i64::from(divisor), i64::from(unit.count)),
                    divisor,
                    subdivisions: unit.count / divisor,
                });
            }
        }
        Self { levels }
    }

    /// Calendar hierarchy: frames in a second, seconds in a minute, minutes in
    /// an hour, hours in a day
    pub fn for_frame_rate(fps: u32) -> Self {
        Self::build(&Self::calendar_units(fps))
    }

    pub fn calendar_units(fps: u32) -> [SubdivisionUnit; 4] {
        [
            SubdivisionUnit::new(TimeValue::ONE, fps),
            SubdivisionUnit::new(TimeValue::from_secs(constants::SECONDS_PER_MINUTE), 60),
            SubdivisionUnit::new(TimeValue::from_secs(constants::SECONDS_PER_HOUR), 60),
            SubdivisionUnit::new(TimeValue::from_secs(constants::SECONDS_PER_DAY), 24),
        ]
    }

    pub fn levels(&self) -> &[TickIntervalLevel] {
        &self.levels
    }

    pub fn get(&self, index: usize) -> Option<&TickIntervalLevel> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn finest(&self) -> Option<&TickIntervalLevel> {
        self.levels.first()
    }

    pub fn coarsest(&self) -> Option<&TickIntervalLevel> {
        self.levels.last()
    }

    /// Minor divisors listed for one major unit, in table order
    pub fn minor_divisors(&self, major_unit: TimeValue) -> Vec<u32> {
        self.levels
            .iter()
            .filter(|level| level.major == major_unit)
            .map(|level| level.divisor)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divisors() {
        assert_eq!(divisors(30), vec![1, 2, 3, 5, 6, 10, 15, 30]);
        assert_eq!(divisors(60), vec![1, 2, 3, 4, 5, 6, 10, 12, 15, 20, 30, 60]);
        assert_eq!(divisors(24), vec![1, 2, 3, 4, 6, 8, 12, 24]);
        assert_eq!(divisors(25), vec![1, 5, 25]);
        assert_eq!(divisors(1), vec![1]);
        assert!(divisors(0).is_empty());
    }

    #[test]
    fn test_divisors_match_brute_force() {
        for n in 1..=240u32 {
            let expected: Vec<u32> = (1..=n).filter(|d| n % d == 0).collect();
            assert_eq!(divisors(n), expected, "divisors of {}", n);
        }
    }

    #[test]
    fn test_frame_levels_for_30_fps() {
        let table = TickIntervalTable::for_frame_rate(30);
        assert_eq!(table.minor_divisors(TimeValue::ONE), vec![1, 2, 3, 5, 6, 10, 15, 30]);

        let finest = table.finest().unwrap();
        assert_eq!(finest.major, TimeValue::ONE);
        assert_eq!(finest.minor, "0.03333333".parse().unwrap());
        assert_eq!(finest.subdivisions, 30);
    }

    #[test]
    fn test_calendar_table_shape() {
        let table = TickIntervalTable::for_frame_rate(24);
        // 8 frame levels, 12 + 12 for minute and hour units, 8 for the day
        assert_eq!(table.len(), 8 + 12 + 12 + 8);

        let coarsest = table.coarsest().unwrap();
        assert_eq!(coarsest.major, TimeValue::from_secs(86_400));
        assert_eq!(coarsest.minor, TimeValue::from_secs(86_400));
        assert_eq!(coarsest.subdivisions, 1);

        let minute_levels: Vec<TimeValue> = table
            .levels()
            .iter()
            .filter(|level| level.major == TimeValue::from_secs(60))
            .map(|level| level.minor)
            .collect();
        assert_eq!(minute_levels[0], TimeValue::ONE);
        assert_eq!(minute_levels[6], TimeValue::from_secs(10));
    }

    #[test]
    fn test_levels_never_get_finer() {
        let table = TickIntervalTable::for_frame_rate(30);
        for pair in table.levels().windows(2) {
            assert!(pair[0].minor <= pair[1].minor);
            assert!(pair[0].major <= pair[1].major);
        }
    }

    #[test]
    fn test_empty_units_skipped() {
        let table = TickIntervalTable::build(&[
            SubdivisionUnit::new(TimeValue::ONE, 0),
            SubdivisionUnit::new(TimeValue::from_secs(60), 4),
        ]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.minor_divisors(TimeValue::ONE), Vec::<u32>::new());
    }
}

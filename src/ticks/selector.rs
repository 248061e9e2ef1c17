//! Adaptive tick level selection.
//! Picks the finest level whose rendered ticks are not cluttered.

use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::core::time::TimeValue;
use crate::ticks::table::{TickIntervalLevel, TickIntervalTable};

/// Clutter limits in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickThresholds {
    /// Minimum free gap between minor ticks
    pub minor: f64,
    /// Minimum free gap between major ticks
    pub major: f64,
    /// Rendered tick width, subtracted from each gap
    pub thickness: f64,
}

impl TickThresholds {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            minor: config.minor_tick_threshold,
            major: config.major_tick_threshold,
            thickness: config.tick_thickness,
        }
    }
}

impl Default for TickThresholds {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Index of the first level, scanning from the finest, whose minor and major
/// gaps both meet their thresholds. Falls back to the coarsest level.
///
/// `pixels_per_unit` converts a duration into on-screen pixels. Returns `None`
/// only for an empty table.
pub fn select_level_index<F>(
    table: &TickIntervalTable,
    pixels_per_unit: F,
    thresholds: &TickThresholds,
) -> Option<usize>
where
    F: Fn(TimeValue) -> f64,
{
    let last = table.len().checked_sub(1)?;
    let mut cursor = 0;
    while cursor < last {
        let level = &table.levels()[cursor];
        let minor_gap = pixels_per_unit(level.minor) - thresholds.thickness;
        let major_gap = pixels_per_unit(level.major) - thresholds.thickness;
        if minor_gap >= thresholds.minor && major_gap >= thresholds.major {
            break;
        }
        trace!(cursor, minor_gap, major_gap, "tick level too dense, coarsening");
        cursor += 1;
    }
    Some(cursor)
}

pub fn select_level<'a, F>(
    table: &'a TickIntervalTable,
    pixels_per_unit: F,
    thresholds: &TickThresholds,
) -> Option<&'a TickIntervalLevel>
where
    F: Fn(TimeValue) -> f64,
{
    select_level_index(table, pixels_per_unit, thresholds).and_then(|index| table.get(index))
}

/// Result of one layout pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickLayout {
    pub index: usize,
    pub level: TickIntervalLevel,
    /// The level differs from the previous pass
    pub changed: bool,
}

/// Keeps a table and the level chosen by the last layout pass
#[derive(Debug, Clone)]
pub struct TickIntervalSelector {
    table: TickIntervalTable,
    thresholds: TickThresholds,
    current: Option<usize>,
}

impl TickIntervalSelector {
    pub fn new(table: TickIntervalTable, thresholds: TickThresholds) -> Self {
        Self {
            table,
            thresholds,
            current: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            TickIntervalTable::for_frame_rate(config.frames_per_second),
            TickThresholds::from_config(config),
        )
    }

    pub fn table(&self) -> &TickIntervalTable {
        &self.table
    }

    pub fn thresholds(&self) -> &TickThresholds {
        &self.thresholds
    }

    pub fn current(&self) -> Option<&TickIntervalLevel> {
        self.current.and_then(|index| self.table.get(index))
    }

    /// Run one layout pass. The scan restarts at the finest level each pass
    /// and only moves toward coarser levels within it.
    pub fn select<F>(&mut self, pixels_per_unit: F) -> Option<TickLayout>
    where
        F: Fn(TimeValue) -> f64,
    {
        let index = select_level_index(&self.table, pixels_per_unit, &self.thresholds)?;
        let level = *self.table.get(index)?;
        let changed = self.current != Some(index);
        if changed {
            debug!(index, minor = %level.minor, major = %level.major, "tick level changed");
        }
        self.current = Some(index);
        Some(TickLayout { index, level, changed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(pixels_per_second: f64) -> impl Fn(TimeValue) -> f64 {
        move |duration: TimeValue| duration.to_seconds() * pixels_per_second
    }

    fn thresholds() -> TickThresholds {
        TickThresholds {
            minor: 8.0,
            major: 60.0,
            thickness: 1.0,
        }
    }

    #[test]
    fn test_finest_level_when_wide() {
        let table = TickIntervalTable::for_frame_rate(30);
        // One frame is 10px, one second 3000px
        let level = select_level(&table, linear(3000.0), &thresholds()).unwrap();
        assert_eq!(level.divisor, 1);
        assert_eq!(level.major, TimeValue::ONE);
    }

    #[test]
    fn test_coarsens_minor_ticks() {
        let table = TickIntervalTable::for_frame_rate(30);
        // One frame is 4px: need 3 frames (12px - 1 >= 8)
        let level = select_level(&table, linear(120.0), &thresholds()).unwrap();
        assert_eq!(level.major, TimeValue::ONE);
        assert_eq!(level.divisor, 3);
    }

    #[test]
    fn test_major_threshold_forces_minute_units() {
        let table = TickIntervalTable::for_frame_rate(30);
        // One second is 20px, under the 60px major threshold
        let level = select_level(&table, linear(20.0), &thresholds()).unwrap();
        assert_eq!(level.major, TimeValue::from_secs(60));
        assert_eq!(level.minor, TimeValue::ONE);
    }

    #[test]
    fn test_falls_back_to_coarsest() {
        let table = TickIntervalTable::for_frame_rate(30);
        let level = select_level(&table, linear(0.000001), &thresholds()).unwrap();
        assert_eq!(level, table.coarsest().unwrap());
    }

    #[test]
    fn test_empty_table() {
        let table = TickIntervalTable::build(&[]);
        assert!(select_level(&table, linear(100.0), &thresholds()).is_none());
    }

    #[test]
    fn test_selector_reports_level_changes() {
        let table = TickIntervalTable::for_frame_rate(30);
        let mut selector = TickIntervalSelector::new(table, thresholds());
        assert!(selector.current().is_none());

        let first = selector.select(linear(120.0)).unwrap();
        assert!(first.changed);

        let again = selector.select(linear(121.0)).unwrap();
        assert!(!again.changed);
        assert_eq!(again.index, first.index);

        // Zooming back in returns to a finer level on the next pass
        let finer = selector.select(linear(3000.0)).unwrap();
        assert!(finer.changed);
        assert!(finer.index < first.index);
        assert_eq!(selector.current(), Some(&finer.level));
    }

    #[test]
    fn test_scan_is_monotonic_in_scale() {
        let table = TickIntervalTable::for_frame_rate(25);
        let mut previous = 0;
        // Shrinking pixel density never picks a finer level
        for step in 0..60 {
            let density = 5000.0 / 1.3f64.powi(step);
            let index = select_level_index(&table, linear(density), &thresholds()).unwrap();
            assert!(index >= previous);
            previous = index;
        }
    }
}

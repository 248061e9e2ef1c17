//! Tick grid: interval table, adaptive level selection and tick enumeration.

pub mod grid;
pub mod selector;
pub mod table;

pub use grid::{Tick, TickGrid, TickKind};
pub use selector::{
    select_level, select_level_index, TickIntervalSelector, TickLayout, TickThresholds,
};
pub use table::{divisors, SubdivisionUnit, TickIntervalLevel, TickIntervalTable};

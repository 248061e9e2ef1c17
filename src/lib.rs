//! AVES range engine.
//!
//! Framework-independent model behind the editor's timeline controls: a
//! bounded range with a visible window, a position and a selection
//! ([`range`]), adaptive tick levels ([`ticks`]), grid snapping ([`snap`]) and
//! a set of disjoint selected spans ([`selection`]). [`timeline`] wires them
//! together for a host control.
//!
//! Everything here is synchronous and single-threaded. Hosts that mutate from
//! several threads must serialize calls themselves; `RangeModel::state()`
//! returns a `Copy` snapshot that can be shared freely.

pub mod config;
pub mod core;
pub mod range;
pub mod selection;
pub mod snap;
pub mod ticks;
pub mod timeline;

pub use crate::config::EngineConfig;
pub use crate::core::{Interval, RangeError, TimeValue};
pub use crate::range::{Changes, Field, RangeModel, RangeSnapshot};
pub use crate::selection::{SelectionChange, SelectionSet};
pub use crate::snap::SnapEngine;
pub use crate::ticks::{TickIntervalLevel, TickIntervalSelector, TickIntervalTable};
pub use crate::timeline::{TimelineEngine, TimelineSnapshot};

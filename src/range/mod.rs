//! Range model and its reconciliation cascade.

pub mod model;
pub mod reconcile;

pub use model::{RangeModel, RangeSnapshot};
pub use reconcile::{reconcile, Changes, Edit, Field, RangeState};

//! Multi-interval selection.

pub mod set;

pub use set::{SelectionChange, SelectionSet};

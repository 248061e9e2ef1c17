
#[allow(clippy::module_inception)]
pub mod timeline;

pub use timeline::{TimelineChanges, TimelineEngine, TimelineSnapshot};

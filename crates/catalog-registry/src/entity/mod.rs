//! Entity registry and its sources.

pub mod registry;
pub mod source;


pub use registry::{EntityRegistry, ItemsOptions, RunOutcome};
pub use source::{ComputedSource, EntitySource, ObservableList, SourceItem, SourceSnapshot};

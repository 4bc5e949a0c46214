//! Before-run hook system — registry, dispatcher, and the run event.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::{BeforeRunHook, CatalogRunEvent, FnHook};
pub use dispatcher::{BeforeRunOutcome, HookDispatcher};
pub use registry::HookRegistry;

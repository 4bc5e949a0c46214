//! # catalog-registry
//!
//! Registries for the catalog. Provides:
//!
//! - Category registry resolving descriptors into typed entities
//! - Entity registry merging any number of time-varying sources into one
//!   deduplicated, cached, filterable view
//! - Before-run hook registry and dispatcher with prevent-default semantics
//!
//! Registries are plain values created once at startup and shared by
//! `Arc`; nothing here is a process-global.

pub mod category;
pub mod entity;
pub mod filter;
pub mod hooks;

pub use category::CategoryRegistry;
pub use entity::registry::{EntityRegistry, ItemsOptions, RunOutcome};
pub use entity::source::{ComputedSource, EntitySource, ObservableList, SourceItem, SourceSnapshot};
pub use filter::FilterSet;
pub use hooks::definitions::{BeforeRunHook, CatalogRunEvent, FnHook};
pub use hooks::dispatcher::{BeforeRunOutcome, HookDispatcher};
pub use hooks::registry::HookRegistry;

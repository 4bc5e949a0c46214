//! # catalog-entity
//!
//! Domain model for catalog entities. A [`CatalogEntity`] is the typed form
//! of an [`EntityDescriptor`](catalog_core::EntityDescriptor); a
//! [`Category`] maps `(group, kind, version)` to the constructor that
//! builds it. Entities share an [`EntityCore`] whose mutable fields are
//! reassigned in place when a source publishes new data.

pub mod builtin;
pub mod category;
pub mod context;
pub mod entity;

pub use category::{Category, CategoryMetadata, CategoryNames, CategorySpec, CategoryVersion, EntityConstructor};
pub use context::{ContextMenuContext, MenuItem, Navigator, RunContext, SettingsContext, SettingsMenu};
pub use entity::{CatalogEntity, EntityCore};

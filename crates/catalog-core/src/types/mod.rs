//! Shared types used across catalog crates.

pub mod descriptor;
pub mod disposer;

pub use descriptor::{EntityDescriptor, EntityMetadata, EntityStatus, split_api_version};
pub use disposer::Disposer;

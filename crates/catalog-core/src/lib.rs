//! # catalog-core
//!
//! Core crate for the catalog. Contains configuration schemas, the
//! entity descriptor wire types, registration disposers, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other catalog crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
pub use types::descriptor::{EntityDescriptor, EntityMetadata, EntityStatus};
pub use types::disposer::Disposer;

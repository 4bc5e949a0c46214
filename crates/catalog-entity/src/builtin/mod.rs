//! Built-in entity kinds registered by the host at startup.

pub mod general;
pub mod web_link;

pub use general::{GeneralEntity, general_category};
pub use web_link::{WebLink, web_link_category};

/// API group of the built-in kinds.
pub const BUILTIN_GROUP: &str = "entity.catalog.dev";

/// Version of the built-in kinds.
pub const BUILTIN_VERSION: &str = "v1";

/// apiVersion of the built-in kinds.
pub fn builtin_api_version() -> String {
    format!("{BUILTIN_GROUP}/{BUILTIN_VERSION}")
}

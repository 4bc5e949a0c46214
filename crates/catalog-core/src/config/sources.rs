//! Static entity source configuration.

use serde::{Deserialize, Serialize};

/// A JSON file holding an array of entity descriptors, registered as a
/// source at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticSourceConfig {
    /// Source id.
    pub id: String,
    /// Path to the JSON file.
    pub path: String,
}

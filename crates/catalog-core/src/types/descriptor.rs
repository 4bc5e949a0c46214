//! Entity descriptor wire types.
//!
//! A descriptor is the untyped shape every source speaks. It is resolved
//! into a typed entity by the category registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untyped wire form of a catalog entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDescriptor {
    /// `"group/version"` or a bare `"version"`.
    pub api_version: String,
    /// Entity kind, e.g. `"WebLink"`.
    pub kind: String,
    /// Identity and labels.
    pub metadata: EntityMetadata,
    /// Current status.
    #[serde(default)]
    pub status: EntityStatus,
    /// Arbitrary kind-specific data.
    #[serde(default = "empty_object")]
    pub spec: Value,
}

/// Metadata block of a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    /// Globally unique identity.
    pub uid: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Optional abbreviated name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Which provider contributed the entity, e.g. `"local"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Arbitrary labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Any other metadata keys, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Status block of a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStatus {
    /// Lifecycle phase, e.g. `"available"`, `"connected"`, `"error"`.
    pub phase: String,
    /// Short machine-readable reason for the phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Whether the entity is currently active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Whether the entity is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl Default for EntityStatus {
    fn default() -> Self {
        Self::with_phase("unknown")
    }
}

impl EntityStatus {
    /// Creates a status with only a phase.
    pub fn with_phase(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            reason: None,
            message: None,
            active: None,
            disabled: None,
        }
    }
}

impl EntityDescriptor {
    /// Creates a descriptor with empty spec and default status.
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        uid: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            metadata: EntityMetadata {
                uid: uid.into(),
                name: name.into(),
                ..EntityMetadata::default()
            },
            status: EntityStatus::default(),
            spec: empty_object(),
        }
    }

    /// Sets the status phase.
    pub fn with_phase(mut self, phase: &str) -> Self {
        self.status.phase = phase.to_string();
        self
    }

    /// Sets the metadata source.
    pub fn with_source(mut self, source: &str) -> Self {
        self.metadata.source = Some(source.to_string());
        self
    }

    /// Sets the spec object.
    pub fn with_spec(mut self, spec: Value) -> Self {
        self.spec = spec;
        self
    }

    /// Returns the entity identity.
    pub fn uid(&self) -> &str {
        &self.metadata.uid
    }

    /// Splits `apiVersion` into `(group, version)`.
    ///
    /// The group is empty when no `/` is present.
    pub fn group_version(&self) -> (&str, &str) {
        split_api_version(&self.api_version)
    }
}

/// Splits an `apiVersion` string at the last `/` into `(group, version)`.
pub fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.rsplit_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_api_version() {
        assert_eq!(
            split_api_version("entity.example.dev/v1"),
            ("entity.example.dev", "v1")
        );
        assert_eq!(split_api_version("v1"), ("", "v1"));
    }

    #[test]
    fn test_deserialize_wire_shape() {
        let json = serde_json::json!({
            "apiVersion": "entity.example.dev/v1",
            "kind": "Widget",
            "metadata": {
                "uid": "w1",
                "name": "first",
                "source": "local",
                "labels": { "team": "core" },
                "owner": "ops"
            },
            "status": { "phase": "available" },
            "spec": { "size": 3 }
        });
        let descriptor: EntityDescriptor = serde_json::from_value(json).expect("deserialize");
        assert_eq!(descriptor.uid(), "w1");
        assert_eq!(descriptor.metadata.source.as_deref(), Some("local"));
        assert_eq!(descriptor.metadata.labels.get("team").map(String::as_str), Some("core"));
        assert_eq!(descriptor.metadata.extra.get("owner"), Some(&serde_json::json!("ops")));
        assert_eq!(descriptor.status.phase, "available");
        assert_eq!(descriptor.group_version(), ("entity.example.dev", "v1"));
    }

    #[test]
    fn test_missing_status_and_spec_default() {
        let json = serde_json::json!({
            "apiVersion": "v1",
            "kind": "Thing",
            "metadata": { "uid": "t1" }
        });
        let descriptor: EntityDescriptor = serde_json::from_value(json).expect("deserialize");
        assert_eq!(descriptor.status.phase, "unknown");
        assert!(descriptor.spec.is_object());
    }
}

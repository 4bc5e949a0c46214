//! The catalog entity trait and its shared mutable core.

use std::any::Any;
use std::fmt;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::trace;

use catalog_core::{AppResult, EntityDescriptor, EntityMetadata, EntityStatus};

use crate::context::{ContextMenuContext, RunContext, SettingsContext};

/// Fields reassigned when the same uid is published again.
#[derive(Debug, Clone)]
struct EntityState {
    metadata: EntityMetadata,
    status: EntityStatus,
    spec: Value,
}

/// Identity plus interior-mutable data shared by every entity type.
///
/// `uid`, `api_version` and `kind` are fixed at construction; metadata,
/// status and spec are replaced by [`EntityCore::apply`] so that holders of
/// an `Arc` to the entity observe refreshes without re-fetching it.
pub struct EntityCore {
    uid: String,
    api_version: String,
    kind: String,
    state: RwLock<EntityState>,
}

impl EntityCore {
    /// Builds a core from a descriptor.
    pub fn from_descriptor(descriptor: &EntityDescriptor) -> Self {
        Self {
            uid: descriptor.metadata.uid.clone(),
            api_version: descriptor.api_version.clone(),
            kind: descriptor.kind.clone(),
            state: RwLock::new(EntityState {
                metadata: descriptor.metadata.clone(),
                status: descriptor.status.clone(),
                spec: descriptor.spec.clone(),
            }),
        }
    }

    /// Reassigns metadata, status and spec from `descriptor`.
    ///
    /// The uid is kept even if the descriptor's metadata disagrees; callers
    /// only apply descriptors keyed by this entity's uid.
    pub fn apply(&self, descriptor: &EntityDescriptor) {
        let mut state = self.state.write();
        state.metadata = descriptor.metadata.clone();
        state.metadata.uid = self.uid.clone();
        state.status = descriptor.status.clone();
        state.spec = descriptor.spec.clone();
        trace!(uid = %self.uid, phase = %state.status.phase, "Entity updated in place");
    }

    /// Returns the entity uid.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Returns the apiVersion the entity was created from.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Returns the kind the entity was created from.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns a copy of the current metadata.
    pub fn metadata(&self) -> EntityMetadata {
        self.state.read().metadata.clone()
    }

    /// Returns a copy of the current status.
    pub fn status(&self) -> EntityStatus {
        self.state.read().status.clone()
    }

    /// Returns a copy of the current spec.
    pub fn spec(&self) -> Value {
        self.state.read().spec.clone()
    }

    /// Returns the current display name.
    pub fn name(&self) -> String {
        self.state.read().metadata.name.clone()
    }

    /// Returns the current status phase.
    pub fn phase(&self) -> String {
        self.state.read().status.phase.clone()
    }

    /// Returns the current metadata source.
    pub fn source(&self) -> Option<String> {
        self.state.read().metadata.source.clone()
    }

    /// Snapshots the entity back into wire form.
    pub fn to_descriptor(&self) -> EntityDescriptor {
        let state = self.state.read();
        EntityDescriptor {
            api_version: self.api_version.clone(),
            kind: self.kind.clone(),
            metadata: state.metadata.clone(),
            status: state.status.clone(),
            spec: state.spec.clone(),
        }
    }
}

impl fmt::Debug for EntityCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCore")
            .field("uid", &self.uid)
            .field("api_version", &self.api_version)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// A typed catalog entity.
///
/// Implementors own an [`EntityCore`] and may override the optional
/// actions. Every accessor is provided on top of [`CatalogEntity::core`].
#[async_trait]
pub trait CatalogEntity: Send + Sync + fmt::Debug + 'static {
    /// Returns the shared core.
    fn core(&self) -> &EntityCore;

    /// Returns `self` as `Any` for typed projections.
    fn as_any(&self) -> &dyn Any;

    /// Primary action, invoked after all before-run hooks allow it.
    async fn on_run(&self, _context: &RunContext) -> AppResult<()> {
        Ok(())
    }

    /// Called when the entity settings page opens.
    fn on_settings_open(&self, _context: &mut SettingsContext) {}

    /// Called when the entity context menu opens.
    fn on_context_menu_open(&self, _context: &mut ContextMenuContext) {}

    /// Returns the entity uid.
    fn get_id(&self) -> &str {
        self.core().uid()
    }

    /// Returns the current display name.
    fn get_name(&self) -> String {
        self.core().name()
    }

    /// Returns the apiVersion.
    fn api_version(&self) -> &str {
        self.core().api_version()
    }

    /// Returns the kind.
    fn kind(&self) -> &str {
        self.core().kind()
    }

    /// Returns a copy of the current metadata.
    fn metadata(&self) -> EntityMetadata {
        self.core().metadata()
    }

    /// Returns a copy of the current status.
    fn status(&self) -> EntityStatus {
        self.core().status()
    }

    /// Returns a copy of the current spec.
    fn spec(&self) -> Value {
        self.core().spec()
    }

    /// Whether the entity is enabled (not explicitly disabled).
    fn is_enabled(&self) -> bool {
        !self.core().status().disabled.unwrap_or(false)
    }
}

impl dyn CatalogEntity {
    /// Downcasts to a concrete entity type.
    pub fn downcast_ref<T: CatalogEntity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Returns whether the entity is of the concrete type `T`.
    pub fn is<T: CatalogEntity>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

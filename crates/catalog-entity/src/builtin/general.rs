//! General entities: in-app shortcuts such as "Preferences" or "Welcome".

use std::any::Any;

use async_trait::async_trait;
use serde::Deserialize;

use catalog_core::{AppError, AppResult, EntityDescriptor};

use super::{BUILTIN_GROUP, BUILTIN_VERSION};
use crate::category::Category;
use crate::context::RunContext;
use crate::entity::{CatalogEntity, EntityCore};

/// Typed spec of a general entity.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralSpec {
    /// In-app route opened on run.
    pub path: String,
    /// Optional icon.
    #[serde(default)]
    pub icon: Option<String>,
}

/// An in-app shortcut.
#[derive(Debug)]
pub struct GeneralEntity {
    core: EntityCore,
}

impl GeneralEntity {
    /// Builds the entity from a descriptor.
    pub fn new(descriptor: &EntityDescriptor) -> Self {
        Self {
            core: EntityCore::from_descriptor(descriptor),
        }
    }

    /// Parses the current spec.
    pub fn typed_spec(&self) -> AppResult<GeneralSpec> {
        serde_json::from_value(self.core.spec()).map_err(|e| {
            AppError::validation(format!("Invalid General spec for '{}': {e}", self.core.uid()))
        })
    }
}

#[async_trait]
impl CatalogEntity for GeneralEntity {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn on_run(&self, context: &RunContext) -> AppResult<()> {
        let spec = self.typed_spec()?;
        context.navigate(&spec.path);
        Ok(())
    }
}

/// The `General` category.
pub fn general_category() -> Category {
    Category::new("General", "settings", BUILTIN_GROUP, "General")
        .with_version(BUILTIN_VERSION, GeneralEntity::new)
}

//! Shared test helpers for integration tests.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use catalog_core::config::registry::RegistryConfig;
use catalog_core::{AppResult, EntityDescriptor};
use catalog_entity::builtin::{general_category, web_link_category};
use catalog_entity::{CatalogEntity, Category, EntityCore, Navigator, RunContext};
use catalog_registry::{CategoryRegistry, EntityRegistry};

pub const WIDGET_GROUP: &str = "entity.example.dev";
pub const WIDGET_API: &str = "entity.example.dev/v1";

/// Navigator that remembers every url.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.visited.lock().push(url.to_string());
    }
}

/// Extension-contributed entity kind.
#[derive(Debug)]
pub struct Widget {
    core: EntityCore,
}

impl Widget {
    pub fn new(descriptor: &EntityDescriptor) -> Self {
        Self {
            core: EntityCore::from_descriptor(descriptor),
        }
    }
}

#[async_trait]
impl CatalogEntity for Widget {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn on_run(&self, context: &RunContext) -> AppResult<()> {
        context.navigate(&format!("/widgets/{}", self.get_id()));
        Ok(())
    }
}

pub fn widget_category() -> Category {
    Category::new("Widgets", "widgets", WIDGET_GROUP, "Widget").with_version("v1", Widget::new)
}

pub fn widget(uid: &str, name: &str, phase: &str) -> EntityDescriptor {
    EntityDescriptor::new(WIDGET_API, "Widget", uid, name).with_phase(phase)
}

/// A host-like setup: built-in categories registered, no sources.
pub struct TestCatalog {
    pub categories: Arc<CategoryRegistry>,
    pub entities: Arc<EntityRegistry>,
    pub navigator: Arc<RecordingNavigator>,
}

impl TestCatalog {
    pub fn new() -> Self {
        let categories = Arc::new(CategoryRegistry::new());
        categories.add(general_category());
        categories.add(web_link_category());

        let navigator = Arc::new(RecordingNavigator::default());
        let entities = Arc::new(EntityRegistry::new(
            Arc::clone(&categories),
            Arc::clone(&navigator) as Arc<dyn Navigator>,
            &RegistryConfig::default(),
        ));

        Self {
            categories,
            entities,
            navigator,
        }
    }
}

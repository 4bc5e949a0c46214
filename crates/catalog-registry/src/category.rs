//! Category registry — resolves descriptors into typed entities.
//!
//! Resolution misses are ordinary control flow: a descriptor whose
//! category is not registered yet yields `None` and is buffered by the
//! entity registry until a matching category arrives.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, info};

use catalog_core::types::split_api_version;
use catalog_core::{Disposer, EntityDescriptor};
use catalog_entity::{CatalogEntity, Category};

use crate::filter::FilterSet;

#[derive(Debug, Default)]
struct CategoryTable {
    /// Registration id → category, in registration order.
    entries: IndexMap<u64, Arc<Category>>,
    next_id: u64,
    /// Bumped on every add and removal.
    generation: u64,
}

/// Registry of all known categories.
#[derive(Debug)]
pub struct CategoryRegistry {
    table: Arc<RwLock<CategoryTable>>,
    filters: FilterSet<Category>,
}

impl CategoryRegistry {
    /// Creates an empty category registry.
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(CategoryTable::default())),
            filters: FilterSet::new(),
        }
    }

    /// Registers a category.
    ///
    /// Duplicate `(group, kind)` claims are not rejected; the most recent
    /// registration shadows earlier ones for lookups. Use
    /// [`CategoryRegistry::duplicate_group_kinds`] to detect them.
    pub fn add(&self, category: Category) -> Disposer {
        let category_id = category.get_id();
        let id = {
            let mut table = self.table.write();
            let id = table.next_id;
            table.next_id += 1;
            table.generation += 1;
            table.entries.insert(id, Arc::new(category));
            id
        };

        info!(category = %category_id, "Category registered");

        let weak = Arc::downgrade(&self.table);
        Disposer::new(move || {
            if let Some(table) = weak.upgrade() {
                let mut table = table.write();
                if table.entries.shift_remove(&id).is_some() {
                    table.generation += 1;
                    info!(category = %category_id, "Category removed");
                }
            }
        })
    }

    /// Returns every registered category in registration order.
    pub fn items(&self) -> Vec<Arc<Category>> {
        self.table.read().entries.values().cloned().collect()
    }

    /// Returns the registered categories that pass every category filter.
    pub fn filtered_items(&self) -> Vec<Arc<Category>> {
        self.filters.apply(&self.items())
    }

    /// Registers a category filter.
    pub fn add_category_filter(
        &self,
        filter: impl Fn(&Category) -> bool + Send + Sync + 'static,
    ) -> Disposer {
        self.filters.add(filter)
    }

    /// Returns a counter that changes whenever the set of categories changes.
    pub fn generation(&self) -> u64 {
        self.table.read().generation
    }

    /// Finds the category claiming `(group, kind)`.
    pub fn get_for_group_kind(&self, group: &str, kind: &str) -> Option<Arc<Category>> {
        self.table
            .read()
            .entries
            .values()
            .rev()
            .find(|c| c.claims(group, kind))
            .cloned()
    }

    /// Finds a category by display name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<Category>> {
        self.table
            .read()
            .entries
            .values()
            .rev()
            .find(|c| c.metadata.name == name)
            .cloned()
    }

    /// Finds the category for an `(apiVersion, kind)` pair.
    pub fn get_category_for(&self, api_version: &str, kind: &str) -> Option<Arc<Category>> {
        let (group, _) = split_api_version(api_version);
        self.get_for_group_kind(group, kind)
    }

    /// Finds the category for a descriptor.
    pub fn get_category_for_entity(&self, descriptor: &EntityDescriptor) -> Option<Arc<Category>> {
        self.get_category_for(&descriptor.api_version, &descriptor.kind)
    }

    /// Returns whether a category and a matching version exist for
    /// `(apiVersion, kind)`.
    pub fn has_category_for(&self, api_version: &str, kind: &str) -> bool {
        let (_, version) = split_api_version(api_version);
        self.get_category_for(api_version, kind)
            .is_some_and(|c| c.version(version).is_some())
    }

    /// Returns whether the descriptor can be resolved right now.
    pub fn has_category_for_entity(&self, descriptor: &EntityDescriptor) -> bool {
        self.has_category_for(&descriptor.api_version, &descriptor.kind)
    }

    /// Builds a typed entity for the descriptor, or `None` if its category
    /// or version is unknown.
    pub fn get_entity_for_data(&self, descriptor: &EntityDescriptor) -> Option<Arc<dyn CatalogEntity>> {
        let category = self.get_category_for_entity(descriptor)?;
        let (_, version) = descriptor.group_version();
        let Some(entry) = category.version(version) else {
            debug!(
                category = %category.get_id(),
                version = %version,
                uid = %descriptor.uid(),
                "Category has no matching version"
            );
            return None;
        };
        Some(entry.construct(descriptor))
    }

    /// Returns `"group/kind"` ids claimed by more than one registration.
    pub fn duplicate_group_kinds(&self) -> Vec<String> {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for category in self.table.read().entries.values() {
            *counts.entry(category.get_id()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(id, _)| id)
            .collect()
    }

    /// Returns the number of categories per group.
    pub fn count_by_group(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for category in self.table.read().entries.values() {
            *counts.entry(category.spec.group.clone()).or_default() += 1;
        }
        counts
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

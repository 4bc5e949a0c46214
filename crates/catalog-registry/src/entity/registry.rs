//! Entity registry — the merged live view of every source.
//!
//! Each read polls all sources, retries buffered descriptors and, only if
//! something changed, reconciles the full set of source contents against
//! the identity map. Known uids are updated in place so that callers
//! holding an entity keep seeing live data.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use catalog_core::config::registry::RegistryConfig;
use catalog_core::{Disposer, EntityDescriptor};
use catalog_entity::{
    CatalogEntity, Category, ContextMenuContext, MenuItem, Navigator, RunContext, SettingsContext,
    SettingsMenu,
};

use super::source::{ComputedSource, EntitySource, ObservableList, SourceItem, SourceSnapshot};
use crate::category::CategoryRegistry;
use crate::filter::FilterSet;
use crate::hooks::definitions::BeforeRunHook;
use crate::hooks::dispatcher::{BeforeRunOutcome, HookDispatcher};
use crate::hooks::registry::HookRegistry;

/// Options for the projection helpers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemsOptions {
    /// Apply the registered catalog filters.
    pub filtered: bool,
}

impl ItemsOptions {
    /// Projection over the filtered view.
    pub fn filtered() -> Self {
        Self { filtered: true }
    }
}

/// What happened to a run request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A before-run hook prevented the run.
    Prevented {
        /// Hook that prevented it.
        by: Option<String>,
    },
    /// The entity's run action completed.
    Completed,
    /// The entity's run action failed; the error was logged.
    Failed,
}

/// Inputs the cached view was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewKey {
    sources_generation: u64,
    revisions: Vec<u64>,
    category_generation: u64,
}

/// One computed merged view.
#[derive(Debug)]
struct MergedView {
    key: ViewKey,
    items: Arc<[Arc<dyn CatalogEntity>]>,
    index: HashMap<String, Arc<dyn CatalogEntity>>,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Source id → source, in registration order.
    sources: IndexMap<String, Arc<dyn EntitySource>>,
    /// Bumped on every source add, replace and removal.
    sources_generation: u64,
    /// uid → live entity.
    entities: HashMap<String, Arc<dyn CatalogEntity>>,
    /// uid → descriptor waiting for its category, in arrival order.
    unresolved: IndexMap<String, EntityDescriptor>,
    view: Option<Arc<MergedView>>,
}

/// Registry owning the merged, deduplicated, filterable entity view.
#[derive(Debug)]
pub struct EntityRegistry {
    categories: Arc<CategoryRegistry>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<RegistryState>,
    filters: FilterSet<dyn CatalogEntity>,
    hooks: HookDispatcher,
    active_entity_id: Arc<RwLock<Option<String>>>,
}

impl EntityRegistry {
    /// Creates an empty registry resolving through `categories`.
    pub fn new(
        categories: Arc<CategoryRegistry>,
        navigator: Arc<dyn Navigator>,
        config: &RegistryConfig,
    ) -> Self {
        Self {
            categories,
            navigator,
            state: Mutex::new(RegistryState::default()),
            filters: FilterSet::new(),
            hooks: HookDispatcher::new(Arc::new(HookRegistry::new()), config.hook_timeout()),
            active_entity_id: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the category registry this registry resolves through.
    pub fn categories(&self) -> &Arc<CategoryRegistry> {
        &self.categories
    }

    // ── Sources ──

    /// Registers a source under `id`, replacing any source with that id.
    pub fn add_source(&self, id: &str, source: Arc<dyn EntitySource>) {
        let mut state = self.state.lock();
        let replaced = state.sources.insert(id.to_string(), source).is_some();
        state.sources_generation += 1;
        info!(source_id = %id, replaced = replaced, "Entity source registered");
    }

    /// Registers a live list under `id`.
    pub fn add_observable_source(&self, id: &str, list: ObservableList) {
        self.add_source(id, Arc::new(list));
    }

    /// Registers a computation under `id`; it is re-evaluated on every read.
    pub fn add_computed_source<F>(&self, id: &str, compute: F)
    where
        F: Fn() -> Vec<SourceItem> + Send + Sync + 'static,
    {
        self.add_source(id, Arc::new(ComputedSource::new(compute)));
    }

    /// Unregisters the source under `id`. Returns whether it existed.
    pub fn remove_source(&self, id: &str) -> bool {
        let mut state = self.state.lock();
        let removed = state.sources.shift_remove(id).is_some();
        if removed {
            state.sources_generation += 1;
            info!(source_id = %id, "Entity source removed");
        }
        removed
    }

    /// Returns the registered source ids in registration order.
    pub fn source_ids(&self) -> Vec<String> {
        self.state.lock().sources.keys().cloned().collect()
    }

    // ── Merged view ──

    /// Returns every resolved entity, in source order.
    ///
    /// The returned slice is reused until a source, the category set or
    /// the unresolved buffer changes.
    pub fn items(&self) -> Arc<[Arc<dyn CatalogEntity>]> {
        Arc::clone(&self.view().items)
    }

    /// Returns the entities that pass every catalog filter.
    pub fn filtered_items(&self) -> Vec<Arc<dyn CatalogEntity>> {
        self.filters.apply(self.items().iter())
    }

    /// Returns the entities with exactly this apiVersion and kind.
    pub fn get_items_for_api_kind(
        &self,
        api_version: &str,
        kind: &str,
        options: ItemsOptions,
    ) -> Vec<Arc<dyn CatalogEntity>> {
        self.select(options)
            .into_iter()
            .filter(|e| e.api_version() == api_version && e.kind() == kind)
            .collect()
    }

    /// Returns the entities of any version `category` supports.
    pub fn get_items_for_category(
        &self,
        category: &Category,
        options: ItemsOptions,
    ) -> Vec<Arc<dyn CatalogEntity>> {
        let supported: HashSet<String> = category.supported_api_versions().into_iter().collect();
        let kind = category.entity_kind();
        self.select(options)
            .into_iter()
            .filter(|e| e.kind() == kind && supported.contains(e.api_version()))
            .collect()
    }

    /// Returns the entities whose concrete type is `T`.
    pub fn get_items_by_entity_type<T: CatalogEntity>(&self) -> Vec<Arc<dyn CatalogEntity>> {
        self.items().iter().filter(|e| e.is::<T>()).cloned().collect()
    }

    /// Looks up an entity by uid.
    ///
    /// Like every read, this retries buffered descriptors first, so an
    /// entity whose category arrived late (the active one included)
    /// resolves on the next lookup.
    pub fn get_by_id(&self, uid: &str) -> Option<Arc<dyn CatalogEntity>> {
        self.view().index.get(uid).cloned()
    }

    /// Returns how many descriptors are waiting for their category.
    pub fn unresolved_count(&self) -> usize {
        self.state.lock().unresolved.len()
    }

    /// Returns the uids waiting for their category, in arrival order.
    pub fn unresolved_ids(&self) -> Vec<String> {
        self.state.lock().unresolved.keys().cloned().collect()
    }

    // ── Active entity ──

    /// Sets or clears the active entity id.
    pub fn set_active_entity(&self, uid: Option<&str>) {
        *self.active_entity_id.write() = uid.map(str::to_string);
    }

    /// Returns the active entity id.
    pub fn active_entity_id(&self) -> Option<String> {
        self.active_entity_id.read().clone()
    }

    /// Returns the active entity if it resolves.
    pub fn active_entity(&self) -> Option<Arc<dyn CatalogEntity>> {
        let uid = self.active_entity_id()?;
        self.get_by_id(&uid)
    }

    // ── Filters and hooks ──

    /// Registers a catalog filter.
    pub fn add_catalog_filter(
        &self,
        filter: impl Fn(&dyn CatalogEntity) -> bool + Send + Sync + 'static,
    ) -> Disposer {
        self.filters.add(move |entity| filter(entity))
    }

    /// Registers a before-run hook.
    pub fn add_on_before_run(&self, hook: Arc<dyn BeforeRunHook>) -> Disposer {
        self.hooks.registry().register(hook)
    }

    /// Runs the before-run hooks and reports whether `entity` may run.
    pub async fn on_before_run(&self, entity: &Arc<dyn CatalogEntity>) -> BeforeRunOutcome {
        self.hooks.dispatch(entity).await
    }

    /// Runs `entity` unless a hook prevents it. Never returns an error;
    /// failures of the entity's own action are logged.
    pub async fn on_run(&self, entity: &Arc<dyn CatalogEntity>) -> RunOutcome {
        let outcome = self.on_before_run(entity).await;
        if !outcome.may_run() {
            return RunOutcome::Prevented {
                by: outcome.prevented_by,
            };
        }

        let active = Arc::clone(&self.active_entity_id);
        let context = RunContext::new(Arc::clone(&self.navigator), move |uid| {
            *active.write() = uid;
        });

        match entity.on_run(&context).await {
            Ok(()) => {
                debug!(uid = %entity.get_id(), "Entity run completed");
                RunOutcome::Completed
            }
            Err(e) => {
                error!(
                    uid = %entity.get_id(),
                    name = %entity.get_name(),
                    error = %e,
                    "Entity run action failed"
                );
                RunOutcome::Failed
            }
        }
    }

    /// Collects the settings sections `entity` contributes.
    pub fn on_settings_open(&self, entity: &Arc<dyn CatalogEntity>) -> Vec<SettingsMenu> {
        let mut context = SettingsContext::new(Arc::clone(&self.navigator));
        entity.on_settings_open(&mut context);
        context.menu_items
    }

    /// Collects the context menu items `entity` contributes.
    pub fn on_context_menu_open(&self, entity: &Arc<dyn CatalogEntity>) -> Vec<MenuItem> {
        let mut context = ContextMenuContext::new(Arc::clone(&self.navigator));
        entity.on_context_menu_open(&mut context);
        context.menu_items
    }

    // ── Internals ──

    fn select(&self, options: ItemsOptions) -> Vec<Arc<dyn CatalogEntity>> {
        if options.filtered {
            self.filtered_items()
        } else {
            self.items().to_vec()
        }
    }

    /// Returns the current merged view, recomputing it if any input changed.
    fn view(&self) -> Arc<MergedView> {
        // Sources are polled without holding the state lock so a computed
        // source may read other state. It must not read this registry.
        let (sources, sources_generation) = {
            let state = self.state.lock();
            (
                state.sources.values().cloned().collect::<Vec<_>>(),
                state.sources_generation,
            )
        };
        let snapshots: Vec<SourceSnapshot> = sources.iter().map(|s| s.snapshot()).collect();

        let mut state = self.state.lock();
        self.process_unresolved(&mut state);

        let key = ViewKey {
            sources_generation,
            revisions: snapshots.iter().map(|s| s.revision).collect(),
            category_generation: self.categories.generation(),
        };

        if let Some(view) = state.view.as_ref().filter(|v| v.key == key) {
            return Arc::clone(view);
        }

        let view = Arc::new(self.reconcile(&mut state, &snapshots, key));
        state.view = Some(Arc::clone(&view));
        view
    }

    /// Moves every buffered descriptor whose category now resolves into the
    /// identity map.
    fn process_unresolved(&self, state: &mut RegistryState) {
        if state.unresolved.is_empty() {
            return;
        }

        let RegistryState {
            unresolved,
            entities,
            view,
            ..
        } = state;

        let mut resolved = 0;
        unresolved.retain(|uid, descriptor| match self.categories.get_entity_for_data(descriptor) {
            Some(entity) => {
                entities.insert(uid.clone(), entity);
                resolved += 1;
                false
            }
            None => true,
        });

        if resolved > 0 {
            *view = None;
            debug!(resolved = resolved, "Resolved buffered descriptors");
        }
    }

    /// Full-set reconciliation of all source snapshots.
    fn reconcile(
        &self,
        state: &mut RegistryState,
        snapshots: &[SourceSnapshot],
        key: ViewKey,
    ) -> MergedView {
        let mut order: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut unresolved: IndexMap<String, EntityDescriptor> = IndexMap::new();

        for item in snapshots.iter().flat_map(|s| s.items.iter()) {
            let uid = item.uid();
            if uid.is_empty() {
                warn!("Ignoring source item without a uid");
                continue;
            }

            match item {
                SourceItem::Descriptor(descriptor) => {
                    if let Some(existing) = state.entities.get(uid) {
                        existing.core().apply(descriptor);
                    } else if let Some(entity) = self.categories.get_entity_for_data(descriptor) {
                        state.entities.insert(uid.to_string(), entity);
                    } else {
                        unresolved.insert(uid.to_string(), descriptor.clone());
                    }
                }
                SourceItem::Entity(entity) => match state.entities.get(uid) {
                    Some(existing) if !Arc::ptr_eq(existing, entity) => {
                        existing.core().apply(&entity.core().to_descriptor());
                    }
                    Some(_) => {}
                    None => {
                        state.entities.insert(uid.to_string(), Arc::clone(entity));
                    }
                },
            }

            if seen.insert(uid.to_string()) {
                order.push(uid.to_string());
            }
        }

        state.entities.retain(|uid, _| seen.contains(uid));
        unresolved.retain(|uid, _| !state.entities.contains_key(uid));
        if !unresolved.is_empty() {
            debug!(count = unresolved.len(), "Descriptors waiting for their category");
        }
        state.unresolved = unresolved;

        let items: Vec<Arc<dyn CatalogEntity>> = order
            .iter()
            .filter_map(|uid| state.entities.get(uid))
            .filter(|e| self.categories.has_category_for(e.api_version(), e.kind()))
            .cloned()
            .collect();

        let index = items
            .iter()
            .map(|e| (e.get_id().to_string(), Arc::clone(e)))
            .collect();

        debug!(
            entity_count = items.len(),
            source_count = snapshots.len(),
            "Merged entity view recomputed"
        );

        MergedView {
            key,
            items: items.into(),
            index,
        }
    }
}

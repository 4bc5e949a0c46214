//! Hook registry — before-run hooks in registration order.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, info};

use catalog_core::Disposer;

use super::definitions::BeforeRunHook;

#[derive(Default)]
struct HookTable {
    next_id: u64,
    hooks: IndexMap<u64, Arc<dyn BeforeRunHook>>,
}

/// Registry of before-run hooks.
pub struct HookRegistry {
    table: Arc<RwLock<HookTable>>,
}

impl HookRegistry {
    /// Creates an empty hook registry.
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(HookTable::default())),
        }
    }

    /// Registers a hook; it runs after every hook registered before it.
    pub fn register(&self, hook: Arc<dyn BeforeRunHook>) -> Disposer {
        let name = hook.name().to_string();
        let id = {
            let mut table = self.table.write();
            let id = table.next_id;
            table.next_id += 1;
            table.hooks.insert(id, hook);
            id
        };

        info!(hook = %name, "Before-run hook registered");

        let weak = Arc::downgrade(&self.table);
        Disposer::new(move || {
            if let Some(table) = weak.upgrade() {
                table.write().hooks.shift_remove(&id);
                debug!(hook = %name, "Before-run hook removed");
            }
        })
    }

    /// Returns the hooks in registration order.
    pub fn snapshot(&self) -> Vec<Arc<dyn BeforeRunHook>> {
        self.table.read().hooks.values().cloned().collect()
    }

    /// Returns the number of registered hooks.
    pub fn len(&self) -> usize {
        self.table.read().hooks.len()
    }

    /// Returns whether no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry").field("len", &self.len()).finish()
    }
}

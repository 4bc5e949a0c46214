//! Filter sets — registered predicates combined by logical AND.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use catalog_core::Disposer;

/// A registered predicate.
pub type Filter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

struct FilterTable<T: ?Sized> {
    next_id: u64,
    filters: IndexMap<u64, Filter<T>>,
}

/// A set of predicates; an item passes only if every predicate keeps it.
pub struct FilterSet<T: ?Sized> {
    table: Arc<RwLock<FilterTable<T>>>,
}

impl<T: ?Sized + 'static> FilterSet<T> {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(FilterTable {
                next_id: 0,
                filters: IndexMap::new(),
            })),
        }
    }

    /// Registers a predicate. The returned disposer removes exactly this
    /// registration, even if the same closure was added twice.
    pub fn add(&self, filter: impl Fn(&T) -> bool + Send + Sync + 'static) -> Disposer {
        let id = {
            let mut table = self.table.write();
            let id = table.next_id;
            table.next_id += 1;
            table.filters.insert(id, Arc::new(filter));
            id
        };

        let weak = Arc::downgrade(&self.table);
        Disposer::new(move || {
            if let Some(table) = weak.upgrade() {
                table.write().filters.shift_remove(&id);
            }
        })
    }

    /// Returns whether `item` satisfies every predicate.
    pub fn matches(&self, item: &T) -> bool {
        let filters: Vec<Filter<T>> = self.table.read().filters.values().cloned().collect();
        filters.iter().all(|f| f(item))
    }

    /// Keeps only the items that satisfy every predicate, preserving order.
    pub fn apply<'a, I, P>(&self, items: I) -> Vec<P>
    where
        I: IntoIterator<Item = &'a P>,
        P: AsRef<T> + Clone + 'a,
    {
        let filters: Vec<Filter<T>> = self.table.read().filters.values().cloned().collect();
        items
            .into_iter()
            .filter(|item| filters.iter().all(|f| f((*item).as_ref())))
            .cloned()
            .collect()
    }

    /// Returns the number of registered predicates.
    pub fn len(&self) -> usize {
        self.table.read().filters.len()
    }

    /// Returns whether no predicates are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized + 'static> Default for FilterSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for FilterSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSet")
            .field("len", &self.table.read().filters.len())
            .finish()
    }
}

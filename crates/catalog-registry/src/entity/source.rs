//! Entity sources — named providers of descriptors or entities.
//!
//! A source always reports its complete current contents; the registry
//! reconciles each snapshot as a full set, never as a delta. The revision
//! tells the registry whether anything changed since its last read.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use catalog_core::EntityDescriptor;
use catalog_entity::CatalogEntity;

/// One element contributed by a source.
#[derive(Debug, Clone)]
pub enum SourceItem {
    /// Untyped wire data, resolved through the category registry.
    Descriptor(EntityDescriptor),
    /// An already-typed entity.
    Entity(Arc<dyn CatalogEntity>),
}

impl SourceItem {
    /// Returns the uid of the item.
    pub fn uid(&self) -> &str {
        match self {
            Self::Descriptor(descriptor) => descriptor.uid(),
            Self::Entity(entity) => entity.get_id(),
        }
    }

    /// Structural equality for descriptors, identity for entities.
    pub fn same_as(&self, other: &SourceItem) -> bool {
        match (self, other) {
            (Self::Descriptor(a), Self::Descriptor(b)) => a == b,
            (Self::Entity(a), Self::Entity(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<EntityDescriptor> for SourceItem {
    fn from(descriptor: EntityDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl From<Arc<dyn CatalogEntity>> for SourceItem {
    fn from(entity: Arc<dyn CatalogEntity>) -> Self {
        Self::Entity(entity)
    }
}

/// Contents of a source at one instant.
#[derive(Debug, Clone)]
pub struct SourceSnapshot {
    /// Changes whenever `items` changes.
    pub revision: u64,
    /// Complete current contents, in source order.
    pub items: Arc<[SourceItem]>,
}

/// A named provider of entities.
pub trait EntitySource: Send + Sync + fmt::Debug {
    /// Returns the current complete contents.
    fn snapshot(&self) -> SourceSnapshot;
}

#[derive(Debug)]
struct ListState {
    revision: u64,
    items: Arc<[SourceItem]>,
}

/// A live list; every mutation bumps its revision.
///
/// Clones share the same list, so a producer can keep one handle while the
/// registry holds another.
#[derive(Debug, Clone)]
pub struct ObservableList {
    state: Arc<RwLock<ListState>>,
}

impl ObservableList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::from_items(Vec::new())
    }

    /// Creates a list with initial contents.
    pub fn from_items(items: Vec<SourceItem>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ListState {
                revision: 0,
                items: items.into(),
            })),
        }
    }

    /// Replaces the whole contents.
    pub fn replace(&self, items: Vec<SourceItem>) {
        self.mutate(|current| *current = items);
    }

    /// Appends an item.
    pub fn push(&self, item: impl Into<SourceItem>) {
        let item = item.into();
        self.mutate(|current| current.push(item));
    }

    /// Replaces the item with the same uid, or appends it.
    pub fn upsert(&self, item: impl Into<SourceItem>) {
        let item = item.into();
        self.mutate(|current| match current.iter().position(|i| i.uid() == item.uid()) {
            Some(index) => current[index] = item,
            None => current.push(item),
        });
    }

    /// Removes every item with `uid`. Returns whether anything was removed.
    pub fn remove(&self, uid: &str) -> bool {
        let mut removed = false;
        self.mutate(|current| {
            let before = current.len();
            current.retain(|i| i.uid() != uid);
            removed = current.len() != before;
        });
        removed
    }

    /// Removes everything.
    pub fn clear(&self) {
        self.replace(Vec::new());
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    /// Returns whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the current revision.
    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    fn mutate(&self, change: impl FnOnce(&mut Vec<SourceItem>)) {
        let mut state = self.state.write();
        let mut items = state.items.to_vec();
        change(&mut items);
        state.items = items.into();
        state.revision += 1;
    }
}

impl Default for ObservableList {
    fn default() -> Self {
        Self::new()
    }
}

impl EntitySource for ObservableList {
    fn snapshot(&self) -> SourceSnapshot {
        let state = self.state.read();
        SourceSnapshot {
            revision: state.revision,
            items: Arc::clone(&state.items),
        }
    }
}

/// A source recomputed on every read.
///
/// The revision only advances when the computed output differs from the
/// previous one, so an unchanged computation keeps the merged view cached.
pub struct ComputedSource<F> {
    compute: F,
    last: Mutex<Option<SourceSnapshot>>,
}

impl<F> ComputedSource<F>
where
    F: Fn() -> Vec<SourceItem> + Send + Sync,
{
    /// Wraps a computation.
    pub fn new(compute: F) -> Self {
        Self {
            compute,
            last: Mutex::new(None),
        }
    }
}

impl<F> EntitySource for ComputedSource<F>
where
    F: Fn() -> Vec<SourceItem> + Send + Sync,
{
    fn snapshot(&self) -> SourceSnapshot {
        let items = (self.compute)();
        let mut last = self.last.lock();

        let revision = match last.as_ref() {
            Some(previous)
                if previous.items.len() == items.len()
                    && previous.items.iter().zip(&items).all(|(a, b)| a.same_as(b)) =>
            {
                return previous.clone();
            }
            Some(previous) => previous.revision + 1,
            None => 0,
        };

        let snapshot = SourceSnapshot {
            revision,
            items: items.into(),
        };
        *last = Some(snapshot.clone());
        snapshot
    }
}

impl<F> fmt::Debug for ComputedSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedSource")
            .field("revision", &self.last.lock().as_ref().map(|s| s.revision))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    fn descriptor(uid: &str, phase: &str) -> SourceItem {
        EntityDescriptor::new("v1", "Thing", uid, uid).with_phase(phase).into()
    }

    #[test]
    fn test_observable_list_revisions() {
        let list = ObservableList::new();
        let start = list.snapshot().revision;
        list.push(descriptor("a", "available"));
        list.upsert(descriptor("a", "error"));
        list.upsert(descriptor("b", "available"));

        let snapshot = list.snapshot();
        assert_eq!(snapshot.revision, start + 3);
        assert_eq!(snapshot.items.len(), 2);
        assert!(snapshot.items[0].same_as(&descriptor("a", "error")));

        assert!(list.remove("a"));
        assert!(!list.remove("a"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_clones_share_contents() {
        let producer = ObservableList::new();
        let consumer = producer.clone();
        producer.push(descriptor("a", "available"));
        assert_eq!(consumer.snapshot().items.len(), 1);
    }

    #[test]
    fn test_computed_source_revision_tracks_output() {
        let phase = Arc::new(AtomicU64::new(0));
        let reader = Arc::clone(&phase);
        let source = ComputedSource::new(move || {
            let phase = if reader.load(Ordering::SeqCst) == 0 { "available" } else { "error" };
            vec![descriptor("a", phase)]
        });

        let first = source.snapshot();
        let second = source.snapshot();
        assert_eq!(first.revision, second.revision);
        assert!(Arc::ptr_eq(&first.items, &second.items));

        phase.store(1, Ordering::SeqCst);
        let third = source.snapshot();
        assert_eq!(third.revision, first.revision + 1);
    }
}

//! Listener table — channel name → registered listeners.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use catalog_core::{AppResult, Disposer};

/// A listener receiving raw payloads.
pub type RawListener = Arc<dyn Fn(Value) -> AppResult<()> + Send + Sync>;

/// Listeners of one side of a link, keyed by channel name.
#[derive(Default)]
pub struct ListenerTable {
    channels: DashMap<String, IndexMap<u64, RawListener>>,
    next_id: AtomicU64,
}

impl ListenerTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener to `channel`; the disposer removes exactly it.
    pub fn add(self: &Arc<Self>, channel: &str, listener: RawListener) -> Disposer {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(id, listener);

        debug!(channel = %channel, listener_id = id, "Channel listener added");

        let weak = Arc::downgrade(self);
        let channel = channel.to_string();
        Disposer::new(move || {
            if let Some(table) = weak.upgrade() {
                table.remove(&channel, id);
            }
        })
    }

    fn remove(&self, channel: &str, id: u64) {
        if let Some(mut listeners) = self.channels.get_mut(channel) {
            listeners.shift_remove(&id);
            if listeners.is_empty() {
                drop(listeners);
                self.channels.remove(channel);
            }
        }
    }

    /// Delivers `payload` to every listener of `channel`, in registration
    /// order.
    ///
    /// Every listener runs even if an earlier one fails; the first failure
    /// is returned.
    pub fn dispatch(&self, channel: &str, payload: Value) -> AppResult<()> {
        let listeners: Vec<RawListener> = match self.channels.get(channel) {
            Some(entry) => entry.values().cloned().collect(),
            None => {
                trace!(channel = %channel, "No listeners for channel");
                return Ok(());
            }
        };

        let mut first_error = None;
        for listener in listeners {
            if let Err(e) = listener(payload.clone()) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Returns the number of listeners on `channel`.
    pub fn listener_count(&self, channel: &str) -> usize {
        self.channels.get(channel).map(|l| l.len()).unwrap_or(0)
    }

    /// Returns the number of channels with at least one listener.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl std::fmt::Debug for ListenerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerTable")
            .field("channels", &self.channels.len())
            .finish()
    }
}

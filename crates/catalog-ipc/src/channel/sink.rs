//! Receiving half of a named channel.

use std::fmt;
use std::sync::Arc;

use catalog_core::{AppResult, Disposer};

/// Typed listener shared between the transport and local callers.
pub(crate) type SinkListener<T> = Arc<dyn Fn(T) -> AppResult<()> + Send + Sync>;

/// A registered listener on one channel.
///
/// [`call`](Self::call) invokes the same listener locally, so code in the
/// observing process can apply an event without a round trip.
pub struct EventSink<T> {
    name: String,
    listener: SinkListener<T>,
    disposer: Disposer,
}

impl<T> EventSink<T> {
    pub(crate) fn new(name: String, listener: SinkListener<T>, disposer: Disposer) -> Self {
        Self {
            name,
            listener,
            disposer,
        }
    }

    /// Invokes the listener directly.
    pub fn call(&self, payload: T) -> AppResult<()> {
        (self.listener)(payload)
    }

    /// Stops receiving from the peer. Safe to call repeatedly.
    pub fn dispose(&self) {
        self.disposer.dispose();
    }

    /// Whether the sink was disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposer.is_disposed()
    }

    /// Returns the channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gives up local calls and keeps only the registration handle.
    pub fn into_disposer(self) -> Disposer {
        self.disposer
    }
}

impl<T> fmt::Debug for EventSink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("name", &self.name)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

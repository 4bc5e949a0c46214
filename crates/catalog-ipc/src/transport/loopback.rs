//! In-memory loopback pair.
//!
//! Two linked endpoints standing in for two processes. Delivery happens
//! synchronously inside `send`, so listener failures on the peer surface
//! directly to the sender.

use std::sync::Arc;

use tracing::trace;

use catalog_core::{AppResult, Disposer};

use super::Transport;
use super::listeners::{ListenerTable, RawListener};
use crate::envelope::Envelope;

/// One end of an in-memory link.
#[derive(Debug)]
pub struct LoopbackTransport {
    /// Listeners registered on this end
    local: Arc<ListenerTable>,
    /// Listeners registered on the peer
    peer: Arc<ListenerTable>,
    /// Label used in logs
    label: &'static str,
}

impl LoopbackTransport {
    /// Creates two linked endpoints: what one sends, the other hears.
    pub fn pair() -> (Arc<Self>, Arc<Self>) {
        let left = Arc::new(ListenerTable::new());
        let right = Arc::new(ListenerTable::new());

        let a = Arc::new(Self {
            local: Arc::clone(&left),
            peer: Arc::clone(&right),
            label: "a",
        });
        let b = Arc::new(Self {
            local: right,
            peer: left,
            label: "b",
        });
        (a, b)
    }

    /// Returns the number of local listeners on `channel`.
    pub fn listener_count(&self, channel: &str) -> usize {
        self.local.listener_count(channel)
    }
}

impl Transport for LoopbackTransport {
    fn send(&self, envelope: Envelope) -> AppResult<()> {
        trace!(side = self.label, channel = %envelope.channel, "Loopback send");
        self.peer.dispatch(&envelope.channel, envelope.payload)
    }

    fn listen(&self, channel: &str, listener: RawListener) -> Disposer {
        self.local.add(channel, listener)
    }
}

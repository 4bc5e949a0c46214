//! Transports move envelopes from one process to its peer.

pub mod listeners;
pub mod loopback;
pub mod stream;

use std::fmt;

use catalog_core::{AppResult, Disposer};

use crate::envelope::Envelope;
use listeners::RawListener;

/// One end of a bidirectional link between two processes.
///
/// `send` delivers to the peer's listeners; `listen` subscribes to what the
/// peer sends.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends an envelope to the peer.
    fn send(&self, envelope: Envelope) -> AppResult<()>;

    /// Subscribes to envelopes the peer sends on `channel`.
    fn listen(&self, channel: &str, listener: RawListener) -> Disposer;
}

//! Sending half of a named channel.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use catalog_core::AppResult;

use crate::envelope::Envelope;
use crate::transport::Transport;

/// Emits typed payloads on one channel.
pub struct EmitterChannel<T> {
    name: String,
    transport: Arc<dyn Transport>,
    _payload: PhantomData<fn(T)>,
}

impl<T: Serialize> EmitterChannel<T> {
    pub(crate) fn new(name: String, transport: Arc<dyn Transport>) -> Self {
        Self {
            name,
            transport,
            _payload: PhantomData,
        }
    }

    /// Serializes `payload` and sends it to the peer process.
    pub fn emit(&self, payload: &T) -> AppResult<()> {
        let payload = serde_json::to_value(payload)?;
        trace!(channel = %self.name, "Emitting on channel");
        self.transport.send(Envelope::new(self.name.clone(), payload))
    }

    /// Returns the channel name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for EmitterChannel<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            transport: Arc::clone(&self.transport),
            _payload: PhantomData,
        }
    }
}

impl<T> fmt::Debug for EmitterChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmitterChannel")
            .field("name", &self.name)
            .finish()
    }
}

//! Typed channels on top of a transport.

pub mod emitter;
pub mod sink;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use catalog_core::{AppError, AppResult};

use crate::transport::Transport;
use crate::transport::listeners::RawListener;

pub use emitter::EmitterChannel;
pub use sink::EventSink;

/// Registers emitters and sinks on one transport endpoint.
#[derive(Clone)]
pub struct IpcChannels {
    transport: Arc<dyn Transport>,
}

impl IpcChannels {
    /// Wraps a transport endpoint.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Returns a sender for `name`.
    pub fn register_emitter_channel<T: Serialize>(&self, name: impl Into<String>) -> EmitterChannel<T> {
        let name = name.into();
        debug!(channel = %name, "Emitter channel registered");
        EmitterChannel::new(name, Arc::clone(&self.transport))
    }

    /// Subscribes `listener` to payloads the peer emits on `name`.
    ///
    /// Payloads that do not decode as `T` are logged and rejected without
    /// reaching the listener.
    pub fn register_event_sink<T, F>(&self, name: impl Into<String>, listener: F) -> EventSink<T>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> AppResult<()> + Send + Sync + 'static,
    {
        let name = name.into();
        let listener: sink::SinkListener<T> = Arc::new(listener);

        let typed = Arc::clone(&listener);
        let channel = name.clone();
        let raw: RawListener = Arc::new(move |value| {
            let payload = serde_json::from_value::<T>(value).map_err(|e| {
                warn!(channel = %channel, error = %e, "Undecodable payload on channel");
                AppError::from(e)
            })?;
            typed(payload)
        });

        let disposer = self.transport.listen(&name, raw);
        debug!(channel = %name, "Event sink registered");
        EventSink::new(name, listener, disposer)
    }
}

impl fmt::Debug for IpcChannels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpcChannels")
            .field("transport", &self.transport)
            .finish()
    }
}

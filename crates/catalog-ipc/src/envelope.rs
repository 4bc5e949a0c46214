//! Wire envelope: one message on one named channel.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message addressed to a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Process-global channel name.
    pub channel: String,
    /// Plain-data payload.
    pub payload: Value,
}

impl Envelope {
    /// Creates an envelope.
    pub fn new(channel: impl Into<String>, payload: Value) -> Self {
        Self {
            channel: channel.into(),
            payload,
        }
    }
}

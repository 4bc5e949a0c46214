//! Cross-process channel configuration.

use serde::{Deserialize, Serialize};

/// IPC settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcConfig {
    /// Prefix for the installation state channels.
    #[serde(default = "default_installation_prefix")]
    pub installation_channel_prefix: String,
    /// Capacity of the outbound queue of a stream transport.
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,
    /// Longest accepted envelope line, in bytes.
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            installation_channel_prefix: default_installation_prefix(),
            outbound_capacity: default_outbound_capacity(),
            max_line_length: default_max_line_length(),
        }
    }
}

fn default_installation_prefix() -> String {
    "extension-installation-state-store".to_string()
}

fn default_outbound_capacity() -> usize {
    256
}

fn default_max_line_length() -> usize {
    1024 * 1024
}

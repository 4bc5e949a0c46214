//! Entity registry configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Entity registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Upper bound for a single before-run hook, in seconds.
    ///
    /// A hook that exceeds it is logged and treated as having contributed
    /// nothing.
    #[serde(default = "default_hook_timeout")]
    pub hook_timeout_seconds: u64,
}

impl RegistryConfig {
    /// Returns the hook timeout as a `Duration`.
    pub fn hook_timeout(&self) -> Duration {
        Duration::from_secs(self.hook_timeout_seconds)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            hook_timeout_seconds: default_hook_timeout(),
        }
    }
}

fn default_hook_timeout() -> u64 {
    30
}

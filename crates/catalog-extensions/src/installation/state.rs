//! Installation state enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one extension id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallationState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Being installed.
    Installing,
    /// Being uninstalled.
    Uninstalling,
}

impl InstallationState {
    /// Return the state as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Installing => "INSTALLING",
            Self::Uninstalling => "UNINSTALLING",
        }
    }
}

impl fmt::Display for InstallationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

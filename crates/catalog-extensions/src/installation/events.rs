//! Installation events — the wire contract between the two processes.
//!
//! Each kind travels on its own channel, `{prefix}:{kind}`. The payload is
//! the bare extension id, or the phase token for pre-install events.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use catalog_core::AppResult;

use super::store::InstallationStateStore;

/// Kind of installation event; selects the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallationEventKind {
    SetInstalling,
    ClearInstalling,
    SetUninstalling,
    ClearUninstalling,
    StartPreInstall,
    EndPreInstall,
}

impl InstallationEventKind {
    /// Every kind, in channel registration order.
    pub const ALL: [Self; 6] = [
        Self::SetInstalling,
        Self::ClearInstalling,
        Self::SetUninstalling,
        Self::ClearUninstalling,
        Self::StartPreInstall,
        Self::EndPreInstall,
    ];

    /// Return the kind as a kebab-case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetInstalling => "set-installing",
            Self::ClearInstalling => "clear-installing",
            Self::SetUninstalling => "set-uninstalling",
            Self::ClearUninstalling => "clear-uninstalling",
            Self::StartPreInstall => "start-pre-install",
            Self::EndPreInstall => "end-pre-install",
        }
    }

    /// Channel name for this kind under `prefix`.
    pub fn channel(&self, prefix: &str) -> String {
        format!("{prefix}:{}", self.as_str())
    }
}

impl fmt::Display for InstallationEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One state-changing event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallationEvent {
    SetInstalling(String),
    ClearInstalling(String),
    SetUninstalling(String),
    ClearUninstalling(String),
    StartPreInstall(Uuid),
    EndPreInstall(Uuid),
}

impl InstallationEvent {
    /// Returns the event kind.
    pub fn kind(&self) -> InstallationEventKind {
        match self {
            Self::SetInstalling(_) => InstallationEventKind::SetInstalling,
            Self::ClearInstalling(_) => InstallationEventKind::ClearInstalling,
            Self::SetUninstalling(_) => InstallationEventKind::SetUninstalling,
            Self::ClearUninstalling(_) => InstallationEventKind::ClearUninstalling,
            Self::StartPreInstall(_) => InstallationEventKind::StartPreInstall,
            Self::EndPreInstall(_) => InstallationEventKind::EndPreInstall,
        }
    }

    /// Channel payload for this event.
    pub fn payload(&self) -> Value {
        match self {
            Self::SetInstalling(id)
            | Self::ClearInstalling(id)
            | Self::SetUninstalling(id)
            | Self::ClearUninstalling(id) => Value::String(id.clone()),
            Self::StartPreInstall(token) | Self::EndPreInstall(token) => {
                Value::String(token.to_string())
            }
        }
    }

    /// Rebuilds an event from the channel it arrived on and its payload.
    pub fn decode(kind: InstallationEventKind, payload: Value) -> AppResult<Self> {
        Ok(match kind {
            InstallationEventKind::SetInstalling => Self::SetInstalling(serde_json::from_value(payload)?),
            InstallationEventKind::ClearInstalling => {
                Self::ClearInstalling(serde_json::from_value(payload)?)
            }
            InstallationEventKind::SetUninstalling => {
                Self::SetUninstalling(serde_json::from_value(payload)?)
            }
            InstallationEventKind::ClearUninstalling => {
                Self::ClearUninstalling(serde_json::from_value(payload)?)
            }
            InstallationEventKind::StartPreInstall => {
                Self::StartPreInstall(serde_json::from_value(payload)?)
            }
            InstallationEventKind::EndPreInstall => Self::EndPreInstall(serde_json::from_value(payload)?),
        })
    }

    /// Returns the event that undoes this one.
    pub fn inverse(&self) -> Self {
        match self {
            Self::SetInstalling(id) => Self::ClearInstalling(id.clone()),
            Self::ClearInstalling(id) => Self::SetInstalling(id.clone()),
            Self::SetUninstalling(id) => Self::ClearUninstalling(id.clone()),
            Self::ClearUninstalling(id) => Self::SetUninstalling(id.clone()),
            Self::StartPreInstall(token) => Self::EndPreInstall(*token),
            Self::EndPreInstall(token) => Self::StartPreInstall(*token),
        }
    }

    /// Applies the event to `store` with the same strict checks as a local
    /// call. Pre-install events are set operations and never fail.
    pub fn apply(&self, store: &InstallationStateStore) -> AppResult<()> {
        match self {
            Self::SetInstalling(id) => store.set_installing(id),
            Self::ClearInstalling(id) => store.clear_installing(id),
            Self::SetUninstalling(id) => store.set_uninstalling(id),
            Self::ClearUninstalling(id) => store.clear_uninstalling(id),
            Self::StartPreInstall(token) => {
                store.insert_pre_install(*token);
                Ok(())
            }
            Self::EndPreInstall(token) => {
                store.remove_pre_install(*token);
                Ok(())
            }
        }
    }
}

//! Per-process installation state store.
//!
//! Every id is in exactly one state; ids not present in the map are idle.
//! Transitions are only legal along these edges, anything else is an
//! `InvalidTransition` error and leaves the store untouched:
//!
//! - idle → installing → idle
//! - idle → uninstalling → idle

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use catalog_core::{AppError, AppResult, Disposer};

use super::guard::PreInstallGuard;
use super::state::InstallationState;

/// An extension with an operation in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationEntry {
    /// Extension id.
    pub id: String,
    /// Current state; never idle.
    pub state: InstallationState,
    /// When the state was entered.
    pub since: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreInner {
    records: HashMap<String, (InstallationState, DateTime<Utc>)>,
    pre_installs: HashSet<Uuid>,
}

impl StoreInner {
    fn state_of(&self, id: &str) -> InstallationState {
        self.records
            .get(id)
            .map(|(state, _)| *state)
            .unwrap_or_default()
    }

    fn count(&self, state: InstallationState) -> usize {
        self.records.values().filter(|(s, _)| *s == state).count()
    }
}

/// Installation bookkeeping for one process.
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InstallationStateStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InstallationStateStore {
    /// Creates an empty store where every id is idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as installing. It must be idle.
    pub fn set_installing(&self, id: &str) -> AppResult<()> {
        self.transition(id, InstallationState::Idle, InstallationState::Installing)
    }

    /// Returns `id` from installing to idle.
    pub fn clear_installing(&self, id: &str) -> AppResult<()> {
        self.transition(id, InstallationState::Installing, InstallationState::Idle)
    }

    /// Marks `id` as uninstalling. It must be idle.
    pub fn set_uninstalling(&self, id: &str) -> AppResult<()> {
        self.transition(id, InstallationState::Idle, InstallationState::Uninstalling)
    }

    /// Returns `id` from uninstalling to idle.
    pub fn clear_uninstalling(&self, id: &str) -> AppResult<()> {
        self.transition(id, InstallationState::Uninstalling, InstallationState::Idle)
    }

    fn transition(
        &self,
        id: &str,
        from: InstallationState,
        to: InstallationState,
    ) -> AppResult<()> {
        let mut inner = self.inner.write();
        let current = inner.state_of(id);

        if current != from {
            return Err(AppError::invalid_transition(format!(
                "Cannot move '{id}' to {to}: expected {from}, found {current}"
            )));
        }

        if to == InstallationState::Idle {
            if let Some((_, since)) = inner.records.remove(id) {
                let elapsed_ms = (Utc::now() - since).num_milliseconds();
                info!(extension_id = %id, from = %from, elapsed_ms, "Extension operation finished");
            }
        } else {
            inner.records.insert(id.to_string(), (to, Utc::now()));
            debug!(extension_id = %id, state = %to, "Extension operation started");
        }

        Ok(())
    }

    /// Opens an anonymous pre-install phase.
    pub fn start_pre_install(&self) -> PreInstallGuard {
        let token = Uuid::new_v4();
        self.insert_pre_install(token);

        let store = self.clone();
        PreInstallGuard::new(
            token,
            Disposer::new(move || {
                store.remove_pre_install(token);
            }),
        )
    }

    /// Records a pre-install phase by token. Returns `false` if it was
    /// already open.
    pub fn insert_pre_install(&self, token: Uuid) -> bool {
        let inserted = self.inner.write().pre_installs.insert(token);
        if inserted {
            debug!(token = %token, "Pre-install phase opened");
        }
        inserted
    }

    /// Ends a pre-install phase. Returns `false` if it was not open.
    pub fn remove_pre_install(&self, token: Uuid) -> bool {
        let removed = self.inner.write().pre_installs.remove(&token);
        if removed {
            debug!(token = %token, "Pre-install phase closed");
        }
        removed
    }

    /// Returns the state of `id`.
    pub fn get_installation_state(&self, id: &str) -> InstallationState {
        self.inner.read().state_of(id)
    }

    /// Whether `id` is installing.
    pub fn is_installing(&self, id: &str) -> bool {
        self.get_installation_state(id) == InstallationState::Installing
    }

    /// Whether `id` is uninstalling.
    pub fn is_uninstalling(&self, id: &str) -> bool {
        self.get_installation_state(id) == InstallationState::Uninstalling
    }

    /// Whether `id` is idle.
    pub fn is_idle(&self, id: &str) -> bool {
        self.get_installation_state(id) == InstallationState::Idle
    }

    /// Number of ids currently installing.
    pub fn installing_count(&self) -> usize {
        self.inner.read().count(InstallationState::Installing)
    }

    /// Whether any id is installing.
    pub fn any_installing(&self) -> bool {
        self.installing_count() > 0
    }

    /// Number of open pre-install phases.
    pub fn pre_installing_count(&self) -> usize {
        self.inner.read().pre_installs.len()
    }

    /// Whether any pre-install phase is open.
    pub fn any_pre_installing(&self) -> bool {
        self.pre_installing_count() > 0
    }

    /// Whether a pre-install phase is open or any id is installing.
    pub fn any_pre_installing_or_installing(&self) -> bool {
        let inner = self.inner.read();
        !inner.pre_installs.is_empty() || inner.count(InstallationState::Installing) > 0
    }

    /// Whether any id is uninstalling.
    pub fn any_uninstalling(&self) -> bool {
        self.inner.read().count(InstallationState::Uninstalling) > 0
    }

    /// Returns every non-idle id, oldest first.
    pub fn entries(&self) -> Vec<InstallationEntry> {
        let mut entries: Vec<InstallationEntry> = self
            .inner
            .read()
            .records
            .iter()
            .map(|(id, (state, since))| InstallationEntry {
                id: id.clone(),
                state: *state,
                since: *since,
            })
            .collect();
        entries.sort_by(|a, b| a.since.cmp(&b.since).then_with(|| a.id.cmp(&b.id)));
        entries
    }
}

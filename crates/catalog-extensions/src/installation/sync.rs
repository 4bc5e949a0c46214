//! Cross-process synchronization of the installation store.
//!
//! The controlling process owns the mutation entry points. Each successful
//! local transition is broadcast on its event channel, and the observing
//! process re-applies it to its own store. A transition the observer
//! rejects means the two stores have diverged; it is logged at error level
//! and returned from the sink.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use catalog_core::error::ErrorKind;
use catalog_core::{AppError, AppResult, Disposer};
use catalog_ipc::{EmitterChannel, EventSink, IpcChannels};

use super::events::{InstallationEvent, InstallationEventKind};
use super::guard::PreInstallGuard;
use super::store::InstallationStateStore;

/// Mutation entry points for the controlling process.
#[derive(Debug)]
pub struct InstallationStateController {
    store: InstallationStateStore,
    emitters: HashMap<InstallationEventKind, EmitterChannel<Value>>,
}

impl InstallationStateController {
    /// Creates a controller broadcasting on `{prefix}:*` channels.
    pub fn new(store: InstallationStateStore, channels: &IpcChannels, prefix: &str) -> Self {
        let emitters: HashMap<_, EmitterChannel<Value>> = InstallationEventKind::ALL
            .into_iter()
            .map(|kind| (kind, channels.register_emitter_channel(kind.channel(prefix))))
            .collect();

        info!(prefix = %prefix, "Installation state controller ready");
        Self { store, emitters }
    }

    /// Returns the local store.
    pub fn store(&self) -> &InstallationStateStore {
        &self.store
    }

    /// Marks `id` as installing and notifies the peer.
    pub fn set_installing(&self, id: &str) -> AppResult<()> {
        self.commit(InstallationEvent::SetInstalling(id.to_string()))
    }

    /// Returns `id` to idle after installing and notifies the peer.
    pub fn clear_installing(&self, id: &str) -> AppResult<()> {
        self.commit(InstallationEvent::ClearInstalling(id.to_string()))
    }

    /// Marks `id` as uninstalling and notifies the peer.
    pub fn set_uninstalling(&self, id: &str) -> AppResult<()> {
        self.commit(InstallationEvent::SetUninstalling(id.to_string()))
    }

    /// Returns `id` to idle after uninstalling and notifies the peer.
    pub fn clear_uninstalling(&self, id: &str) -> AppResult<()> {
        self.commit(InstallationEvent::ClearUninstalling(id.to_string()))
    }

    /// Opens a pre-install phase on both sides.
    ///
    /// Releasing the guard closes it on both sides. If the peer cannot be
    /// told about the phase, it is not opened locally either.
    pub fn start_pre_install(&self) -> AppResult<PreInstallGuard> {
        let token = Uuid::new_v4();
        self.commit(InstallationEvent::StartPreInstall(token))?;

        let store = self.store.clone();
        let end = self
            .emitters
            .get(&InstallationEventKind::EndPreInstall)
            .cloned();

        Ok(PreInstallGuard::new(
            token,
            Disposer::new(move || {
                if !store.remove_pre_install(token) {
                    return;
                }
                if let Some(emitter) = end {
                    let event = InstallationEvent::EndPreInstall(token);
                    if let Err(e) = emitter.emit(&event.payload()) {
                        error!(token = %token, error = %e, "Failed to broadcast end of pre-install");
                    }
                }
            }),
        ))
    }

    /// Applies locally, then broadcasts.
    ///
    /// When the event never left this process the local transition is
    /// undone, so the caller can retry. When the peer received it and
    /// rejected it, the local transition stands and the error is returned.
    fn commit(&self, event: InstallationEvent) -> AppResult<()> {
        event.apply(&self.store)?;

        let Err(e) = broadcast(&self.emitters, &event) else {
            return Ok(());
        };

        if !was_delivered(&e) {
            let kind = event.kind();
            match event.inverse().apply(&self.store) {
                Ok(()) => warn!(kind = %kind, "Installation event not delivered, local change undone"),
                Err(undo) => error!(kind = %kind, error = %undo, "Failed to undo undelivered installation event"),
            }
        }
        Err(e)
    }
}

/// Whether a broadcast error came back from the peer rather than from the
/// link itself.
fn was_delivered(error: &AppError) -> bool {
    !(error.is(ErrorKind::Channel) || error.is(ErrorKind::Internal))
}

fn broadcast(
    emitters: &HashMap<InstallationEventKind, EmitterChannel<Value>>,
    event: &InstallationEvent,
) -> AppResult<()> {
    let kind = event.kind();
    let emitter = emitters
        .get(&kind)
        .ok_or_else(|| AppError::internal(format!("No emitter for installation event '{kind}'")))?;

    emitter.emit(&event.payload()).inspect_err(|e| {
        error!(kind = %kind, error = %e, "Failed to broadcast installation event");
    })
}

/// Mirrors the controller's events into `store` in the observing process.
///
/// Returns a disposer that unregisters every sink.
pub fn bind_observer(store: &InstallationStateStore, channels: &IpcChannels, prefix: &str) -> Disposer {
    let sinks: Vec<_> = InstallationEventKind::ALL
        .into_iter()
        .map(|kind| {
            let store = store.clone();
            channels.register_event_sink(kind.channel(prefix), move |payload: Value| {
                let event = InstallationEvent::decode(kind, payload)?;
                event.apply(&store).inspect_err(|e| {
                    error!(
                        kind = %kind,
                        error = %e,
                        "Installation state diverged between processes"
                    );
                })
            })
        })
        .collect();

    info!(prefix = %prefix, channels = sinks.len(), "Installation state observer bound");

    Disposer::all(sinks.into_iter().map(EventSink::into_disposer).collect())
}

#[cfg(test)]
mod tests {
    use catalog_ipc::{Envelope, LoopbackTransport, RawListener, Transport};

    use super::*;
    use crate::installation::state::InstallationState;

    const PREFIX: &str = "extension-installation-state-store";

    struct Processes {
        controller: InstallationStateController,
        observed: InstallationStateStore,
        binding: Disposer,
    }

    fn processes() -> Processes {
        let (main, renderer) = LoopbackTransport::pair();
        let main = IpcChannels::new(main);
        let renderer = IpcChannels::new(renderer);

        let observed = InstallationStateStore::new();
        let binding = bind_observer(&observed, &renderer, PREFIX);
        let controller = InstallationStateController::new(InstallationStateStore::new(), &main, PREFIX);

        Processes {
            controller,
            observed,
            binding,
        }
    }

    #[test]
    fn test_transitions_are_mirrored() {
        let p = processes();

        p.controller.set_installing("ext-a").unwrap();
        assert!(p.observed.is_installing("ext-a"));

        p.controller.clear_installing("ext-a").unwrap();
        p.controller.set_uninstalling("ext-a").unwrap();
        assert_eq!(
            p.observed.get_installation_state("ext-a"),
            InstallationState::Uninstalling
        );

        p.controller.clear_uninstalling("ext-a").unwrap();
        assert!(p.observed.is_idle("ext-a"));
    }

    #[test]
    fn test_illegal_local_transition_is_not_broadcast() {
        let p = processes();
        let err = p.controller.clear_installing("ext-a").unwrap_err();
        assert!(err.is(ErrorKind::InvalidTransition));
        assert!(p.observed.is_idle("ext-a"));
    }

    #[test]
    fn test_divergence_surfaces_to_sender() {
        let p = processes();
        p.observed.set_uninstalling("ext-a").unwrap();

        let err = p.controller.set_installing("ext-a").unwrap_err();
        assert!(err.is(ErrorKind::InvalidTransition));
        assert!(p.controller.store().is_installing("ext-a"));
        assert!(p.observed.is_uninstalling("ext-a"));
    }

    #[test]
    fn test_pre_install_is_mirrored() {
        let p = processes();

        let guard = p.controller.start_pre_install().unwrap();
        assert_eq!(p.observed.pre_installing_count(), 1);
        assert!(p.observed.any_pre_installing_or_installing());

        guard.dispose();
        guard.dispose();
        drop(guard);
        assert_eq!(p.controller.store().pre_installing_count(), 0);
        assert_eq!(p.observed.pre_installing_count(), 0);
    }

    #[test]
    fn test_disposed_binding_stops_mirroring() {
        let p = processes();
        p.binding.dispose();
        p.controller.set_installing("ext-a").unwrap();
        assert!(p.observed.is_idle("ext-a"));
    }

    #[test]
    fn test_controller_shares_store_with_clones() {
        let (main, _renderer) = LoopbackTransport::pair();
        let store = InstallationStateStore::new();
        let controller = InstallationStateController::new(store.clone(), &IpcChannels::new(main), PREFIX);

        controller.set_installing("ext-b").unwrap();
        assert!(store.is_installing("ext-b"));
        assert!(controller.store().is_installing("ext-b"));
    }

    /// A link whose peer has gone away.
    #[derive(Debug)]
    struct SeveredLink;

    impl Transport for SeveredLink {
        fn send(&self, envelope: Envelope) -> AppResult<()> {
            Err(AppError::channel(format!(
                "Transport closed while sending on '{}'",
                envelope.channel
            )))
        }

        fn listen(&self, _channel: &str, _listener: RawListener) -> Disposer {
            Disposer::new(|| {})
        }
    }

    fn severed_controller() -> InstallationStateController {
        let channels = IpcChannels::new(std::sync::Arc::new(SeveredLink));
        InstallationStateController::new(InstallationStateStore::new(), &channels, PREFIX)
    }

    #[test]
    fn test_undelivered_transition_is_undone() {
        let controller = severed_controller();

        let err = controller.set_installing("ext-a").unwrap_err();
        assert!(err.is(ErrorKind::Channel));
        assert!(controller.store().is_idle("ext-a"));

        let retry = controller.set_installing("ext-a").unwrap_err();
        assert!(retry.is(ErrorKind::Channel));
        assert!(controller.store().is_idle("ext-a"));
    }

    #[test]
    fn test_undelivered_clear_keeps_operation_open() {
        let (main, _renderer) = LoopbackTransport::pair();
        let store = InstallationStateStore::new();
        InstallationStateController::new(store.clone(), &IpcChannels::new(main), PREFIX)
            .set_uninstalling("ext-a")
            .unwrap();

        let severed = InstallationStateController::new(
            store.clone(),
            &IpcChannels::new(std::sync::Arc::new(SeveredLink)),
            PREFIX,
        );
        assert!(severed.clear_uninstalling("ext-a").is_err());
        assert!(store.is_uninstalling("ext-a"));
    }

    #[test]
    fn test_undelivered_pre_install_is_not_opened() {
        let controller = severed_controller();
        assert!(controller.start_pre_install().is_err());
        assert!(!controller.store().any_pre_installing());
    }
}

//! Two-process installation flows: a controlling side and an observing
//! side, linked by the loopback pair or by a byte stream.

use std::sync::Arc;
use std::time::Duration;

use catalog_core::config::ipc::IpcConfig;
use catalog_core::error::ErrorKind;
use catalog_extensions::{InstallationState, InstallationStateController, InstallationStateStore, bind_observer};
use catalog_ipc::{IpcChannels, LoopbackTransport, StreamTransport, Transport};

fn prefix() -> String {
    IpcConfig::default().installation_channel_prefix
}

/// Polls `condition` until it holds or five seconds pass.
async fn eventually(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[test]
fn test_install_flow_over_loopback() {
    let (main, renderer) = LoopbackTransport::pair();
    let observed = InstallationStateStore::new();
    let _binding = bind_observer(&observed, &IpcChannels::new(renderer), &prefix());
    let controller = InstallationStateController::new(
        InstallationStateStore::new(),
        &IpcChannels::new(main),
        &prefix(),
    );

    let download = controller.start_pre_install().unwrap();
    assert!(observed.any_pre_installing_or_installing());

    controller.set_installing("ext-a").unwrap();
    download.dispose();
    assert_eq!(observed.pre_installing_count(), 0);
    assert!(observed.any_pre_installing_or_installing());
    assert_eq!(observed.get_installation_state("ext-a"), InstallationState::Installing);

    let err = controller.set_uninstalling("ext-a").unwrap_err();
    assert!(err.is(ErrorKind::InvalidTransition));

    controller.clear_installing("ext-a").unwrap();
    assert!(observed.is_idle("ext-a"));
    assert!(!observed.any_pre_installing_or_installing());
}

#[tokio::test]
async fn test_install_flow_over_stream() {
    let config = IpcConfig::default();
    let (main_io, renderer_io) = tokio::io::duplex(4096);
    let (main_read, main_write) = tokio::io::split(main_io);
    let (renderer_read, renderer_write) = tokio::io::split(renderer_io);

    let main = StreamTransport::spawn(main_read, main_write, &config);
    let renderer = StreamTransport::spawn(renderer_read, renderer_write, &config);

    let observed = InstallationStateStore::new();
    let _binding = bind_observer(
        &observed,
        &IpcChannels::new(Arc::clone(&renderer) as Arc<dyn Transport>),
        &prefix(),
    );
    let controller = InstallationStateController::new(
        InstallationStateStore::new(),
        &IpcChannels::new(Arc::clone(&main) as Arc<dyn Transport>),
        &prefix(),
    );

    controller.set_installing("ext-a").unwrap();
    controller.set_uninstalling("ext-b").unwrap();
    eventually(|| observed.is_installing("ext-a") && observed.is_uninstalling("ext-b")).await;

    controller.clear_installing("ext-a").unwrap();
    controller.clear_uninstalling("ext-b").unwrap();
    {
        let _phase = controller.start_pre_install().unwrap();
        eventually(|| observed.any_pre_installing()).await;
    }
    eventually(|| !observed.any_pre_installing()).await;

    assert!(observed.is_idle("ext-a"));
    assert!(observed.is_idle("ext-b"));
    assert_eq!(observed.installing_count(), 0);

    main.close();
    renderer.close();
}

#[tokio::test]
async fn test_stream_observer_keeps_running_after_divergence() {
    let config = IpcConfig::default();
    let (main_io, renderer_io) = tokio::io::duplex(4096);
    let (main_read, main_write) = tokio::io::split(main_io);
    let (renderer_read, renderer_write) = tokio::io::split(renderer_io);

    let main = StreamTransport::spawn(main_read, main_write, &config);
    let renderer = StreamTransport::spawn(renderer_read, renderer_write, &config);

    let observed = InstallationStateStore::new();
    observed.set_uninstalling("ext-a").unwrap();
    let _binding = bind_observer(
        &observed,
        &IpcChannels::new(Arc::clone(&renderer) as Arc<dyn Transport>),
        &prefix(),
    );
    let controller = InstallationStateController::new(
        InstallationStateStore::new(),
        &IpcChannels::new(Arc::clone(&main) as Arc<dyn Transport>),
        &prefix(),
    );

    // Rejected on the observing side; the stream link cannot report it back.
    controller.set_installing("ext-a").unwrap();
    controller.set_installing("ext-b").unwrap();

    eventually(|| observed.is_installing("ext-b")).await;
    assert!(observed.is_uninstalling("ext-a"));
}

#[tokio::test]
async fn test_full_outbound_queue_leaves_state_unchanged() {
    let config = IpcConfig {
        outbound_capacity: 1,
        ..IpcConfig::default()
    };
    // The peer end is held but never read, so the writer stalls.
    let (main_io, _stalled_peer) = tokio::io::duplex(1);
    let (main_read, main_write) = tokio::io::split(main_io);
    let main = StreamTransport::spawn(main_read, main_write, &config);

    let controller = InstallationStateController::new(
        InstallationStateStore::new(),
        &IpcChannels::new(Arc::clone(&main) as Arc<dyn Transport>),
        &prefix(),
    );

    let mut rejected = None;
    for n in 0..16 {
        let id = format!("ext-{n}");
        match controller.set_installing(&id) {
            Ok(()) => assert!(controller.store().is_installing(&id)),
            Err(e) => {
                assert!(e.is(ErrorKind::Channel));
                rejected = Some(id);
                break;
            }
        }
    }

    let id = rejected.expect("outbound queue never filled");
    assert!(controller.store().is_idle(&id));

    let retry = controller.set_installing(&id).unwrap_err();
    assert!(retry.is(ErrorKind::Channel));
    assert!(controller.store().is_idle(&id));

    main.close();
}

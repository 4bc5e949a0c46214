//! # catalog-extensions
//!
//! Extension lifecycle bookkeeping. Tracks, per extension id, whether it
//! is idle, installing, or uninstalling, plus anonymous pre-install
//! phases that run before an id is known.
//!
//! The controlling process mutates the store through an
//! [`InstallationStateController`], which broadcasts every transition; the
//! observing process mirrors them with [`bind_observer`].

pub mod installation;

pub use installation::events::{InstallationEvent, InstallationEventKind};
pub use installation::guard::PreInstallGuard;
pub use installation::state::InstallationState;
pub use installation::store::{InstallationEntry, InstallationStateStore};
pub use installation::sync::{InstallationStateController, bind_observer};

//! Installation state machine and its cross-process synchronization.

pub mod events;
pub mod guard;
pub mod state;
pub mod store;
pub mod sync;

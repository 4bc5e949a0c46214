//! # catalog-ipc
//!
//! Named, one-directional message channels between two processes.
//! Provides:
//!
//! - A [`Transport`] abstraction carrying JSON envelopes
//! - [`LoopbackTransport`]: a synchronous in-memory pair for tests and
//!   single-process embedding
//! - [`StreamTransport`]: newline-delimited JSON over any async byte
//!   stream (pipes, sockets, child stdio)
//! - [`IpcChannels`]: typed emitters and event sinks on top of a transport
//!
//! Payloads are plain data: anything that round-trips through
//! `serde_json::Value`. Messages on one channel arrive in send order.

pub mod channel;
pub mod envelope;
pub mod transport;

pub use channel::{EmitterChannel, EventSink, IpcChannels};
pub use envelope::Envelope;
pub use transport::listeners::{ListenerTable, RawListener};
pub use transport::loopback::LoopbackTransport;
pub use transport::stream::StreamTransport;
pub use transport::Transport;

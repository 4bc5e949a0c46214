//! Byte-stream transport — newline-delimited JSON envelopes.
//!
//! Works over any `AsyncRead`/`AsyncWrite` pair: pipes, Unix sockets, or a
//! child's stdio. A writer task drains a bounded queue so send order is
//! preserved; a reader task decodes lines and dispatches them to local
//! listeners.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, error, info, warn};

use catalog_core::config::ipc::IpcConfig;
use catalog_core::{AppError, AppResult, Disposer};

use super::Transport;
use super::listeners::{ListenerTable, RawListener};
use crate::envelope::Envelope;

/// One end of a stream link.
#[derive(Debug)]
pub struct StreamTransport {
    /// Serialized envelopes waiting for the writer task
    outbound: mpsc::Sender<String>,
    /// Listeners fed by the reader task
    listeners: Arc<ListenerTable>,
    /// Background tasks, aborted on close
    tasks: [AbortHandle; 2],
}

impl StreamTransport {
    /// Starts the reader and writer tasks on the current runtime.
    pub fn spawn<R, W>(reader: R, writer: W, config: &IpcConfig) -> Arc<Self>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outbound, rx) = mpsc::channel(config.outbound_capacity.max(1));
        let listeners = Arc::new(ListenerTable::new());

        let writer_task = tokio::spawn(write_loop(writer, rx));
        let reader_task = tokio::spawn(read_loop(
            reader,
            Arc::clone(&listeners),
            config.max_line_length,
        ));

        info!(
            outbound_capacity = config.outbound_capacity,
            max_line_length = config.max_line_length,
            "Stream transport started"
        );

        Arc::new(Self {
            outbound,
            listeners,
            tasks: [writer_task.abort_handle(), reader_task.abort_handle()],
        })
    }

    /// Stops both background tasks. Pending outbound messages are dropped.
    pub fn close(&self) {
        for task in &self.tasks {
            task.abort();
        }
        debug!("Stream transport closed");
    }

    /// Whether the writer side can no longer accept messages.
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

impl Transport for StreamTransport {
    fn send(&self, envelope: Envelope) -> AppResult<()> {
        let line = serde_json::to_string(&envelope)?;
        self.outbound.try_send(line).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => AppError::channel(format!(
                "Outbound queue full while sending on '{}'",
                envelope.channel
            )),
            mpsc::error::TrySendError::Closed(_) => AppError::channel(format!(
                "Transport closed while sending on '{}'",
                envelope.channel
            )),
        })
    }

    fn listen(&self, channel: &str, listener: RawListener) -> Disposer {
        self.listeners.add(channel, listener)
    }
}

impl Drop for StreamTransport {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn write_loop<W>(writer: W, mut rx: mpsc::Receiver<String>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut sink = FramedWrite::new(writer, LinesCodec::new());

    while let Some(line) = rx.recv().await {
        if let Err(e) = sink.send(line).await {
            error!(error = %e, "Failed to write envelope, stopping writer");
            break;
        }
    }

    debug!("Stream writer finished");
}

async fn read_loop<R>(reader: R, listeners: Arc<ListenerTable>, max_line_length: usize)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(max_line_length));

    while let Some(next) = lines.next().await {
        let line = match next {
            Ok(line) => line,
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                warn!(max_line_length, "Discarding oversized envelope line");
                continue;
            }
            Err(LinesCodecError::Io(e)) => {
                error!(error = %e, "Stream read failed, stopping reader");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let envelope: Envelope = match serde_json::from_str(&line) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Discarding malformed envelope");
                continue;
            }
        };

        if let Err(e) = listeners.dispatch(&envelope.channel, envelope.payload) {
            error!(
                channel = %envelope.channel,
                error = %e,
                "Channel listener rejected message"
            );
        }
    }

    debug!("Stream reader finished");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{Value, json};
    use tokio::io::AsyncWriteExt;

    use super::*;

    fn linked_pair() -> (Arc<StreamTransport>, Arc<StreamTransport>) {
        let config = IpcConfig::default();
        let (left, right) = tokio::io::duplex(4096);
        let (left_read, left_write) = tokio::io::split(left);
        let (right_read, right_write) = tokio::io::split(right);
        (
            StreamTransport::spawn(left_read, left_write, &config),
            StreamTransport::spawn(right_read, right_write, &config),
        )
    }

    fn collector(
        transport: &StreamTransport,
        channel: &str,
    ) -> (Disposer, mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let disposer = transport.listen(
            channel,
            Arc::new(move |payload| {
                let _ = tx.send(payload);
                Ok(())
            }),
        );
        (disposer, rx)
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Value>) -> Value {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for message")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_envelopes_arrive_in_send_order() {
        let (a, b) = linked_pair();
        let (_guard, mut rx) = collector(&b, "numbers");

        for n in 0..5 {
            a.send(Envelope::new("numbers", json!(n))).unwrap();
        }

        for n in 0..5 {
            assert_eq!(next(&mut rx).await, json!(n));
        }
    }

    #[tokio::test]
    async fn test_both_directions() {
        let (a, b) = linked_pair();
        let (_ga, mut at_a) = collector(&a, "pong");
        let (_gb, mut at_b) = collector(&b, "ping");

        a.send(Envelope::new("ping", json!("hello"))).unwrap();
        assert_eq!(next(&mut at_b).await, json!("hello"));

        b.send(Envelope::new("pong", json!({"ok": true}))).unwrap();
        assert_eq!(next(&mut at_a).await, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_malformed_line_is_skipped() {
        let (raw, peer) = tokio::io::duplex(1024);
        let (peer_read, peer_write) = tokio::io::split(peer);
        let transport = StreamTransport::spawn(peer_read, peer_write, &IpcConfig::default());
        let (_guard, mut rx) = collector(&transport, "c");

        let (_raw_read, mut raw_write) = tokio::io::split(raw);
        raw_write
            .write_all(b"not json\n\n{\"channel\":\"c\",\"payload\":1}\n")
            .await
            .unwrap();

        assert_eq!(next(&mut rx).await, json!(1));
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let (a, _b) = linked_pair();
        a.close();
        tokio::time::timeout(Duration::from_secs(5), async {
            while !a.is_closed() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("writer did not stop");

        assert!(a.send(Envelope::new("late", Value::Null)).is_err());
    }
}

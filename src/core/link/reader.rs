use crate::core::link::protocol::ChunkDecoder;
use crate::core::link::transport::Transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// Polls the transport and drains buffered bytes to the decoder.
///
/// Each drain reads until `read_available` reports nothing left, forwarding
/// every non-empty chunk to the decoder synchronously and in arrival order.
/// A drain error only ends the current drain; the transport routinely errors
/// once fully drained or closed, and teardown is the close signal's job, not
/// ours. The loop never writes and never touches the writer's gate.
pub struct ReadLoop {
    transport: Arc<Mutex<Box<dyn Transport>>>,
    decoder: Arc<Mutex<Box<dyn ChunkDecoder>>>,
    draining: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl ReadLoop {
    pub fn new(
        transport: Arc<Mutex<Box<dyn Transport>>>,
        decoder: Arc<Mutex<Box<dyn ChunkDecoder>>>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            transport,
            decoder,
            draining: Arc::new(AtomicBool::new(false)),
            poll_interval,
        }
    }

    /// Spawn the poll task; it exits on its own once the transport closes
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(self.poll_interval).await;
                if !self.drain().await {
                    debug!("transport closed, read loop exiting");
                    break;
                }
            }
        })
    }

    /// Drain all currently buffered data; returns false once the transport
    /// is closed. Reentrant calls while a drain is in progress return
    /// immediately without starting a second drain.
    pub async fn drain(&self) -> bool {
        if self.draining.swap(true, Ordering::AcqRel) {
            return true;
        }
        let still_open = self.drain_once().await;
        self.draining.store(false, Ordering::Release);
        still_open
    }

    async fn drain_once(&self) -> bool {
        let mut transport = self.transport.lock().await;
        if !transport.is_open() {
            return false;
        }

        loop {
            match transport.read_available() {
                Ok(Some(chunk)) if !chunk.is_empty() => {
                    trace!(len = chunk.len(), "inbound chunk");
                    let mut decoder = self.decoder.lock().await;
                    decoder.decode_chunk(&chunk);
                }
                Ok(_) => break,
                Err(e) => {
                    // Expected once the source is exhausted or the port
                    // went away; the close signal handles the latter.
                    debug!(error = %e, "drain ended");
                    break;
                }
            }
        }
        true
    }
}

use crate::core::events::{EventBus, SessionEvent};
use crate::core::link::transport::Transport;
use crate::domain::error::PrintLinkResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// State protected by the write gate: when the previous gated write finished
struct WriteSlot {
    last_write: Option<Instant>,
}

/// Serializes all outbound writes to one transport.
///
/// The gate is a fair `tokio::sync::Mutex`, so competing gated callers are
/// queued first-come-first-served and their writes reach the transport in
/// call order. A mandatory minimum gap between consecutive gated writes is
/// enforced inside the gate because the printer needs settling time between
/// packets.
///
/// Bypass sends skip both the gate and the gap and lock only the transport
/// itself; their ordering relative to gated sends is undefined. They exist
/// for urgent out-of-band control (e.g. aborting mid-negotiation) that must
/// not wait behind queued packets.
#[derive(Clone)]
pub struct ExclusiveWriter {
    gate: Arc<Mutex<WriteSlot>>,
    transport: Arc<Mutex<Box<dyn Transport>>>,
    write_gap: Duration,
    events: EventBus,
}

impl ExclusiveWriter {
    pub fn new(
        transport: Arc<Mutex<Box<dyn Transport>>>,
        write_gap: Duration,
        events: EventBus,
    ) -> Self {
        Self {
            gate: Arc::new(Mutex::new(WriteSlot { last_write: None })),
            transport,
            write_gap,
            events,
        }
    }

    /// Write one packet, queued behind the gate unless `bypass` is set
    pub async fn send(&self, data: &[u8], bypass: bool) -> PrintLinkResult<()> {
        if bypass {
            self.write_now(data).await?;
            return Ok(());
        }

        let mut slot = self.gate.lock().await;
        if let Some(last) = slot.last_write {
            let since = last.elapsed();
            if since < self.write_gap {
                tokio::time::sleep(self.write_gap - since).await;
            }
        }
        self.write_now(data).await?;
        slot.last_write = Some(Instant::now());
        Ok(())
    }

    /// True while the underlying transport is still open
    pub async fn is_open(&self) -> bool {
        self.transport.lock().await.is_open()
    }

    async fn write_now(&self, data: &[u8]) -> PrintLinkResult<()> {
        {
            let mut transport = self.transport.lock().await;
            transport.write(data)?;
        }
        debug!(len = data.len(), packet = %hex::encode(data), "packet written");
        self.events.emit(&SessionEvent::PacketSent {
            data: data.to_vec(),
        });
        Ok(())
    }
}

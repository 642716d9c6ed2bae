use crate::core::events::{EventBus, SessionEvent};
use crate::core::link::protocol::{ChunkDecoder, DeviceProtocol};
use crate::core::link::reader::ReadLoop;
use crate::core::link::transport::{Transport, TransportOpener};
use crate::core::link::writer::ExclusiveWriter;
use crate::core::session::state::ConnectionStatus;
use crate::domain::config::SessionConfig;
use crate::domain::error::{PrintLinkError, PrintLinkResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Everything owned by one live connection. Dropped as a unit on teardown,
/// so a session can never hold two open transports.
struct ActiveLink {
    transport: Arc<Mutex<Box<dyn Transport>>>,
    writer: ExclusiveWriter,
    read_task: JoinHandle<()>,
    heartbeat_task: Option<JoinHandle<()>>,
    monitor_task: JoinHandle<()>,
}

/// Session with one remotely attached printer.
///
/// The session owns the transport exclusively and orchestrates the
/// connect/disconnect lifecycle: open, install the close and read observers,
/// drive the protocol collaborator's handshake and info fetch, then accept
/// sends. Clones share the same underlying session.
///
/// Concurrent `connect`/`disconnect` callers are serialized first-come-first-
/// served on the link slot; the session never reconnects on its own.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    opener: Box<dyn TransportOpener>,
    protocol: Arc<dyn DeviceProtocol>,
    decoder: Arc<Mutex<Box<dyn ChunkDecoder>>>,
    events: EventBus,
    endpoint: RwLock<Option<String>>,
    status: RwLock<ConnectionStatus>,
    last_error: RwLock<Option<String>>,
    /// Fair mutex: holds the active link and doubles as the FIFO gate that
    /// serializes competing connect/disconnect callers
    link: Mutex<Option<ActiveLink>>,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        opener: Box<dyn TransportOpener>,
        protocol: Arc<dyn DeviceProtocol>,
        decoder: Box<dyn ChunkDecoder>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                config,
                opener,
                protocol,
                decoder: Arc::new(Mutex::new(decoder)),
                events: EventBus::new(),
                endpoint: RwLock::new(None),
                status: RwLock::new(ConnectionStatus::Disconnected),
                last_error: RwLock::new(None),
                link: Mutex::new(None),
            }),
        }
    }

    /// Event registry for connect/disconnect/packet-sent notifications
    pub fn events(&self) -> EventBus {
        self.inner.events.clone()
    }

    /// Configure the endpoint used by the next `connect`
    pub async fn set_endpoint(&self, endpoint: impl Into<String>) {
        *self.inner.endpoint.write().await = Some(endpoint.into());
    }

    pub async fn endpoint(&self) -> Option<String> {
        self.inner.endpoint.read().await.clone()
    }

    pub async fn status(&self) -> ConnectionStatus {
        *self.inner.status.read().await
    }

    /// True only in the Connected state
    pub async fn is_connected(&self) -> bool {
        self.status().await == ConnectionStatus::Connected
    }

    /// Message of the most recent connect failure, if any
    pub async fn last_error(&self) -> Option<String> {
        self.inner.last_error.read().await.clone()
    }

    /// Open the configured endpoint and negotiate a usable session.
    ///
    /// Any prior connection is fully torn down first, so calling this twice
    /// leaves exactly one live transport. On handshake or info-fetch failure
    /// the transport is closed again and the original error propagates; the
    /// session is never left half-connected. Returns the negotiation result
    /// code on success.
    pub async fn connect(&self) -> PrintLinkResult<u8> {
        let mut slot = self.inner.link.lock().await;
        if let Some(old) = slot.take() {
            debug!("tearing down previous link before reconnect");
            self.teardown(old).await;
        }

        match self.establish(&mut slot).await {
            Ok(code) => {
                *self.inner.last_error.write().await = None;
                Ok(code)
            }
            Err(e) => {
                *self.inner.last_error.write().await = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Close the transport and stop all session tasks. Safe to call when
    /// already disconnected or never connected.
    pub async fn disconnect(&self) -> PrintLinkResult<()> {
        let mut slot = self.inner.link.lock().await;
        if let Some(link) = slot.take() {
            self.teardown(link).await;
            info!("session disconnected");
        } else {
            self.set_status(ConnectionStatus::Disconnected).await;
        }
        Ok(())
    }

    /// Queue one outbound packet through the exclusive writer.
    ///
    /// `bypass` skips the FIFO gate and the inter-write gap for urgent
    /// out-of-band control; its ordering relative to gated sends is
    /// undefined. Fails with `NotConnected` outside the Connected state,
    /// before any queueing, so failed sends never occupy the gate.
    pub async fn send(&self, data: &[u8], bypass: bool) -> PrintLinkResult<()> {
        if !self.is_connected().await {
            return Err(PrintLinkError::NotConnected);
        }
        let writer = {
            let slot = self.inner.link.lock().await;
            match slot.as_ref() {
                Some(link) => link.writer.clone(),
                None => return Err(PrintLinkError::NotConnected),
            }
        };
        writer.send(data, bypass).await
    }

    async fn establish(
        &self,
        slot: &mut Option<ActiveLink>,
    ) -> PrintLinkResult<u8> {
        let endpoint = self
            .inner
            .endpoint
            .read()
            .await
            .clone()
            .ok_or(PrintLinkError::EndpointNotSet)?;

        self.set_status(ConnectionStatus::Opening).await;
        let transport = match self
            .inner
            .opener
            .open(&endpoint, self.inner.config.baud_rate)
            .await
        {
            Ok(t) => t,
            Err(e) => {
                self.set_status(ConnectionStatus::Disconnected).await;
                return Err(e);
            }
        };

        let closed_rx = transport.closed_signal();
        let transport = Arc::new(Mutex::new(transport));
        let writer = ExclusiveWriter::new(
            Arc::clone(&transport),
            self.inner.config.write_gap(),
            self.inner.events.clone(),
        );
        let read_task = ReadLoop::new(
            Arc::clone(&transport),
            Arc::clone(&self.inner.decoder),
            self.inner.config.read_poll(),
        )
        .spawn();
        let monitor_task = self.spawn_close_monitor(closed_rx);

        self.set_status(ConnectionStatus::Negotiating).await;
        let result_code = match self.negotiate(&writer).await {
            Ok(code) => code,
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "negotiation failed, closing transport");
                self.teardown(ActiveLink {
                    transport,
                    writer,
                    read_task,
                    heartbeat_task: None,
                    monitor_task,
                })
                .await;
                return Err(e);
            }
        };

        let heartbeat_task = self
            .inner
            .config
            .heartbeat_interval()
            .map(|interval| self.spawn_heartbeat(writer.clone(), interval));

        *slot = Some(ActiveLink {
            transport,
            writer,
            read_task,
            heartbeat_task,
            monitor_task,
        });
        self.set_status(ConnectionStatus::Connected).await;

        let endpoint_label = self.endpoint_label(&endpoint);
        info!(endpoint = %endpoint, code = result_code, "printer connected");
        self.inner.events.emit(&SessionEvent::Connected {
            endpoint_label,
            result_code,
        });
        Ok(result_code)
    }

    async fn negotiate(&self, writer: &ExclusiveWriter) -> PrintLinkResult<u8> {
        let code = self.inner.protocol.handshake(writer).await?;
        match tokio::time::timeout(
            self.inner.config.info_timeout(),
            self.inner.protocol.fetch_device_info(writer),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(PrintLinkError::InfoFetch {
                    message: "device info retrieval timed out".to_string(),
                })
            }
        }
        Ok(code)
    }

    async fn teardown(&self, link: ActiveLink) {
        if let Some(heartbeat) = link.heartbeat_task {
            heartbeat.abort();
        }
        link.read_task.abort();
        {
            let mut transport = link.transport.lock().await;
            transport.close();
        }
        // The close monitor emits the Disconnected event exactly once per
        // close; waiting for it keeps event order stable across reconnects.
        let _ = link.monitor_task.await;
        self.set_status(ConnectionStatus::Disconnected).await;
    }

    fn spawn_close_monitor(&self, mut closed_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                if *closed_rx.borrow() {
                    break;
                }
                if closed_rx.changed().await.is_err() {
                    // Sender gone without a close signal; nothing to report.
                    return;
                }
            }
            *inner.status.write().await = ConnectionStatus::Disconnected;
            info!("transport closed");
            inner.events.emit(&SessionEvent::Disconnected);
        })
    }

    fn spawn_heartbeat(&self, writer: ExclusiveWriter, interval: Duration) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The immediate first tick would race the connect event.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !writer.is_open().await {
                    break;
                }
                match tokio::time::timeout(
                    inner.config.info_timeout(),
                    inner.protocol.heartbeat(&writer),
                )
                .await
                {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        if !writer.is_open().await {
                            break;
                        }
                        warn!(error = %e, "heartbeat failed");
                    }
                    Err(_) => warn!("heartbeat timed out"),
                }
            }
            debug!("heartbeat task exiting");
        })
    }

    fn endpoint_label(&self, endpoint: &str) -> String {
        match crate::infrastructure::serial::enumerate::scan() {
            Ok(ports) => ports
                .into_iter()
                .find(|descriptor| descriptor.address == endpoint)
                .map(|descriptor| descriptor.display_name)
                .unwrap_or_else(|| endpoint.to_string()),
            Err(_) => endpoint.to_string(),
        }
    }

    async fn set_status(&self, status: ConnectionStatus) {
        *self.inner.status.write().await = status;
    }
}

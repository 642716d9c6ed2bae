//! Shared test doubles: a scriptable transport, opener, protocol, and
//! decoder mirroring the shapes of the real serial implementations.
#![allow(dead_code)]

use async_trait::async_trait;
use printlink::{
    ChunkDecoder, DeviceProtocol, EventKind, ExclusiveWriter, PrintLinkError, PrintLinkResult,
    SessionEvent, Transport, TransportOpener,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;

pub struct PortState {
    open: AtomicBool,
    writes: Mutex<Vec<(Instant, Vec<u8>)>>,
    inbound: Mutex<VecDeque<Vec<u8>>>,
    closed_tx: watch::Sender<bool>,
}

/// Test-side controller for one mock transport
#[derive(Clone)]
pub struct MockPort {
    state: Arc<PortState>,
}

impl MockPort {
    pub fn push_inbound(&self, data: &[u8]) {
        self.state.inbound.lock().unwrap().push_back(data.to_vec());
    }

    /// Simulate the cable being pulled
    pub fn unplug(&self) {
        if self.state.open.swap(false, Ordering::SeqCst) {
            let _ = self.state.closed_tx.send(true);
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.open.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<(Instant, Vec<u8>)> {
        self.state.writes.lock().unwrap().clone()
    }

    pub fn written_payloads(&self) -> Vec<Vec<u8>> {
        self.writes().into_iter().map(|(_, data)| data).collect()
    }
}

struct MockTransport {
    state: Arc<PortState>,
}

impl Transport for MockTransport {
    fn write(&mut self, data: &[u8]) -> PrintLinkResult<()> {
        if !self.state.open.load(Ordering::SeqCst) {
            return Err(PrintLinkError::WriteFailed {
                message: "transport is closed".to_string(),
            });
        }
        self.state
            .writes
            .lock()
            .unwrap()
            .push((Instant::now(), data.to_vec()));
        Ok(())
    }

    fn read_available(&mut self) -> PrintLinkResult<Option<Vec<u8>>> {
        if !self.state.open.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.state.inbound.lock().unwrap().pop_front())
    }

    fn close(&mut self) {
        if self.state.open.swap(false, Ordering::SeqCst) {
            let _ = self.state.closed_tx.send(true);
        }
    }

    fn is_open(&self) -> bool {
        self.state.open.load(Ordering::SeqCst)
    }

    fn closed_signal(&self) -> watch::Receiver<bool> {
        self.state.closed_tx.subscribe()
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        self.close();
    }
}

struct OpenerState {
    ports: Mutex<VecDeque<Arc<PortState>>>,
    opened: AtomicUsize,
}

/// Opener handing out pre-scripted mock ports in order
#[derive(Clone)]
pub struct MockOpener {
    state: Arc<OpenerState>,
}

impl MockOpener {
    pub fn new() -> Self {
        Self {
            state: Arc::new(OpenerState {
                ports: Mutex::new(VecDeque::new()),
                opened: AtomicUsize::new(0),
            }),
        }
    }

    /// Queue one port for a future `open` call and return its controller
    pub fn expect_port(&self) -> MockPort {
        let (closed_tx, _) = watch::channel(false);
        let state = Arc::new(PortState {
            open: AtomicBool::new(true),
            writes: Mutex::new(Vec::new()),
            inbound: Mutex::new(VecDeque::new()),
            closed_tx,
        });
        self.state.ports.lock().unwrap().push_back(Arc::clone(&state));
        MockPort { state }
    }

    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportOpener for MockOpener {
    async fn open(&self, endpoint: &str, _baud_rate: u32) -> PrintLinkResult<Box<dyn Transport>> {
        let state = self.state.ports.lock().unwrap().pop_front();
        match state {
            Some(state) => {
                self.state.opened.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(MockTransport { state }))
            }
            None => Err(PrintLinkError::TransportUnavailable {
                message: format!("{}: no such port", endpoint),
            }),
        }
    }
}

/// The packet the mock protocol writes during its handshake
pub const HELLO_PACKET: &[u8] = &[0x03, 0x21, 0x01];

struct ProtocolState {
    handshake_error: Mutex<Option<String>>,
    info_error: Mutex<Option<String>>,
    info_delay: Mutex<Option<Duration>>,
    result_code: u8,
    heartbeats: AtomicUsize,
}

#[derive(Clone)]
pub struct MockProtocol {
    state: Arc<ProtocolState>,
}

impl MockProtocol {
    pub fn new(result_code: u8) -> Self {
        Self {
            state: Arc::new(ProtocolState {
                handshake_error: Mutex::new(None),
                info_error: Mutex::new(None),
                info_delay: Mutex::new(None),
                result_code,
                heartbeats: AtomicUsize::new(0),
            }),
        }
    }

    pub fn fail_handshake(&self, message: &str) {
        *self.state.handshake_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_info_fetch(&self, message: &str) {
        *self.state.info_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn delay_info_fetch(&self, delay: Duration) {
        *self.state.info_delay.lock().unwrap() = Some(delay);
    }

    pub fn heartbeats(&self) -> usize {
        self.state.heartbeats.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceProtocol for MockProtocol {
    async fn handshake(&self, writer: &ExclusiveWriter) -> PrintLinkResult<u8> {
        if let Some(message) = self.state.handshake_error.lock().unwrap().clone() {
            return Err(PrintLinkError::Handshake { message });
        }
        writer.send(HELLO_PACKET, false).await?;
        Ok(self.state.result_code)
    }

    async fn fetch_device_info(&self, _writer: &ExclusiveWriter) -> PrintLinkResult<()> {
        let delay = self.state.info_delay.lock().unwrap().clone();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.state.info_error.lock().unwrap().clone() {
            return Err(PrintLinkError::InfoFetch { message });
        }
        Ok(())
    }

    async fn heartbeat(&self, _writer: &ExclusiveWriter) -> PrintLinkResult<()> {
        self.state.heartbeats.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Decoder recording every chunk it receives, in arrival order
pub struct RecordingDecoder {
    chunks: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingDecoder {
    pub fn new() -> (Self, Arc<Mutex<Vec<Vec<u8>>>>) {
        let chunks = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                chunks: Arc::clone(&chunks),
            },
            chunks,
        )
    }
}

impl ChunkDecoder for RecordingDecoder {
    fn decode_chunk(&mut self, data: &[u8]) {
        self.chunks.lock().unwrap().push(data.to_vec());
    }
}

/// Subscribe to all event kinds and record their arrival order
pub fn record_events(session: &printlink::Session) -> Arc<Mutex<Vec<SessionEvent>>> {
    let log: Arc<Mutex<Vec<SessionEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let events = session.events();
    for kind in [
        EventKind::Connected,
        EventKind::Disconnected,
        EventKind::PacketSent,
    ] {
        let log = Arc::clone(&log);
        events.subscribe(kind, move |event| {
            log.lock().unwrap().push(event.clone());
        });
    }
    log
}

pub fn count_kind(log: &Arc<Mutex<Vec<SessionEvent>>>, kind: EventKind) -> usize {
    log.lock()
        .unwrap()
        .iter()
        .filter(|event| event.kind() == kind)
        .count()
}

use crate::domain::error::PrintLinkResult;
use async_trait::async_trait;
use tokio::sync::watch;

/// One physical serial connection.
///
/// At most one live instance exists per session; the session that opened the
/// handle owns it exclusively. Reads are non-blocking and only the read loop
/// calls them, so the trait needs no interior synchronization of its own.
pub trait Transport: Send {
    /// Write raw bytes; fails with `WriteFailed` when the handle is not open
    fn write(&mut self, data: &[u8]) -> PrintLinkResult<()>;

    /// Return currently buffered bytes, or `None` when nothing is pending.
    ///
    /// Never blocks. An error here is an expected end-of-data or closed-port
    /// signal; the caller treats it as the end of the current drain.
    fn read_available(&mut self) -> PrintLinkResult<Option<Vec<u8>>>;

    /// Close the handle and release the OS resource. Idempotent; the close
    /// signal fires exactly once regardless of how often this is called.
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Receiver that flips to `true` exactly once when the handle closes,
    /// whether caller-initiated or device-initiated (cable pulled)
    fn closed_signal(&self) -> watch::Receiver<bool>;
}

/// Factory seam for opening transports, so the session state machine stays
/// independent of the serial backend
#[async_trait]
pub trait TransportOpener: Send + Sync {
    /// Open the endpoint at the given baud rate; fails with
    /// `TransportUnavailable` when the port cannot be opened (missing,
    /// busy, or permission denied)
    async fn open(&self, endpoint: &str, baud_rate: u32) -> PrintLinkResult<Box<dyn Transport>>;
}

/// Discovered serial endpoint with a best-effort human-readable name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// Platform address, e.g. `/dev/ttyUSB0` or `COM7`
    pub address: String,
    /// Friendly name, falling back to `"unknown"` when the platform offers
    /// no usable hint
    pub display_name: String,
}

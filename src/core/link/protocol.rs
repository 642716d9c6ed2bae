use crate::core::link::writer::ExclusiveWriter;
use crate::domain::error::PrintLinkResult;
use async_trait::async_trait;

/// Receives raw inbound chunks, in arrival order, from the read loop.
///
/// Framing and parsing happen entirely behind this seam; the session core
/// never interprets packet contents.
pub trait ChunkDecoder: Send {
    fn decode_chunk(&mut self, data: &[u8]);
}

/// Printer protocol collaborator driving the negotiation phase of connect.
///
/// The collaborator sends through the [`ExclusiveWriter`] it is handed and
/// observes responses through whatever channel its decoder half surfaces
/// them on; the session only cares about success, failure, and the
/// negotiation result code.
#[async_trait]
pub trait DeviceProtocol: Send + Sync {
    /// Run the initial handshake; returns the negotiation result code.
    /// Failures surface as `Handshake` errors and abort the connect.
    async fn handshake(&self, writer: &ExclusiveWriter) -> PrintLinkResult<u8>;

    /// Fetch device info after a successful handshake. Failures surface as
    /// `InfoFetch` errors and abort the connect. The session enforces the
    /// configured timeout around this call.
    async fn fetch_device_info(&self, writer: &ExclusiveWriter) -> PrintLinkResult<()>;

    /// Periodic health check; called on the configured interval while the
    /// session is connected. Errors are recoverable and only logged.
    async fn heartbeat(&self, writer: &ExclusiveWriter) -> PrintLinkResult<()>;
}

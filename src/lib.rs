//! PrintLink Library
//!
//! Session manager for remotely attached serial label printers: owns the
//! physical transport, serializes outbound writes behind a FIFO gate with a
//! mandatory inter-write gap, drains inbound bytes to a decoder collaborator,
//! and exposes connect/disconnect lifecycle with observable events.
//!
//! The printer protocol itself (packet framing, print-task state machine,
//! heartbeat payloads) lives behind the [`DeviceProtocol`] and
//! [`ChunkDecoder`] seams; this crate never interprets packet contents.

pub mod core;
pub mod domain;
pub mod infrastructure;

pub use domain::config::{PrintLinkConfig, SessionConfig};
pub use domain::error::{PrintLinkError, PrintLinkResult};

pub use core::events::{EventBus, EventKind, ListenerId, SessionEvent};
pub use core::link::{
    ChunkDecoder, DeviceProtocol, EndpointDescriptor, ExclusiveWriter, ReadLoop, Transport,
    TransportOpener,
};
pub use core::session::{ConnectionStatus, Session};

pub use infrastructure::serial::{scan, SerialOpener};

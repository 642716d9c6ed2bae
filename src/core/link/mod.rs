// Link module - Transport seam, exclusive writer, and read loop
pub mod protocol;
pub mod reader;
pub mod transport;
pub mod writer;

pub use protocol::{ChunkDecoder, DeviceProtocol};
pub use reader::ReadLoop;
pub use transport::{EndpointDescriptor, Transport, TransportOpener};
pub use writer::ExclusiveWriter;

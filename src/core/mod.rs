// Core module - Session management and transport coordination
pub mod events;
pub mod link;
pub mod session;

pub use events::{EventBus, EventKind, ListenerId, SessionEvent};
pub use link::{ChunkDecoder, DeviceProtocol, ExclusiveWriter, ReadLoop};
pub use session::{ConnectionStatus, Session};

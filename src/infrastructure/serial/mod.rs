// Serial module - serialport-backed transport and enumeration
pub mod enumerate;
pub mod transport;

pub use enumerate::scan;
pub use transport::{SerialOpener, SerialTransport};

// Session module - Printer session state machine
pub mod session;
pub mod state;

pub use session::Session;
pub use state::ConnectionStatus;

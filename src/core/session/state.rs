/// Connection status of a printer session.
///
/// `Disconnected` is reachable from every other state; the forward path is
/// `Disconnected → Opening → Negotiating → Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No transport open
    Disconnected,
    /// Transport open in progress
    Opening,
    /// Transport open, handshake and info fetch running
    Negotiating,
    /// Session usable; sends are accepted
    Connected,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Opening => write!(f, "Opening"),
            ConnectionStatus::Negotiating => write!(f, "Negotiating"),
            ConnectionStatus::Connected => write!(f, "Connected"),
        }
    }
}

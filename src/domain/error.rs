use thiserror::Error;

/// PrintLink unified error type
#[derive(Error, Debug)]
pub enum PrintLinkError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No endpoint configured")]
    EndpointNotSet,

    #[error("Transport unavailable: {message}")]
    TransportUnavailable { message: String },

    #[error("Printer not connected")]
    NotConnected,

    #[error("Transport write failed: {message}")]
    WriteFailed { message: String },

    #[error("Handshake failed: {message}")]
    Handshake { message: String },

    #[error("Device info retrieval failed: {message}")]
    InfoFetch { message: String },

    #[error("Operation timed out")]
    Timeout,

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type PrintLinkResult<T> = Result<T, PrintLinkError>;

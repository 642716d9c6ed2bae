use crate::core::link::transport::{Transport, TransportOpener};
use crate::domain::error::{PrintLinkError, PrintLinkResult};
use async_trait::async_trait;
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// `serialport`-backed transport handle.
///
/// The port is dropped on close, releasing the OS resource on every exit
/// path. Fatal read/write errors (device unplugged, port revoked) mark the
/// handle closed and fire the close signal, the same signal a caller
/// initiated close fires.
pub struct SerialTransport {
    port: Option<Box<dyn SerialPort>>,
    closed_tx: watch::Sender<bool>,
}

impl SerialTransport {
    fn new(port: Box<dyn SerialPort>) -> Self {
        let (closed_tx, _) = watch::channel(false);
        Self {
            port: Some(port),
            closed_tx,
        }
    }

    /// Timeout-class errors are the serial layer's way of saying "no data";
    /// anything else means the port is gone.
    fn is_fatal(kind: std::io::ErrorKind) -> bool {
        !matches!(
            kind,
            std::io::ErrorKind::TimedOut
                | std::io::ErrorKind::WouldBlock
                | std::io::ErrorKind::Interrupted
        )
    }

    fn mark_closed(&mut self) {
        if self.port.take().is_some() {
            warn!("serial port lost, marking transport closed");
            let _ = self.closed_tx.send(true);
        }
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, data: &[u8]) -> PrintLinkResult<()> {
        let port = self.port.as_mut().ok_or_else(|| PrintLinkError::WriteFailed {
            message: "transport is closed".to_string(),
        })?;

        match port.write_all(data) {
            Ok(()) => {
                debug!(len = data.len(), "wrote to serial port");
                Ok(())
            }
            Err(e) => {
                if Self::is_fatal(e.kind()) {
                    self.mark_closed();
                }
                Err(PrintLinkError::WriteFailed {
                    message: e.to_string(),
                })
            }
        }
    }

    fn read_available(&mut self) -> PrintLinkResult<Option<Vec<u8>>> {
        let port = match self.port.as_mut() {
            Some(port) => port,
            None => return Ok(None),
        };

        let pending = match port.bytes_to_read() {
            Ok(0) => return Ok(None),
            Ok(n) => n as usize,
            Err(e) => {
                self.mark_closed();
                return Err(e.into());
            }
        };

        let mut buffer = vec![0u8; pending];
        match port.read(&mut buffer) {
            Ok(0) => Ok(None),
            Ok(n) => {
                buffer.truncate(n);
                Ok(Some(buffer))
            }
            Err(e) => {
                if Self::is_fatal(e.kind()) {
                    self.mark_closed();
                    Err(e.into())
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            info!("serial port closed");
            let _ = self.closed_tx.send(true);
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn closed_signal(&self) -> watch::Receiver<bool> {
        self.closed_tx.subscribe()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens `SerialTransport`s with a fixed open timeout
pub struct SerialOpener {
    open_timeout: Duration,
}

impl SerialOpener {
    pub fn new(open_timeout: Duration) -> Self {
        Self { open_timeout }
    }
}

#[async_trait]
impl TransportOpener for SerialOpener {
    async fn open(&self, endpoint: &str, baud_rate: u32) -> PrintLinkResult<Box<dyn Transport>> {
        let port = serialport::new(endpoint, baud_rate)
            .timeout(self.open_timeout)
            .open()
            .map_err(|e| PrintLinkError::TransportUnavailable {
                message: format!("{}: {}", endpoint, e),
            })?;

        info!(endpoint = %endpoint, baud_rate, "serial port opened");
        Ok(Box::new(SerialTransport::new(port)))
    }
}

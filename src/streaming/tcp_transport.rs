//! TCP transport with bounded blocking calls.
//!
//! Reads use a short timeout so a waiting session can notice shutdown
//! between polls.

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::streaming::error::TransportError;
use crate::streaming::transport::{Endpoint, Transport};

pub struct TcpTransport {
    stream: Option<TcpStream>,
    connect_timeout: Duration,
    poll_interval: Duration,
    write_timeout: Duration,
}

impl TcpTransport {
    pub fn new(connect_timeout: Duration, poll_interval: Duration, write_timeout: Duration) -> Self {
        Self {
            stream: None,
            connect_timeout,
            poll_interval,
            write_timeout,
        }
    }

    fn open(&self, endpoint: &Endpoint) -> std::io::Result<TcpStream> {
        let mut last_err = None;
        for addr in (endpoint.host.as_str(), endpoint.port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            std::io::Error::new(ErrorKind::AddrNotAvailable, "host resolved to no addresses")
        }))
    }

    fn stream(&mut self) -> Result<&mut TcpStream, TransportError> {
        self.stream.as_mut().ok_or(TransportError::NotConnected)
    }

    /// Drops the connection after a failed call and classifies the error.
    fn fail(&mut self, err: std::io::Error) -> TransportError {
        self.stream = None;
        match err.kind() {
            ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::UnexpectedEof
            | ErrorKind::WriteZero => TransportError::Disconnected,
            _ => TransportError::Io(err),
        }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(2),
            Duration::from_millis(250),
            Duration::from_secs(5),
        )
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, endpoint: &Endpoint) -> Result<(), TransportError> {
        self.disconnect();
        debug!(%endpoint, "Connecting");

        let stream = self.open(endpoint).map_err(|source| TransportError::ConnectFailed {
            endpoint: endpoint.to_string(),
            source,
        })?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(self.poll_interval))?;
        stream.set_write_timeout(Some(self.write_timeout))?;

        info!(%endpoint, "Connected");
        self.stream = Some(stream);
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<Option<usize>, TransportError> {
        let result = self.stream()?.read(buf);
        match result {
            Ok(0) => {
                self.stream = None;
                Err(TransportError::Disconnected)
            }
            Ok(n) => Ok(Some(n)),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let result = self.stream()?.write_all(data);
        result.map_err(|e| self.fail(e))
    }
}

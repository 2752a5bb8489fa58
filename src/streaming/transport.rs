use std::fmt;

use crate::streaming::error::TransportError;

/// Remote peer address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Blocking, connection-oriented byte transport used by the session.
pub trait Transport {
    /// Drops any existing connection and opens a new one.
    fn connect(&mut self, endpoint: &Endpoint) -> Result<(), TransportError>;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Waits for incoming bytes. `Ok(None)` means the poll interval elapsed
    /// with nothing received; `Ok(Some(n))` always has `n >= 1`. A closed
    /// connection is `Err(TransportError::Disconnected)`.
    fn receive(&mut self, buf: &mut [u8]) -> Result<Option<usize>, TransportError>;

    /// Sends all of `data`.
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;
}

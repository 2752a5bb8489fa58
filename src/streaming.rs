//! Image streaming module
//!
//! Delivers annotated frames to a remote peer over TCP. The peer asks for an
//! image by sending any byte; each answer is a 13-byte ASCII length header
//! followed by the encoded image.

mod backoff;
mod error;
pub mod protocol;
mod session;
mod tcp_transport;
mod transport;

#[cfg(test)]
mod tests;

pub use backoff::Backoff;
pub use error::{ProtocolError, SessionError, TransportError};
pub use protocol::{encode_header, HEADER_LEN};
pub use session::{
    DeliveryMode, SessionConfig, SessionConfigBuilder, SessionStats, StreamingSession, StreamingState,
};
pub use tcp_transport::TcpTransport;
pub use transport::{Endpoint, Transport};

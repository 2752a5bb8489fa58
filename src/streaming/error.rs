use thiserror::Error;

use crate::thermal_pipeline::{CameraError, EncodeError, ProcessingError};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Peer disconnected")]
    Disconnected,

    #[error("Transport is not connected")]
    NotConnected,

    #[error("Failed to connect to {endpoint}: {source}")]
    ConnectFailed {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Payload of {0} bytes does not fit the 10-digit length header")]
    PayloadTooLarge(usize),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Camera failed: {0}")]
    Camera(#[from] CameraError),

    #[error("Frame processing failed: {0}")]
    Processing(#[from] ProcessingError),

    #[error("Frame encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

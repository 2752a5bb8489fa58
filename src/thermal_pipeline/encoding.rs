//! Display frame encoding module
//!
//! Compressed byte buffers for the wire and for snapshots on disk.

mod jpeg_encoder;
mod writer;


pub use jpeg_encoder::{JpegFrameEncoder, DEFAULT_JPEG_QUALITY};
pub use writer::{write_frame_file, FrameEncoder};

use std::path::Path;

use tracing::debug;

use crate::thermal_pipeline::common::error::{EncodeError, PipelineError, Result};
use crate::thermal_pipeline::frame::DisplayFrame;

pub trait FrameEncoder {
    fn encode(&self, frame: &DisplayFrame) -> std::result::Result<Vec<u8>, EncodeError>;

    /// File extension, without the dot, for files holding this encoding.
    fn extension(&self) -> &'static str;
}

/// Encodes `frame` and writes it to `path`, replacing any existing file.
pub fn write_frame_file<E: FrameEncoder + ?Sized>(
    encoder: &E,
    frame: &DisplayFrame,
    path: &Path,
) -> Result<()> {
    let bytes = encoder.encode(frame)?;
    std::fs::write(path, &bytes).map_err(PipelineError::Io)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Frame written");
    Ok(())
}

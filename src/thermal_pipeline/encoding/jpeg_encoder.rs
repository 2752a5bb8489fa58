use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use tracing::trace;

use crate::thermal_pipeline::common::error::EncodeError;
use crate::thermal_pipeline::encoding::writer::FrameEncoder;
use crate::thermal_pipeline::frame::DisplayFrame;

pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Baseline JPEG encoding through the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct JpegFrameEncoder {
    quality: u8,
}

impl JpegFrameEncoder {
    /// Quality is clamped to `1..=100`.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegFrameEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl FrameEncoder for JpegFrameEncoder {
    fn encode(&self, frame: &DisplayFrame) -> Result<Vec<u8>, EncodeError> {
        let (width, height) = frame.image.dimensions();
        if frame.image.as_raw().len() != (width * height * 3) as usize {
            return Err(EncodeError::BufferLayout(width, height));
        }

        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, self.quality)
            .encode(frame.image.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| EncodeError::Jpeg(e.to_string()))?;

        trace!(width, height, bytes = buffer.len(), quality = self.quality, "JPEG encoded");
        Ok(buffer)
    }

    fn extension(&self) -> &'static str {
        "jpeg"
    }
}

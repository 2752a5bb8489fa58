use std::path::PathBuf;

use crate::streaming::{DeliveryMode, Endpoint, SessionConfig};
use crate::thermal_pipeline::camera::{SEEK_COMPACT_HEIGHT, SEEK_COMPACT_WIDTH};
use crate::thermal_pipeline::encoding::DEFAULT_JPEG_QUALITY;
use crate::thermal_pipeline::{
    CalibrationConstants, Colormap, ProcessingConfig, ProcessingError, Rotation,
};

/// Where raw frames come from.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraSource {
    /// Little-endian u16 frame dump on disk
    Replay {
        path: PathBuf,
        width: usize,
        height: usize,
        device_sensor_value: i32,
        looping: bool,
    },
    /// Generated moving hot spot
    Synthetic {
        width: usize,
        height: usize,
        device_sensor_value: i32,
    },
}

impl Default for CameraSource {
    fn default() -> Self {
        CameraSource::Synthetic {
            width: SEEK_COMPACT_WIDTH,
            height: SEEK_COMPACT_HEIGHT,
            device_sensor_value: 6616,
        }
    }
}

/// Where display frames go.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkConfig {
    Local {
        preview_path: PathBuf,
        snapshot_dir: PathBuf,
    },
    Streaming {
        endpoint: Endpoint,
        delivery: DeliveryMode,
    },
}

impl SinkConfig {
    pub fn is_streaming(&self) -> bool {
        matches!(self, SinkConfig::Streaming { .. })
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig::Local {
            preview_path: PathBuf::from("preview.jpeg"),
            snapshot_dir: PathBuf::from("."),
        }
    }
}

/// Everything the binary needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub calibration: CalibrationConstants,
    pub processing: ProcessingConfig,
    pub camera: CameraSource,
    pub sink: SinkConfig,
    pub jpeg_quality: u8,
    /// Stamp wall-clock time on every frame
    pub timestamp: bool,
}

impl AppConfig {
    /// Processing defaults of the local viewer: 3x, no rotation, warning above 45C.
    pub fn local_processing() -> ProcessingConfig {
        ProcessingConfig::builder()
            .scale(3.0)
            .colormap(Some(Colormap::Hot))
            .rotation(Rotation::None)
            .warning_threshold_celsius(45.0)
            .warning_text("WARNING")
            .build()
    }

    /// Processing defaults of the streamer: 4x, rotated 90, warning above 35C.
    pub fn streaming_processing() -> ProcessingConfig {
        ProcessingConfig::builder()
            .scale(4.0)
            .colormap(Some(Colormap::Hot))
            .rotation(Rotation::Deg90)
            .warning_threshold_celsius(35.0)
            .warning_text("DEMAM")
            .build()
    }

    /// Defaults matching `sink`.
    pub fn for_sink(sink: SinkConfig) -> Self {
        // Frames served on request carry no clock, pushed and local frames do.
        let timestamp = !matches!(
            sink,
            SinkConfig::Streaming {
                delivery: DeliveryMode::OnRequest,
                ..
            }
        );
        let processing = if sink.is_streaming() {
            Self::streaming_processing()
        } else {
            Self::local_processing()
        };
        Self {
            calibration: CalibrationConstants::default(),
            processing,
            camera: CameraSource::default(),
            sink,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            timestamp,
        }
    }

    /// Checks the settings that are otherwise only caught frame by frame.
    pub fn validate(&self) -> Result<(), ProcessingError> {
        self.processing.validate()
    }

    /// Session settings, or `None` for the local sink.
    pub fn session_config(&self) -> Option<SessionConfig> {
        match &self.sink {
            SinkConfig::Streaming { endpoint, delivery } => Some(
                SessionConfig::builder()
                    .endpoint(endpoint.clone())
                    .delivery(*delivery)
                    .timestamp(self.timestamp)
                    .build(),
            ),
            SinkConfig::Local { .. } => None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_sink(SinkConfig::default())
    }
}

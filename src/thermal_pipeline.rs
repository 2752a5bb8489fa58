//! Thermal image pipeline module
//!
//! Calibration, frame processing, encoding and camera acquisition for raw
//! 14-bit thermal sensor frames.

pub mod calibration;
pub mod camera;
pub mod common;
pub mod encoding;
pub mod frame;
pub mod processing;

pub use common::{CameraError, EncodeError, PipelineError, ProcessingError, Result};

pub use calibration::{AffineCorrection, CalibrationConstants, CalibrationModel, TemperatureReadings};

pub use camera::{RawDumpCamera, SyntheticCamera, ThermalCamera};

pub use encoding::{FrameEncoder, JpegFrameEncoder};

pub use frame::{DisplayFrame, RawFrame};

pub use processing::{Colormap, FrameProcessor, ProcessingConfig, ProcessingConfigBuilder, Rotation};

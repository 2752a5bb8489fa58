//! Frame processing module
//!
//! Converts a raw 14-bit frame into an annotated RGB display frame:
//! calibration of the extrema, contrast stretch, rotation, scaling, legend,
//! pseudo-color and the temperature overlay.

pub mod colormap;
pub mod config;
mod font;
pub mod grayscale;
pub mod overlay;
mod processor;
mod timing;


pub use colormap::Colormap;
pub use config::{AnnotationLayout, ProcessingConfig, ProcessingConfigBuilder, Rotation, LEGEND_WIDTH};
pub use processor::{format_temperature, FrameProcessor};
pub use timing::{ProcessingStage, ProcessingTimings};

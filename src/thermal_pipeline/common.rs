//! Common utilities module
//!
//! This module contains the error types shared across the thermal pipeline.

pub mod error;

pub use error::{CameraError, EncodeError, PipelineError, ProcessingError, Result};

//! Camera acquisition module
//!
//! The pipeline consumes frames through `ThermalCamera`. Two sources ship
//! with the crate: a replay of raw frame dumps and a synthetic scene.

mod replay;
mod source;
mod synthetic;


pub use replay::RawDumpCamera;
pub use source::ThermalCamera;
pub use synthetic::SyntheticCamera;

/// Sensor grid of the Seek Thermal Compact.
pub const SEEK_COMPACT_WIDTH: usize = 206;
pub const SEEK_COMPACT_HEIGHT: usize = 156;

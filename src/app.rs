//! Application loop
//!
//! Wires a camera, the frame processor and one output sink together: either
//! a local preview with snapshot commands or a streaming session.

mod config;
mod display;
mod runner;


pub use config::{AppConfig, CameraSource, SinkConfig};
pub use display::{parse_command, DisplayCommand, LocalDisplay, PreviewFileDisplay};
pub use runner::{open_camera, run, run_local, save_snapshot, LocalStats};

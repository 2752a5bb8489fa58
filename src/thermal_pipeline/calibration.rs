//! Calibration model
//!
//! Pure functions mapping raw sensor units and the auxiliary device
//! thermistor reading into degrees Celsius.

mod model;
pub mod types;

#[cfg(test)]
mod tests;

pub use model::{CalibrationModel, TemperatureReadings};
pub use types::{AffineCorrection, CalibrationConstants};

use tracing::trace;

use crate::thermal_pipeline::calibration::types::CalibrationConstants;

/// Celsius readings derived from one frame's raw extrema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReadings {
    pub min: f64,
    pub max: f64,
    pub center: f64,
    pub device_kelvin: f64,
}

/// Thermistor inversion plus the empirical raw-to-Celsius fit.
#[derive(Debug, Clone, Default)]
pub struct CalibrationModel {
    constants: CalibrationConstants,
}

impl CalibrationModel {
    pub fn new(constants: CalibrationConstants) -> Self {
        debug_assert!(constants.beta_coefficient != 0.0);
        Self { constants }
    }

    pub fn constants(&self) -> &CalibrationConstants {
        &self.constants
    }

    /// Single-beta thermistor inversion:
    /// `1/T = (ln(s) - ln(s_ref)) / beta + 1/T_ref`.
    ///
    /// Evaluated as `T_ref / (x * T_ref / beta + 1)` so that a reading equal to
    /// the reference returns `ref_temp_kelvin` bit-for-bit. Non-positive
    /// readings produce NaN or infinity.
    pub fn sensor_to_device_kelvin(&self, sensor_reading: f64) -> f64 {
        let c = &self.constants;
        let log_ratio = sensor_reading.ln() - c.ref_sensor_value.ln();
        c.ref_temp_kelvin / (log_ratio * c.ref_temp_kelvin / c.beta_coefficient + 1.0)
    }

    /// Converts a 14-bit raw value into Celsius for the given device temperature.
    ///
    /// The fit yields Fahrenheit which is converted to Celsius; the affine
    /// correction is applied afterwards.
    pub fn temperature_from_raw(&self, raw_value: u16, device_kelvin: f64) -> f64 {
        let c = &self.constants;
        let base = f64::from(raw_value) * c.device_range / c.full_scale;
        let fahrenheit = base - device_kelvin * c.linear_slope + c.linear_offset - 273.0;
        let celsius = (fahrenheit - 32.0) * 5.0 / 9.0;
        c.correction.apply(celsius)
    }

    pub fn readings(&self, min: u16, max: u16, center: u16, device_sensor_value: i32) -> TemperatureReadings {
        let device_kelvin = self.sensor_to_device_kelvin(f64::from(device_sensor_value));
        let readings = TemperatureReadings {
            min: self.temperature_from_raw(min, device_kelvin),
            max: self.temperature_from_raw(max, device_kelvin),
            center: self.temperature_from_raw(center, device_kelvin),
            device_kelvin,
        };
        trace!(
            raw_min = min,
            raw_max = max,
            raw_center = center,
            device_sensor_value,
            ?readings,
            "Calibrated frame extrema"
        );
        readings
    }
}

//! Calibration constants

/// Affine correction applied to a Celsius reading after the empirical fit:
/// `((celsius + pre_add) * multiplier) + post_add`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineCorrection {
    pub pre_add: f64,
    pub multiplier: f64,
    pub post_add: f64,
}

impl AffineCorrection {
    pub const IDENTITY: Self = Self {
        pre_add: 0.0,
        multiplier: 1.0,
        post_add: 0.0,
    };

    pub fn new(pre_add: f64, multiplier: f64, post_add: f64) -> Self {
        Self {
            pre_add,
            multiplier,
            post_add,
        }
    }

    pub fn apply(&self, celsius: f64) -> f64 {
        ((celsius + self.pre_add) * self.multiplier) + self.post_add
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for AffineCorrection {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Process-wide calibration constants for the thermistor and the raw-value fit.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationConstants {
    /// Thermistor reference temperature in Kelvin (23C)
    pub ref_temp_kelvin: f64,
    /// Device sensor reading at `ref_temp_kelvin`
    pub ref_sensor_value: f64,
    /// Thermistor beta coefficient, must be non-zero
    pub beta_coefficient: f64,
    /// Slope of the linear fit against device Kelvin
    pub linear_slope: f64,
    /// Offset of the linear fit
    pub linear_offset: f64,
    /// Device units spanned by the full raw range
    pub device_range: f64,
    /// Full 14-bit raw span
    pub full_scale: f64,
    /// Field recalibration, kept separate from the fit constants
    pub correction: AffineCorrection,
}

impl Default for CalibrationConstants {
    fn default() -> Self {
        Self {
            ref_temp_kelvin: 297.0,
            ref_sensor_value: 6616.0,
            beta_coefficient: 200.0,
            linear_slope: -1.5276,
            linear_offset: -470.8979,
            device_range: 330.0,
            full_scale: 16384.0,
            correction: AffineCorrection::IDENTITY,
        }
    }
}

impl CalibrationConstants {
    pub fn with_correction(mut self, correction: AffineCorrection) -> Self {
        self.correction = correction;
        self
    }
}

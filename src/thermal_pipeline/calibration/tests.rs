use crate::thermal_pipeline::calibration::{AffineCorrection, CalibrationConstants, CalibrationModel};

const EPS: f64 = 1e-9;

#[test]
fn test_reference_reading_returns_reference_temperature() {
    let model = CalibrationModel::default();
    assert_eq!(model.sensor_to_device_kelvin(6616.0), 297.0);

    let constants = CalibrationConstants {
        ref_temp_kelvin: 301.15,
        ref_sensor_value: 5123.0,
        beta_coefficient: 3950.0,
        ..CalibrationConstants::default()
    };
    let model = CalibrationModel::new(constants);
    assert_eq!(model.sensor_to_device_kelvin(5123.0), 301.15);
}

#[test]
fn test_device_kelvin_matches_reciprocal_form() {
    let model = CalibrationModel::default();
    let sensor = 7000.0_f64;
    let expected = 1.0 / ((sensor.ln() - 6616.0_f64.ln()) / 200.0 + 1.0 / 297.0);
    assert!((model.sensor_to_device_kelvin(sensor) - expected).abs() < EPS);
}

#[test]
fn test_negative_sensor_is_nan() {
    let model = CalibrationModel::default();
    assert!(model.sensor_to_device_kelvin(-5.0).is_nan());
    assert!(model.sensor_to_device_kelvin(-1.0).is_nan());
}

#[test]
fn test_temperature_is_monotonic_in_raw() {
    let model = CalibrationModel::default();
    let device_k = model.sensor_to_device_kelvin(6616.0);
    let low = model.temperature_from_raw(0, device_k);
    let mid = model.temperature_from_raw(8192, device_k);
    let high = model.temperature_from_raw(16383, device_k);
    assert!(low <= mid);
    assert!(mid <= high);
}

#[test]
fn test_temperature_matches_hand_computation() {
    let model = CalibrationModel::default();
    let device_k = 297.0;
    let fahrenheit = 8192.0 * 330.0 / 16384.0 - device_k * -1.5276 + -470.8979 - 273.0;
    let expected = (fahrenheit - 32.0) * 5.0 / 9.0;
    assert!((model.temperature_from_raw(8192, device_k) - expected).abs() < EPS);
}

#[test]
fn test_correction_is_applied_after_fit() {
    let base = CalibrationModel::default();
    let correction = AffineCorrection::new(1.5, 2.0, -3.0);
    let corrected = CalibrationModel::new(CalibrationConstants::default().with_correction(correction));

    let plain = base.temperature_from_raw(5000, 297.0);
    let adjusted = corrected.temperature_from_raw(5000, 297.0);
    assert!((adjusted - ((plain + 1.5) * 2.0 - 3.0)).abs() < EPS);
}

#[test]
fn test_identity_correction_is_default() {
    let constants = CalibrationConstants::default();
    assert!(constants.correction.is_identity());
    assert_eq!(constants.correction.apply(42.25), 42.25);
}

#[test]
fn test_readings_use_same_device_temperature() {
    let model = CalibrationModel::default();
    let readings = model.readings(1000, 9000, 4000, 6616);
    assert_eq!(readings.device_kelvin, 297.0);
    assert_eq!(readings.min, model.temperature_from_raw(1000, 297.0));
    assert_eq!(readings.max, model.temperature_from_raw(9000, 297.0));
    assert_eq!(readings.center, model.temperature_from_raw(4000, 297.0));
}

use tracing::info;

use crate::thermal_pipeline::camera::source::ThermalCamera;
use crate::thermal_pipeline::common::error::CameraError;
use crate::thermal_pipeline::frame::RawFrame;

const BACKGROUND: u16 = 5200;
const HOTSPOT_PEAK: u16 = 9400;
const HOTSPOT_RADIUS: f64 = 6.0;

/// Generates a warm gradient with a hot spot sweeping across the frame.
/// Useful without hardware attached.
pub struct SyntheticCamera {
    width: usize,
    height: usize,
    device_sensor_value: i32,
    frame_limit: Option<u64>,
    frame_index: u64,
    opened: bool,
}

impl SyntheticCamera {
    pub fn new(width: usize, height: usize, device_sensor_value: i32) -> Self {
        Self {
            width,
            height,
            device_sensor_value,
            frame_limit: None,
            frame_index: 0,
            opened: false,
        }
    }

    /// Stop with `EndOfStream` after `limit` frames.
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    fn sample(&self, x: usize, y: usize, hot_x: f64, hot_y: f64) -> u16 {
        let gradient = ((x + y) * 4) as u16;
        let distance = ((x as f64 - hot_x).powi(2) + (y as f64 - hot_y).powi(2)).sqrt();
        if distance < HOTSPOT_RADIUS {
            let falloff = 1.0 - distance / HOTSPOT_RADIUS;
            BACKGROUND + gradient + (f64::from(HOTSPOT_PEAK - BACKGROUND) * falloff) as u16
        } else {
            BACKGROUND + gradient
        }
    }
}

impl ThermalCamera for SyntheticCamera {
    fn open(&mut self) -> Result<(), CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::OpenFailed(format!(
                "invalid frame size {}x{}",
                self.width, self.height
            )));
        }
        info!(width = self.width, height = self.height, "Synthetic camera opened");
        self.opened = true;
        self.frame_index = 0;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<RawFrame, CameraError> {
        if !self.opened {
            return Err(CameraError::NotOpen);
        }
        if self.frame_limit.is_some_and(|limit| self.frame_index >= limit) {
            return Err(CameraError::EndOfStream);
        }

        let hot_x = (self.frame_index * 3 % self.width as u64) as f64;
        let hot_y = self.height as f64 / 2.0;
        let mut data = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                data.push(self.sample(x, y, hot_x, hot_y));
            }
        }
        self.frame_index += 1;

        Ok(RawFrame::new(self.width, self.height, data, self.device_sensor_value))
    }

    fn device_temperature_sensor(&self) -> i32 {
        self.device_sensor_value
    }
}

use crate::thermal_pipeline::common::error::CameraError;
use crate::thermal_pipeline::frame::RawFrame;

pub trait ThermalCamera {
    fn open(&mut self) -> Result<(), CameraError>;

    /// Blocks until the next frame is available. An error means the camera
    /// cannot deliver further frames.
    fn read_frame(&mut self) -> Result<RawFrame, CameraError>;

    /// Auxiliary thermistor reading of the most recent acquisition.
    fn device_temperature_sensor(&self) -> i32;
}

impl<C: ThermalCamera + ?Sized> ThermalCamera for Box<C> {
    fn open(&mut self) -> Result<(), CameraError> {
        (**self).open()
    }

    fn read_frame(&mut self) -> Result<RawFrame, CameraError> {
        (**self).read_frame()
    }

    fn device_temperature_sensor(&self) -> i32 {
        (**self).device_temperature_sensor()
    }
}

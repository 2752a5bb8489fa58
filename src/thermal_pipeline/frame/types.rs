//! Raw sensor frames and annotated display frames

use std::ops::Add;

use image::{Rgb, RgbImage};

use crate::thermal_pipeline::calibration::TemperatureReadings;
use crate::thermal_pipeline::common::error::ProcessingError;

/// Largest value a 14-bit sensor sample can take.
pub const MAX_RAW_VALUE: u16 = 16383;

/// One uncalibrated frame as captured from the sensor
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// Width of the sensor grid in pixels
    pub width: usize,
    /// Height of the sensor grid in pixels
    pub height: usize,
    /// Row-major 14-bit samples
    pub data: Vec<u16>,
    /// Auxiliary thermistor reading captured with this frame
    pub device_sensor_value: i32,
}

impl RawFrame {
    pub fn new(width: usize, height: usize, data: Vec<u16>, device_sensor_value: i32) -> Self {
        Self {
            width,
            height,
            data,
            device_sensor_value,
        }
    }

    pub fn filled(width: usize, height: usize, value: u16, device_sensor_value: i32) -> Self {
        Self::new(width, height, vec![value; width * height], device_sensor_value)
    }

    pub fn get(&self, x: usize, y: usize) -> u16 {
        self.data[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: u16) {
        self.data[y * self.width + x] = value;
    }

    /// Sample at the integer-division midpoint of the grid.
    pub fn center_value(&self) -> u16 {
        self.get(self.width / 2, self.height / 2)
    }

    pub fn validate(&self) -> Result<(), ProcessingError> {
        if self.width == 0 || self.height == 0 {
            return Err(ProcessingError::InvalidDimensions(self.width, self.height));
        }
        if self.data.len() != self.width * self.height {
            return Err(ProcessingError::DataLengthMismatch {
                width: self.width,
                height: self.height,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

/// Pixel coordinate in display space. Signed so that annotation offsets may
/// point outside the image; drawing clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Multiplies both components by `scale`, rounding to the nearest pixel.
    pub fn scaled(self, scale: f32) -> Self {
        Self {
            x: (self.x as f32 * scale).round() as i32,
            y: (self.y as f32 * scale).round() as i32,
        }
    }
}

impl Add for PixelPos {
    type Output = PixelPos;

    fn add(self, rhs: PixelPos) -> PixelPos {
        PixelPos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Halo, outline and fill colors of a three-layer annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerStyle {
    pub halo: Rgb<u8>,
    pub outline: Rgb<u8>,
    pub fill: Rgb<u8>,
}

impl LayerStyle {
    pub const HALO: Rgb<u8> = Rgb([255, 255, 255]);
    pub const OUTLINE: Rgb<u8> = Rgb([0, 0, 0]);

    pub const COLD: LayerStyle = LayerStyle::with_fill(Rgb([0, 0, 255]));
    pub const HOT: LayerStyle = LayerStyle::with_fill(Rgb([255, 0, 0]));
    pub const NEUTRAL: LayerStyle = LayerStyle::with_fill(Rgb([128, 128, 128]));

    pub const fn with_fill(fill: Rgb<u8>) -> Self {
        Self {
            halo: Self::HALO,
            outline: Self::OUTLINE,
            fill,
        }
    }

    /// Layers in drawing order together with their offset from the anchor.
    pub fn layers(&self) -> [(PixelPos, Rgb<u8>); 3] {
        [
            (PixelPos::new(1, 1), self.halo),
            (PixelPos::new(-1, -1), self.outline),
            (PixelPos::new(0, 0), self.fill),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationRole {
    MinReading,
    MaxReading,
    CenterReading,
    MinMarker,
    MaxMarker,
    CenterMarker,
    Warning,
    Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationKind {
    Text(String),
    Crosshair,
}

/// A text label or crosshair rendered onto a display frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub role: AnnotationRole,
    pub position: PixelPos,
    pub kind: AnnotationKind,
    pub style: LayerStyle,
}

impl Annotation {
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            AnnotationKind::Text(text) => Some(text),
            AnnotationKind::Crosshair => None,
        }
    }
}

/// Marker coordinates in display space, after rotation and scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkerPositions {
    pub min: PixelPos,
    pub max: PixelPos,
    pub center: PixelPos,
}

/// Annotated RGB image produced from a single raw frame.
#[derive(Debug, Clone)]
pub struct DisplayFrame {
    pub image: RgbImage,
    pub readings: TemperatureReadings,
    pub markers: MarkerPositions,
    pub annotations: Vec<Annotation>,
}

impl DisplayFrame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn warning_shown(&self) -> bool {
        self.annotation(AnnotationRole::Warning).is_some()
    }

    pub fn annotation(&self, role: AnnotationRole) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.role == role)
    }
}

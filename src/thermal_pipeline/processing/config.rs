//! Frame processing configuration types

use crate::thermal_pipeline::common::error::ProcessingError;
use crate::thermal_pipeline::frame::PixelPos;
use crate::thermal_pipeline::processing::colormap::Colormap;

/// Width in pixels of the gradient strip appended to the right edge.
pub const LEGEND_WIDTH: u32 = 20;

/// Clockwise rotation applied to the 8-bit frame before annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    /// Transpose, then flip horizontally
    Deg90,
    /// Flip both axes
    Deg180,
    /// Transpose, then flip vertically
    Deg270,
}

impl Rotation {
    /// Unsupported angles fall back to no rotation.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees {
            90 => Rotation::Deg90,
            180 => Rotation::Deg180,
            270 => Rotation::Deg270,
            _ => Rotation::None,
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Where raw pixel `(x, y)` of a `width`x`height` grid lands after rotation.
    pub fn map_point(&self, x: u32, y: u32, width: u32, height: u32) -> (u32, u32) {
        match self {
            Rotation::None => (x, y),
            Rotation::Deg90 => (height - 1 - y, x),
            Rotation::Deg180 => (width - 1 - x, height - 1 - y),
            Rotation::Deg270 => (y, width - 1 - x),
        }
    }
}

/// Pixel offsets used to place readouts and markers.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationLayout {
    /// Offset from an anchor to the text baseline origin
    pub text_offset: PixelPos,
    /// Integer magnification of the 5x7 glyphs
    pub glyph_scale: u32,
    /// Distance of the min readout anchor from the bottom-right corner
    pub min_anchor_inset: PixelPos,
    /// Distance of the max readout anchor from the right and top edges
    pub max_anchor_inset: PixelPos,
    /// Empty radius in the middle of a crosshair
    pub marker_gap: i32,
    /// Reach of each crosshair arm
    pub marker_arm: i32,
}

impl Default for AnnotationLayout {
    fn default() -> Self {
        Self {
            text_offset: PixelPos::new(-40, 20),
            glyph_scale: 3,
            min_anchor_inset: PixelPos::new(50, 30),
            max_anchor_inset: PixelPos::new(50, 1),
            marker_gap: 2,
            marker_arm: 7,
        }
    }
}

/// Configuration for raw to display frame processing
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Output magnification, must be finite and positive
    pub scale: f32,
    /// Pseudo-color lookup, `None` keeps the frame gray
    pub colormap: Option<Colormap>,
    pub rotation: Rotation,
    /// Max readings strictly above this trigger the warning label
    pub warning_threshold_celsius: f64,
    pub warning_text: String,
    pub layout: AnnotationLayout,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            scale: 3.0,
            colormap: Some(Colormap::Hot),
            rotation: Rotation::None,
            warning_threshold_celsius: 45.0,
            warning_text: "WARNING".to_string(),
            layout: AnnotationLayout::default(),
        }
    }
}

impl ProcessingConfig {
    pub fn builder() -> ProcessingConfigBuilder {
        ProcessingConfigBuilder::default()
    }

    /// Rejects settings that would make every frame fail.
    pub fn validate(&self) -> Result<(), ProcessingError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ProcessingError::InvalidScale(self.scale));
        }
        Ok(())
    }
}

/// Builder for ProcessingConfig
#[derive(Default)]
pub struct ProcessingConfigBuilder {
    scale: Option<f32>,
    colormap: Option<Option<Colormap>>,
    rotation: Option<Rotation>,
    warning_threshold_celsius: Option<f64>,
    warning_text: Option<String>,
    layout: Option<AnnotationLayout>,
}

impl ProcessingConfigBuilder {
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn colormap(mut self, colormap: Option<Colormap>) -> Self {
        self.colormap = Some(colormap);
        self
    }

    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn warning_threshold_celsius(mut self, threshold: f64) -> Self {
        self.warning_threshold_celsius = Some(threshold);
        self
    }

    pub fn warning_text(mut self, text: impl Into<String>) -> Self {
        self.warning_text = Some(text.into());
        self
    }

    pub fn layout(mut self, layout: AnnotationLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn build(self) -> ProcessingConfig {
        let default = ProcessingConfig::default();
        ProcessingConfig {
            scale: self.scale.unwrap_or(default.scale),
            colormap: self.colormap.unwrap_or(default.colormap),
            rotation: self.rotation.unwrap_or(default.rotation),
            warning_threshold_celsius: self
                .warning_threshold_celsius
                .unwrap_or(default.warning_threshold_celsius),
            warning_text: self.warning_text.unwrap_or(default.warning_text),
            layout: self.layout.unwrap_or(default.layout),
        }
    }
}

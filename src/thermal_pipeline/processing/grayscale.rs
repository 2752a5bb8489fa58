//! Grayscale stages: stretch, rotate, locate extrema, resize, legend.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};

use crate::thermal_pipeline::common::error::ProcessingError;
use crate::thermal_pipeline::frame::{PixelPos, RawFrame};
use crate::thermal_pipeline::processing::config::{Rotation, LEGEND_WIDTH};

/// The three raw samples that drive every temperature readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStats {
    pub min: u16,
    pub max: u16,
    pub center: u16,
}

pub fn raw_stats(frame: &RawFrame) -> RawStats {
    let (min, max) = frame
        .data
        .iter()
        .fold((u16::MAX, u16::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    RawStats {
        min,
        max,
        center: frame.center_value(),
    }
}

/// Min-max stretch to the full 16-bit range, then a linear cut to 8 bits.
/// A flat frame stretches to black.
pub fn stretch_to_gray8(frame: &RawFrame, stats: &RawStats) -> Result<GrayImage, ProcessingError> {
    let span = f64::from(stats.max) - f64::from(stats.min);
    let gain = if span > 0.0 { 65535.0 / span } else { 0.0 };

    let pixels = frame
        .data
        .iter()
        .map(|&v| {
            let wide = ((f64::from(v) - f64::from(stats.min)) * gain).round();
            (wide / 256.0).round().min(255.0) as u8
        })
        .collect();

    GrayImage::from_raw(frame.width as u32, frame.height as u32, pixels).ok_or(
        ProcessingError::DataLengthMismatch {
            width: frame.width,
            height: frame.height,
            actual: frame.data.len(),
        },
    )
}

/// Clockwise rotation; `imageops::rotate90` is transpose + horizontal flip and
/// `imageops::rotate270` is transpose + vertical flip.
pub fn rotate(gray: GrayImage, rotation: Rotation) -> GrayImage {
    match rotation {
        Rotation::None => gray,
        Rotation::Deg90 => imageops::rotate90(&gray),
        Rotation::Deg180 => imageops::rotate180(&gray),
        Rotation::Deg270 => imageops::rotate270(&gray),
    }
}

/// First darkest and first brightest pixel in row-major order.
pub fn locate_extrema(gray: &GrayImage) -> (PixelPos, PixelPos) {
    let mut min = (u8::MAX, PixelPos::default());
    let mut max = (u8::MIN, PixelPos::default());
    let mut first = true;

    for (x, y, Luma([v])) in gray.enumerate_pixels() {
        let pos = PixelPos::new(x as i32, y as i32);
        if first || *v < min.0 {
            min = (*v, pos);
        }
        if first || *v > max.0 {
            max = (*v, pos);
        }
        first = false;
    }
    (min.1, max.1)
}

/// Integer-division midpoint of the image.
pub fn center_of(gray: &GrayImage) -> PixelPos {
    PixelPos::new((gray.width() / 2) as i32, (gray.height() / 2) as i32)
}

pub fn scaled_dimension(dim: u32, scale: f32) -> u32 {
    ((dim as f32 * scale).round() as u32).max(1)
}

/// Bilinear resize by `scale`; a unit scale returns the input untouched.
pub fn resize(gray: GrayImage, scale: f32) -> GrayImage {
    if scale == 1.0 {
        return gray;
    }
    let width = scaled_dimension(gray.width(), scale);
    let height = scaled_dimension(gray.height(), scale);
    imageops::resize(&gray, width, height, FilterType::Triangle)
}

/// Intensity of legend row `row` out of `rows`: 255 at the top fading linearly.
pub fn legend_value(row: u32, rows: u32) -> u8 {
    (255.0 * f64::from(rows - row) / f64::from(rows)).round() as u8
}

/// Returns `gray` widened by a static gradient strip on the right edge.
pub fn append_legend(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut out = GrayImage::new(width + LEGEND_WIDTH, height);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        *pixel = if x < width {
            *gray.get_pixel(x, y)
        } else {
            Luma([legend_value(y, height)])
        };
    }
    out
}

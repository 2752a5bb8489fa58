//! Three-layer text and crosshair rendering.
//!
//! Every annotation is drawn three times: a white halo shifted down-right, a
//! black outline shifted up-left, then the fill color on the anchor itself,
//! which keeps labels legible over any colormap.

use chrono::{DateTime, TimeZone};
use image::{Rgb, RgbImage};

use crate::thermal_pipeline::frame::{
    Annotation, AnnotationKind, AnnotationRole, DisplayFrame, LayerStyle, PixelPos,
};
use crate::thermal_pipeline::processing::config::AnnotationLayout;
use crate::thermal_pipeline::processing::font::{self, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};

/// Baseline origin of the wall-clock stamp in the top-left corner.
const TIMESTAMP_ORIGIN: PixelPos = PixelPos::new(10, 30);
const TIMESTAMP_FORMAT: &str = "%Y %m/%d %H:%M:%S";

pub fn render_annotation(image: &mut RgbImage, annotation: &Annotation, layout: &AnnotationLayout) {
    for (offset, color) in annotation.style.layers() {
        let anchor = annotation.position + offset;
        match &annotation.kind {
            AnnotationKind::Text(text) => {
                draw_text(image, text, anchor + layout.text_offset, layout.glyph_scale, color)
            }
            AnnotationKind::Crosshair => {
                draw_crosshair(image, anchor, layout.marker_gap, layout.marker_arm, color)
            }
        }
    }
}

/// Draws `text` with its bottom-left corner at `origin`.
pub fn draw_text(image: &mut RgbImage, text: &str, origin: PixelPos, scale: u32, color: Rgb<u8>) {
    let scale = scale.max(1) as i32;
    let top = origin.y - GLYPH_HEIGHT as i32 * scale;
    let mut left = origin.x;

    for ch in text.chars() {
        if let Some(glyph) = font::glyph_bits(ch) {
            for (row, pattern) in glyph.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (pattern >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                        continue;
                    }
                    let px = left + col as i32 * scale;
                    let py = top + row as i32 * scale;
                    fill_block(image, px, py, scale, color);
                }
            }
        }
        left += GLYPH_ADVANCE as i32 * scale;
    }
}

/// Four diagonal segments forming an X with an empty middle of radius `gap`.
pub fn draw_crosshair(image: &mut RgbImage, center: PixelPos, gap: i32, arm: i32, color: Rgb<u8>) {
    for (dx, dy) in [(1, 1), (-1, -1), (1, -1), (-1, 1)] {
        let outer = center + PixelPos::new(dx * arm, dy * arm);
        let inner = center + PixelPos::new(dx * gap, dy * gap);
        draw_line(image, outer, inner, color);
    }
}

/// Bresenham line, clipped to the image.
pub fn draw_line(image: &mut RgbImage, from: PixelPos, to: PixelPos, color: Rgb<u8>) {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);

    loop {
        put_pixel_clipped(image, x, y, color);
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Stamps the wall-clock time in the top-left corner of `frame`.
pub fn draw_timestamp<Tz: TimeZone>(frame: &mut DisplayFrame, now: &DateTime<Tz>, layout: &AnnotationLayout)
where
    Tz::Offset: std::fmt::Display,
{
    let text = now.format(TIMESTAMP_FORMAT).to_string();
    let annotation = Annotation {
        role: AnnotationRole::Timestamp,
        position: PixelPos::new(
            TIMESTAMP_ORIGIN.x - layout.text_offset.x,
            TIMESTAMP_ORIGIN.y - layout.text_offset.y,
        ),
        kind: AnnotationKind::Text(text),
        style: LayerStyle::with_fill(LayerStyle::OUTLINE),
    };
    render_annotation(&mut frame.image, &annotation, layout);
    frame.annotations.push(annotation);
}

fn fill_block(image: &mut RgbImage, x: i32, y: i32, size: i32, color: Rgb<u8>) {
    for by in y..y + size {
        for bx in x..x + size {
            put_pixel_clipped(image, bx, by, color);
        }
    }
}

fn put_pixel_clipped(image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x < image.width() && y < image.height() {
        image.put_pixel(x, y, color);
    }
}

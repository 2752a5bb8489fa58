//! Pseudo-color lookup tables, numbered the way OpenCV numbers its colormaps.

use image::{GrayImage, Rgb, RgbImage};

use crate::thermal_pipeline::common::error::ProcessingError;

/// Id that selects plain grayscale output.
pub const GRAYSCALE_ID: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    Autumn,
    Bone,
    Jet,
    Winter,
    Rainbow,
    Ocean,
    Summer,
    Spring,
    Cool,
    Hsv,
    Pink,
    Hot,
}

impl Colormap {
    pub const ALL: [Colormap; 12] = [
        Colormap::Autumn,
        Colormap::Bone,
        Colormap::Jet,
        Colormap::Winter,
        Colormap::Rainbow,
        Colormap::Ocean,
        Colormap::Summer,
        Colormap::Spring,
        Colormap::Cool,
        Colormap::Hsv,
        Colormap::Pink,
        Colormap::Hot,
    ];

    /// Parses a colormap id; `-1` yields `Ok(None)` (grayscale).
    pub fn from_id(id: i32) -> Result<Option<Colormap>, ProcessingError> {
        if id == GRAYSCALE_ID {
            return Ok(None);
        }
        usize::try_from(id)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .map(Some)
            .ok_or(ProcessingError::UnsupportedColormap(id))
    }

    pub fn id(&self) -> i32 {
        Self::ALL
            .iter()
            .position(|c| c == self)
            .map(|idx| idx as i32)
            .unwrap_or(GRAYSCALE_ID)
    }

    /// 256-entry lookup table for this colormap.
    pub fn lut(&self) -> [[u8; 3]; 256] {
        let mut table = [[0u8; 3]; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let [r, g, b] = self.sample(i as f32 / 255.0);
            *entry = [to_u8(r), to_u8(g), to_u8(b)];
        }
        table
    }

    /// Evaluates the map at `t` in `[0, 1]`, returning linear RGB in `[0, 1]`.
    fn sample(&self, t: f32) -> [f32; 3] {
        match self {
            Colormap::Autumn => [1.0, t, 0.0],
            Colormap::Bone => {
                let [hr, hg, hb] = Colormap::Hot.sample(t);
                [
                    (7.0 * t + hb) / 8.0,
                    (7.0 * t + hg) / 8.0,
                    (7.0 * t + hr) / 8.0,
                ]
            }
            Colormap::Jet => [
                unit(1.5 - (4.0 * t - 3.0).abs()),
                unit(1.5 - (4.0 * t - 2.0).abs()),
                unit(1.5 - (4.0 * t - 1.0).abs()),
            ],
            Colormap::Winter => [0.0, t, 1.0 - t / 2.0],
            Colormap::Rainbow => hue_to_rgb(t * 270.0),
            Colormap::Ocean => [unit(3.0 * t - 2.0), unit(1.5 * t - 0.5), t],
            Colormap::Summer => [t, 0.5 + t / 2.0, 0.4],
            Colormap::Spring => [1.0, t, 1.0 - t],
            Colormap::Cool => [t, 1.0 - t, 1.0],
            Colormap::Hsv => hue_to_rgb(t * 360.0),
            Colormap::Pink => {
                let [hr, hg, hb] = Colormap::Hot.sample(t);
                [
                    ((2.0 * t + hr) / 3.0).sqrt(),
                    ((2.0 * t + hg) / 3.0).sqrt(),
                    ((2.0 * t + hb) / 3.0).sqrt(),
                ]
            }
            Colormap::Hot => [
                unit(3.0 * t),
                unit(3.0 * t - 1.0),
                unit(3.0 * t - 2.0),
            ],
        }
    }
}

/// Maps each gray level through `colormap`, or replicates it across the
/// three channels when no colormap is set.
pub fn colorize(gray: &GrayImage, colormap: Option<Colormap>) -> RgbImage {
    let (width, height) = gray.dimensions();
    match colormap {
        Some(map) => {
            let lut = map.lut();
            RgbImage::from_fn(width, height, |x, y| Rgb(lut[gray.get_pixel(x, y).0[0] as usize]))
        }
        None => RgbImage::from_fn(width, height, |x, y| {
            let v = gray.get_pixel(x, y).0[0];
            Rgb([v, v, v])
        }),
    }
}

fn unit(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

fn to_u8(v: f32) -> u8 {
    (unit(v) * 255.0).round() as u8
}

fn hue_to_rgb(hue: f32) -> [f32; 3] {
    let h = (hue % 360.0) / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    match h as u32 {
        0 => [1.0, x, 0.0],
        1 => [x, 1.0, 0.0],
        2 => [0.0, 1.0, x],
        3 => [0.0, x, 1.0],
        4 => [x, 0.0, 1.0],
        _ => [1.0, 0.0, x],
    }
}

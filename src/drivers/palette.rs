use serde::{Deserialize, Serialize};

use crate::drivers::Band;

pub type Rgb = [u8; 3];

pub fn band_color(band: Band) -> Rgb {
    match band {
        Band::Delta => [0x88, 0x84, 0xd8],
        Band::Theta => [0x82, 0xca, 0x9d],
        Band::Alpha => [0xff, 0xc6, 0x58],
        Band::Beta => [0xd3, 0x41, 0x41],
        Band::Gamma => [0xff, 0x57, 0x33],
    }
}
/// Stable colour for a raw channel line; neighbouring channels are spread
/// around the hue wheel by the golden angle.
pub fn channel_color(index: usize) -> Rgb {
    let hue = (index as f32 * 137.507_77) % 360.0;
    hsv_to_rgb(hue, 0.65, 0.95)
}
fn hsv_to_rgb(hue_deg: f32, saturation: f32, value: f32) -> Rgb {
    let c = value * saturation;
    let h = hue_deg / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DensityLevel {
    Low,
    Medium,
    High,
}
impl DensityLevel {
    pub fn classify(density: f64) -> Self {
        if density < 100.0 {
            DensityLevel::Low
        } else if density < 200.0 {
            DensityLevel::Medium
        } else {
            DensityLevel::High
        }
    }
    pub fn color(self) -> Rgb {
        match self {
            DensityLevel::Low => [0, 0, 255],
            DensityLevel::Medium => [0, 128, 0],
            DensityLevel::High => [255, 0, 0],
        }
    }
}

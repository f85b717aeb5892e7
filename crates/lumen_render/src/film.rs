//! Render target and tonemapping.

use std::path::Path;

use crate::Color;

/// Gamma used to squash the dynamic range before discretization.
const GAMMA: f32 = 0.6;

/// Accumulation buffer for render output.
pub struct Film {
    pub width: u32,
    pub height: u32,
    pixels: Vec<Color>,
}

impl Film {
    /// Create a film filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Tonemap to 8-bit RGB: gamma-squash every channel, then normalize by
    /// the brightest channel so the full range maps onto 0..=254.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut max_intensity = 0.0f32;
        for p in &self.pixels {
            max_intensity = max_intensity.max(p.x).max(p.y).max(p.z);
        }

        let max_intensity = max_intensity.powf(GAMMA);
        let scale = if max_intensity > 0.0 {
            254.99 / max_intensity
        } else {
            0.0
        };

        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for p in &self.pixels {
            let c = p.powf(GAMMA) * scale;
            bytes.push(c.x.round() as u8);
            bytes.push(c.y.round() as u8);
            bytes.push(c.z.round() as u8);
        }
        bytes
    }

    /// Write the tonemapped image; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        let rgb = self.to_rgb8();
        let mut img = image::RgbImage::new(self.width, self.height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let i = ((y * self.width + x) * 3) as usize;
            *pixel = image::Rgb([rgb[i], rgb[i + 1], rgb[i + 2]]);
        }
        img.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_get_set_roundtrip() {
        let mut film = Film::new(4, 4);
        film.set(2, 3, Vec3::new(1.0, 0.5, 0.25));
        assert_eq!(film.get(2, 3), Vec3::new(1.0, 0.5, 0.25));
        assert_eq!(film.get(0, 0), Vec3::ZERO);
    }

    #[test]
    fn test_tonemap_black_film() {
        let film = Film::new(2, 2);
        assert!(film.to_rgb8().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tonemap_brightest_channel_maps_to_254() {
        let mut film = Film::new(2, 1);
        film.set(0, 0, Vec3::new(4.0, 0.0, 0.0));
        film.set(1, 0, Vec3::new(1.0, 1.0, 1.0));

        let rgb = film.to_rgb8();
        // Brightest channel hits the top of the range.
        assert_eq!(rgb[0], 255);
        // Gamma squash keeps dimmer channels well above linear scaling.
        let dim = rgb[3];
        assert!(dim > 0);
        assert!(dim < 255);
        let expected = (1.0f32.powf(0.6) / 4.0f32.powf(0.6) * 254.99).round() as u8;
        assert_eq!(dim, expected);
    }
}

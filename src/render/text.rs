use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use std::path::Path;

pub struct TextOverlay {
    font: Font,
    font_size: f32,
}

impl TextOverlay {
    /// Load a label font from disk. `None` (with a warning) when the file is
    /// missing or not a parseable font, so callers can skip labels.
    pub fn from_file(path: &Path, font_size: f32) -> Option<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("Failed to read font {}: {}", path.display(), err);
                return None;
            }
        };

        match Font::from_bytes(bytes, FontSettings::default()) {
            Ok(font) => Some(Self { font, font_size }),
            Err(err) => {
                log::warn!("Failed to parse font {}: {}", path.display(), err);
                None
            }
        }
    }

    /// Alpha-blend text onto the image at the given position.
    pub fn composite(&self, img: &mut RgbaImage, text: &str, x: u32, y: u32, color: [u8; 4]) {
        let (width, height) = img.dimensions();
        let mut cursor_x = x as i32;

        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, self.font_size);
            let glyph_y = y as i32 + self.font_size as i32 - metrics.height as i32 - metrics.ymin;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let alpha = bitmap[gy * metrics.width + gx];
                    if alpha == 0 {
                        continue;
                    }

                    let px = cursor_x + gx as i32;
                    let py = glyph_y + gy as i32;
                    if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                        continue;
                    }

                    let a = alpha as f32 / 255.0 * (color[3] as f32 / 255.0);
                    let inv_a = 1.0 - a;
                    let pixel = img.get_pixel_mut(px as u32, py as u32);
                    let Rgba(bg) = *pixel;
                    *pixel = Rgba([
                        (color[0] as f32 * a + bg[0] as f32 * inv_a) as u8,
                        (color[1] as f32 * a + bg[1] as f32 * inv_a) as u8,
                        (color[2] as f32 * a + bg[2] as f32 * inv_a) as u8,
                        255,
                    ]);
                }
            }

            cursor_x += metrics.advance_width as i32;
        }
    }

    /// Width of rendered text in pixels.
    pub fn measure_width(&self, text: &str) -> u32 {
        let mut width = 0.0f32;
        for ch in text.chars() {
            let (metrics, _) = self.font.rasterize(ch, self.font_size);
            width += metrics.advance_width;
        }
        width.ceil() as u32
    }

    pub fn line_height(&self) -> u32 {
        self.font_size.ceil() as u32
    }
}

//! PNG badge rasterizer.
//!
//! Draws the status text onto a white 300x50 canvas with the 8x8 bitmap
//! font from `font8x8`, scaled 2x. Characters the font lacks render as
//! `?`; text that runs past the right edge is cut at a glyph boundary.

use std::io::Cursor;

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{ImageFormat, Rgb, RgbImage};

pub const WIDTH: u32 = 300;
pub const HEIGHT: u32 = 50;

const TEXT_X: u32 = 10;
const TEXT_Y: u32 = 15;
const GLYPH_SIZE: u32 = 8;
const SCALE: u32 = 2;

/// Encode `text` in `color` as PNG bytes.
pub fn render_png(text: &str, color: [u8; 3]) -> Result<Vec<u8>, image::ImageError> {
    let mut canvas = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([255, 255, 255]));
    draw_text(&mut canvas, TEXT_X, TEXT_Y, text, Rgb(color));

    let mut buf = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

fn draw_text(canvas: &mut RgbImage, x0: u32, y0: u32, text: &str, color: Rgb<u8>) {
    let advance = GLYPH_SIZE * SCALE;
    let mut x = x0;

    for ch in text.chars() {
        if x + advance > canvas.width() {
            break;
        }
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);

        for (row, bits) in (0u32..).zip(glyph) {
            for col in 0..GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for dy in 0..SCALE {
                    for dx in 0..SCALE {
                        let px = x + col * SCALE + dx;
                        let py = y0 + row * SCALE + dy;
                        if px < canvas.width() && py < canvas.height() {
                            canvas.put_pixel(px, py, color);
                        }
                    }
                }
            }
        }
        x += advance;
    }
}

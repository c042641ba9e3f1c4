//! Rasterizes font glyphs for atlas packing.

use anyhow::{anyhow, Result};
use fontdue::{Font, FontSettings};
use image::RgbaImage;

/// One rasterized glyph with its placement metrics.
#[derive(Debug)]
pub struct GlyphImage {
    pub codepoint: char,
    /// Coverage promoted to white RGBA. May be empty (e.g. for spaces).
    pub pixels: RgbaImage,
    /// Pen offset of the bitmap's left edge.
    pub offset_x: i32,
    /// Pen offset of the bitmap's bottom edge, relative to the baseline.
    pub offset_y: i32,
    pub advance_x: f32,
}

/// Rasterize every codepoint of `charset` at the given pixel height.
///
/// Glyphs that rasterize to an empty bitmap are kept so their advance still
/// reaches the catalogue.
pub fn rasterize_glyphs(
    font_bytes: &[u8],
    charset: &str,
    pixel_height: f32,
) -> Result<Vec<GlyphImage>> {
    let font = Font::from_bytes(font_bytes, FontSettings::default())
        .map_err(|err| anyhow!("failed to parse font: {err}"))?;

    let mut glyphs = Vec::new();
    for codepoint in charset.chars() {
        let (metrics, coverage) = font.rasterize(codepoint, pixel_height);
        let width = metrics.width as u32;
        let height = metrics.height as u32;
        let mut pixels = RgbaImage::new(width, height);
        if width > 0 {
            for (index, alpha) in coverage.iter().enumerate() {
                let x = index as u32 % width;
                let y = index as u32 / width;
                pixels.put_pixel(x, y, image::Rgba([255, 255, 255, *alpha]));
            }
        }
        glyphs.push(GlyphImage {
            codepoint,
            pixels,
            offset_x: metrics.xmin,
            offset_y: metrics.ymin,
            advance_x: metrics.advance_width,
        });
    }
    Ok(glyphs)
}

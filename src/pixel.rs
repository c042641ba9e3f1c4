use crate::reader::AseReader;
use crate::{AsepriteParseError, ColorPalette, PixelFormat, Result};

// From the Aseprite file spec:
// PIXEL: One pixel, depending on the image pixel format:
// Grayscale: BYTE[2], each pixel has 2 bytes in the order Value, Alpha.
// Indexed: BYTE, each pixel uses 1 byte (the index).
// RGBA: BYTE[4], each pixel has 4 bytes in this order Red, Green, Blue, Alpha.

/// One RGBA pixel, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    pub(crate) const TRANSPARENT: Rgba = Rgba {
        red: 0,
        green: 0,
        blue: 0,
        alpha: 0,
    };
}

/// One grayscale pixel: value plus alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grayscale {
    pub value: u8,
    pub alpha: u8,
}

impl Grayscale {
    /// Expand to RGBA by replicating the value into all color channels.
    pub fn to_rgba(self) -> Rgba {
        Rgba {
            red: self.value,
            green: self.value,
            blue: self.value,
            alpha: self.alpha,
        }
    }
}

/// One indexed pixel: an index into the document palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indexed(pub u8);

impl Indexed {
    /// Resolve through the palette. Index 0 is transparent in every
    /// non-background layer regardless of the header's transparent-index
    /// field; this matches how the original pipeline reads legacy documents.
    pub fn to_rgba(self, palette: &ColorPalette) -> Result<Rgba> {
        if self.0 == 0 {
            return Ok(Rgba::TRANSPARENT);
        }
        let entry = palette.color(self.0 as u32).ok_or_else(|| {
            AsepriteParseError::InvalidInput(format!(
                "Palette index out of range: {} (palette has {} colors)",
                self.0,
                palette.num_colors()
            ))
        })?;
        Ok(Rgba {
            red: entry.red,
            green: entry.green,
            blue: entry.blue,
            alpha: entry.alpha,
        })
    }
}

/// A decoded pixel buffer in the document's own color depth.
#[derive(Debug)]
pub enum Pixels {
    Rgba(Vec<Rgba>),
    Grayscale(Vec<Grayscale>),
    Indexed(Vec<Indexed>),
}

impl Pixels {
    fn from_bytes(bytes: Vec<u8>, pixel_format: PixelFormat) -> Result<Self> {
        match pixel_format {
            PixelFormat::Indexed { .. } => {
                let pixels = bytes.iter().map(|byte| Indexed(*byte)).collect();
                Ok(Self::Indexed(pixels))
            }
            PixelFormat::Grayscale => {
                if bytes.len() % 2 != 0 {
                    return Err(AsepriteParseError::InvalidInput(
                        "Incorrect length of bytes for grayscale image data".to_string(),
                    ));
                }
                let pixels = bytes
                    .chunks_exact(2)
                    .map(|chunk| Grayscale {
                        value: chunk[0],
                        alpha: chunk[1],
                    })
                    .collect();
                Ok(Self::Grayscale(pixels))
            }
            PixelFormat::Rgba => {
                if bytes.len() % 4 != 0 {
                    return Err(AsepriteParseError::InvalidInput(
                        "Incorrect length of bytes for RGBA image data".to_string(),
                    ));
                }
                let pixels = bytes
                    .chunks_exact(4)
                    .map(|chunk| Rgba {
                        red: chunk[0],
                        green: chunk[1],
                        blue: chunk[2],
                        alpha: chunk[3],
                    })
                    .collect();
                Ok(Self::Rgba(pixels))
            }
        }
    }

    pub(crate) fn from_raw(
        reader: &mut AseReader,
        pixel_format: PixelFormat,
        expected_pixel_count: usize,
    ) -> Result<Self> {
        let bytes = reader.take_bytes(pixel_format.bytes_per_pixel() * expected_pixel_count)?;
        Self::from_bytes(bytes, pixel_format)
    }

    pub(crate) fn from_compressed(
        reader: AseReader,
        pixel_format: PixelFormat,
        expected_pixel_count: usize,
    ) -> Result<Self> {
        let bytes = reader.unzip(pixel_format.bytes_per_pixel() * expected_pixel_count)?;
        Self::from_bytes(bytes, pixel_format)
    }

    /// Number of pixels in the buffer.
    pub fn len(&self) -> usize {
        match self {
            Pixels::Rgba(v) => v.len(),
            Pixels::Grayscale(v) => v.len(),
            Pixels::Indexed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize the buffer as RGBA. Indexed buffers resolve through the
    /// palette and fail with [AsepriteParseError::MissingPaletteForIndexed]
    /// when the document carries none.
    pub fn to_rgba(&self, palette: Option<&ColorPalette>) -> Result<Vec<Rgba>> {
        match self {
            Pixels::Rgba(pixels) => Ok(pixels.clone()),
            Pixels::Grayscale(pixels) => Ok(pixels.iter().map(|px| px.to_rgba()).collect()),
            Pixels::Indexed(pixels) => {
                let palette = palette.ok_or(AsepriteParseError::MissingPaletteForIndexed)?;
                pixels.iter().map(|px| px.to_rgba(palette)).collect()
            }
        }
    }
}

use crate::pixel::Pixels;
use crate::reader::AseReader;
use crate::tilemap::TilemapData;
use crate::{AsepriteParseError, PixelFormat, Result};

/// One cel as stored in the file: the pixels (or link, or tile grid) of one
/// layer in one frame. In the timeline view these are the dots.
#[derive(Debug)]
pub struct RawCel {
    /// Index into the document's layer chunks, in file order.
    pub layer_index: u16,
    pub x: i16,
    pub y: i16,
    pub opacity: u8,
    pub z_index: i16,
    pub content: CelContent,
}

/// Pixel data plus its dimensions.
#[derive(Debug)]
pub struct ImageContent {
    pub width: u16,
    pub height: u16,
    pub pixels: Pixels,
}

/// The wire variant of a cel.
///
/// `Raw` and `CompressedImage` both end up holding decoded pixels but stay
/// distinct: downstream stages treat the two differently.
#[derive(Debug)]
pub enum CelContent {
    Raw(ImageContent),
    /// Frame index of the cel this one mirrors. Always points backward.
    Linked(u16),
    CompressedImage(ImageContent),
    CompressedTilemap(TilemapData),
}

/// A cel-extra chunk: subpixel bounds for its preceding cel chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelExtra {
    /// Precise float position and size, present when the flag bit is set.
    pub precise_bounds: Option<(f64, f64, f64, f64)>,
}

pub(crate) fn parse_chunk(mut reader: AseReader, pixel_format: PixelFormat) -> Result<RawCel> {
    let layer_index = reader.word()?;
    let x = reader.short()?;
    let y = reader.short()?;
    let opacity = reader.byte()?;
    let type_offset = reader.position();
    let cel_type = reader.word()?;
    let z_index = reader.short()?;
    reader.skip_bytes(5)?;

    let content = match cel_type {
        0 => {
            let width = reader.word()?;
            let height = reader.word()?;
            let expected_pixel_count = width as usize * height as usize;
            let pixels = Pixels::from_raw(&mut reader, pixel_format, expected_pixel_count)?;
            CelContent::Raw(ImageContent {
                width,
                height,
                pixels,
            })
        }
        1 => CelContent::Linked(reader.word()?),
        2 => {
            let width = reader.word()?;
            let height = reader.word()?;
            let expected_pixel_count = width as usize * height as usize;
            let pixels = Pixels::from_compressed(reader, pixel_format, expected_pixel_count)?;
            CelContent::CompressedImage(ImageContent {
                width,
                height,
                pixels,
            })
        }
        3 => CelContent::CompressedTilemap(TilemapData::parse(reader)?),
        code => {
            // Unknown variants inside a chunk selector are fatal, unlike
            // unknown chunk types which the frame loop skips.
            return Err(AsepriteParseError::InvalidCelType {
                offset: type_offset,
                code,
            });
        }
    };

    Ok(RawCel {
        layer_index,
        x,
        y,
        opacity,
        z_index,
        content,
    })
}

pub(crate) fn parse_extra_chunk(mut reader: AseReader) -> Result<CelExtra> {
    let flags = reader.dword()?;
    let x = reader.fixed()?;
    let y = reader.fixed()?;
    let width = reader.fixed()?;
    let height = reader.fixed()?;
    let precise_bounds = (flags & 1 != 0).then_some((x, y, width, height));
    Ok(CelExtra { precise_bounds })
}

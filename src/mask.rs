use crate::reader::AseReader;
use crate::Result;

/// A legacy mask chunk: a named 1-bpp bitmap. Kept for completeness; modern
/// editors no longer write it.
#[derive(Debug)]
pub struct Mask {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub name: String,
    /// Row-major bitmap, each row padded to a whole byte.
    pub bitmap: Vec<u8>,
}

pub(crate) fn parse_chunk(mut reader: AseReader) -> Result<Mask> {
    let x = reader.short()?;
    let y = reader.short()?;
    let width = reader.word()?;
    let height = reader.word()?;
    reader.skip_bytes(8)?;
    let name = reader.string()?;
    let row_bytes = (width as usize + 7) / 8;
    let bitmap = reader.take_bytes(height as usize * row_bytes)?;
    Ok(Mask {
        x,
        y,
        width,
        height,
        name,
        bitmap,
    })
}

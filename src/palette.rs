use crate::reader::AseReader;
use crate::{AsepriteParseError, Result};

/// The document's color palette.
#[derive(Debug)]
pub struct ColorPalette {
    pub entries: Vec<ColorPaletteEntry>,
}

/// One palette color.
#[derive(Debug)]
pub struct ColorPaletteEntry {
    pub id: u32,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    pub name: Option<String>,
}

impl ColorPalette {
    pub fn num_colors(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Look up a color by its palette index.
    pub fn color(&self, id: u32) -> Option<&ColorPaletteEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }
}

pub(crate) fn parse_chunk(mut reader: AseReader) -> Result<ColorPalette> {
    let _new_size = reader.dword()?;
    let first_color_index = reader.dword()?;
    let last_color_index = reader.dword()?;
    reader.skip_bytes(8)?;

    if last_color_index < first_color_index {
        return Err(AsepriteParseError::InvalidInput(format!(
            "Bad palette color indices: first={} last={}",
            first_color_index, last_color_index,
        )));
    }

    let count = last_color_index - first_color_index + 1;
    let mut entries = Vec::with_capacity(count as usize);
    for id in 0..count {
        let flags = reader.word()?;
        let red = reader.byte()?;
        let green = reader.byte()?;
        let blue = reader.byte()?;
        let alpha = reader.byte()?;
        let name = if flags & 1 != 0 {
            Some(reader.string()?)
        } else {
            None
        };
        entries.push(ColorPaletteEntry {
            id: id + first_color_index,
            red,
            green,
            blue,
            alpha,
            name,
        });
    }

    Ok(ColorPalette { entries })
}

/// Which of the two legacy palette chunks a pack sequence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OldPaletteKind {
    /// Chunk 0x0004: channel values use the full 0..=255 range.
    Rgb256,
    /// Chunk 0x0011: channel values use the 0..=63 range.
    Rgb64,
}

/// A legacy palette chunk: a sequence of packs, each skipping ahead in the
/// palette and then overwriting a run of colors.
#[derive(Debug)]
pub struct OldPalette {
    pub kind: OldPaletteKind,
    pub packets: Vec<OldPalettePacket>,
}

/// One legacy palette pack.
#[derive(Debug)]
pub struct OldPalettePacket {
    /// Entries to skip from the previous packet's end.
    pub skip: u8,
    /// RGB triples in the chunk's native channel range.
    pub colors: Vec<[u8; 3]>,
}

pub(crate) fn parse_old_palette_chunk(
    mut reader: AseReader,
    kind: OldPaletteKind,
) -> Result<OldPalette> {
    let num_packets = reader.word()?;
    let mut packets = Vec::with_capacity(num_packets as usize);
    for _packet in 0..num_packets {
        let skip = reader.byte()?;
        let count = match reader.byte()? {
            // 0 means 256 colors
            0 => 256_usize,
            n => n as usize,
        };
        let mut colors = Vec::with_capacity(count);
        for _color in 0..count {
            let red = reader.byte()?;
            let green = reader.byte()?;
            let blue = reader.byte()?;
            colors.push([red, green, blue]);
        }
        packets.push(OldPalettePacket { skip, colors });
    }
    Ok(OldPalette { kind, packets })
}

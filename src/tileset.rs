use bitflags::bitflags;

use crate::pixel::Pixels;
use crate::reader::AseReader;
use crate::{PixelFormat, Result};

bitflags! {
    #[derive(Debug, Clone, Copy)]
    pub(crate) struct TilesetFlags: u32 {
        /// Include link to external file.
        const LINKS_EXTERNAL_FILE = 0x0001;
        /// Include tiles inside this file.
        const FILE_INCLUDES_TILES = 0x0002;
        /// Tilemaps using this tileset use tile ID=0 as empty tile. In rare
        /// cases this bit is off and the empty tile is 0xffffffff.
        const EMPTY_TILE_IS_ID_ZERO = 0x0004;
    }
}

/// A reference to a tileset stored in another file.
#[derive(Debug, Clone, Copy)]
pub struct ExternalTilesetReference {
    pub external_file_id: u32,
    pub tileset_id: u32,
}

/// A tileset chunk: the tile dimensions plus, usually, the compressed tile
/// image (all tiles stacked vertically).
#[derive(Debug)]
pub struct Tileset {
    pub id: u32,
    pub empty_tile_is_id_zero: bool,
    pub tile_count: u32,
    pub tile_width: u16,
    pub tile_height: u16,
    /// Number shown in the UI for the first tile. Presentation only.
    pub base_index: i16,
    pub name: String,
    pub external_file: Option<ExternalTilesetReference>,
    /// Decoded tile image in the document's color depth, `tile_count` tiles
    /// tall.
    pub pixels: Option<Pixels>,
}

pub(crate) fn parse_chunk(mut reader: AseReader, pixel_format: PixelFormat) -> Result<Tileset> {
    let id = reader.dword()?;
    let flags = TilesetFlags::from_bits_retain(reader.dword()?);
    let tile_count = reader.dword()?;
    let tile_width = reader.word()?;
    let tile_height = reader.word()?;
    let base_index = reader.short()?;
    reader.skip_bytes(14)?;
    let name = reader.string()?;

    let external_file = if flags.contains(TilesetFlags::LINKS_EXTERNAL_FILE) {
        let external_file_id = reader.dword()?;
        let tileset_id = reader.dword()?;
        Some(ExternalTilesetReference {
            external_file_id,
            tileset_id,
        })
    } else {
        None
    };

    let pixels = if flags.contains(TilesetFlags::FILE_INCLUDES_TILES) {
        let compressed_len = reader.dword()?;
        let (compressed, data_offset) = reader.take_slice(compressed_len as usize)?;
        let expected_pixel_count =
            tile_width as usize * tile_height as usize * tile_count as usize;
        let image_reader = AseReader::with_offset(compressed, data_offset);
        Some(Pixels::from_compressed(
            image_reader,
            pixel_format,
            expected_pixel_count,
        )?)
    } else {
        None
    };

    Ok(Tileset {
        id,
        empty_tile_is_id_zero: flags.contains(TilesetFlags::EMPTY_TILE_IS_ID_ZERO),
        tile_count,
        tile_width,
        tile_height,
        base_index,
        name,
        external_file,
        pixels,
    })
}

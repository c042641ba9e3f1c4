use byteorder::{ByteOrder, LittleEndian};

use crate::reader::AseReader;
use crate::tile::Tile;
use crate::{AsepriteParseError, Result};

/// A tilemap cel: a grid of tile references into the layer's tileset.
#[derive(Debug)]
pub struct TilemapData {
    /// Width in number of tiles.
    pub width: u16,
    /// Height in number of tiles.
    pub height: u16,
    /// Bits per tile word in the compressed stream: 8, 16 or 32.
    pub bits_per_tile: u16,
    pub bitmasks: TileBitmasks,
    /// Row-major tile grid.
    pub tiles: Vec<Tile>,
}

/// Bitmasks isolating the parts of a tile word.
#[derive(Debug, Clone, Copy)]
pub struct TileBitmasks {
    pub tile_id: u32,
    pub x_flip: u32,
    pub y_flip: u32,
    pub rotate_90cw: u32,
}

impl TilemapData {
    /// Lookup tile at given grid location.
    pub fn tile(&self, x: u16, y: u16) -> Option<&Tile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get(y as usize * self.width as usize + x as usize)
    }

    pub(crate) fn parse(mut reader: AseReader) -> Result<Self> {
        let width = reader.word()?;
        let height = reader.word()?;
        let bits_per_tile = reader.word()?;
        if !matches!(bits_per_tile, 8 | 16 | 32) {
            return Err(AsepriteParseError::InvalidInput(format!(
                "Invalid tilemap bits per tile: {} (must be 8, 16 or 32)",
                bits_per_tile
            )));
        }
        let bitmasks = TileBitmasks {
            tile_id: reader.dword()?,
            x_flip: reader.dword()?,
            y_flip: reader.dword()?,
            rotate_90cw: reader.dword()?,
        };
        reader.skip_bytes(10)?;

        let expected_tile_count = width as usize * height as usize;
        let word_bytes = bits_per_tile as usize / 8;
        let bytes = reader.unzip(expected_tile_count * word_bytes)?;
        let tiles = bytes
            .chunks_exact(word_bytes)
            .map(|chunk| {
                let word = match bits_per_tile {
                    8 => chunk[0] as u32,
                    16 => LittleEndian::read_u16(chunk) as u32,
                    _ => LittleEndian::read_u32(chunk),
                };
                Tile::from_word(word, &bitmasks)
            })
            .collect();

        Ok(TilemapData {
            width,
            height,
            bits_per_tile,
            bitmasks,
            tiles,
        })
    }
}

use crate::tilemap::TileBitmasks;

/// One entry of a tilemap grid: a tile identity plus its transform flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Index into the corresponding tileset.
    pub id: u32,
    pub flip_x: bool,
    pub flip_y: bool,
    pub rotate_90cw: bool,
}

impl Tile {
    pub(crate) fn from_word(word: u32, masks: &TileBitmasks) -> Self {
        Tile {
            id: word & masks.tile_id,
            flip_x: word & masks.x_flip != 0,
            flip_y: word & masks.y_flip != 0,
            rotate_90cw: word & masks.rotate_90cw != 0,
        }
    }
}

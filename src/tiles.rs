//! Cuts tileset documents into fixed-size tiles.

use image::RgbaImage;

use crate::cel::CelContent;
use crate::{AsepriteFile, AsepriteParseError, Result};

/// Number of tile columns a tileset sheet is divided into. The tile edge
/// length follows from the sheet width.
pub const TILES_PER_ROW: u32 = 10;

/// One surviving tile of a tileset sheet, with its grid coordinate.
#[derive(Debug)]
pub struct TileImage {
    pub grid_x: u32,
    pub grid_y: u32,
    pub pixels: RgbaImage,
}

/// Cut the first image cel of a tileset document into a fixed grid.
///
/// Tiles whose pixels are all fully transparent are discarded. Tiles come
/// out row-major (x varies fastest).
pub fn extract_tiles(file: &AsepriteFile) -> Result<Vec<TileImage>> {
    let image = file
        .frames()
        .iter()
        .flat_map(|frame| frame.cels())
        .find_map(|cel| match &cel.content {
            CelContent::CompressedImage(image) => Some(image),
            _ => None,
        })
        .ok_or_else(|| {
            AsepriteParseError::InvalidInput("Tileset document contains no image cel".to_owned())
        })?;

    let rgba = image.pixels.to_rgba(file.first_palette())?;
    let mut sheet = RgbaImage::new(image.width as u32, image.height as u32);
    for (index, px) in rgba.iter().enumerate() {
        let x = index as u32 % image.width as u32;
        let y = index as u32 / image.width as u32;
        sheet.put_pixel(x, y, image::Rgba([px.red, px.green, px.blue, px.alpha]));
    }
    extract_tiles_from_image(&sheet)
}

/// Cut an already decoded sheet (e.g. a tileset PNG) into the same fixed
/// grid used for Aseprite tileset documents.
pub fn extract_tiles_from_image(sheet: &RgbaImage) -> Result<Vec<TileImage>> {
    let (sheet_width, sheet_height) = sheet.dimensions();
    if sheet_width == 0 || sheet_width % TILES_PER_ROW != 0 {
        return Err(AsepriteParseError::InvalidInput(format!(
            "Tileset sheet width {} does not divide into {} columns",
            sheet_width, TILES_PER_ROW
        )));
    }
    let tile_size = sheet_width / TILES_PER_ROW;
    let rows = sheet_height / tile_size;

    let mut tiles = Vec::new();
    for grid_y in 0..rows {
        for grid_x in 0..TILES_PER_ROW {
            let mut pixels = RgbaImage::new(tile_size, tile_size);
            let mut any_opaque = false;
            for y in 0..tile_size {
                for x in 0..tile_size {
                    let src = *sheet.get_pixel(grid_x * tile_size + x, grid_y * tile_size + y);
                    if src.0[3] != 0 {
                        any_opaque = true;
                    }
                    pixels.put_pixel(x, y, src);
                }
            }
            if any_opaque {
                tiles.push(TileImage {
                    grid_x,
                    grid_y,
                    pixels,
                });
            }
        }
    }
    Ok(tiles)
}

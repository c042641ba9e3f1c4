#![warn(clippy::all)]
/*!

Build-time sprite atlas baker.

`aseatlas` reads [Aseprite](https://www.aseprite.org/) documents directly in
their binary form ([file format specification][spec]) together with plain PNG
images and an optional TrueType font, flattens every animation frame, extracts
tile grids, rasterizes glyphs, and packs all of it into a single RGBA atlas.
Alongside the atlas image it writes a generated Rust source file that locates
every frame, tile and glyph, so the consuming game never has to parse anything
at runtime.

[spec]: https://github.com/aseprite/aseprite/blob/master/docs/ase-file-specs.md

# Decoding a document

```no_run
use aseatlas::AsepriteFile;
# use std::path::Path;
let ase = AsepriteFile::read_file(Path::new("goblin.aseprite")).unwrap();

println!("Size: {}x{}", ase.width(), ase.height());
println!("Frames: {}", ase.num_frames());
```

# Baking an atlas

```no_run
use aseatlas::atlas::{AtlasBuilder, AtlasSettings};
use aseatlas::{catalogue, flatten, AsepriteFile};
# use std::path::Path;
let ase = AsepriteFile::read_file(Path::new("goblin.aseprite")).unwrap();
let flattened = flatten::flatten(&ase).unwrap();

let mut builder = AtlasBuilder::new(AtlasSettings::default());
builder.add_document("Goblin", flattened);
let atlas = builder.build();

atlas.image.save("atlas.png").unwrap();
std::fs::write("atlas_gen.rs", catalogue::emit(&atlas)).unwrap();
```

*/

pub(crate) mod cel;
pub(crate) mod color_profile;
pub(crate) mod error;
pub(crate) mod external_file;
pub(crate) mod file;
pub(crate) mod layer;
pub(crate) mod mask;
pub(crate) mod palette;
pub(crate) mod parse;
pub(crate) mod pixel;
pub(crate) mod reader;
pub(crate) mod slice;
pub(crate) mod tags;
#[cfg(test)]
mod tests;
pub(crate) mod tile;
pub(crate) mod tilemap;
pub(crate) mod tileset;
pub(crate) mod user_data;

pub mod atlas;
pub mod catalogue;
pub mod config;
pub mod flatten;
pub mod font;
pub mod tiles;

/// A specialized `Result` type for decoding and baking operations.
pub type Result<T> = std::result::Result<T, AsepriteParseError>;

pub use cel::{CelContent, CelExtra, ImageContent, RawCel};
pub use color_profile::{ColorProfile, ColorProfileType};
pub use error::AsepriteParseError;
pub use external_file::ExternalFile;
pub use file::{AsepriteFile, FileHeader, Frame, PixelFormat};
pub use layer::{BlendMode, Layer, LayerFlags, LayerType};
pub use mask::Mask;
pub use palette::{ColorPalette, ColorPaletteEntry, OldPalette, OldPaletteKind, OldPalettePacket};
pub use parse::{read_chunks_filtered, read_chunks_of, Chunk, ChunkType};
pub use pixel::{Grayscale, Indexed, Pixels, Rgba};
pub use reader::{Point, Rect, Size};
pub use slice::{Slice, SliceKey};
pub use tags::{AnimationDirection, Tag};
pub use tile::Tile;
pub use tilemap::{TileBitmasks, TilemapData};
pub use tileset::{ExternalTilesetReference, Tileset};
pub use user_data::{PropertiesMap, PropertyValue, UserData};

//! Command-line configuration of the baker.

use clap::Parser;
use std::path::PathBuf;

/// Bake a directory of sprite sources and an optional font into a single
/// packed texture atlas plus a generated metadata source file.
#[derive(Parser, Debug)]
#[command(name = "aseatlas", version)]
pub struct Config {
    /// Directory scanned for .ase/.aseprite/.png sources. Files whose name
    /// starts with `tileset` are cut into tiles instead of flattened.
    #[arg(value_name = "TEXTURES_DIR")]
    pub textures_dir: PathBuf,

    /// Output path of the packed atlas PNG.
    #[arg(long, default_value = "atlas.png")]
    pub out_image: PathBuf,

    /// Output path of the generated metadata source file.
    #[arg(long, default_value = "atlas_gen.rs")]
    pub out_catalogue: PathBuf,

    /// TrueType font rasterized into the atlas. Skipped with a warning when
    /// the file is missing.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Glyph height in pixels.
    #[arg(long, default_value_t = 32.0)]
    pub font_px: f32,

    /// Codepoints rasterized from the font.
    #[arg(
        long,
        default_value = " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~"
    )]
    pub charset: String,

    /// Atlas width in pixels, before cropping.
    #[arg(long, default_value_t = 1024)]
    pub atlas_width: u32,

    /// Atlas height in pixels, before cropping.
    #[arg(long, default_value_t = 1024)]
    pub atlas_height: u32,

    /// Extrude tile edges by one pixel to avoid sampling bleed between
    /// adjacent tiles.
    #[arg(long)]
    pub tile_padding: bool,

    /// Keep the full atlas size instead of cropping to the used region.
    #[arg(long)]
    pub no_crop: bool,
}

//! Packs flattened frames, tiles and glyphs into one atlas image.
//!
//! There are a number of rectangle packer crates with different feature sets
//! and more or less complex APIs; `rect_packer` keeps its skyline state
//! internal and hands back one placement per request. The orchestrator here
//! owns everything around it: rectangle identities, seam sizes, compositing
//! and the final crop.

use image::RgbaImage;
use log::error;
use rect_packer::{Config, Packer};

use crate::flatten::{DocAnimation, FlattenedDocument, FrameImage, TrimOffsets};
use crate::font::GlyphImage;
use crate::tags::AnimationDirection;
use crate::tiles::TileImage;

/// Edge length of the solid-white swatch block.
pub const SWATCH_SIZE: u32 = 10;

/// A rectangle in atlas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl AtlasRect {
    /// Whether the interiors of two rectangles overlap.
    pub fn intersects(&self, other: &AtlasRect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// Where one packed frame ended up, plus everything the consuming game needs
/// to position it.
#[derive(Debug)]
pub struct TextureRecord {
    pub name: String,
    pub rect: AtlasRect,
    pub doc_width: u32,
    pub doc_height: u32,
    /// Whitespace trimmed from each side of the original document.
    pub offsets: TrimOffsets,
    /// Frame duration in seconds.
    pub duration: f32,
}

/// An animation spanning a run of frame textures.
#[derive(Debug)]
pub struct AnimationRecord {
    pub name: String,
    /// Name of the first frame texture.
    pub first: String,
    /// Name of the last frame texture.
    pub last: String,
    pub direction: AnimationDirection,
    pub repeat: u16,
    pub doc_width: u32,
    pub doc_height: u32,
}

/// One packed tile with its grid coordinate in the source sheet.
#[derive(Debug)]
pub struct TileRecord {
    pub grid_x: u32,
    pub grid_y: u32,
    pub rect: AtlasRect,
}

/// All packed tiles of one tileset document.
#[derive(Debug)]
pub struct TilesetRecord {
    pub name: String,
    pub tiles: Vec<TileRecord>,
}

/// One packed glyph with its metrics.
#[derive(Debug)]
pub struct GlyphRecord {
    pub codepoint: char,
    pub rect: AtlasRect,
    pub offset_x: i32,
    pub offset_y: i32,
    pub advance_x: f32,
}

/// Atlas geometry and behavior switches.
#[derive(Debug, Clone, Copy)]
pub struct AtlasSettings {
    pub width: u32,
    pub height: u32,
    /// Extrude tile edges by one pixel so sub-pixel camera motion samples
    /// tile-local color instead of neighbour tiles.
    pub tile_padding: bool,
    /// Crop the finished atlas to the used region (from the bottom-right, so
    /// recorded coordinates stay valid).
    pub crop: bool,
}

impl Default for AtlasSettings {
    fn default() -> Self {
        AtlasSettings {
            width: 1024,
            height: 1024,
            tile_padding: false,
            crop: true,
        }
    }
}

/// The finished atlas: the image plus every record the catalogue emits.
#[derive(Debug)]
pub struct Atlas {
    pub image: RgbaImage,
    pub sprites: Vec<TextureRecord>,
    pub animations: Vec<AnimationRecord>,
    pub tilesets: Vec<TilesetRecord>,
    pub glyphs: Vec<GlyphRecord>,
    /// The solid-white block, when it found a spot.
    pub swatch: Option<AtlasRect>,
}

struct TextureEntry {
    name: String,
    frame: FrameImage,
    doc_width: u32,
    doc_height: u32,
}

struct TileEntry {
    tileset: usize,
    tile: TileImage,
}

enum Entry {
    Texture(TextureEntry),
    Glyph(GlyphImage),
    Tile(TileEntry),
}

/// Gathers rectangles from every source, then packs and composites them in
/// one pass.
pub struct AtlasBuilder {
    settings: AtlasSettings,
    entries: Vec<Entry>,
    tileset_names: Vec<String>,
    animations: Vec<AnimationRecord>,
}

impl AtlasBuilder {
    pub fn new(settings: AtlasSettings) -> Self {
        AtlasBuilder {
            settings,
            entries: Vec::new(),
            tileset_names: Vec::new(),
            animations: Vec::new(),
        }
    }

    /// Add every frame of a flattened document. Frame textures are named
    /// `<base_name><frame_index>`; animations pick up the tag name as a
    /// `_<tag>` suffix.
    pub fn add_document(&mut self, base_name: &str, doc: FlattenedDocument) {
        for animation in &doc.animations {
            self.animations.push(resolve_animation(
                base_name,
                animation,
                doc.doc_width,
                doc.doc_height,
            ));
        }
        for frame in doc.frames {
            let name = format!("{}{}", base_name, frame.frame_index);
            self.entries.push(Entry::Texture(TextureEntry {
                name,
                frame,
                doc_width: doc.doc_width,
                doc_height: doc.doc_height,
            }));
        }
    }

    /// Add a plain image (e.g. a decoded PNG) as a single untrimmed texture.
    pub fn add_image(&mut self, name: &str, image: RgbaImage) {
        let (width, height) = image.dimensions();
        self.entries.push(Entry::Texture(TextureEntry {
            name: name.to_owned(),
            frame: FrameImage {
                frame_index: 0,
                pixels: image,
                source_x: 0,
                source_y: 0,
                source_width: width,
                source_height: height,
                offsets: TrimOffsets::default(),
                duration_ms: 0,
            },
            doc_width: width,
            doc_height: height,
        }));
    }

    /// Add the surviving tiles of one tileset document.
    pub fn add_tileset(&mut self, name: &str, tiles: Vec<TileImage>) {
        let tileset = self.tileset_names.len();
        self.tileset_names.push(name.to_owned());
        for tile in tiles {
            self.entries.push(Entry::Tile(TileEntry { tileset, tile }));
        }
    }

    /// Add rasterized glyphs.
    pub fn add_glyphs(&mut self, glyphs: Vec<GlyphImage>) {
        for glyph in glyphs {
            self.entries.push(Entry::Glyph(glyph));
        }
    }

    /// Pack everything, composite the atlas image and collect the records.
    ///
    /// A rectangle that does not fit is dropped; the first such failure logs
    /// one error for the whole run, and the remaining records are still
    /// produced. Partial atlases stay useful for iteration.
    pub fn build(self) -> Atlas {
        let settings = self.settings;
        let mut packer = Packer::new(Config {
            width: settings.width as i32,
            height: settings.height as i32,
            border_padding: 0,
            rectangle_padding: 0,
        });
        let mut image = RgbaImage::new(settings.width, settings.height);
        let mut fit_error_logged = false;

        let mut sprites = Vec::new();
        let mut tilesets: Vec<TilesetRecord> = self
            .tileset_names
            .into_iter()
            .map(|name| TilesetRecord {
                name,
                tiles: Vec::new(),
            })
            .collect();
        let mut glyphs = Vec::new();

        for entry in self.entries {
            match entry {
                Entry::Texture(texture) => {
                    // 1-px seam between neighbours.
                    let packed_w = texture.frame.source_width + 1;
                    let packed_h = texture.frame.source_height + 1;
                    if let Some((x, y)) =
                        place(&mut packer, packed_w, packed_h, &mut fit_error_logged)
                    {
                        let frame = &texture.frame;
                        copy_rect(
                            &mut image,
                            &frame.pixels,
                            frame.source_x,
                            frame.source_y,
                            frame.source_width,
                            frame.source_height,
                            x,
                            y,
                        );
                        sprites.push(TextureRecord {
                            name: texture.name,
                            rect: AtlasRect {
                                x,
                                y,
                                w: frame.source_width,
                                h: frame.source_height,
                            },
                            doc_width: texture.doc_width,
                            doc_height: texture.doc_height,
                            offsets: frame.offsets,
                            duration: frame.duration_ms as f32 / 1000.0,
                        });
                    }
                }
                Entry::Glyph(glyph) => {
                    // 1-px transparent border on all sides against filtering
                    // bleed.
                    let (glyph_w, glyph_h) = glyph.pixels.dimensions();
                    if let Some((x, y)) =
                        place(&mut packer, glyph_w + 2, glyph_h + 2, &mut fit_error_logged)
                    {
                        copy_rect(&mut image, &glyph.pixels, 0, 0, glyph_w, glyph_h, x + 1, y + 1);
                        glyphs.push(GlyphRecord {
                            codepoint: glyph.codepoint,
                            rect: AtlasRect {
                                x: x + 1,
                                y: y + 1,
                                w: glyph_w,
                                h: glyph_h,
                            },
                            offset_x: glyph.offset_x,
                            offset_y: glyph.offset_y,
                            advance_x: glyph.advance_x,
                        });
                    }
                }
                Entry::Tile(entry) => {
                    let inset = if settings.tile_padding { 1 } else { 0 };
                    let tile_size = entry.tile.pixels.width();
                    let packed = tile_size + 2 * inset + 1;
                    if let Some((x, y)) = place(&mut packer, packed, packed, &mut fit_error_logged)
                    {
                        let tile_x = x + inset;
                        let tile_y = y + inset;
                        copy_rect(
                            &mut image,
                            &entry.tile.pixels,
                            0,
                            0,
                            tile_size,
                            tile_size,
                            tile_x,
                            tile_y,
                        );
                        if inset == 1 {
                            extrude_edges(&mut image, tile_x, tile_y, tile_size);
                        }
                        tilesets[entry.tileset].tiles.push(TileRecord {
                            grid_x: entry.tile.grid_x,
                            grid_y: entry.tile.grid_y,
                            rect: AtlasRect {
                                x: tile_x,
                                y: tile_y,
                                w: tile_size,
                                h: tile_size,
                            },
                        });
                    }
                }
            }
        }

        // A solid block so the atlas texture can draw filled shapes.
        let swatch = place(
            &mut packer,
            SWATCH_SIZE + 1,
            SWATCH_SIZE + 1,
            &mut fit_error_logged,
        )
        .map(|(x, y)| {
            for py in y..y + SWATCH_SIZE {
                for px in x..x + SWATCH_SIZE {
                    image.put_pixel(px, py, image::Rgba([255, 255, 255, 255]));
                }
            }
            AtlasRect {
                x,
                y,
                w: SWATCH_SIZE,
                h: SWATCH_SIZE,
            }
        });

        let image = if settings.crop {
            crop_to_used(image)
        } else {
            image
        };

        Atlas {
            image,
            sprites,
            animations: self.animations,
            tilesets,
            glyphs,
            swatch,
        }
    }
}

fn resolve_animation(
    base_name: &str,
    animation: &DocAnimation,
    doc_width: u32,
    doc_height: u32,
) -> AnimationRecord {
    let name = match &animation.tag_name {
        Some(tag) => format!("{}_{}", base_name, tag),
        None => base_name.to_owned(),
    };
    AnimationRecord {
        name,
        first: format!("{}{}", base_name, animation.from_frame),
        last: format!("{}{}", base_name, animation.to_frame),
        direction: animation.direction,
        repeat: animation.repeat,
        doc_width,
        doc_height,
    }
}

fn place(packer: &mut Packer, w: u32, h: u32, fit_error_logged: &mut bool) -> Option<(u32, u32)> {
    match packer.pack(w as i32, h as i32, false) {
        Some(rect) => Some((rect.x as u32, rect.y as u32)),
        None => {
            if !*fit_error_logged {
                error!("atlas is full; at least one rectangle was dropped");
                *fit_error_logged = true;
            }
            None
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn copy_rect(
    dst: &mut RgbaImage,
    src: &RgbaImage,
    src_x: u32,
    src_y: u32,
    w: u32,
    h: u32,
    dst_x: u32,
    dst_y: u32,
) {
    for y in 0..h {
        for x in 0..w {
            let px = *src.get_pixel(src_x + x, src_y + y);
            dst.put_pixel(dst_x + x, dst_y + y, px);
        }
    }
}

// Copies the four 1-px edge strips of a tile outward. The packer reserved
// the border, so the writes stay inside the tile's padded rectangle.
fn extrude_edges(image: &mut RgbaImage, x: u32, y: u32, size: u32) {
    for i in 0..size {
        let top = *image.get_pixel(x + i, y);
        image.put_pixel(x + i, y - 1, top);
        let bottom = *image.get_pixel(x + i, y + size - 1);
        image.put_pixel(x + i, y + size, bottom);
        let left = *image.get_pixel(x, y + i);
        image.put_pixel(x - 1, y + i, left);
        let right = *image.get_pixel(x + size - 1, y + i);
        image.put_pixel(x + size, y + i, right);
    }
}

// Tightest rectangle containing any non-transparent pixel, anchored at the
// origin.
fn crop_to_used(image: RgbaImage) -> RgbaImage {
    let mut used_w = 0;
    let mut used_h = 0;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0[3] != 0 {
            used_w = used_w.max(x + 1);
            used_h = used_h.max(y + 1);
        }
    }
    if used_w == 0 {
        used_w = 1;
        used_h = 1;
    }
    image::imageops::crop_imm(&image, 0, 0, used_w, used_h).to_image()
}

use std::{fs, path::Path};

use crate::{
    cel::RawCel,
    layer::Layer,
    palette::ColorPalette,
    parse::{self, Chunk},
    tags::Tag,
    AsepriteParseError, Result,
};

/// A decoded Aseprite document.
///
/// The document owns every buffer, string and property tree decoded from the
/// stream; dropping it releases everything in one step. It is immutable after
/// decoding completes.
#[derive(Debug)]
pub struct AsepriteFile {
    pub(crate) header: FileHeader,
    pub(crate) frames: Vec<Frame>,
}

/// The fixed 128-byte file header.
#[derive(Debug, Clone)]
pub struct FileHeader {
    /// Total byte count the header declares for the whole file.
    pub file_size: u32,
    pub num_frames: u16,
    pub width: u16,
    pub height: u16,
    pub pixel_format: PixelFormat,
    /// Raw header flag bits.
    pub flags: u32,
    /// Default frame duration in milliseconds; frames with duration 0
    /// inherit it.
    pub default_frame_time: u16,
    /// Palette index treated as transparent (indexed mode only).
    pub transparent_color_index: u8,
    pub num_colors: u16,
    /// Pixel aspect ratio numerator; 0 means 1.
    pub pixel_width: u8,
    /// Pixel aspect ratio denominator; 0 means 1.
    pub pixel_height: u8,
    pub grid_x: i16,
    pub grid_y: i16,
    pub grid_width: u16,
    pub grid_height: u16,
}

impl FileHeader {
    /// Whether the layer opacity fields carry meaningful values.
    pub fn layer_opacity_valid(&self) -> bool {
        self.flags & 1 != 0
    }

    /// Pixel aspect ratio with the zero-means-one rule applied.
    pub fn pixel_ratio(&self) -> (u8, u8) {
        (self.pixel_width.max(1), self.pixel_height.max(1))
    }
}

/// One animation frame: its effective duration and the chunks it carries, in
/// file order.
#[derive(Debug)]
pub struct Frame {
    pub duration_ms: u16,
    pub chunks: Vec<Chunk>,
}

impl Frame {
    /// Frame duration in seconds.
    pub fn duration(&self) -> f32 {
        self.duration_ms as f32 / 1000.0
    }

    /// All cel chunks of this frame, in file order.
    pub fn cels(&self) -> impl Iterator<Item = &RawCel> {
        self.chunks.iter().filter_map(|chunk| match chunk {
            Chunk::Cel(cel) => Some(cel),
            _ => None,
        })
    }
}

/// Pixel format of the source Aseprite file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Red, green, blue, and alpha with 8 bits each.
    Rgba,
    /// 8 bit grayscale and 8 bit alpha.
    Grayscale,
    /// Indexed color. Color is determined by palette. The
    /// `transparent_color_index` indicates a transparent pixel in any
    /// non-background layer.
    #[allow(missing_docs)]
    Indexed { transparent_color_index: u8 },
}

impl PixelFormat {
    /// Number of bytes to store one pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba => 4,
            PixelFormat::Grayscale => 2,
            PixelFormat::Indexed { .. } => 1,
        }
    }
}

impl AsepriteFile {
    /// Load an Aseprite file. Loads the full file into memory.
    pub fn read_file(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(AsepriteParseError::ReadFailed)?;
        parse::read_aseprite(&data)
    }

    /// Decode an Aseprite document from an in-memory byte slice.
    pub fn read(data: &[u8]) -> Result<Self> {
        parse::read_aseprite(data)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.header.width as u32
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.header.height as u32
    }

    /// Width and height in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Number of animation frames.
    pub fn num_frames(&self) -> u32 {
        self.frames.len() as u32
    }

    /// The pixel format used by the original file.
    pub fn pixel_format(&self) -> PixelFormat {
        self.header.pixel_format
    }

    /// The decoded file header.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// All frames, in document order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// A reference to a single frame.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than `num_frames`.
    pub fn frame(&self, index: u32) -> &Frame {
        &self.frames[index as usize]
    }

    /// Every chunk of every frame, in file order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.frames.iter().flat_map(|frame| frame.chunks.iter())
    }

    /// All layer chunks in file order. Index into the result is the layer
    /// index cels refer to.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.chunks().filter_map(|chunk| match chunk {
            Chunk::Layer(layer) => Some(layer),
            _ => None,
        })
    }

    /// All tags in document order, regardless of which frame carries them.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.chunks().flat_map(|chunk| match chunk {
            Chunk::Tags(tags) => tags.as_slice(),
            _ => &[],
        })
    }

    /// The first palette chunk in the document, if any. Indexed pixels
    /// resolve against it.
    pub fn first_palette(&self) -> Option<&ColorPalette> {
        self.chunks().find_map(|chunk| match chunk {
            Chunk::Palette(palette) => Some(palette),
            _ => None,
        })
    }
}

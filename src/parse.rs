use log::debug;

use crate::cel::{CelContent, CelExtra, RawCel};
use crate::color_profile::ColorProfile;
use crate::external_file::ExternalFile;
use crate::layer::Layer;
use crate::mask::Mask;
use crate::palette::{ColorPalette, OldPalette, OldPaletteKind};
use crate::reader::AseReader;
use crate::slice::Slice;
use crate::tags::Tag;
use crate::tileset::Tileset;
use crate::user_data::UserData;
use crate::{
    cel, color_profile, external_file, layer, mask, palette, slice, tags, tileset, user_data,
    AsepriteFile, AsepriteParseError, FileHeader, Frame, PixelFormat, Result,
};

// file format docs: https://github.com/aseprite/aseprite/blob/master/docs/ase-file-specs.md
pub(crate) const FILE_MAGIC: u16 = 0xA5E0;
pub(crate) const FRAME_MAGIC: u16 = 0xF1FA;

const CHUNK_HEADER_SIZE: usize = 6;
const FRAME_HEADER_SIZE: i64 = 16;

/// The sixteen chunk variants of the container, identified by their 16-bit
/// type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkType {
    OldPalette256, // deprecated
    OldPalette64,  // deprecated
    Layer,
    Cel,
    CelExtra,
    ColorProfile,
    ExternalFiles,
    Mask, // deprecated
    Path,
    Tags,
    Palette,
    UserData,
    Slice,
    Tileset,
}

impl ChunkType {
    fn from_code(code: u16) -> Option<ChunkType> {
        match code {
            0x0004 => Some(ChunkType::OldPalette256),
            0x0011 => Some(ChunkType::OldPalette64),
            0x2004 => Some(ChunkType::Layer),
            0x2005 => Some(ChunkType::Cel),
            0x2006 => Some(ChunkType::CelExtra),
            0x2007 => Some(ChunkType::ColorProfile),
            0x2008 => Some(ChunkType::ExternalFiles),
            0x2016 => Some(ChunkType::Mask),
            0x2017 => Some(ChunkType::Path),
            0x2018 => Some(ChunkType::Tags),
            0x2019 => Some(ChunkType::Palette),
            0x2020 => Some(ChunkType::UserData),
            0x2022 => Some(ChunkType::Slice),
            0x2023 => Some(ChunkType::Tileset),
            _ => None,
        }
    }
}

/// One decoded chunk with its typed payload.
#[derive(Debug)]
pub enum Chunk {
    OldPalette(OldPalette),
    Layer(Layer),
    Cel(RawCel),
    CelExtra(CelExtra),
    ColorProfile(ColorProfile),
    ExternalFiles(Vec<ExternalFile>),
    Mask(Mask),
    Path,
    Tags(Vec<Tag>),
    Palette(ColorPalette),
    UserData(UserData),
    Slice(Slice),
    Tileset(Tileset),
}

impl Chunk {
    /// The chunk variant this payload was decoded from.
    pub fn chunk_type(&self) -> ChunkType {
        match self {
            // The two legacy palette chunks only differ in their color range,
            // recorded on the payload.
            Chunk::OldPalette(p) => match p.kind {
                OldPaletteKind::Rgb256 => ChunkType::OldPalette256,
                OldPaletteKind::Rgb64 => ChunkType::OldPalette64,
            },
            Chunk::Layer(_) => ChunkType::Layer,
            Chunk::Cel(_) => ChunkType::Cel,
            Chunk::CelExtra(_) => ChunkType::CelExtra,
            Chunk::ColorProfile(_) => ChunkType::ColorProfile,
            Chunk::ExternalFiles(_) => ChunkType::ExternalFiles,
            Chunk::Mask(_) => ChunkType::Mask,
            Chunk::Path => ChunkType::Path,
            Chunk::Tags(_) => ChunkType::Tags,
            Chunk::Palette(_) => ChunkType::Palette,
            Chunk::UserData(_) => ChunkType::UserData,
            Chunk::Slice(_) => ChunkType::Slice,
            Chunk::Tileset(_) => ChunkType::Tileset,
        }
    }
}

/// Decode a full Aseprite document.
///
/// Unknown chunk type codes are skipped by their declared length so files
/// written by newer editors remain readable.
pub fn read_aseprite(data: &[u8]) -> Result<AsepriteFile> {
    let mut reader = AseReader::new(data);
    let header = parse_file_header(&mut reader, data.len() as u64)?;

    let mut frames = Vec::with_capacity(header.num_frames as usize);
    for _frame in 0..header.num_frames {
        let (duration_ms, chunks) = parse_frame(
            &mut reader,
            header.pixel_format,
            header.default_frame_time,
            None,
        )?;
        frames.push(Frame {
            duration_ms,
            chunks,
        });
    }

    let file = AsepriteFile { header, frames };
    validate(&file)?;
    Ok(file)
}

/// Walk the frames of a document and return only the chunks whose type is in
/// `wanted`, as a flat list in file order.
///
/// Unlike [read_aseprite] this pass is strict: an unknown chunk type code is
/// an error rather than a skip.
pub fn read_chunks_filtered(data: &[u8], wanted: &[ChunkType]) -> Result<Vec<Chunk>> {
    let mut reader = AseReader::new(data);
    let header = parse_file_header(&mut reader, data.len() as u64)?;

    let mut chunks = Vec::new();
    for _frame in 0..header.num_frames {
        let (_duration, mut frame_chunks) = parse_frame(
            &mut reader,
            header.pixel_format,
            header.default_frame_time,
            Some(wanted),
        )?;
        chunks.append(&mut frame_chunks);
    }
    Ok(chunks)
}

/// [read_chunks_filtered] specialized to a single chunk variant.
pub fn read_chunks_of(data: &[u8], chunk_type: ChunkType) -> Result<Vec<Chunk>> {
    read_chunks_filtered(data, &[chunk_type])
}

fn parse_file_header(reader: &mut AseReader, stream_len: u64) -> Result<FileHeader> {
    let file_size = reader.dword()?;
    let magic_offset = reader.position();
    let magic_number = reader.word()?;
    if magic_number != FILE_MAGIC {
        return Err(AsepriteParseError::BadFileMagic {
            offset: magic_offset,
            found: magic_number,
        });
    }
    if file_size as u64 != stream_len {
        return Err(AsepriteParseError::DataSizeMismatch {
            declared: file_size,
            actual: stream_len,
        });
    }

    let num_frames = reader.word()?;
    let width = reader.word()?;
    let height = reader.word()?;
    let color_depth = reader.word()?;
    let flags = reader.dword()?;
    let default_frame_time = reader.word()?;
    reader.skip_bytes(8)?; // two zeroed legacy dwords
    let transparent_color_index = reader.byte()?;
    reader.skip_bytes(3)?;
    let num_colors = reader.word()?;
    let pixel_width = reader.byte()?;
    let pixel_height = reader.byte()?;
    let grid_x = reader.short()?;
    let grid_y = reader.short()?;
    let grid_width = reader.word()?;
    let grid_height = reader.word()?;
    reader.skip_bytes(84)?;

    let pixel_format = parse_pixel_format(color_depth, transparent_color_index)?;

    Ok(FileHeader {
        file_size,
        num_frames,
        width,
        height,
        pixel_format,
        flags,
        default_frame_time,
        transparent_color_index,
        num_colors,
        pixel_width,
        pixel_height,
        grid_x,
        grid_y,
        grid_width,
        grid_height,
    })
}

// When `filter` is None every known chunk is decoded and unknown codes are
// skipped. With a filter only the wanted types are decoded and unknown codes
// are fatal.
fn parse_frame(
    reader: &mut AseReader,
    pixel_format: PixelFormat,
    default_frame_time: u16,
    filter: Option<&[ChunkType]>,
) -> Result<(u16, Vec<Chunk>)> {
    let bytes = reader.dword()?;
    let magic_offset = reader.position();
    let magic_number = reader.word()?;
    if magic_number != FRAME_MAGIC {
        return Err(AsepriteParseError::BadFrameMagic {
            offset: magic_offset,
            found: magic_number,
        });
    }
    let old_num_chunks = reader.word()?;
    let frame_duration_ms = reader.word()?;
    reader.skip_bytes(2)?;
    let new_num_chunks = reader.dword()?;

    let num_chunks = if new_num_chunks == 0 {
        old_num_chunks as u32
    } else {
        new_num_chunks
    };
    let duration_ms = if frame_duration_ms == 0 {
        default_frame_time
    } else {
        frame_duration_ms
    };

    let mut chunks = Vec::new();
    let mut bytes_available = bytes as i64 - FRAME_HEADER_SIZE;
    for _chunk in 0..num_chunks {
        let chunk_offset = reader.position();
        // chunk size includes the 6-byte chunk header
        let chunk_size = reader.dword()?;
        let chunk_code = reader.word()?;
        check_chunk_bytes(chunk_size, bytes_available, chunk_offset)?;
        let (chunk_data, data_offset) =
            reader.take_slice(chunk_size as usize - CHUNK_HEADER_SIZE)?;
        bytes_available -= chunk_size as i64;

        let chunk_type = match ChunkType::from_code(chunk_code) {
            Some(chunk_type) => chunk_type,
            None if filter.is_none() => {
                debug!(
                    "Skipping unknown chunk type {:#06x} ({} bytes) at offset {}",
                    chunk_code,
                    chunk_data.len(),
                    chunk_offset
                );
                continue;
            }
            None => {
                return Err(AsepriteParseError::InvalidChunkType {
                    offset: chunk_offset,
                    code: chunk_code,
                })
            }
        };
        if let Some(wanted) = filter {
            if !wanted.contains(&chunk_type) {
                continue;
            }
        }

        chunks.push(parse_chunk(chunk_type, chunk_data, data_offset, pixel_format)?);
    }

    Ok((duration_ms, chunks))
}

// Each decoder runs on a sub-slice of exactly the declared payload length, so
// it can never read past its chunk; trailing reserved bytes are dropped with
// the slice.
fn parse_chunk(
    chunk_type: ChunkType,
    data: &[u8],
    offset: u64,
    pixel_format: PixelFormat,
) -> Result<Chunk> {
    let reader = AseReader::with_offset(data, offset);
    match chunk_type {
        ChunkType::OldPalette256 => {
            palette::parse_old_palette_chunk(reader, OldPaletteKind::Rgb256).map(Chunk::OldPalette)
        }
        ChunkType::OldPalette64 => {
            palette::parse_old_palette_chunk(reader, OldPaletteKind::Rgb64).map(Chunk::OldPalette)
        }
        ChunkType::Layer => layer::parse_chunk(reader).map(Chunk::Layer),
        ChunkType::Cel => cel::parse_chunk(reader, pixel_format).map(Chunk::Cel),
        ChunkType::CelExtra => cel::parse_extra_chunk(reader).map(Chunk::CelExtra),
        ChunkType::ColorProfile => color_profile::parse_chunk(reader).map(Chunk::ColorProfile),
        ChunkType::ExternalFiles => external_file::parse_chunk(reader).map(Chunk::ExternalFiles),
        ChunkType::Mask => mask::parse_chunk(reader).map(Chunk::Mask),
        ChunkType::Path => Ok(Chunk::Path), // reserved, empty payload
        ChunkType::Tags => tags::parse_chunk(reader).map(Chunk::Tags),
        ChunkType::Palette => palette::parse_chunk(reader).map(Chunk::Palette),
        ChunkType::UserData => user_data::parse_chunk(reader).map(Chunk::UserData),
        ChunkType::Slice => slice::parse_chunk(reader).map(Chunk::Slice),
        ChunkType::Tileset => tileset::parse_chunk(reader, pixel_format).map(Chunk::Tileset),
    }
}

fn check_chunk_bytes(chunk_size: u32, bytes_available: i64, offset: u64) -> Result<()> {
    if (chunk_size as usize) < CHUNK_HEADER_SIZE {
        return Err(AsepriteParseError::InvalidInput(format!(
            "Chunk size {} at offset {} is below the minimum of {}",
            chunk_size, offset, CHUNK_HEADER_SIZE
        )));
    }
    if chunk_size as i64 > bytes_available {
        return Err(AsepriteParseError::InvalidInput(format!(
            "Chunk of size {} at offset {} exceeds the {} bytes left in its frame",
            chunk_size, offset, bytes_available
        )));
    }
    Ok(())
}

fn parse_pixel_format(color_depth: u16, transparent_color_index: u8) -> Result<PixelFormat> {
    match color_depth {
        8 => Ok(PixelFormat::Indexed {
            transparent_color_index,
        }),
        16 => Ok(PixelFormat::Grayscale),
        32 => Ok(PixelFormat::Rgba),
        _ => Err(AsepriteParseError::InvalidInput(format!(
            "Unknown pixel format. Color depth: {}",
            color_depth
        ))),
    }
}

// Cross-chunk invariants: every cel refers to an already declared layer,
// linked cels point strictly backward, tag ranges lie inside the document.
fn validate(file: &AsepriteFile) -> Result<()> {
    let num_frames = file.frames.len();
    let mut layers_seen = 0_usize;
    for (frame_index, frame) in file.frames.iter().enumerate() {
        for chunk in &frame.chunks {
            match chunk {
                Chunk::Layer(_) => layers_seen += 1,
                Chunk::Cel(cel) => {
                    if cel.layer_index as usize >= layers_seen {
                        return Err(AsepriteParseError::InvalidInput(format!(
                            "Cel in frame {} references layer {} but only {} layers are declared",
                            frame_index, cel.layer_index, layers_seen
                        )));
                    }
                    if let CelContent::Linked(linked_frame) = cel.content {
                        if linked_frame as usize >= frame_index {
                            return Err(AsepriteParseError::InvalidInput(format!(
                                "Linked cel in frame {} references frame {}; links must point backward",
                                frame_index, linked_frame
                            )));
                        }
                    }
                }
                Chunk::Tags(tags) => {
                    for tag in tags {
                        if tag.from_frame > tag.to_frame || tag.to_frame as usize >= num_frames {
                            return Err(AsepriteParseError::InvalidInput(format!(
                                "Tag '{}' spans frames {}..{} in a {}-frame document",
                                tag.name, tag.from_frame, tag.to_frame, num_frames
                            )));
                        }
                    }
                }
                _ => {}
            }
        }
    }
    Ok(())
}

use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};

use crate::atlas::{AtlasBuilder, AtlasRect, AtlasSettings};
use crate::font::GlyphImage;
use crate::*;

// ---------------------------------------------------------------------------
// Synthesized documents
//
// Tests build Aseprite streams byte by byte instead of shipping binary
// fixtures; the builders below cover the header/frame/chunk framing.
// ---------------------------------------------------------------------------

struct DocBuilder {
    width: u16,
    height: u16,
    color_depth: u16,
    transparent_index: u8,
    default_frame_time: u16,
    frames: Vec<FrameBuilder>,
}

impl DocBuilder {
    fn new(width: u16, height: u16, color_depth: u16) -> Self {
        DocBuilder {
            width,
            height,
            color_depth,
            transparent_index: 0,
            default_frame_time: 100,
            frames: Vec::new(),
        }
    }

    fn frame(mut self, frame: FrameBuilder) -> Self {
        self.frames.push(frame);
        self
    }

    fn build(self) -> Vec<u8> {
        let mut body = Vec::new();
        for frame in &self.frames {
            frame.write(&mut body);
        }

        let file_size = (128 + body.len()) as u32;
        let mut out = Vec::with_capacity(file_size as usize);
        out.extend_from_slice(&file_size.to_le_bytes());
        out.extend_from_slice(&0xA5E0_u16.to_le_bytes());
        out.extend_from_slice(&(self.frames.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.color_depth.to_le_bytes());
        out.extend_from_slice(&1_u32.to_le_bytes()); // flags: layer opacity valid
        out.extend_from_slice(&self.default_frame_time.to_le_bytes());
        out.extend_from_slice(&[0; 8]); // legacy placeholder dwords
        out.push(self.transparent_index);
        out.extend_from_slice(&[0; 3]);
        out.extend_from_slice(&0_u16.to_le_bytes()); // palette size
        out.push(1); // pixel width
        out.push(1); // pixel height
        out.extend_from_slice(&0_i16.to_le_bytes()); // grid x
        out.extend_from_slice(&0_i16.to_le_bytes()); // grid y
        out.extend_from_slice(&16_u16.to_le_bytes()); // grid width
        out.extend_from_slice(&16_u16.to_le_bytes()); // grid height
        out.extend_from_slice(&[0; 84]);
        assert_eq!(out.len(), 128);
        out.extend_from_slice(&body);
        out
    }
}

struct FrameBuilder {
    duration: u16,
    legacy_count_only: bool,
    chunks: Vec<Vec<u8>>,
}

impl FrameBuilder {
    fn new() -> Self {
        FrameBuilder {
            duration: 100,
            legacy_count_only: false,
            chunks: Vec::new(),
        }
    }

    fn duration(mut self, ms: u16) -> Self {
        self.duration = ms;
        self
    }

    fn legacy_count_only(mut self) -> Self {
        self.legacy_count_only = true;
        self
    }

    fn chunk(mut self, chunk: Vec<u8>) -> Self {
        self.chunks.push(chunk);
        self
    }

    fn write(&self, out: &mut Vec<u8>) {
        let chunk_bytes: usize = self.chunks.iter().map(Vec::len).sum();
        out.extend_from_slice(&((16 + chunk_bytes) as u32).to_le_bytes());
        out.extend_from_slice(&0xF1FA_u16.to_le_bytes());
        out.extend_from_slice(&(self.chunks.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.duration.to_le_bytes());
        out.extend_from_slice(&[0; 2]);
        let modern = if self.legacy_count_only {
            0
        } else {
            self.chunks.len() as u32
        };
        out.extend_from_slice(&modern.to_le_bytes());
        for chunk in &self.chunks {
            out.extend_from_slice(chunk);
        }
    }
}

fn chunk(chunk_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 6);
    out.extend_from_slice(&((payload.len() + 6) as u32).to_le_bytes());
    out.extend_from_slice(&chunk_type.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

fn ase_string(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() + 2);
    out.extend_from_slice(&(s.len() as u16).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
    out
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn layer_chunk_full(name: &str, flags: u16, blend_code: u16) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&flags.to_le_bytes());
    payload.extend_from_slice(&0_u16.to_le_bytes()); // type: image
    payload.extend_from_slice(&0_u16.to_le_bytes()); // child level
    payload.extend_from_slice(&0_u16.to_le_bytes()); // default width
    payload.extend_from_slice(&0_u16.to_le_bytes()); // default height
    payload.extend_from_slice(&blend_code.to_le_bytes());
    payload.push(255); // opacity
    payload.extend_from_slice(&[0; 3]);
    payload.extend_from_slice(&ase_string(name));
    chunk(0x2004, &payload)
}

fn layer_chunk_with_flags(name: &str, flags: u16) -> Vec<u8> {
    layer_chunk_full(name, flags, 0)
}

fn layer_chunk(name: &str) -> Vec<u8> {
    layer_chunk_with_flags(name, 1)
}

fn cel_header(layer: u16, x: i16, y: i16, cel_type: u16) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&layer.to_le_bytes());
    payload.extend_from_slice(&x.to_le_bytes());
    payload.extend_from_slice(&y.to_le_bytes());
    payload.push(255); // opacity
    payload.extend_from_slice(&cel_type.to_le_bytes());
    payload.extend_from_slice(&0_i16.to_le_bytes()); // z-index
    payload.extend_from_slice(&[0; 5]);
    payload
}

fn compressed_cel_chunk(layer: u16, x: i16, y: i16, w: u16, h: u16, pixels: &[u8]) -> Vec<u8> {
    let mut payload = cel_header(layer, x, y, 2);
    payload.extend_from_slice(&w.to_le_bytes());
    payload.extend_from_slice(&h.to_le_bytes());
    payload.extend_from_slice(&zlib(pixels));
    chunk(0x2005, &payload)
}

fn raw_cel_chunk(layer: u16, x: i16, y: i16, w: u16, h: u16, pixels: &[u8]) -> Vec<u8> {
    let mut payload = cel_header(layer, x, y, 0);
    payload.extend_from_slice(&w.to_le_bytes());
    payload.extend_from_slice(&h.to_le_bytes());
    payload.extend_from_slice(pixels);
    chunk(0x2005, &payload)
}

fn linked_cel_chunk(layer: u16, frame: u16) -> Vec<u8> {
    let mut payload = cel_header(layer, 0, 0, 1);
    payload.extend_from_slice(&frame.to_le_bytes());
    chunk(0x2005, &payload)
}

fn tilemap_cel_chunk(
    layer: u16,
    w: u16,
    h: u16,
    bits_per_tile: u16,
    masks: [u32; 4],
    words: &[u8],
) -> Vec<u8> {
    let mut payload = cel_header(layer, 0, 0, 3);
    payload.extend_from_slice(&w.to_le_bytes());
    payload.extend_from_slice(&h.to_le_bytes());
    payload.extend_from_slice(&bits_per_tile.to_le_bytes());
    for mask in masks {
        payload.extend_from_slice(&mask.to_le_bytes());
    }
    payload.extend_from_slice(&[0; 10]);
    payload.extend_from_slice(&zlib(words));
    chunk(0x2005, &payload)
}

fn palette_chunk(colors: &[[u8; 4]]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&(colors.len() as u32).to_le_bytes());
    payload.extend_from_slice(&0_u32.to_le_bytes());
    payload.extend_from_slice(&(colors.len() as u32 - 1).to_le_bytes());
    payload.extend_from_slice(&[0; 8]);
    for color in colors {
        payload.extend_from_slice(&0_u16.to_le_bytes()); // no name
        payload.extend_from_slice(color);
    }
    chunk(0x2019, &payload)
}

fn tags_chunk(tags: &[(u16, u16, u8, &str)]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&(tags.len() as u16).to_le_bytes());
    payload.extend_from_slice(&[0; 8]);
    for (from, to, direction, name) in tags {
        payload.extend_from_slice(&from.to_le_bytes());
        payload.extend_from_slice(&to.to_le_bytes());
        payload.push(*direction);
        payload.extend_from_slice(&0_u16.to_le_bytes()); // repeat
        payload.extend_from_slice(&[0; 6]);
        payload.extend_from_slice(&[0; 3]); // deprecated RGB
        payload.push(0);
        payload.extend_from_slice(&ase_string(name));
    }
    chunk(0x2018, &payload)
}

fn single_frame_doc(width: u16, height: u16, pixels: &[u8]) -> Vec<u8> {
    DocBuilder::new(width, height, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(compressed_cel_chunk(0, 0, 0, width, height, pixels)),
        )
        .build()
}

// ---------------------------------------------------------------------------
// Document decoding
// ---------------------------------------------------------------------------

#[test]
fn minimum_document() {
    let data = single_frame_doc(1, 1, &[0xFF, 0x00, 0x00, 0xFF]);
    let ase = AsepriteFile::read(&data).unwrap();
    assert_eq!(ase.size(), (1, 1));
    assert_eq!(ase.num_frames(), 1);
    assert_eq!(ase.pixel_format(), PixelFormat::Rgba);

    let flat = flatten::flatten(&ase).unwrap();
    assert!(flat.animations.is_empty());
    assert_eq!(flat.frames.len(), 1);
    let frame = &flat.frames[0];
    assert_eq!((frame.source_width, frame.source_height), (1, 1));
    assert_eq!(frame.offsets, flatten::TrimOffsets::default());
    assert_eq!(frame.pixels.get_pixel(0, 0).0, [255, 0, 0, 255]);
}

#[test]
fn empty_document() {
    let data = DocBuilder::new(16, 16, 32).build();
    let ase = AsepriteFile::read(&data).unwrap();
    assert_eq!(ase.num_frames(), 0);
    assert!(ase.frames().is_empty());

    let flat = flatten::flatten(&ase).unwrap();
    assert!(flat.frames.is_empty());
    assert!(flat.animations.is_empty());
}

#[test]
fn indexed_transparent_index_zero() {
    let data = DocBuilder::new(2, 1, 8)
        .frame(
            FrameBuilder::new()
                .chunk(palette_chunk(&[[0, 0, 0, 0], [255, 0, 0, 255]]))
                .chunk(layer_chunk("Layer 1"))
                .chunk(compressed_cel_chunk(0, 0, 0, 2, 1, &[0, 1])),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();

    let flat = flatten::flatten(&ase).unwrap();
    let frame = &flat.frames[0];
    assert_eq!(frame.pixels.get_pixel(0, 0).0[3], 0);
    assert_eq!(frame.pixels.get_pixel(1, 0).0, [255, 0, 0, 255]);
}

#[test]
fn layer_blend_modes_decode_across_the_table() {
    let data = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk_full("shade", 1, 4))
                .chunk(layer_chunk_full("mix", 1, 18)),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let modes: Vec<BlendMode> = ase.layers().map(|layer| layer.blend_mode).collect();
    assert_eq!(modes, vec![BlendMode::Darken, BlendMode::Divide]);
}

#[test]
fn undefined_blend_mode_code_is_rejected() {
    let data = DocBuilder::new(1, 1, 32)
        .frame(FrameBuilder::new().chunk(layer_chunk_full("bad", 1, 99)))
        .build();
    match AsepriteFile::read(&data) {
        Err(AsepriteParseError::InvalidInput(msg)) => {
            assert!(msg.contains("blend mode code 99"), "unexpected message: {}", msg)
        }
        other => panic!("expected InvalidInput, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn indexed_without_palette_fails_on_flatten() {
    let data = DocBuilder::new(1, 1, 8)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[1])),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    match flatten::flatten(&ase) {
        Err(AsepriteParseError::MissingPaletteForIndexed) => {}
        other => panic!("expected MissingPaletteForIndexed, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn indexed_without_palette_fails_even_with_no_composited_cels() {
    // the only cel sits on a hidden layer, so nothing would ever resolve
    // through the palette
    let data = DocBuilder::new(1, 1, 8)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk_with_flags("hidden", 0))
                .chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[1])),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    match flatten::flatten(&ase) {
        Err(AsepriteParseError::MissingPaletteForIndexed) => {}
        other => panic!("expected MissingPaletteForIndexed, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn grayscale_expands_by_replication() {
    let data = DocBuilder::new(1, 1, 16)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[128, 200])),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let flat = flatten::flatten(&ase).unwrap();
    assert_eq!(flat.frames[0].pixels.get_pixel(0, 0).0, [128, 128, 128, 200]);
}

#[test]
fn bad_file_magic() {
    let mut data = single_frame_doc(1, 1, &[0; 4]);
    data[4] ^= 0xFF;
    match AsepriteFile::read(&data) {
        Err(AsepriteParseError::BadFileMagic { offset, .. }) => assert_eq!(offset, 4),
        other => panic!("expected BadFileMagic, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn bad_frame_magic() {
    let mut data = single_frame_doc(1, 1, &[0; 4]);
    // frame magic sits right after the 128-byte header and 4-byte frame size
    data[132] = 0;
    data[133] = 0;
    match AsepriteFile::read(&data) {
        Err(AsepriteParseError::BadFrameMagic { offset, found }) => {
            assert_eq!(offset, 132);
            assert_eq!(found, 0);
        }
        other => panic!("expected BadFrameMagic, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn data_size_mismatch() {
    let mut data = single_frame_doc(1, 1, &[0; 4]);
    data.push(0);
    match AsepriteFile::read(&data) {
        Err(AsepriteParseError::DataSizeMismatch { declared, actual }) => {
            assert_eq!(actual, declared as u64 + 1);
        }
        other => panic!("expected DataSizeMismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn unknown_chunk_is_skipped() {
    let data = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(chunk(0x9999, &[0xAB; 10]))
                .chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[1, 2, 3, 4])),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    // the unknown chunk vanishes, the cel behind it survives
    assert_eq!(ase.frame(0).chunks.len(), 2);
    assert_eq!(ase.frame(0).cels().count(), 1);
}

#[test]
fn unknown_chunk_is_fatal_in_strict_pass() {
    let data = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(chunk(0x9999, &[0xAB; 10])),
        )
        .build();
    match read_chunks_of(&data, ChunkType::Layer) {
        Err(AsepriteParseError::InvalidChunkType { code, .. }) => assert_eq!(code, 0x9999),
        other => panic!("expected InvalidChunkType, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn filtered_pass_returns_flat_list() {
    let data = DocBuilder::new(8, 8, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(tags_chunk(&[(0, 1, 0, "walk")]))
                .chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[0; 4])),
        )
        .frame(FrameBuilder::new().chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[0; 4])))
        .build();
    let chunks = read_chunks_of(&data, ChunkType::Tags).unwrap();
    assert_eq!(chunks.len(), 1);
    match &chunks[0] {
        Chunk::Tags(tags) => assert_eq!(tags[0].name, "walk"),
        other => panic!("expected tags chunk, got {:?}", other),
    }
}

#[test]
fn legacy_chunk_count_is_used_when_modern_is_zero() {
    let data = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .legacy_count_only()
                .chunk(layer_chunk("Layer 1"))
                .chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[0; 4])),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    assert_eq!(ase.frame(0).chunks.len(), 2);
}

#[test]
fn zero_duration_inherits_header_default() {
    let data = DocBuilder::new(1, 1, 32)
        .frame(FrameBuilder::new().duration(0).chunk(layer_chunk("Layer 1")))
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    assert_eq!(ase.frame(0).duration_ms, 100);
}

#[test]
fn trailing_chunk_bytes_are_dropped() {
    // a chunk longer than its decoder consumes still frames correctly
    let mut payload = Vec::new();
    payload.extend_from_slice(&1_u16.to_le_bytes()); // flags: visible
    payload.extend_from_slice(&0_u16.to_le_bytes());
    payload.extend_from_slice(&0_u16.to_le_bytes());
    payload.extend_from_slice(&0_u16.to_le_bytes());
    payload.extend_from_slice(&0_u16.to_le_bytes());
    payload.extend_from_slice(&0_u16.to_le_bytes());
    payload.push(255);
    payload.extend_from_slice(&[0; 3]);
    payload.extend_from_slice(&ase_string("padded"));
    payload.extend_from_slice(&[0xEE; 4]); // trailing junk
    let data = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(chunk(0x2004, &payload))
                .chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[0; 4])),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    assert_eq!(ase.layers().count(), 1);
    assert_eq!(ase.layers().next().unwrap().name, "padded");
    assert_eq!(ase.frame(0).cels().count(), 1);
}

#[test]
fn invalid_cel_type_is_fatal() {
    let mut payload = cel_header(0, 0, 0, 7);
    payload.extend_from_slice(&[0; 4]);
    let data = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(chunk(0x2005, &payload)),
        )
        .build();
    match AsepriteFile::read(&data) {
        Err(AsepriteParseError::InvalidCelType { code, .. }) => assert_eq!(code, 7),
        other => panic!("expected InvalidCelType, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn cel_layer_index_out_of_range_is_rejected() {
    let data = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(compressed_cel_chunk(5, 0, 0, 1, 1, &[0; 4])),
        )
        .build();
    assert!(matches!(
        AsepriteFile::read(&data),
        Err(AsepriteParseError::InvalidInput(_))
    ));
}

#[test]
fn linked_cel_must_point_backward() {
    let valid = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[0; 4])),
        )
        .frame(FrameBuilder::new().chunk(linked_cel_chunk(0, 0)))
        .build();
    assert!(AsepriteFile::read(&valid).is_ok());

    let self_link = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[0; 4])),
        )
        .frame(FrameBuilder::new().chunk(linked_cel_chunk(0, 1)))
        .build();
    assert!(matches!(
        AsepriteFile::read(&self_link),
        Err(AsepriteParseError::InvalidInput(_))
    ));
}

#[test]
fn tag_range_is_validated() {
    let data = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(tags_chunk(&[(0, 3, 0, "oob")])),
        )
        .build();
    assert!(matches!(
        AsepriteFile::read(&data),
        Err(AsepriteParseError::InvalidInput(_))
    ));
}

#[test]
fn unknown_tag_direction_falls_back_to_forward() {
    let data = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(tags_chunk(&[(0, 0, 9, "weird")])),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let tag = ase.tags().next().unwrap();
    assert_eq!(tag.animation_direction, AnimationDirection::Forward);
    assert_eq!(tag.name, "weird");
}

#[test]
fn raw_cel_decodes_but_is_excluded_from_flattening() {
    let data = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(raw_cel_chunk(0, 0, 0, 1, 1, &[9, 9, 9, 255])),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let cel = ase.frame(0).cels().next().unwrap();
    assert!(matches!(cel.content, CelContent::Raw(_)));

    let flat = flatten::flatten(&ase).unwrap();
    assert!(flat.frames.is_empty());
}

#[test]
fn hidden_layers_are_not_composited() {
    let data = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk_with_flags("hidden", 0))
                .chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[1, 2, 3, 255])),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let flat = flatten::flatten(&ase).unwrap();
    assert!(flat.frames.is_empty());
}

#[test]
fn cels_composite_in_layer_order() {
    let red = [255, 0, 0, 255];
    let blue = [0, 0, 255, 255];
    let data = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("bottom"))
                .chunk(layer_chunk("top"))
                // file order deliberately reversed; the flattener sorts
                .chunk(compressed_cel_chunk(1, 0, 0, 1, 1, &blue))
                .chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &red)),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let flat = flatten::flatten(&ase).unwrap();
    assert_eq!(flat.frames[0].pixels.get_pixel(0, 0).0, blue);
}

#[test]
fn frame_trim_offsets_match_document_size() {
    // 4x4 canvas, 2x2 cel at (1, 1)
    let data = DocBuilder::new(4, 4, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(compressed_cel_chunk(0, 1, 1, 2, 2, &[7; 16])),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let flat = flatten::flatten(&ase).unwrap();
    let frame = &flat.frames[0];
    assert_eq!((frame.source_width, frame.source_height), (2, 2));
    let offsets = frame.offsets;
    assert_eq!((offsets.left, offsets.top, offsets.right, offsets.bottom), (1, 1, 1, 1));
    assert_eq!(frame.source_width + offsets.left + offsets.right, flat.doc_width);
    assert_eq!(frame.source_height + offsets.top + offsets.bottom, flat.doc_height);
}

#[test]
fn cel_outside_canvas_is_clipped() {
    // 2x2 cel hanging off the top-left corner
    let pixels: Vec<u8> = [[1u8, 1, 1, 255]; 4].concat();
    let data = DocBuilder::new(4, 4, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(compressed_cel_chunk(0, -1, -1, 2, 2, &pixels)),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let flat = flatten::flatten(&ase).unwrap();
    let frame = &flat.frames[0];
    assert_eq!((frame.source_width, frame.source_height), (1, 1));
    assert_eq!((frame.source_x, frame.source_y), (1, 1));
    assert_eq!(frame.offsets.left, 0);
    assert_eq!(frame.offsets.right, 3);
}

// ---------------------------------------------------------------------------
// Individual chunk decoders
// ---------------------------------------------------------------------------

#[test]
fn old_palette_chunk_packs() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&1_u16.to_le_bytes()); // one packet
    payload.push(0); // skip
    payload.push(2); // two colors
    payload.extend_from_slice(&[10, 20, 30, 40, 50, 60]);
    let data = DocBuilder::new(1, 1, 32)
        .frame(FrameBuilder::new().chunk(chunk(0x0004, &payload)))
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let old = ase
        .chunks()
        .find_map(|c| match c {
            Chunk::OldPalette(p) => Some(p),
            _ => None,
        })
        .unwrap();
    assert_eq!(old.packets.len(), 1);
    assert_eq!(old.packets[0].colors, vec![[10, 20, 30], [40, 50, 60]]);
}

#[test]
fn color_profile_preserves_icc_bytes() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&2_u16.to_le_bytes()); // ICC
    payload.extend_from_slice(&0_u16.to_le_bytes()); // flags
    payload.extend_from_slice(&0_u32.to_le_bytes()); // gamma
    payload.extend_from_slice(&[0; 8]);
    payload.extend_from_slice(&3_u32.to_le_bytes());
    payload.extend_from_slice(&[1, 2, 3]);
    let data = DocBuilder::new(1, 1, 32)
        .frame(FrameBuilder::new().chunk(chunk(0x2007, &payload)))
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let profile = ase
        .chunks()
        .find_map(|c| match c {
            Chunk::ColorProfile(p) => Some(p),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        profile.profile_type,
        ColorProfileType::Icc { data: vec![1, 2, 3] }
    );
}

#[test]
fn cel_extra_precise_bounds() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&1_u32.to_le_bytes());
    payload.extend_from_slice(&0x0001_8000_i32.to_le_bytes()); // x = 1.5
    payload.extend_from_slice(&0_i32.to_le_bytes());
    payload.extend_from_slice(&0x0002_0000_i32.to_le_bytes()); // w = 2.0
    payload.extend_from_slice(&0x0000_8000_i32.to_le_bytes()); // h = 0.5
    payload.extend_from_slice(&[0; 16]);
    let data = DocBuilder::new(1, 1, 32)
        .frame(FrameBuilder::new().chunk(chunk(0x2006, &payload)))
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let extra = ase
        .chunks()
        .find_map(|c| match c {
            Chunk::CelExtra(e) => Some(e),
            _ => None,
        })
        .unwrap();
    assert_eq!(extra.precise_bounds, Some((1.5, 0.0, 2.0, 0.5)));
}

#[test]
fn mask_chunk_bitmap() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&0_i16.to_le_bytes());
    payload.extend_from_slice(&0_i16.to_le_bytes());
    payload.extend_from_slice(&9_u16.to_le_bytes()); // 9 px wide: 2 bytes/row
    payload.extend_from_slice(&2_u16.to_le_bytes());
    payload.extend_from_slice(&[0; 8]);
    payload.extend_from_slice(&ase_string("m"));
    payload.extend_from_slice(&[0xF0, 0x80, 0x0F, 0x01]);
    let data = DocBuilder::new(1, 1, 32)
        .frame(FrameBuilder::new().chunk(chunk(0x2016, &payload)))
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let mask = ase
        .chunks()
        .find_map(|c| match c {
            Chunk::Mask(m) => Some(m),
            _ => None,
        })
        .unwrap();
    assert_eq!(mask.name, "m");
    assert_eq!(mask.bitmap, vec![0xF0, 0x80, 0x0F, 0x01]);
}

#[test]
fn slice_chunk_center_and_pivot() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&1_u32.to_le_bytes()); // one key
    payload.extend_from_slice(&3_u32.to_le_bytes()); // center + pivot
    payload.extend_from_slice(&0_u32.to_le_bytes());
    payload.extend_from_slice(&ase_string("hud"));
    payload.extend_from_slice(&0_u32.to_le_bytes()); // from frame
    payload.extend_from_slice(&1_i32.to_le_bytes());
    payload.extend_from_slice(&2_i32.to_le_bytes());
    payload.extend_from_slice(&3_u32.to_le_bytes());
    payload.extend_from_slice(&4_u32.to_le_bytes());
    payload.extend_from_slice(&0_i32.to_le_bytes());
    payload.extend_from_slice(&0_i32.to_le_bytes());
    payload.extend_from_slice(&1_u32.to_le_bytes());
    payload.extend_from_slice(&1_u32.to_le_bytes());
    payload.extend_from_slice(&5_i32.to_le_bytes());
    payload.extend_from_slice(&6_i32.to_le_bytes());
    let data = DocBuilder::new(1, 1, 32)
        .frame(FrameBuilder::new().chunk(chunk(0x2022, &payload)))
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let slice = ase
        .chunks()
        .find_map(|c| match c {
            Chunk::Slice(s) => Some(s),
            _ => None,
        })
        .unwrap();
    assert_eq!(slice.name, "hud");
    let key = &slice.keys[0];
    assert_eq!(key.origin, (1, 2));
    assert_eq!(key.size, (3, 4));
    assert_eq!(key.center, Some((0, 0, 1, 1)));
    assert_eq!(key.pivot, Some((5, 6)));
}

#[test]
fn user_data_property_tree() {
    let mut props = Vec::new();
    props.extend_from_slice(&1_u32.to_le_bytes()); // one map
    props.extend_from_slice(&0_u32.to_le_bytes()); // key 0: user properties
    props.extend_from_slice(&3_u32.to_le_bytes()); // three properties
    props.extend_from_slice(&ase_string("name"));
    props.extend_from_slice(&0x000D_u16.to_le_bytes());
    props.extend_from_slice(&ase_string("hero"));
    props.extend_from_slice(&ase_string("tags"));
    props.extend_from_slice(&0x0011_u16.to_le_bytes());
    props.extend_from_slice(&2_u32.to_le_bytes()); // two elements
    props.extend_from_slice(&0x0005_u16.to_le_bytes()); // all u16
    props.extend_from_slice(&3_u16.to_le_bytes());
    props.extend_from_slice(&4_u16.to_le_bytes());
    props.extend_from_slice(&ase_string("links"));
    props.extend_from_slice(&0x0012_u16.to_le_bytes());
    props.extend_from_slice(&1_u32.to_le_bytes()); // one entry
    props.extend_from_slice(&9_u32.to_le_bytes()); // key 9
    props.extend_from_slice(&0x0001_u16.to_le_bytes());
    props.push(1);

    let mut payload = Vec::new();
    payload.extend_from_slice(&5_u32.to_le_bytes()); // text + properties
    payload.extend_from_slice(&ase_string("hi"));
    payload.extend_from_slice(&((props.len() + 8) as u32).to_le_bytes());
    payload.extend_from_slice(&props);

    let data = DocBuilder::new(1, 1, 32)
        .frame(FrameBuilder::new().chunk(chunk(0x2020, &payload)))
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let user_data = ase
        .chunks()
        .find_map(|c| match c {
            Chunk::UserData(u) => Some(u),
            _ => None,
        })
        .unwrap();
    assert_eq!(user_data.text.as_deref(), Some("hi"));
    let maps = user_data.properties.as_ref().unwrap();
    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0].key, 0);
    let props = &maps[0].properties;
    assert_eq!(props[0], ("name".to_owned(), PropertyValue::String("hero".to_owned())));
    assert_eq!(
        props[1].1,
        PropertyValue::Vector(vec![PropertyValue::Uint16(3), PropertyValue::Uint16(4)])
    );
    assert_eq!(
        props[2].1,
        PropertyValue::Map(vec![(9, PropertyValue::Bool(true))])
    );
}

#[test]
fn unknown_property_type_is_fatal() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&4_u32.to_le_bytes()); // properties only
    payload.extend_from_slice(&12_u32.to_le_bytes()); // declared size
    payload.extend_from_slice(&1_u32.to_le_bytes());
    payload.extend_from_slice(&0_u32.to_le_bytes());
    payload.extend_from_slice(&1_u32.to_le_bytes());
    payload.extend_from_slice(&ase_string("x"));
    payload.extend_from_slice(&0x00EE_u16.to_le_bytes());
    let data = DocBuilder::new(1, 1, 32)
        .frame(FrameBuilder::new().chunk(chunk(0x2020, &payload)))
        .build();
    match AsepriteFile::read(&data) {
        Err(AsepriteParseError::InvalidPropertyType { code, .. }) => assert_eq!(code, 0xEE),
        other => panic!("expected InvalidPropertyType, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn tilemap_tile_words_of_all_widths() {
    let masks_8 = [0x0000_003F, 0x0000_0040, 0x0000_0080, 0x0000_0000];
    let masks_16 = [0x0000_00FF, 0x0000_0100, 0x0000_0200, 0x0000_0400];
    let masks_32 = [0x1FFF_FFFF, 0x8000_0000, 0x4000_0000, 0x2000_0000];
    let words_32: Vec<u8> = [2_u32 | 0x8000_0000, 3_u32]
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .collect();
    let data = DocBuilder::new(8, 8, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("map"))
                .chunk(tilemap_cel_chunk(0, 2, 1, 8, masks_8, &[0x41, 0x02]))
                .chunk(tilemap_cel_chunk(0, 2, 1, 16, masks_16, &[0x05, 0x01, 0x07, 0x00]))
                .chunk(tilemap_cel_chunk(0, 2, 1, 32, masks_32, &words_32)),
        )
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let maps: Vec<&TilemapData> = ase
        .frame(0)
        .cels()
        .filter_map(|cel| match &cel.content {
            CelContent::CompressedTilemap(map) => Some(map),
            _ => None,
        })
        .collect();
    assert_eq!(maps.len(), 3);

    // 8-bit: 0x41 = id 1 with the x-flip bit
    assert_eq!(maps[0].bits_per_tile, 8);
    assert_eq!(maps[0].tiles[0], Tile { id: 1, flip_x: true, flip_y: false, rotate_90cw: false });
    assert_eq!(maps[0].tiles[1].id, 2);

    // 16-bit little endian: 0x0105 = id 5 with x-flip
    assert_eq!(maps[1].tiles[0].id, 5);
    assert!(maps[1].tiles[0].flip_x);
    assert_eq!(maps[1].tiles[1].id, 7);

    // 32-bit with the standard masks
    assert_eq!(maps[2].tiles[0].id, 2);
    assert!(maps[2].tiles[0].flip_x);
    assert_eq!(maps[2].tiles[1].id, 3);
    assert!(!maps[2].tiles[1].flip_x);

    assert_eq!(maps[0].tile(1, 0).map(|t| t.id), Some(2));
    assert_eq!(maps[0].tile(2, 0), None);
}

#[test]
fn tileset_chunk_with_embedded_image() {
    // two 2x2 RGBA tiles stacked vertically
    let tile_pixels: Vec<u8> = (0..2 * 2 * 2 * 4).map(|i| i as u8).collect();
    let mut payload = Vec::new();
    payload.extend_from_slice(&0_u32.to_le_bytes()); // id
    payload.extend_from_slice(&6_u32.to_le_bytes()); // includes tiles + empty id zero
    payload.extend_from_slice(&2_u32.to_le_bytes()); // tile count
    payload.extend_from_slice(&2_u16.to_le_bytes());
    payload.extend_from_slice(&2_u16.to_le_bytes());
    payload.extend_from_slice(&1_i16.to_le_bytes()); // base index
    payload.extend_from_slice(&[0; 14]);
    payload.extend_from_slice(&ase_string("terrain"));
    let compressed = zlib(&tile_pixels);
    payload.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
    payload.extend_from_slice(&compressed);
    let data = DocBuilder::new(8, 8, 32)
        .frame(FrameBuilder::new().chunk(chunk(0x2023, &payload)))
        .build();
    let ase = AsepriteFile::read(&data).unwrap();
    let tileset = ase
        .chunks()
        .find_map(|c| match c {
            Chunk::Tileset(t) => Some(t),
            _ => None,
        })
        .unwrap();
    assert_eq!(tileset.name, "terrain");
    assert_eq!((tileset.tile_width, tileset.tile_height), (2, 2));
    assert!(tileset.empty_tile_is_id_zero);
    let pixels = tileset.pixels.as_ref().unwrap();
    assert_eq!(pixels.len(), 8);
}

#[test]
fn short_zlib_stream_is_fatal() {
    // deflate of 2 bytes where 4 are declared by the cel dimensions
    let data = DocBuilder::new(1, 1, 32)
        .frame(
            FrameBuilder::new()
                .chunk(layer_chunk("Layer 1"))
                .chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[0xFF, 0x00])),
        )
        .build();
    assert!(matches!(
        AsepriteFile::read(&data),
        Err(AsepriteParseError::DecompressFailed { .. })
    ));
}

// ---------------------------------------------------------------------------
// Animations
// ---------------------------------------------------------------------------

fn two_frame_doc(tags: Option<Vec<u8>>) -> Vec<u8> {
    let mut first = FrameBuilder::new()
        .chunk(layer_chunk("Layer 1"))
        .chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[255, 0, 0, 255]));
    if let Some(tag_bytes) = tags {
        first = first.chunk(tag_bytes);
    }
    DocBuilder::new(1, 1, 32)
        .frame(first)
        .frame(FrameBuilder::new().chunk(compressed_cel_chunk(0, 0, 0, 1, 1, &[0, 255, 0, 255])))
        .build()
}

#[test]
fn untagged_document_gets_whole_range_animation() {
    let data = two_frame_doc(None);
    let ase = AsepriteFile::read(&data).unwrap();
    let flat = flatten::flatten(&ase).unwrap();
    assert_eq!(flat.frames.len(), 2);

    let mut builder = AtlasBuilder::new(AtlasSettings::default());
    builder.add_document("Hero", flat);
    let atlas = builder.build();

    assert_eq!(atlas.animations.len(), 1);
    let animation = &atlas.animations[0];
    assert_eq!(animation.name, "Hero");
    assert_eq!(animation.first, "Hero0");
    assert_eq!(animation.last, "Hero1");
    assert_eq!(animation.direction, AnimationDirection::Forward);
}

#[test]
fn tags_suppress_the_synthetic_animation() {
    let data = two_frame_doc(Some(tags_chunk(&[(0, 1, 2, "walk")])));
    let ase = AsepriteFile::read(&data).unwrap();
    let flat = flatten::flatten(&ase).unwrap();

    let mut builder = AtlasBuilder::new(AtlasSettings::default());
    builder.add_document("Hero", flat);
    let atlas = builder.build();

    assert_eq!(atlas.animations.len(), 1);
    let animation = &atlas.animations[0];
    assert_eq!(animation.name, "Hero_walk");
    assert_eq!(animation.first, "Hero0");
    assert_eq!(animation.last, "Hero1");
    assert_eq!(animation.direction, AnimationDirection::PingPong);
}

// ---------------------------------------------------------------------------
// Tile extraction
// ---------------------------------------------------------------------------

#[test]
fn tile_extractor_drops_transparent_tiles() {
    // 20x6 sheet: tile size 2, grid 10x3; tile (1, 2) left transparent
    let sheet_w = 20_u32;
    let sheet_h = 6_u32;
    let mut pixels = vec![0_u8; (sheet_w * sheet_h * 4) as usize];
    for y in 0..sheet_h {
        for x in 0..sheet_w {
            let in_hole = (2..4).contains(&x) && (4..6).contains(&y);
            if !in_hole {
                let base = ((y * sheet_w + x) * 4) as usize;
                pixels[base..base + 4].copy_from_slice(&[200, 200, 200, 255]);
            }
        }
    }
    let data = single_frame_doc(sheet_w as u16, sheet_h as u16, &pixels);
    let ase = AsepriteFile::read(&data).unwrap();

    let extracted = tiles::extract_tiles(&ase).unwrap();
    assert_eq!(extracted.len(), 29);
    assert!(!extracted.iter().any(|t| t.grid_x == 1 && t.grid_y == 2));
    // row-major: x varies fastest
    assert_eq!((extracted[0].grid_x, extracted[0].grid_y), (0, 0));
    assert_eq!((extracted[1].grid_x, extracted[1].grid_y), (1, 0));
}

#[test]
fn tileset_png_sheets_use_the_same_grid() {
    // tileset-prefixed PNGs go through the extractor too; same grid rules
    let mut sheet = image::RgbaImage::from_pixel(20, 2, image::Rgba([5, 5, 5, 255]));
    for y in 0..2 {
        for x in 6..8 {
            sheet.put_pixel(x, y, image::Rgba([0, 0, 0, 0])); // clear tile (3, 0)
        }
    }
    let extracted = tiles::extract_tiles_from_image(&sheet).unwrap();
    assert_eq!(extracted.len(), 9);
    assert!(!extracted.iter().any(|t| t.grid_x == 3));
    assert_eq!(extracted[0].pixels.dimensions(), (2, 2));
}

// ---------------------------------------------------------------------------
// Atlas packing
// ---------------------------------------------------------------------------

fn build_sample_atlas(tile_padding: bool) -> atlas::Atlas {
    let doc = AsepriteFile::read(&two_frame_doc(None)).unwrap();
    let tiles_doc = {
        let mut pixels = vec![0_u8; 20 * 2 * 4];
        for px in pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[9, 9, 9, 255]);
        }
        AsepriteFile::read(&single_frame_doc(20, 2, &pixels)).unwrap()
    };

    let mut builder = AtlasBuilder::new(AtlasSettings {
        width: 128,
        height: 128,
        tile_padding,
        crop: true,
    });
    builder.add_document("Hero", flatten::flatten(&doc).unwrap());
    builder.add_tileset("Tileset_Ground", tiles::extract_tiles(&tiles_doc).unwrap());
    builder.add_image("Logo", image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255])));
    builder.add_glyphs(vec![GlyphImage {
        codepoint: 'A',
        pixels: image::RgbaImage::from_pixel(3, 3, image::Rgba([255, 255, 255, 255])),
        offset_x: 0,
        offset_y: -1,
        advance_x: 4.0,
    }]);
    builder.build()
}

#[test]
fn packed_rectangles_are_disjoint() {
    let atlas = build_sample_atlas(true);

    let mut rects: Vec<AtlasRect> = Vec::new();
    rects.extend(atlas.sprites.iter().map(|s| s.rect));
    rects.extend(atlas.tilesets.iter().flat_map(|t| t.tiles.iter().map(|tile| tile.rect)));
    rects.extend(atlas.glyphs.iter().map(|g| g.rect));
    rects.push(atlas.swatch.unwrap());

    assert_eq!(atlas.sprites.len(), 3); // two frames + the PNG
    assert_eq!(atlas.tilesets[0].tiles.len(), 10);
    assert_eq!(atlas.glyphs.len(), 1);

    for (i, a) in rects.iter().enumerate() {
        for b in &rects[i + 1..] {
            assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
        }
    }
}

#[test]
fn atlas_pixels_land_inside_their_records() {
    let atlas = build_sample_atlas(false);

    // frame 0 of Hero is the red pixel
    let hero0 = atlas.sprites.iter().find(|s| s.name == "Hero0").unwrap();
    assert_eq!(
        atlas.image.get_pixel(hero0.rect.x, hero0.rect.y).0,
        [255, 0, 0, 255]
    );
    assert_eq!(hero0.duration, 0.1);

    let logo = atlas.sprites.iter().find(|s| s.name == "Logo").unwrap();
    assert_eq!((logo.rect.w, logo.rect.h), (3, 2));
    assert_eq!(logo.offsets, flatten::TrimOffsets::default());
    assert_eq!(logo.duration, 0.0);
    assert_eq!(
        atlas.image.get_pixel(logo.rect.x, logo.rect.y).0,
        [1, 2, 3, 255]
    );

    // glyphs keep a transparent 1-px border
    let glyph = &atlas.glyphs[0];
    assert_eq!(atlas.image.get_pixel(glyph.rect.x, glyph.rect.y).0, [255, 255, 255, 255]);
    assert_eq!(atlas.image.get_pixel(glyph.rect.x - 1, glyph.rect.y - 1).0[3], 0);

    // the swatch is solid white
    let swatch = atlas.swatch.unwrap();
    for y in swatch.y..swatch.y + swatch.h {
        for x in swatch.x..swatch.x + swatch.w {
            assert_eq!(atlas.image.get_pixel(x, y).0, [255, 255, 255, 255]);
        }
    }
}

#[test]
fn tile_padding_extrudes_edges() {
    let atlas = build_sample_atlas(true);
    let tile = &atlas.tilesets[0].tiles[0];
    // the strip one pixel outside the tile repeats the tile's edge color
    assert_eq!(atlas.image.get_pixel(tile.rect.x - 1, tile.rect.y).0, [9, 9, 9, 255]);
    assert_eq!(atlas.image.get_pixel(tile.rect.x, tile.rect.y - 1).0, [9, 9, 9, 255]);
    assert_eq!(
        atlas.image.get_pixel(tile.rect.x + tile.rect.w, tile.rect.y).0,
        [9, 9, 9, 255]
    );
}

#[test]
fn crop_keeps_all_used_pixels() {
    let atlas = build_sample_atlas(false);
    let (width, height) = atlas.image.dimensions();
    assert!(width < 128 && height < 128);
    // cropping is from the bottom-right only: the last row and column still
    // hold something
    let last_col_used = (0..height).any(|y| atlas.image.get_pixel(width - 1, y).0[3] != 0);
    let last_row_used = (0..width).any(|x| atlas.image.get_pixel(x, height - 1).0[3] != 0);
    assert!(last_col_used);
    assert!(last_row_used);
}

#[test]
fn oversized_rectangle_is_dropped_not_fatal() {
    let mut builder = AtlasBuilder::new(AtlasSettings {
        width: 8,
        height: 8,
        tile_padding: false,
        crop: false,
    });
    builder.add_image("Big", image::RgbaImage::new(64, 64));
    let atlas = builder.build();
    assert!(atlas.sprites.is_empty());
    // the swatch still fits an 8x8 atlas at 11x11? it does not; also dropped
    assert!(atlas.swatch.is_none());
}

// ---------------------------------------------------------------------------
// Catalogue emission
// ---------------------------------------------------------------------------

#[test]
fn catalogue_is_deterministic() {
    let first = catalogue::emit(&build_sample_atlas(false));
    let second = catalogue::emit(&build_sample_atlas(false));
    assert_eq!(first, second);
}

#[test]
fn catalogue_lists_every_record_kind() {
    let atlas = build_sample_atlas(false);
    let source = catalogue::emit(&atlas);
    assert!(source.contains("pub static SPRITES"));
    assert!(source.contains("SpriteFrame { name: \"Hero0\""));
    assert!(source.contains("SpriteAnimation { name: \"Hero\", first: \"Hero0\", last: \"Hero1\""));
    assert!(source.contains("(\"Tileset_Ground\", &["));
    assert!(source.contains("Glyph { codepoint: 'A'"));
    assert!(source.contains("pub const SWATCH: AtlasRect"));
    assert!(source.contains(&format!(
        "pub const ATLAS_WIDTH: u32 = {};",
        atlas.image.width()
    )));
}

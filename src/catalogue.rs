//! Emits the generated metadata source file for a finished atlas.
//!
//! The output is plain Rust: record structs plus `static` tables, in a fixed
//! order (sprites, animations, tilesets, glyphs, swatch) with no forward
//! references. Re-running the pipeline on unchanged inputs yields a
//! byte-identical file.

use std::fmt::Write as _;
use std::path::Path;

use crate::atlas::Atlas;
use crate::tags::AnimationDirection;
use crate::{AsepriteParseError, Result};

/// Derive the symbolic atlas name from a source file stem: components split
/// on separators, each capitalized, joined with underscores.
/// `goblin_archer` becomes `Goblin_Archer`.
pub fn atlas_name(stem: &str) -> String {
    stem.split(|c: char| matches!(c, '_' | '-' | ' ' | '.'))
        .filter(|component| !component.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("_")
}

fn capitalize(component: &str) -> String {
    let mut chars = component.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn play_mode(direction: AnimationDirection) -> &'static str {
    match direction {
        AnimationDirection::Forward => "PlayMode::Forward",
        AnimationDirection::Reverse => "PlayMode::Reverse",
        AnimationDirection::PingPong => "PlayMode::PingPong",
        AnimationDirection::PingPongReverse => "PlayMode::PingPongReverse",
    }
}

/// Render the catalogue as Rust source.
pub fn emit(atlas: &Atlas) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// @generated by aseatlas. Do not edit.");
    let _ = writeln!(out, "#![allow(dead_code, clippy::all)]");
    let _ = writeln!(out);
    let _ = writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq)]");
    let _ = writeln!(
        out,
        "pub struct AtlasRect {{ pub x: u32, pub y: u32, pub w: u32, pub h: u32 }}"
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "#[derive(Debug, Clone, Copy)]");
    let _ = writeln!(out, "pub struct SpriteFrame {{");
    let _ = writeln!(out, "    pub name: &'static str,");
    let _ = writeln!(out, "    pub rect: AtlasRect,");
    let _ = writeln!(out, "    pub doc_w: u32,");
    let _ = writeln!(out, "    pub doc_h: u32,");
    let _ = writeln!(out, "    pub trim_left: u32,");
    let _ = writeln!(out, "    pub trim_top: u32,");
    let _ = writeln!(out, "    pub trim_right: u32,");
    let _ = writeln!(out, "    pub trim_bottom: u32,");
    let _ = writeln!(out, "    pub duration: f32,");
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);
    let _ = writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq)]");
    let _ = writeln!(
        out,
        "pub enum PlayMode {{ Forward, Reverse, PingPong, PingPongReverse }}"
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "#[derive(Debug, Clone, Copy)]");
    let _ = writeln!(out, "pub struct SpriteAnimation {{");
    let _ = writeln!(out, "    pub name: &'static str,");
    let _ = writeln!(out, "    pub first: &'static str,");
    let _ = writeln!(out, "    pub last: &'static str,");
    let _ = writeln!(out, "    pub mode: PlayMode,");
    let _ = writeln!(out, "    pub repeat: u16,");
    let _ = writeln!(out, "    pub doc_w: u32,");
    let _ = writeln!(out, "    pub doc_h: u32,");
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);
    let _ = writeln!(out, "#[derive(Debug, Clone, Copy)]");
    let _ = writeln!(
        out,
        "pub struct TileRect {{ pub grid_x: u32, pub grid_y: u32, pub rect: AtlasRect }}"
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "#[derive(Debug, Clone, Copy)]");
    let _ = writeln!(out, "pub struct Glyph {{");
    let _ = writeln!(out, "    pub codepoint: char,");
    let _ = writeln!(out, "    pub rect: AtlasRect,");
    let _ = writeln!(out, "    pub offset_x: i32,");
    let _ = writeln!(out, "    pub offset_y: i32,");
    let _ = writeln!(out, "    pub advance_x: f32,");
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);
    let _ = writeln!(out, "pub const ATLAS_WIDTH: u32 = {};", atlas.image.width());
    let _ = writeln!(
        out,
        "pub const ATLAS_HEIGHT: u32 = {};",
        atlas.image.height()
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "pub static SPRITES: &[SpriteFrame] = &[");
    for sprite in &atlas.sprites {
        let _ = writeln!(
            out,
            "    SpriteFrame {{ name: {:?}, rect: {}, doc_w: {}, doc_h: {}, \
             trim_left: {}, trim_top: {}, trim_right: {}, trim_bottom: {}, duration: {:?} }},",
            sprite.name,
            rect_literal(sprite.rect.x, sprite.rect.y, sprite.rect.w, sprite.rect.h),
            sprite.doc_width,
            sprite.doc_height,
            sprite.offsets.left,
            sprite.offsets.top,
            sprite.offsets.right,
            sprite.offsets.bottom,
            sprite.duration,
        );
    }
    let _ = writeln!(out, "];");
    let _ = writeln!(out);

    let _ = writeln!(out, "pub static ANIMATIONS: &[SpriteAnimation] = &[");
    for animation in &atlas.animations {
        let _ = writeln!(
            out,
            "    SpriteAnimation {{ name: {:?}, first: {:?}, last: {:?}, mode: {}, \
             repeat: {}, doc_w: {}, doc_h: {} }},",
            animation.name,
            animation.first,
            animation.last,
            play_mode(animation.direction),
            animation.repeat,
            animation.doc_width,
            animation.doc_height,
        );
    }
    let _ = writeln!(out, "];");
    let _ = writeln!(out);

    let _ = writeln!(out, "pub static TILESETS: &[(&str, &[TileRect])] = &[");
    for tileset in &atlas.tilesets {
        let _ = writeln!(out, "    ({:?}, &[", tileset.name);
        for tile in &tileset.tiles {
            let _ = writeln!(
                out,
                "        TileRect {{ grid_x: {}, grid_y: {}, rect: {} }},",
                tile.grid_x,
                tile.grid_y,
                rect_literal(tile.rect.x, tile.rect.y, tile.rect.w, tile.rect.h),
            );
        }
        let _ = writeln!(out, "    ]),");
    }
    let _ = writeln!(out, "];");
    let _ = writeln!(out);

    let _ = writeln!(out, "pub static GLYPHS: &[Glyph] = &[");
    for glyph in &atlas.glyphs {
        let _ = writeln!(
            out,
            "    Glyph {{ codepoint: {:?}, rect: {}, offset_x: {}, offset_y: {}, advance_x: {:?} }},",
            glyph.codepoint,
            rect_literal(glyph.rect.x, glyph.rect.y, glyph.rect.w, glyph.rect.h),
            glyph.offset_x,
            glyph.offset_y,
            glyph.advance_x,
        );
    }
    let _ = writeln!(out, "];");

    if let Some(swatch) = atlas.swatch {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "pub const SWATCH: AtlasRect = {};",
            rect_literal(swatch.x, swatch.y, swatch.w, swatch.h)
        );
    }

    out
}

/// Write the catalogue next to the atlas image.
pub fn write_file(path: &Path, atlas: &Atlas) -> Result<()> {
    std::fs::write(path, emit(atlas)).map_err(AsepriteParseError::WriteFailed)
}

fn rect_literal(x: u32, y: u32, w: u32, h: u32) -> String {
    format!("AtlasRect {{ x: {}, y: {}, w: {}, h: {} }}", x, y, w, h)
}

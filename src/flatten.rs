//! Flattens decoded documents into per-frame pixel buffers ready for
//! packing.

use image::RgbaImage;

use crate::cel::{CelContent, ImageContent, RawCel};
use crate::pixel::Rgba;
use crate::tags::AnimationDirection;
use crate::{AsepriteFile, AsepriteParseError, PixelFormat, Result};

/// Whitespace trimmed from each side of a frame, relative to the document
/// rectangle. `source_size + left + right` always equals the document width,
/// and likewise vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrimOffsets {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// One flattened frame: the composited cel bounding box plus the source
/// rectangle (its intersection with the document) that actually gets packed.
#[derive(Debug)]
pub struct FrameImage {
    /// Index of the frame within its document.
    pub frame_index: u32,
    /// Composited pixels covering the cel bounding box.
    pub pixels: RgbaImage,
    /// Offset of the source rectangle inside `pixels`.
    pub source_x: u32,
    pub source_y: u32,
    /// Size of the source rectangle.
    pub source_width: u32,
    pub source_height: u32,
    pub offsets: TrimOffsets,
    pub duration_ms: u16,
}

/// An animation over a frame range: tag-derived, or the synthetic
/// whole-document range when the document has no tags.
#[derive(Debug)]
pub struct DocAnimation {
    /// Tag name; `None` for the synthetic whole-document animation.
    pub tag_name: Option<String>,
    pub from_frame: u32,
    pub to_frame: u32,
    pub direction: AnimationDirection,
    pub repeat: u16,
}

/// The flattened form of one document.
#[derive(Debug)]
pub struct FlattenedDocument {
    pub doc_width: u32,
    pub doc_height: u32,
    pub frames: Vec<FrameImage>,
    pub animations: Vec<DocAnimation>,
}

/// Flatten every frame of a document.
///
/// Only compressed-image cels on visible layers take part; raw and linked
/// cels are excluded from compositing. Cels composite back-to-front in layer
/// order with opaque-replacement blits; neither cel nor layer opacity is
/// applied.
pub fn flatten(file: &AsepriteFile) -> Result<FlattenedDocument> {
    let visible: Vec<bool> = file.layers().map(|layer| layer.is_visible()).collect();
    let palette = file.first_palette();
    // An indexed document without a palette cannot be flattened, whether or
    // not any cel ends up selected below.
    if matches!(file.pixel_format(), PixelFormat::Indexed { .. }) && palette.is_none() {
        return Err(AsepriteParseError::MissingPaletteForIndexed);
    }
    let (doc_width, doc_height) = file.size();

    let mut frames = Vec::new();
    for (frame_index, frame) in file.frames().iter().enumerate() {
        let mut cels: Vec<(&RawCel, &ImageContent)> = frame
            .cels()
            .filter_map(|cel| match &cel.content {
                CelContent::CompressedImage(image)
                    if image.width > 0
                        && image.height > 0
                        && visible.get(cel.layer_index as usize).copied().unwrap_or(false) =>
                {
                    Some((cel, image))
                }
                _ => None,
            })
            .collect();
        if cels.is_empty() {
            continue;
        }

        // Enclosing bounding box over the selected cels, in document
        // coordinates. Cel positions may be negative or extend past the
        // canvas.
        let mut box_left = i32::MAX;
        let mut box_top = i32::MAX;
        let mut box_right = i32::MIN;
        let mut box_bottom = i32::MIN;
        for (cel, image) in &cels {
            box_left = box_left.min(cel.x as i32);
            box_top = box_top.min(cel.y as i32);
            box_right = box_right.max(cel.x as i32 + image.width as i32);
            box_bottom = box_bottom.max(cel.y as i32 + image.height as i32);
        }

        // Back-to-front order.
        cels.sort_by_key(|(cel, _)| cel.layer_index);

        let mut buffer = RgbaImage::new(
            (box_right - box_left) as u32,
            (box_bottom - box_top) as u32,
        );
        for (cel, image) in &cels {
            let rgba = image.pixels.to_rgba(palette)?;
            blit(
                &mut buffer,
                image,
                &rgba,
                (cel.x as i32 - box_left) as u32,
                (cel.y as i32 - box_top) as u32,
            );
        }

        // Clip the box against the document rectangle; frames lying fully
        // outside the canvas are dropped.
        let source_left = box_left.max(0);
        let source_top = box_top.max(0);
        let source_right = box_right.min(doc_width as i32);
        let source_bottom = box_bottom.min(doc_height as i32);
        if source_right <= source_left || source_bottom <= source_top {
            continue;
        }

        frames.push(FrameImage {
            frame_index: frame_index as u32,
            pixels: buffer,
            source_x: (source_left - box_left) as u32,
            source_y: (source_top - box_top) as u32,
            source_width: (source_right - source_left) as u32,
            source_height: (source_bottom - source_top) as u32,
            offsets: TrimOffsets {
                left: source_left as u32,
                top: source_top as u32,
                right: (doc_width as i32 - source_right) as u32,
                bottom: (doc_height as i32 - source_bottom) as u32,
            },
            duration_ms: frame.duration_ms,
        });
    }

    // Tags replace the synthetic whole-document animation entirely.
    let mut animations = Vec::new();
    if file.num_frames() > 1 {
        let tags: Vec<_> = file.tags().collect();
        if tags.is_empty() {
            animations.push(DocAnimation {
                tag_name: None,
                from_frame: 0,
                to_frame: file.num_frames() - 1,
                direction: AnimationDirection::Forward,
                repeat: 0,
            });
        } else {
            for tag in tags {
                animations.push(DocAnimation {
                    tag_name: Some(tag.name.clone()),
                    from_frame: tag.from_frame as u32,
                    to_frame: tag.to_frame as u32,
                    direction: tag.animation_direction,
                    repeat: tag.repeat,
                });
            }
        }
    }

    Ok(FlattenedDocument {
        doc_width,
        doc_height,
        frames,
        animations,
    })
}

// Opaque replacement: a source pixel with any coverage overwrites the
// destination; fully transparent pixels leave it untouched.
fn blit(dst: &mut RgbaImage, image: &ImageContent, pixels: &[Rgba], dst_x: u32, dst_y: u32) {
    let width = image.width as u32;
    for y in 0..image.height as u32 {
        for x in 0..width {
            let px = pixels[(y * width + x) as usize];
            if px.alpha == 0 {
                continue;
            }
            dst.put_pixel(
                dst_x + x,
                dst_y + y,
                image::Rgba([px.red, px.green, px.blue, px.alpha]),
            );
        }
    }
}

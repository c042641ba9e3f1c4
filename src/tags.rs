use log::debug;

use crate::reader::AseReader;
use crate::Result;

/// A tag is a grouping of one or more frames into a named animation.
///
/// Tag ranges may overlap each other. Tag names are _not_ guaranteed to be
/// unique.
#[derive(Debug, Clone)]
pub struct Tag {
    pub name: String,
    /// First frame included in the tag.
    pub from_frame: u16,
    /// Last frame included in the tag.
    pub to_frame: u16,
    pub animation_direction: AnimationDirection,
    /// How often the animation repeats; 0 means indefinitely.
    pub repeat: u16,
}

/// Describes how the tag's frames should be animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationDirection {
    /// Start at `from_frame` and count up to `to_frame`.
    Forward,
    /// Start at `to_frame` and count down to `from_frame`.
    Reverse,
    /// Count up to `to_frame`, then back down.
    PingPong,
    /// Count down to `from_frame`, then back up.
    PingPongReverse,
}

pub(crate) fn parse_chunk(mut reader: AseReader) -> Result<Vec<Tag>> {
    let num_tags = reader.word()?;
    reader.skip_bytes(8)?;

    let mut result = Vec::with_capacity(num_tags as usize);
    for _tag in 0..num_tags {
        let from_frame = reader.word()?;
        let to_frame = reader.word()?;
        let anim_dir = reader.byte()?;
        let repeat = reader.word()?;
        reader.skip_bytes(6)?;
        reader.skip_bytes(3)?; // deprecated RGB tag color
        reader.skip_bytes(1)?;
        let name = reader.string()?;
        result.push(Tag {
            name,
            from_frame,
            to_frame,
            animation_direction: parse_animation_direction(anim_dir),
            repeat,
        });
    }

    Ok(result)
}

// Unknown direction bytes fall back to Forward so documents written by newer
// editors keep decoding.
fn parse_animation_direction(id: u8) -> AnimationDirection {
    match id {
        0 => AnimationDirection::Forward,
        1 => AnimationDirection::Reverse,
        2 => AnimationDirection::PingPong,
        3 => AnimationDirection::PingPongReverse,
        _ => {
            debug!("Unknown animation direction {}, treating as forward", id);
            AnimationDirection::Forward
        }
    }
}

use crate::reader::AseReader;
use crate::{AsepriteParseError, Result};
use bitflags::bitflags;

bitflags! {
    /// Layer attribute flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LayerFlags: u16 {
        const VISIBLE = 0x0001;
        const EDITABLE = 0x0002;
        const LOCK_MOVEMENT = 0x0004;
        const BACKGROUND = 0x0008;
        const PREFER_LINKED_CELS = 0x0010;
        const COLLAPSED = 0x0020;
        const REFERENCE = 0x0040;
    }
}

/// What kind of content the layer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerType {
    /// An ordinary raster layer.
    Image,
    /// A folder grouping child layers.
    Group,
    /// A layer whose cels index into the given tileset.
    Tilemap { tileset_index: u32 },
}

/// Layer blend modes, as shown in the Aseprite UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
    Addition,
    Subtract,
    Divide,
}

// Wire codes are the indices into this table.
static BLEND_MODES: [BlendMode; 19] = [
    BlendMode::Normal,
    BlendMode::Multiply,
    BlendMode::Screen,
    BlendMode::Overlay,
    BlendMode::Darken,
    BlendMode::Lighten,
    BlendMode::ColorDodge,
    BlendMode::ColorBurn,
    BlendMode::HardLight,
    BlendMode::SoftLight,
    BlendMode::Difference,
    BlendMode::Exclusion,
    BlendMode::Hue,
    BlendMode::Saturation,
    BlendMode::Color,
    BlendMode::Luminosity,
    BlendMode::Addition,
    BlendMode::Subtract,
    BlendMode::Divide,
];

impl BlendMode {
    /// Look up the blend mode for a wire code, if the format defines one.
    pub fn from_code(code: u16) -> Option<BlendMode> {
        BLEND_MODES.get(code as usize).copied()
    }
}

/// A decoded layer chunk.
///
/// Layers are stored back to front; the running index of layer chunks within
/// the document is the layer index cels refer to.
#[derive(Debug)]
pub struct Layer {
    pub flags: LayerFlags,
    pub layer_type: LayerType,
    /// Nesting depth below the preceding group layer.
    pub child_level: u16,
    pub blend_mode: BlendMode,
    pub opacity: u8,
    pub name: String,
}

impl Layer {
    /// Whether the layer's own visibility bit is set.
    pub fn is_visible(&self) -> bool {
        self.flags.contains(LayerFlags::VISIBLE)
    }

    pub fn is_background(&self) -> bool {
        self.flags.contains(LayerFlags::BACKGROUND)
    }
}

pub(crate) fn parse_chunk(mut reader: AseReader) -> Result<Layer> {
    let flags = LayerFlags::from_bits_retain(reader.word()?);
    let layer_type_code = reader.word()?;
    let child_level = reader.word()?;
    let _default_width = reader.word()?;
    let _default_height = reader.word()?;
    let blend_mode_code = reader.word()?;
    let opacity = reader.byte()?;
    reader.skip_bytes(3)?;
    let name = reader.string()?;
    let blend_mode = BlendMode::from_code(blend_mode_code).ok_or_else(|| {
        AsepriteParseError::InvalidInput(format!(
            "Layer '{}' carries blend mode code {}, which the format does not define",
            name, blend_mode_code
        ))
    })?;
    let layer_type = match layer_type_code {
        0 => LayerType::Image,
        1 => LayerType::Group,
        2 => LayerType::Tilemap {
            tileset_index: reader.dword()?,
        },
        _ => {
            return Err(AsepriteParseError::InvalidInput(format!(
                "Invalid layer type: {}",
                layer_type_code
            )))
        }
    };

    Ok(Layer {
        flags,
        layer_type,
        child_level,
        blend_mode,
        opacity,
        name,
    })
}

use crate::reader::AseReader;
use crate::{AsepriteParseError, Result};

/// The document's color profile chunk.
#[derive(Debug)]
pub struct ColorProfile {
    pub profile_type: ColorProfileType,
    pub flags: u16,
    /// Fixed gamma, meaningful when flag bit 0 is set.
    pub fixed_gamma: f64,
}

/// How colors in the document should be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorProfileType {
    None,
    Srgb,
    /// An embedded ICC profile. The payload is preserved verbatim and never
    /// parsed.
    Icc { data: Vec<u8> },
}

pub(crate) fn parse_chunk(mut reader: AseReader) -> Result<ColorProfile> {
    let type_offset = reader.position();
    let profile_type_code = reader.word()?;
    let flags = reader.word()?;
    let fixed_gamma = reader.fixed()?;
    reader.skip_bytes(8)?;

    let profile_type = match profile_type_code {
        0x0000 => ColorProfileType::None,
        0x0001 => ColorProfileType::Srgb,
        0x0002 => {
            let icc_len = reader.dword()?;
            let data = reader.take_bytes(icc_len as usize)?;
            ColorProfileType::Icc { data }
        }
        _ => {
            return Err(AsepriteParseError::UnsupportedFeature(format!(
                "Unknown color profile type {} at offset {}",
                profile_type_code, type_offset
            )))
        }
    };

    Ok(ColorProfile {
        profile_type,
        flags,
        fixed_gamma,
    })
}

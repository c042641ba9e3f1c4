use std::{error::Error, fmt, io};

/// An error occurred while decoding an Aseprite document or writing baked
/// output.
///
/// Decode-time variants carry the absolute byte offset (from the start of the
/// stream) at which the problem was detected.
#[derive(Debug)]
pub enum AsepriteParseError {
    /// The stream does not start with the `0xA5E0` file magic.
    BadFileMagic { offset: u64, found: u16 },
    /// A frame header does not carry the `0xF1FA` frame magic.
    BadFrameMagic { offset: u64, found: u16 },
    /// The stream ended before a read completed.
    UnexpectedEnd { offset: u64 },
    /// The header's declared file size disagrees with the stream length.
    DataSizeMismatch { declared: u32, actual: u64 },
    /// Unknown chunk code encountered in a strict (filtered) pass. The
    /// permissive full decode skips unknown chunks instead.
    InvalidChunkType { offset: u64, code: u16 },
    /// Unknown cel variant code inside a cel chunk.
    InvalidCelType { offset: u64, code: u16 },
    /// Unknown type tag inside a user-data property tree.
    InvalidPropertyType { offset: u64, code: u16 },
    /// A length-prefixed string was not valid UTF-8.
    InvalidUtf8 { offset: u64 },
    /// An indexed-color document carries image cels but no palette chunk.
    MissingPaletteForIndexed,
    /// A zlib stream failed to inflate, or inflated to the wrong size.
    DecompressFailed { offset: u64, reason: String },
    /// The input data was malformed. String contains a detailed message.
    InvalidInput(String),
    /// The input data was correct, but uses a feature that this crate does
    /// not support. String contains a detailed message.
    UnsupportedFeature(String),
    /// Reading the underlying stream failed.
    ReadFailed(io::Error),
    /// Writing baked output failed.
    WriteFailed(io::Error),
}

impl fmt::Display for AsepriteParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AsepriteParseError::*;
        match self {
            BadFileMagic { offset, found } => write!(
                f,
                "Invalid magic number for header at offset {}: {:#06x} != 0xa5e0",
                offset, found
            ),
            BadFrameMagic { offset, found } => write!(
                f,
                "Invalid magic number for frame at offset {}: {:#06x} != 0xf1fa",
                offset, found
            ),
            UnexpectedEnd { offset } => {
                write!(f, "Unexpected end of input at offset {}", offset)
            }
            DataSizeMismatch { declared, actual } => write!(
                f,
                "Header declares {} bytes but the stream holds {}",
                declared, actual
            ),
            InvalidChunkType { offset, code } => {
                write!(f, "Invalid chunk type {:#06x} at offset {}", code, offset)
            }
            InvalidCelType { offset, code } => {
                write!(f, "Invalid cel type {} at offset {}", code, offset)
            }
            InvalidPropertyType { offset, code } => write!(
                f,
                "Invalid user-data property type {:#06x} at offset {}",
                code, offset
            ),
            InvalidUtf8 { offset } => {
                write!(f, "Could not decode utf8 string at offset {}", offset)
            }
            MissingPaletteForIndexed => write!(
                f,
                "Document uses indexed color mode but does not contain a palette"
            ),
            DecompressFailed { offset, reason } => write!(
                f,
                "Failed to inflate compressed data at offset {}: {}",
                offset, reason
            ),
            InvalidInput(msg) => write!(f, "Invalid Aseprite input: {}", msg),
            UnsupportedFeature(msg) => write!(f, "Unsupported feature: {}", msg),
            ReadFailed(err) => write!(f, "Read error: {}", err),
            WriteFailed(err) => write!(f, "Write error: {}", err),
        }
    }
}

impl Error for AsepriteParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AsepriteParseError::ReadFailed(err) | AsepriteParseError::WriteFailed(err) => Some(err),
            _ => None,
        }
    }
}

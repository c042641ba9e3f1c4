use crate::{AsepriteParseError, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use std::io::{Cursor, Read};

/// Wire-format point: two signed 32-bit coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Wire-format size: signed 32-bit width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// Wire-format rectangle: origin plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

fn map_io(offset: u64, err: std::io::Error) -> AsepriteParseError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        AsepriteParseError::UnexpectedEnd { offset }
    } else {
        AsepriteParseError::ReadFailed(err)
    }
}

/// Sequential little-endian reader over a byte slice.
///
/// Keeps a running byte counter relative to the start of the original stream
/// (`base` accounts for sub-slices handed to chunk decoders), so every error
/// reports a file-absolute offset. The reader never seeks backwards.
pub(crate) struct AseReader<'a> {
    input: Cursor<&'a [u8]>,
    base: u64,
}

impl<'a> AseReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self::with_offset(data, 0)
    }

    /// A reader over a sub-slice that starts at absolute stream offset
    /// `base`.
    pub(crate) fn with_offset(data: &'a [u8], base: u64) -> Self {
        AseReader {
            input: Cursor::new(data),
            base,
        }
    }

    /// Absolute position in the original stream.
    pub(crate) fn position(&self) -> u64 {
        self.base + self.input.position()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.input.get_ref().len() - self.input.position() as usize
    }

    pub(crate) fn byte(&mut self) -> Result<u8> {
        let offset = self.position();
        self.input.read_u8().map_err(|e| map_io(offset, e))
    }

    pub(crate) fn sbyte(&mut self) -> Result<i8> {
        let offset = self.position();
        self.input.read_i8().map_err(|e| map_io(offset, e))
    }

    pub(crate) fn word(&mut self) -> Result<u16> {
        let offset = self.position();
        self.input
            .read_u16::<LittleEndian>()
            .map_err(|e| map_io(offset, e))
    }

    pub(crate) fn short(&mut self) -> Result<i16> {
        let offset = self.position();
        self.input
            .read_i16::<LittleEndian>()
            .map_err(|e| map_io(offset, e))
    }

    pub(crate) fn dword(&mut self) -> Result<u32> {
        let offset = self.position();
        self.input
            .read_u32::<LittleEndian>()
            .map_err(|e| map_io(offset, e))
    }

    pub(crate) fn long(&mut self) -> Result<i32> {
        let offset = self.position();
        self.input
            .read_i32::<LittleEndian>()
            .map_err(|e| map_io(offset, e))
    }

    pub(crate) fn qword(&mut self) -> Result<u64> {
        let offset = self.position();
        self.input
            .read_u64::<LittleEndian>()
            .map_err(|e| map_io(offset, e))
    }

    pub(crate) fn long64(&mut self) -> Result<i64> {
        let offset = self.position();
        self.input
            .read_i64::<LittleEndian>()
            .map_err(|e| map_io(offset, e))
    }

    /// 16.16 fixed point, widened to `f64`.
    pub(crate) fn fixed(&mut self) -> Result<f64> {
        self.long().map(|raw| raw as f64 / 65536.0)
    }

    pub(crate) fn float(&mut self) -> Result<f32> {
        let offset = self.position();
        self.input
            .read_f32::<LittleEndian>()
            .map_err(|e| map_io(offset, e))
    }

    pub(crate) fn double(&mut self) -> Result<f64> {
        let offset = self.position();
        self.input
            .read_f64::<LittleEndian>()
            .map_err(|e| map_io(offset, e))
    }

    /// 16 raw bytes in canonical order.
    pub(crate) fn uuid(&mut self) -> Result<[u8; 16]> {
        let mut bytes = [0_u8; 16];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Length-prefixed UTF-8 string (16-bit length, then exactly that many
    /// bytes).
    pub(crate) fn string(&mut self) -> Result<String> {
        let offset = self.position();
        let str_len = self.word()?;
        let str_bytes = self.take_bytes(str_len as usize)?;
        String::from_utf8(str_bytes).map_err(|_| AsepriteParseError::InvalidUtf8 { offset })
    }

    pub(crate) fn point(&mut self) -> Result<Point> {
        let x = self.long()?;
        let y = self.long()?;
        Ok(Point { x, y })
    }

    pub(crate) fn size(&mut self) -> Result<Size> {
        let width = self.long()?;
        let height = self.long()?;
        Ok(Size { width, height })
    }

    pub(crate) fn rect(&mut self) -> Result<Rect> {
        let origin = self.point()?;
        let size = self.size()?;
        Ok(Rect { origin, size })
    }

    pub(crate) fn read_exact(&mut self, buffer: &mut [u8]) -> Result<()> {
        let offset = self.position();
        self.input.read_exact(buffer).map_err(|e| map_io(offset, e))
    }

    pub(crate) fn take_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut output = vec![0_u8; count];
        self.read_exact(&mut output)?;
        Ok(output)
    }

    pub(crate) fn skip_bytes(&mut self, count: usize) -> Result<()> {
        if self.remaining() < count {
            let offset = self.base + self.input.get_ref().len() as u64;
            return Err(AsepriteParseError::UnexpectedEnd { offset });
        }
        let pos = self.input.position();
        self.input.set_position(pos + count as u64);
        Ok(())
    }

    /// Split off the next `count` bytes as a sub-slice, together with its
    /// absolute stream offset.
    pub(crate) fn take_slice(&mut self, count: usize) -> Result<(&'a [u8], u64)> {
        let offset = self.position();
        let full: &'a [u8] = *self.input.get_ref();
        if self.remaining() < count {
            return Err(AsepriteParseError::UnexpectedEnd {
                offset: self.base + full.len() as u64,
            });
        }
        let pos = self.input.position() as usize;
        self.input.set_position((pos + count) as u64);
        Ok((&full[pos..pos + count], offset))
    }

    /// Inflate the remaining bytes as a zlib stream. A result shorter or
    /// longer than `expected_output_size` is fatal.
    pub(crate) fn unzip(self, expected_output_size: usize) -> Result<Vec<u8>> {
        let offset = self.position();
        let pos = self.input.position() as usize;
        let rest = &self.input.get_ref()[pos..];
        let mut decoder = ZlibDecoder::new(rest);
        let mut buffer = Vec::with_capacity(expected_output_size);
        decoder
            .read_to_end(&mut buffer)
            .map_err(|e| AsepriteParseError::DecompressFailed {
                offset,
                reason: e.to_string(),
            })?;
        if buffer.len() != expected_output_size {
            return Err(AsepriteParseError::DecompressFailed {
                offset,
                reason: format!(
                    "inflated to {} bytes, expected {}",
                    buffer.len(),
                    expected_output_size
                ),
            });
        }
        Ok(buffer)
    }
}

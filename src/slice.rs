use crate::reader::AseReader;
use crate::Result;

/// A named slice: per-frame rectangles with optional nine-patch center and
/// pivot.
#[derive(Debug)]
pub struct Slice {
    pub name: String,
    pub flags: u32,
    pub keys: Vec<SliceKey>,
}

/// The slice geometry from `from_frame` onward.
#[derive(Debug)]
pub struct SliceKey {
    pub from_frame: u32,
    pub origin: (i32, i32),
    pub size: (u32, u32),
    /// Nine-patch center rectangle, relative to the slice origin.
    pub center: Option<(i32, i32, u32, u32)>,
    pub pivot: Option<(i32, i32)>,
}

pub(crate) fn parse_chunk(mut reader: AseReader) -> Result<Slice> {
    let num_slice_keys = reader.dword()?;
    let flags = reader.dword()?;
    reader.skip_bytes(4)?;
    let name = reader.string()?;

    let mut keys = Vec::with_capacity(num_slice_keys as usize);
    for _key in 0..num_slice_keys {
        let from_frame = reader.dword()?;
        let origin_x = reader.long()?;
        let origin_y = reader.long()?;
        let width = reader.dword()?;
        let height = reader.dword()?;
        let center = if flags & 1 != 0 {
            let center_x = reader.long()?;
            let center_y = reader.long()?;
            let center_width = reader.dword()?;
            let center_height = reader.dword()?;
            Some((center_x, center_y, center_width, center_height))
        } else {
            None
        };
        let pivot = if flags & 2 != 0 {
            let pivot_x = reader.long()?;
            let pivot_y = reader.long()?;
            Some((pivot_x, pivot_y))
        } else {
            None
        };
        keys.push(SliceKey {
            from_frame,
            origin: (origin_x, origin_y),
            size: (width, height),
            center,
            pivot,
        });
    }

    Ok(Slice { name, flags, keys })
}

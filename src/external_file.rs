use crate::reader::AseReader;
use crate::Result;

/// One entry of the external-files table: a 32-bit id mapped to a file name
/// (or uuid in string form) that other chunks reference.
#[derive(Debug)]
pub struct ExternalFile {
    pub id: u32,
    pub name: String,
}

pub(crate) fn parse_chunk(mut reader: AseReader) -> Result<Vec<ExternalFile>> {
    let num_entries = reader.dword()?;
    reader.skip_bytes(8)?;
    let mut entries = Vec::with_capacity(num_entries as usize);
    for _entry in 0..num_entries {
        let id = reader.dword()?;
        reader.skip_bytes(8)?;
        let name = reader.string()?;
        entries.push(ExternalFile { id, name });
    }
    Ok(entries)
}

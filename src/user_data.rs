use crate::reader::{AseReader, Point, Rect, Size};
use crate::{AsepriteParseError, Result};

/// A user-data chunk: free-form annotations attached to the preceding chunk
/// (or to the sprite itself when it appears first).
#[derive(Debug, Default)]
pub struct UserData {
    pub text: Option<String>,
    pub color: Option<[u8; 4]>,
    /// Property maps keyed by extension id (key 0 holds user properties).
    pub properties: Option<Vec<PropertiesMap>>,
}

/// One properties map: a 32-bit key plus named property entries in file
/// order.
#[derive(Debug)]
pub struct PropertiesMap {
    pub key: u32,
    pub properties: Vec<(String, PropertyValue)>,
}

/// A polymorphic property value. The variant set is closed; unknown type
/// tags are fatal. Cycles are impossible by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    /// 16.16 fixed point, widened to `f64`.
    Fixed(f64),
    Float(f32),
    Double(f64),
    String(String),
    Point(Point),
    Size(Size),
    Rect(Rect),
    /// A homogeneous, length-prefixed vector.
    Vector(Vec<PropertyValue>),
    /// A nested map from 32-bit keys to property values.
    Map(Vec<(u32, PropertyValue)>),
    Uuid([u8; 16]),
}

pub(crate) fn parse_chunk(mut reader: AseReader) -> Result<UserData> {
    let flags = reader.dword()?;
    let text = if flags & 1 != 0 {
        Some(reader.string()?)
    } else {
        None
    };
    let color = if flags & 2 != 0 {
        let red = reader.byte()?;
        let green = reader.byte()?;
        let blue = reader.byte()?;
        let alpha = reader.byte()?;
        Some([red, green, blue, alpha])
    } else {
        None
    };
    let properties = if flags & 4 != 0 {
        let _total_size = reader.dword()?;
        let num_maps = reader.dword()?;
        let mut maps = Vec::with_capacity(num_maps as usize);
        for _map in 0..num_maps {
            maps.push(parse_properties_map(&mut reader)?);
        }
        Some(maps)
    } else {
        None
    };

    Ok(UserData {
        text,
        color,
        properties,
    })
}

fn parse_properties_map(reader: &mut AseReader) -> Result<PropertiesMap> {
    let key = reader.dword()?;
    let num_properties = reader.dword()?;
    let mut properties = Vec::with_capacity(num_properties as usize);
    for _property in 0..num_properties {
        let name = reader.string()?;
        let value = parse_value(reader, None)?;
        properties.push((name, value));
    }
    Ok(PropertiesMap { key, properties })
}

// `forced_type` carries the element type of a homogeneous vector; when None
// the value reads its own 16-bit type tag.
fn parse_value(reader: &mut AseReader, forced_type: Option<u16>) -> Result<PropertyValue> {
    let type_offset = reader.position();
    let type_tag = match forced_type {
        Some(tag) => tag,
        None => reader.word()?,
    };
    match type_tag {
        0x0000 => Ok(PropertyValue::Null),
        0x0001 => Ok(PropertyValue::Bool(reader.byte()? != 0)),
        0x0002 => Ok(PropertyValue::Int8(reader.sbyte()?)),
        0x0003 => Ok(PropertyValue::Uint8(reader.byte()?)),
        0x0004 => Ok(PropertyValue::Int16(reader.short()?)),
        0x0005 => Ok(PropertyValue::Uint16(reader.word()?)),
        0x0006 => Ok(PropertyValue::Int32(reader.long()?)),
        0x0007 => Ok(PropertyValue::Uint32(reader.dword()?)),
        0x0008 => Ok(PropertyValue::Int64(reader.long64()?)),
        0x0009 => Ok(PropertyValue::Uint64(reader.qword()?)),
        0x000A => Ok(PropertyValue::Fixed(reader.fixed()?)),
        0x000B => Ok(PropertyValue::Float(reader.float()?)),
        0x000C => Ok(PropertyValue::Double(reader.double()?)),
        0x000D => Ok(PropertyValue::String(reader.string()?)),
        0x000E => Ok(PropertyValue::Point(reader.point()?)),
        0x000F => Ok(PropertyValue::Size(reader.size()?)),
        0x0010 => Ok(PropertyValue::Rect(reader.rect()?)),
        0x0011 => {
            let count = reader.dword()?;
            let element_type = reader.word()?;
            let mut elements = Vec::with_capacity(count as usize);
            for _element in 0..count {
                // Element type 0 means every element carries its own tag.
                let forced = (element_type != 0).then_some(element_type);
                elements.push(parse_value(reader, forced)?);
            }
            Ok(PropertyValue::Vector(elements))
        }
        0x0012 => {
            let count = reader.dword()?;
            let mut entries = Vec::with_capacity(count as usize);
            for _entry in 0..count {
                let key = reader.dword()?;
                let value = parse_value(reader, None)?;
                entries.push((key, value));
            }
            Ok(PropertyValue::Map(entries))
        }
        0x0013 => Ok(PropertyValue::Uuid(reader.uuid()?)),
        code => Err(AsepriteParseError::InvalidPropertyType {
            offset: type_offset,
            code,
        }),
    }
}

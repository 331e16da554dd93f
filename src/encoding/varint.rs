use std::io::{self, Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

const MARKER_U16: u8 = 0xfd;
const MARKER_U32: u8 = 0xfe;
const MARKER_U64: u8 = 0xff;

/// Number of bytes `value` occupies once encoded.
pub fn varint_size(value: u64) -> usize {
    match value {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x10000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Writes `value` using the smallest tier and returns the number of bytes written.
pub fn write_varint<W: Write>(writer: &mut W, value: u64) -> io::Result<usize> {
    match value {
        0..=0xfc => writer.write_u8(value as u8)?,
        0xfd..=0xffff => {
            writer.write_u8(MARKER_U16)?;
            writer.write_u16::<LittleEndian>(value as u16)?;
        }
        0x10000..=0xffff_ffff => {
            writer.write_u8(MARKER_U32)?;
            writer.write_u32::<LittleEndian>(value as u32)?;
        }
        _ => {
            writer.write_u8(MARKER_U64)?;
            writer.write_u64::<LittleEndian>(value)?;
        }
    }

    Ok(varint_size(value))
}

pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(varint_size(value));
    // writing into a Vec cannot fail
    let _ = write_varint(&mut buf, value);
    buf
}

pub fn read_varint<R: Read>(reader: &mut R) -> Result<u64> {
    let first = reader.read_u8().map_err(|_| Error::malformed("missing varint"))?;

    let value = match first {
        MARKER_U16 => reader.read_u16::<LittleEndian>().map(u64::from),
        MARKER_U32 => reader.read_u32::<LittleEndian>().map(u64::from),
        MARKER_U64 => reader.read_u64::<LittleEndian>(),
        _ => return Ok(u64::from(first)),
    };

    value.map_err(|_| Error::malformed(format!("truncated varint after marker {:#04x}", first)))
}

/// Decodes a varint from the front of `bytes`, returning the value and the
/// number of bytes consumed.
pub fn decode_varint(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut cursor = Cursor::new(bytes);
    let value = read_varint(&mut cursor)?;
    Ok((value, cursor.position() as usize))
}

//! Name table: string section, extension table and string interning
//!
//! The string section starts with a u32 count of 0x2000-byte chunks, followed
//! by that many chunks of NUL-terminated names. The extension table follows
//! immediately: a u32 count and one u32 string offset per extension.
//!
//! A name is either a literal NUL-terminated string, or (when the
//! back-reference bit is set) a 16-bit little-endian word pointing at bytes
//! already present earlier in the section, followed by a literal suffix.

use crate::rf::entry::NameInfo;
use crate::rf::error::{RfError, RfResult};
use std::collections::HashMap;
use tracing::debug;

/// Size of one string section chunk
pub const STRING_SECTION_SIZE: usize = 0x2000;

/// Decoded view over an archive's string section and extension table
#[derive(Debug, Clone)]
pub struct NameTable<'a> {
    strings: &'a [u8],
    extensions: Vec<String>,
    /// Bytes consumed from the start of the section, including the extension table
    consumed: usize,
}

impl<'a> NameTable<'a> {
    /// Parse the string section and extension table starting at `section`
    pub fn parse(section: &'a [u8]) -> RfResult<Self> {
        let num_sections = read_u32(section, 0, "string")?;
        let strings_len = (num_sections as usize)
            .checked_mul(STRING_SECTION_SIZE)
            .ok_or(RfError::BlockOutOfRange {
                block: "string",
                offset: u64::from(num_sections),
            })?;
        let strings_end = 4 + strings_len;
        let strings = section.get(4..strings_end).ok_or(RfError::Truncated {
            expected: strings_end,
            actual: section.len(),
        })?;

        let num_extensions = read_u32(section, strings_end, "extension")? as usize;
        let table_end = num_extensions
            .checked_mul(4)
            .and_then(|len| len.checked_add(strings_end + 4))
            .filter(|&end| end <= section.len())
            .ok_or(RfError::BlockOutOfRange {
                block: "extension",
                offset: strings_end as u64,
            })?;

        let mut extensions = Vec::with_capacity(num_extensions);
        for i in 0..num_extensions {
            let offset = read_u32(section, strings_end + 4 + i * 4, "extension")?;
            let bytes = c_string_at(strings, offset)?;
            extensions.push(to_string(bytes, offset)?);
        }

        debug!(
            "String section: {} chunks, {} extensions",
            num_sections, num_extensions
        );

        Ok(Self {
            strings,
            extensions,
            consumed: table_end,
        })
    }

    /// Raw string bytes (all chunks, padding included)
    pub fn strings(&self) -> &'a [u8] {
        self.strings
    }

    /// Extension strings in table order
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Bytes of the section covered by the string chunks and the extension table
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Base name (without extension) referenced by `info`
    pub fn base_name(&self, info: NameInfo) -> RfResult<String> {
        let offset = info.str_offset();

        if !info.is_back_reference() {
            return to_string(c_string_at(self.strings, offset)?, offset);
        }

        let (length, distance) = decode_back_reference(read_u16(self.strings, offset)?);
        let start = offset
            .checked_sub(distance)
            .ok_or(RfError::BackReferenceOutOfRange { offset, distance })?
            as usize;

        // The copied prefix stops early at a NUL, like a C string would.
        let end = (start + length).min(self.strings.len());
        let window = &self.strings[start..end];
        let prefix = window
            .iter()
            .position(|&b| b == 0)
            .map_or(window, |nul| &window[..nul]);
        let suffix = c_string_at(self.strings, offset + 2)?;

        let mut name = Vec::with_capacity(prefix.len() + suffix.len());
        name.extend_from_slice(prefix);
        name.extend_from_slice(suffix);
        String::from_utf8(name).map_err(|_| RfError::NonUtf8Name(offset))
    }

    /// Full filename: base name followed by the selected extension
    pub fn resolve(&self, info: NameInfo) -> RfResult<String> {
        let index = info.extension_index();
        let extension =
            self.extensions
                .get(index as usize)
                .ok_or(RfError::ExtensionIndexOutOfRange {
                    index,
                    count: self.extensions.len(),
                })?;

        let mut name = self.base_name(info)?;
        name.push_str(extension);
        Ok(name)
    }
}

/// Split a back-reference word into (copy length, distance back)
pub const fn decode_back_reference(word: u16) -> (usize, u32) {
    let length = (word & 0x1F) as usize + 4;
    let distance = (((word & 0xE0) >> 6) << 8) | (word >> 8);
    (length, distance as u32)
}

/// Deduplicating string table builder
///
/// The first occurrence of a string reserves the next offset; later
/// occurrences reuse it.
#[derive(Debug, Clone, Default)]
pub struct StringInterner {
    data: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl StringInterner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of `value`, appending it on first use
    pub fn intern(&mut self, value: &str) -> RfResult<u32> {
        if let Some(&offset) = self.offsets.get(value) {
            return Ok(offset);
        }

        if value.as_bytes().contains(&0) {
            return Err(RfError::InvalidName(value.to_string()));
        }

        let offset = self.data.len();
        if offset > NameInfo::STR_OFFSET_MASK as usize {
            return Err(RfError::StringTableOverflow(offset));
        }

        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        self.offsets.insert(value.to_string(), offset as u32);
        Ok(offset as u32)
    }

    /// Number of distinct strings
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether no string has been interned
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Size of the string bytes
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// String bytes in offset order
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

fn read_u32(data: &[u8], offset: usize, block: &'static str) -> RfResult<u32> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(RfError::BlockOutOfRange {
            block,
            offset: offset as u64,
        })
}

fn read_u16(strings: &[u8], offset: u32) -> RfResult<u16> {
    let start = offset as usize;
    strings
        .get(start..start + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or(RfError::NameOffsetOutOfRange(offset))
}

fn c_string_at(strings: &[u8], offset: u32) -> RfResult<&[u8]> {
    let tail = strings
        .get(offset as usize..)
        .ok_or(RfError::NameOffsetOutOfRange(offset))?;
    let nul = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(RfError::NameOffsetOutOfRange(offset))?;
    Ok(&tail[..nul])
}

fn to_string(bytes: &[u8], offset: u32) -> RfResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| RfError::NonUtf8Name(offset))
}

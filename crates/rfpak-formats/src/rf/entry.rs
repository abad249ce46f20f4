//! Entry records and resolved resource entries

use crate::rf::error::{RfError, RfResult};
use crate::rf::flags::ResourceFlags;
use binrw::{BinRead, BinWrite};

/// Size of one on-disk entry record
pub const ENTRY_RECORD_SIZE: usize = 24;

/// Packed name reference of an entry record
///
/// ```text
/// bits  0..=19  offset into the string section
/// bit      23   back-reference mode
/// bits 24..=31  extension table index
/// ```
#[derive(BinRead, BinWrite, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[brw(little)]
pub struct NameInfo(pub u32);

impl NameInfo {
    /// Mask of the string offset bits
    pub const STR_OFFSET_MASK: u32 = 0x000F_FFFF;
    /// Back-reference mode bit
    pub const BACK_REFERENCE: u32 = 0x0080_0000;
    /// Shift of the extension index byte
    pub const EXTENSION_SHIFT: u32 = 24;

    /// Literal name at `str_offset` with the given extension
    pub fn literal(str_offset: u32, extension_index: u8) -> RfResult<Self> {
        if str_offset > Self::STR_OFFSET_MASK {
            return Err(RfError::StringTableOverflow(str_offset as usize));
        }
        Ok(Self(
            str_offset | (u32::from(extension_index) << Self::EXTENSION_SHIFT),
        ))
    }

    /// Offset into the string section
    pub const fn str_offset(self) -> u32 {
        self.0 & Self::STR_OFFSET_MASK
    }

    /// Index into the extension table
    pub const fn extension_index(self) -> u8 {
        (self.0 >> Self::EXTENSION_SHIFT) as u8
    }

    /// Whether the name is stored as a back-reference
    pub const fn is_back_reference(self) -> bool {
        (self.0 & Self::BACK_REFERENCE) != 0
    }
}

/// On-disk entry record (24 bytes, little-endian)
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
pub struct RfEntryRecord {
    /// Byte offset into the payload shard
    pub pack_offset: u32,
    /// Packed name reference
    pub name_info: NameInfo,
    /// Stored size in the shard
    pub size_compressed: u32,
    /// Decoded size
    pub size_uncompressed: u32,
    /// Modification timestamp
    pub timestamp: u32,
    /// Depth byte and attribute bits
    pub flags: ResourceFlags,
}

/// One catalog item with its name already resolved
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourceEntry {
    /// Byte offset into the payload shard
    pub pack_offset: u32,
    /// Full filename including any extension
    pub filename: String,
    /// Stored size in the shard
    pub size_compressed: u32,
    /// Decoded size
    pub size_uncompressed: u32,
    /// Modification timestamp
    pub timestamp: u32,
    /// Depth byte and attribute bits
    pub flags: ResourceFlags,
}

impl ResourceEntry {
    /// Directory entry at the given depth
    pub fn directory(filename: impl Into<String>, depth: u8) -> Self {
        Self {
            filename: filename.into(),
            flags: ResourceFlags::new(ResourceFlags::DIRECTORY).with_depth(depth),
            ..Self::default()
        }
    }

    /// File entry stored raw (compressed size equals decoded size)
    pub fn file(filename: impl Into<String>, size: u32, flags: ResourceFlags) -> Self {
        Self {
            filename: filename.into(),
            size_compressed: size,
            size_uncompressed: size,
            flags,
            ..Self::default()
        }
    }

    /// Depth encoded in the flags
    pub const fn depth(&self) -> u8 {
        self.flags.depth()
    }

    /// Check if the entry is a directory
    pub const fn is_directory(&self) -> bool {
        self.flags.is_directory()
    }

    /// Check if the payload is stored without zlib compression
    pub const fn is_raw(&self) -> bool {
        self.size_compressed == self.size_uncompressed
    }

    /// Clone with a different depth
    pub fn with_depth(&self, depth: u8) -> Self {
        Self {
            flags: self.flags.with_depth(depth),
            ..self.clone()
        }
    }

    /// Record for this entry with the given name reference
    pub fn to_record(&self, name_info: NameInfo) -> RfEntryRecord {
        RfEntryRecord {
            pack_offset: self.pack_offset,
            name_info,
            size_compressed: self.size_compressed,
            size_uncompressed: self.size_uncompressed,
            timestamp: self.timestamp,
            flags: self.flags,
        }
    }

    /// Entry from a record and its resolved filename
    pub fn from_record(record: &RfEntryRecord, filename: String) -> Self {
        Self {
            pack_offset: record.pack_offset,
            filename,
            size_compressed: record.size_compressed,
            size_uncompressed: record.size_uncompressed,
            timestamp: record.timestamp,
            flags: record.flags,
        }
    }
}

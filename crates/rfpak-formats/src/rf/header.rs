//! RF archive header

use crate::rf::entry::ENTRY_RECORD_SIZE;
use crate::rf::error::{RfError, RfResult};
use binrw::{BinRead, BinWrite};

/// Archive magic
pub const RF_MAGIC: [u8; 2] = *b"RF";

/// Size of the fixed header layout
pub const HEADER_SIZE: usize = 0x80;

/// Number of reserved words at the end of the header
pub const RESERVED_WORDS: usize = 0x15;

/// Filler written into every reserved word
pub const RESERVED_FILL: u32 = 0xAAAA_AAAA;

/// Version written by the builder
pub const DEFAULT_VERSION: u16 = 6;

/// RF archive header (128 bytes, little-endian)
///
/// Offsets are absolute file offsets; the payload itself starts at
/// `header_size` once inflated.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct RfHeader {
    /// Magic bytes: "RF"
    pub magic: [u8; 2],

    /// Format version
    pub version: u16,

    /// Header size, also the offset of the compressed payload
    pub header_size: u32,

    /// Always zero
    pub padding: u32,

    /// Offset of the entries block
    pub entries_block_offset: u32,

    /// Size of the entries block
    pub entries_block_size: u32,

    /// Archive timestamp
    pub timestamp: u32,

    /// Size of the zlib stream following the header
    pub size_compressed: u32,

    /// Size of the inflated payload
    pub size_uncompressed: u32,

    /// Offset of the string section
    pub string_block_offset: u32,

    /// Size of the string bytes before section padding
    pub string_block_size: u32,

    /// Number of entry records
    pub num_entries: u32,

    /// Reserved words, 0xAA filled by the builder
    pub reserved: [u32; RESERVED_WORDS],
}

impl Default for RfHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl RfHeader {
    /// Header with fixed fields set and all sizes zero
    pub fn new() -> Self {
        Self {
            magic: RF_MAGIC,
            version: DEFAULT_VERSION,
            header_size: HEADER_SIZE as u32,
            padding: 0,
            entries_block_offset: HEADER_SIZE as u32,
            entries_block_size: 0,
            timestamp: 0,
            size_compressed: 0,
            size_uncompressed: 0,
            string_block_offset: HEADER_SIZE as u32,
            string_block_size: 0,
            num_entries: 0,
            reserved: [RESERVED_FILL; RESERVED_WORDS],
        }
    }

    /// Validate header values
    pub fn validate(&self) -> RfResult<()> {
        if self.magic != RF_MAGIC {
            return Err(RfError::InvalidMagic(self.magic));
        }

        if (self.header_size as usize) < HEADER_SIZE {
            return Err(RfError::InvalidHeaderSize {
                got: self.header_size,
                minimum: HEADER_SIZE as u32,
            });
        }

        if u64::from(self.num_entries) * ENTRY_RECORD_SIZE as u64
            != u64::from(self.entries_block_size)
        {
            return Err(RfError::EntryCountMismatch {
                num_entries: self.num_entries,
                block_size: self.entries_block_size,
            });
        }

        Ok(())
    }

    /// Translate an absolute file offset into a payload offset
    pub fn payload_offset(&self, absolute: u32, block: &'static str) -> RfResult<usize> {
        absolute
            .checked_sub(self.header_size)
            .map(|offset| offset as usize)
            .ok_or(RfError::BlockOutOfRange {
                block,
                offset: u64::from(absolute),
            })
    }
}

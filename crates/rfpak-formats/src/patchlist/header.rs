//! Patchlist header

use binrw::{BinRead, BinWrite};

/// Size of the header and of every path record
pub const PATCHLIST_RECORD_SIZE: usize = 0x80;

/// Reserved bytes after magic and count
pub const PATCHLIST_RESERVED: usize = 0x78;

/// Patchlist header (128 bytes, little-endian)
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct PatchlistHeader {
    /// Magic value, carried through unchanged
    pub magic: u32,

    /// Number of path records
    pub num_files: u32,

    /// Reserved bytes, carried through unchanged
    pub reserved: [u8; PATCHLIST_RESERVED],
}

impl PatchlistHeader {
    /// Header with the given magic, no files and zeroed reserved bytes
    pub fn new(magic: u32) -> Self {
        Self {
            magic,
            num_files: 0,
            reserved: [0; PATCHLIST_RESERVED],
        }
    }
}

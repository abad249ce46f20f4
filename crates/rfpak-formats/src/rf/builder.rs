//! Builder for RF archives

use crate::compression::deflate;
use crate::rf::RfArchive;
use crate::rf::entry::{ENTRY_RECORD_SIZE, NameInfo, ResourceEntry};
use crate::rf::error::{RfError, RfResult};
use crate::rf::header::{DEFAULT_VERSION, HEADER_SIZE, RfHeader};
use crate::rf::names::{STRING_SECTION_SIZE, StringInterner};
use binrw::BinWriterExt;
use std::io::Cursor;
use tracing::debug;

/// Alignment of the blocks inside the payload and of `string_block_offset`
pub const BLOCK_ALIGNMENT: usize = 0x80;

/// Filler byte for block alignment padding
pub const BLOCK_FILL: u8 = 0xBB;

/// Round `value` up to a multiple of `alignment`
pub const fn align_up(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

fn pad_to(data: &mut Vec<u8>, alignment: usize, fill: u8) {
    let target = align_up(data.len(), alignment);
    data.resize(target, fill);
}

fn to_u32(value: usize) -> RfResult<u32> {
    u32::try_from(value).map_err(|_| RfError::PayloadTooLarge(value))
}

/// Builder for RF archives
///
/// Names are always written in literal form with a single, empty extension,
/// so every filename is stored in full. Identical filenames share one copy
/// in the string section.
#[derive(Debug, Clone)]
pub struct RfArchiveBuilder {
    version: u16,
    timestamp: u32,
    entries: Vec<ResourceEntry>,
}

impl Default for RfArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RfArchiveBuilder {
    /// Create a builder with no entries
    pub fn new() -> Self {
        Self {
            version: DEFAULT_VERSION,
            timestamp: 0,
            entries: Vec::new(),
        }
    }

    /// Builder seeded with an archive's entries, version and timestamp
    pub fn from_archive(archive: &RfArchive) -> Self {
        Self {
            version: archive.header.version,
            timestamp: archive.header.timestamp,
            entries: archive.entries.clone(),
        }
    }

    /// Set the header version
    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    /// Set the header timestamp
    pub fn timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Append an entry
    pub fn add_entry(&mut self, entry: ResourceEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    /// Append several entries
    pub fn add_entries<I: IntoIterator<Item = ResourceEntry>>(&mut self, entries: I) -> &mut Self {
        self.entries.extend(entries);
        self
    }

    /// Number of entries added so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry was added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the archive to bytes
    pub fn build(&self) -> RfResult<Vec<u8>> {
        let num_entries = u32::try_from(self.entries.len())
            .map_err(|_| RfError::TooManyEntries(self.entries.len()))?;
        let entries_block_size = to_u32(self.entries.len() * ENTRY_RECORD_SIZE)?;

        // The empty string goes first so the single extension can point at it.
        let mut interner = StringInterner::new();
        let empty_extension = interner.intern("")?;

        let mut records = Cursor::new(Vec::with_capacity(entries_block_size as usize));
        for entry in &self.entries {
            let offset = interner.intern(&entry.filename)?;
            records.write_le(&entry.to_record(NameInfo::literal(offset, 0)?))?;
        }
        let mut payload = records.into_inner();
        pad_to(&mut payload, BLOCK_ALIGNMENT, BLOCK_FILL);

        let string_block_size = to_u32(interner.byte_len())?;
        let distinct = interner.len();
        let mut strings = interner.into_bytes();
        strings.resize(align_up(strings.len(), STRING_SECTION_SIZE), 0);
        let num_sections = to_u32(strings.len() / STRING_SECTION_SIZE)?;

        payload.extend_from_slice(&num_sections.to_le_bytes());
        payload.extend_from_slice(&strings);
        payload.extend_from_slice(&1u32.to_le_bytes());
        payload.extend_from_slice(&empty_extension.to_le_bytes());
        pad_to(&mut payload, BLOCK_ALIGNMENT, BLOCK_FILL);

        debug!(
            "Payload: {} entries, {} distinct names in {} string chunks, {} bytes",
            num_entries,
            distinct,
            num_sections,
            payload.len()
        );

        let compressed = deflate(&payload)?;

        let mut header = RfHeader::new();
        header.version = self.version;
        header.timestamp = self.timestamp;
        header.entries_block_offset = HEADER_SIZE as u32;
        header.entries_block_size = entries_block_size;
        header.size_compressed = to_u32(compressed.len())?;
        header.size_uncompressed = to_u32(payload.len())?;
        header.string_block_offset = to_u32(align_up(
            HEADER_SIZE + entries_block_size as usize,
            BLOCK_ALIGNMENT,
        ))?;
        header.string_block_size = string_block_size;
        header.num_entries = num_entries;

        let mut output = Cursor::new(Vec::with_capacity(HEADER_SIZE + compressed.len()));
        output.write_le(&header)?;
        let mut output = output.into_inner();
        output.extend_from_slice(&compressed);

        Ok(output)
    }
}

//! RF resource archive format implementation
//!
//! An RF archive is a fixed 128-byte header followed by a single zlib stream.
//! Inflated, the payload holds the flattened resource catalog.
//!
//! # Format Structure
//!
//! ```text
//! RF Archive:
//! ├── Header (0x80 bytes, little-endian)
//! │   ├── magic "RF", version (u16), header_size (u32), padding (u32)
//! │   ├── entries_block_offset, entries_block_size, timestamp (u32 each)
//! │   ├── size_compressed, size_uncompressed (u32 each)
//! │   ├── string_block_offset, string_block_size, num_entries (u32 each)
//! │   └── 21 reserved u32 words (0xAA filled)
//! └── zlib stream (size_compressed bytes) inflating to size_uncompressed bytes:
//!     ├── Entries block (num_entries × 24 bytes)
//!     ├── 0xBB padding to a 0x80 boundary
//!     ├── String section
//!     │   ├── chunk count (u32)
//!     │   └── chunk count × 0x2000 bytes of NUL-terminated names, zero padded
//!     ├── Extension table
//!     │   ├── extension count (u32)
//!     │   └── extension count × u32 string offsets
//!     └── 0xBB padding to a 0x80 boundary
//! ```
//!
//! Entries are a pre-order depth-first listing of the resource tree; each
//! entry's depth lives in the low byte of its flags (see [`ResourceFlags`]).
//!
//! # Usage
//!
//! ```rust
//! use rfpak_formats::rf::{RfArchive, RfArchiveBuilder, ResourceEntry, ResourceFlags};
//!
//! let mut builder = RfArchiveBuilder::new();
//! builder.add_entry(ResourceEntry::directory("", 0));
//! builder.add_entry(ResourceEntry::file("a.txt", 12, ResourceFlags::new(1)));
//! let bytes = builder.build()?;
//!
//! let archive = RfArchive::parse(&bytes)?;
//! assert_eq!(archive.entries[1].filename, "a.txt");
//! # Ok::<(), rfpak_formats::rf::RfError>(())
//! ```

mod builder;
mod entry;
mod error;
mod flags;
mod header;
mod names;

pub use builder::{BLOCK_ALIGNMENT, BLOCK_FILL, RfArchiveBuilder, align_up};
pub use entry::{ENTRY_RECORD_SIZE, NameInfo, ResourceEntry, RfEntryRecord};
pub use error::{RfError, RfResult};
pub use flags::{ResourceFlags, depth_of, with_depth};
pub use header::{DEFAULT_VERSION, HEADER_SIZE, RESERVED_FILL, RESERVED_WORDS, RF_MAGIC, RfHeader};
pub use names::{NameTable, STRING_SECTION_SIZE, StringInterner, decode_back_reference};

use crate::compression::inflate_exact;
use binrw::BinRead;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Parsed RF archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfArchive {
    /// Header as read from the file
    pub header: RfHeader,
    /// Entries in pre-order, depth-tagged
    pub entries: Vec<ResourceEntry>,
}

impl RfArchive {
    /// Archive with a fresh header and the given entries
    pub fn new(entries: Vec<ResourceEntry>) -> Self {
        Self {
            header: RfHeader::new(),
            entries,
        }
    }

    /// Parse an archive from its file bytes
    pub fn parse(data: &[u8]) -> RfResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(RfError::Truncated {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let header = RfHeader::read(&mut Cursor::new(data))?;
        header.validate()?;

        let start = u64::from(header.header_size);
        let end = start + u64::from(header.size_compressed);
        if end > data.len() as u64 {
            return Err(RfError::CompressedSpanOutOfRange {
                start,
                end,
                file_len: data.len(),
            });
        }

        let payload = inflate_exact(
            &data[start as usize..end as usize],
            header.size_uncompressed as usize,
        )?;
        debug!(
            "Inflated payload: {} -> {} bytes",
            header.size_compressed, header.size_uncompressed
        );

        let entries_start = header.payload_offset(header.entries_block_offset, "entries")?;
        let entries_end = entries_start + header.entries_block_size as usize;
        let entries_data =
            payload
                .get(entries_start..entries_end)
                .ok_or(RfError::BlockOutOfRange {
                    block: "entries",
                    offset: u64::from(header.entries_block_offset),
                })?;

        let strings_start = header.payload_offset(header.string_block_offset, "string")?;
        let section = payload
            .get(strings_start..)
            .ok_or(RfError::BlockOutOfRange {
                block: "string",
                offset: u64::from(header.string_block_offset),
            })?;
        let names = NameTable::parse(section)?;

        let mut cursor = Cursor::new(entries_data);
        let mut entries = Vec::with_capacity(header.num_entries as usize);
        for index in 0..header.num_entries as usize {
            let record = RfEntryRecord::read(&mut cursor)?;
            let filename = names
                .resolve(record.name_info)
                .map_err(|e| RfError::Entry {
                    index,
                    source: Box::new(e),
                })?;
            entries.push(ResourceEntry::from_record(&record, filename));
        }

        Ok(Self { header, entries })
    }

    /// Build the archive to bytes
    ///
    /// Sizes and offsets are recomputed; the version and timestamp of
    /// `header` are kept.
    pub fn build(&self) -> RfResult<Vec<u8>> {
        RfArchiveBuilder::from_archive(self).build()
    }

    /// Read and parse an archive file
    pub fn load<P: AsRef<Path>>(path: P) -> RfResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| RfError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let archive = Self::parse(&data)?;
        info!(
            "Loaded {} entries from {}",
            archive.entries.len(),
            path.display()
        );
        Ok(archive)
    }

    /// Build the archive and write it atomically to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RfResult<()> {
        let path = path.as_ref();
        let data = self.build()?;
        crate::fs::write_atomic(path, &data).map_err(|source| RfError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "Wrote {} entries ({} bytes) to {}",
            self.entries.len(),
            data.len(),
            path.display()
        );
        Ok(())
    }
}

impl crate::RfFormat for RfArchive {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        Self::parse(data).map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        self.build()
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::RfFormat;
    use crate::compression::deflate;
    use crate::test_utils::{sample_entries, test_round_trip};
    use binrw::BinWriterExt;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_sample() {
        let archive = RfArchive::new(sample_entries());
        let bytes = archive.build().expect("archive builds");
        let parsed = RfArchive::parse(&bytes).expect("archive parses");

        assert_eq!(parsed.entries, archive.entries);
        RfArchive::verify_round_trip(&bytes).expect("byte-identical rebuild");
        test_round_trip(&parsed).expect("round trip");
    }

    #[test]
    fn test_header_consistency() {
        let entries = sample_entries();
        let bytes = RfArchive::new(entries.clone()).build().unwrap();
        let header = RfArchive::parse(&bytes).unwrap().header;

        assert_eq!(header.num_entries as usize, entries.len());
        assert_eq!(header.entries_block_size, header.num_entries * 24);
        assert_eq!(
            header.string_block_offset,
            align_up(
                (header.entries_block_offset + header.entries_block_size) as usize,
                BLOCK_ALIGNMENT
            ) as u32
        );
        assert_eq!(header.size_compressed as usize, bytes.len() - HEADER_SIZE);
        assert_eq!(header.size_uncompressed as usize % BLOCK_ALIGNMENT, 0);
    }

    #[test]
    fn test_keeps_version_and_timestamp() {
        let mut archive = RfArchive::new(sample_entries());
        archive.header.version = 9;
        archive.header.timestamp = 0x5EED;

        let parsed = RfArchive::parse(&archive.build().unwrap()).unwrap();
        assert_eq!(parsed.header.version, 9);
        assert_eq!(parsed.header.timestamp, 0x5EED);
        assert_eq!(parsed.header.reserved, [RESERVED_FILL; RESERVED_WORDS]);
    }

    #[test]
    fn test_parse_rejects_bad_magic() {
        let mut bytes = RfArchive::new(sample_entries()).build().unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            RfArchive::parse(&bytes),
            Err(RfError::InvalidMagic(_))
        ));
    }

    #[test]
    fn test_parse_rejects_truncated_payload() {
        let bytes = RfArchive::new(sample_entries()).build().unwrap();
        assert!(matches!(
            RfArchive::parse(&bytes[..bytes.len() - 1]),
            Err(RfError::CompressedSpanOutOfRange { .. })
        ));
        assert!(matches!(
            RfArchive::parse(&bytes[..64]),
            Err(RfError::Truncated { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_size_mismatch() {
        let mut bytes = RfArchive::new(sample_entries()).build().unwrap();
        // size_uncompressed lives at 0x1C
        let wrong = (RfArchive::parse(&bytes).unwrap().header.size_uncompressed + 1).to_le_bytes();
        bytes[0x1C..0x20].copy_from_slice(&wrong);

        assert!(matches!(
            RfArchive::parse(&bytes),
            Err(RfError::DecompressedSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_entry_count_mismatch() {
        let mut bytes = RfArchive::new(sample_entries()).build().unwrap();
        bytes[0x28] = bytes[0x28].wrapping_add(1);

        assert!(matches!(
            RfArchive::parse(&bytes),
            Err(RfError::EntryCountMismatch { .. })
        ));
    }

    #[test]
    fn test_parse_back_reference_archive() {
        // Hand-assembled payload using the compact name encoding
        let mut strings = vec![0u8; STRING_SECTION_SIZE];
        strings[0x00..0x08].copy_from_slice(b"texture\0");
        strings[0x08..0x0D].copy_from_slice(b".dds\0");
        // "textu" + "re_02" via back-reference: len 5, distance 0x10
        strings[0x10..0x12].copy_from_slice(&0x1001u16.to_le_bytes());
        strings[0x12..0x18].copy_from_slice(b"re_02\0");

        let records = [
            RfEntryRecord {
                pack_offset: 0,
                name_info: NameInfo(0),
                size_compressed: 10,
                size_uncompressed: 20,
                timestamp: 1,
                flags: ResourceFlags::new(1),
            },
            RfEntryRecord {
                pack_offset: 10,
                name_info: NameInfo(0x10 | NameInfo::BACK_REFERENCE | (1 << 24)),
                size_compressed: 30,
                size_uncompressed: 30,
                timestamp: 2,
                flags: ResourceFlags::new(1),
            },
        ];

        let mut payload = Cursor::new(Vec::new());
        for record in &records {
            payload.write_le(record).unwrap();
        }
        let mut payload = payload.into_inner();
        payload.resize(BLOCK_ALIGNMENT, BLOCK_FILL);
        payload.extend_from_slice(&1u32.to_le_bytes());
        payload.extend_from_slice(&strings);
        payload.extend_from_slice(&2u32.to_le_bytes());
        payload.extend_from_slice(&0x0Eu32.to_le_bytes()); // empty string
        payload.extend_from_slice(&0x08u32.to_le_bytes()); // ".dds"

        let compressed = deflate(&payload).unwrap();
        let mut header = RfHeader::new();
        header.num_entries = 2;
        header.entries_block_size = 48;
        header.string_block_offset = (HEADER_SIZE + BLOCK_ALIGNMENT) as u32;
        header.size_compressed = compressed.len() as u32;
        header.size_uncompressed = payload.len() as u32;

        let mut file = Cursor::new(Vec::new());
        file.write_le(&header).unwrap();
        let mut file = file.into_inner();
        file.extend_from_slice(&compressed);

        let archive = RfArchive::parse(&file).expect("archive parses");
        assert_eq!(archive.entries[0].filename, "texture");
        assert_eq!(archive.entries[1].filename, "texture_02.dds");
        assert_eq!(archive.entries[1].pack_offset, 10);

        // Rebuilding writes every name literally
        let rebuilt = RfArchive::parse(&archive.build().unwrap()).unwrap();
        assert_eq!(rebuilt.entries, archive.entries);
    }
}

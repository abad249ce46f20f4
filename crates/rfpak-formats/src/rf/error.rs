//! RF archive error types

use std::path::PathBuf;
use thiserror::Error;

/// RF archive error type
#[derive(Debug, Error)]
pub enum RfError {
    /// Invalid magic bytes
    #[error("invalid RF magic: expected 'RF', got {0:?}")]
    InvalidMagic([u8; 2]),

    /// Header size smaller than the fixed header layout
    #[error("invalid header size: got {got}, minimum {minimum}")]
    InvalidHeaderSize {
        /// Header size found
        got: u32,
        /// Size of the fixed header layout
        minimum: u32,
    },

    /// Input shorter than required
    #[error("data truncated: need {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Header entry count disagrees with the entries block size
    #[error("entry count mismatch: {num_entries} entries but entries block is {block_size} bytes")]
    EntryCountMismatch {
        /// Entry count from the header
        num_entries: u32,
        /// Entries block size from the header
        block_size: u32,
    },

    /// Compressed payload extends past the end of the file
    #[error("compressed payload [{start}, {end}) exceeds file length {file_len}")]
    CompressedSpanOutOfRange {
        /// Payload start offset
        start: u64,
        /// Payload end offset
        end: u64,
        /// File length
        file_len: usize,
    },

    /// A block referenced by the header lies outside the payload
    #[error("{block} block at offset 0x{offset:X} lies outside the payload")]
    BlockOutOfRange {
        /// Block name
        block: &'static str,
        /// Offset of the block as recorded in the file
        offset: u64,
    },

    /// Inflate produced a different number of bytes than announced
    #[error("decompressed size mismatch: expected {expected}, got {actual}")]
    DecompressedSizeMismatch {
        /// Size announced by the container
        expected: usize,
        /// Size produced by inflate
        actual: usize,
    },

    /// zlib stream could not be inflated
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// zlib stream could not be produced
    #[error("compression failed: {0}")]
    Compression(String),

    /// Name offset outside the string section
    #[error("name offset 0x{0:X} outside the string section")]
    NameOffsetOutOfRange(u32),

    /// Back-reference points before the start of the string section
    #[error("back-reference at 0x{offset:X} reaches {distance} bytes back")]
    BackReferenceOutOfRange {
        /// Offset of the reference word
        offset: u32,
        /// Distance encoded in the reference word
        distance: u32,
    },

    /// Extension index outside the extension table
    #[error("extension index {index} outside table of {count} extensions")]
    ExtensionIndexOutOfRange {
        /// Extension index from the name info
        index: u8,
        /// Number of extensions in the table
        count: usize,
    },

    /// Name bytes are not valid UTF-8
    #[error("name at offset 0x{0:X} is not valid UTF-8")]
    NonUtf8Name(u32),

    /// Name contains a byte the string table cannot store
    #[error("filename {0:?} contains a NUL byte")]
    InvalidName(String),

    /// String table grew past the 20-bit offset range
    #[error("string table of {0} bytes exceeds the 20-bit name offset range")]
    StringTableOverflow(usize),

    /// More entries than a u32 count can describe
    #[error("too many entries: {0}")]
    TooManyEntries(usize),

    /// Payload larger than a u32 size field can describe
    #[error("payload of {0} bytes exceeds the 32-bit size fields")]
    PayloadTooLarge(usize),

    /// Error while decoding a particular entry
    #[error("entry {index}: {source}")]
    Entry {
        /// Entry index in the flat sequence
        index: usize,
        /// Underlying error
        #[source]
        source: Box<RfError>,
    },

    /// Failed to read an archive file
    #[error("failed to read {path}: {source}")]
    ReadFile {
        /// Archive path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an archive file
    #[error("failed to write {path}: {source}")]
    WriteFile {
        /// Archive path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for RF archive operations
pub type RfResult<T> = Result<T, RfError>;

//! Patchlist manifest format implementation
//!
//! # Format Structure
//!
//! ```text
//! Patchlist:
//! ├── Header (0x80 bytes, little-endian)
//! │   ├── magic (u32)
//! │   ├── num_files (u32)
//! │   └── reserved (0x78 bytes)
//! └── num_files × 0x80-byte records, each a NUL-padded relative path
//! ```
//!
//! Paths are stored as the caller provides them; the game expects them to
//! start with the logical root (for example `data/`).

mod error;
mod header;

pub use error::{PatchlistError, PatchlistResult};
pub use header::{PATCHLIST_RECORD_SIZE, PATCHLIST_RESERVED, PatchlistHeader};

use binrw::{BinRead, BinWriterExt};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Parsed patchlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patchlist {
    /// Header as read from the file; `num_files` is recomputed on build
    pub header: PatchlistHeader,
    /// Relative paths in record order
    pub files: Vec<String>,
}

impl Patchlist {
    /// Empty patchlist with the given magic
    pub fn new(magic: u32) -> Self {
        Self {
            header: PatchlistHeader::new(magic),
            files: Vec::new(),
        }
    }

    /// Parse a patchlist from its file bytes
    pub fn parse(data: &[u8]) -> PatchlistResult<Self> {
        if data.len() < PATCHLIST_RECORD_SIZE {
            return Err(PatchlistError::Truncated {
                expected: PATCHLIST_RECORD_SIZE,
                actual: data.len(),
            });
        }

        let header = PatchlistHeader::read(&mut Cursor::new(data))?;
        let body = &data[PATCHLIST_RECORD_SIZE..];

        if header.num_files as usize * PATCHLIST_RECORD_SIZE != body.len() {
            return Err(PatchlistError::FileCountMismatch {
                num_files: header.num_files,
                body_len: body.len(),
            });
        }

        let files = body
            .chunks_exact(PATCHLIST_RECORD_SIZE)
            .enumerate()
            .map(|(index, record)| {
                let end = record.iter().position(|&b| b == 0).unwrap_or(record.len());
                String::from_utf8(record[..end].to_vec())
                    .map_err(|_| PatchlistError::InvalidRecord(index))
            })
            .collect::<PatchlistResult<Vec<_>>>()?;

        debug!("Parsed patchlist with {} files", files.len());

        Ok(Self { header, files })
    }

    /// Build the patchlist to bytes
    pub fn build(&self) -> PatchlistResult<Vec<u8>> {
        let mut header = self.header.clone();
        header.num_files = self.files.len() as u32;

        let mut cursor = Cursor::new(Vec::with_capacity(
            (self.files.len() + 1) * PATCHLIST_RECORD_SIZE,
        ));
        cursor.write_le(&header)?;
        let mut output = cursor.into_inner();

        for path in &self.files {
            validate_path(path)?;
            let start = output.len();
            output.extend_from_slice(path.as_bytes());
            output.resize(start + PATCHLIST_RECORD_SIZE, 0);
        }

        Ok(output)
    }

    /// Append a path record
    pub fn append(&mut self, path: impl Into<String>) -> PatchlistResult<()> {
        let path = path.into();
        validate_path(&path)?;
        self.files.push(path);
        Ok(())
    }

    /// Whether a path is already listed
    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f == path)
    }

    /// Read and parse a patchlist file
    pub fn load<P: AsRef<Path>>(path: P) -> PatchlistResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| PatchlistError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&data)
    }

    /// Build the patchlist and write it atomically to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PatchlistResult<()> {
        let path = path.as_ref();
        let data = self.build()?;
        crate::fs::write_atomic(path, &data).map_err(|source| PatchlistError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Wrote {} patchlist records to {}", self.files.len(), path.display());
        Ok(())
    }
}

fn validate_path(path: &str) -> PatchlistResult<()> {
    if path.as_bytes().contains(&0) {
        return Err(PatchlistError::InvalidPath(path.to_string()));
    }
    // One byte is kept for the terminator.
    let max = PATCHLIST_RECORD_SIZE - 1;
    if path.len() > max {
        return Err(PatchlistError::PathTooLong {
            path: path.to_string(),
            len: path.len(),
            max,
        });
    }
    Ok(())
}

impl crate::RfFormat for Patchlist {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        Self::parse(data).map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        self.build()
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
    }
}

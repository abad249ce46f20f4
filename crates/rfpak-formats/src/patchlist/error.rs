//! Patchlist error types

use std::path::PathBuf;
use thiserror::Error;

/// Patchlist error type
#[derive(Debug, Error)]
pub enum PatchlistError {
    /// File shorter than the header
    #[error("patchlist truncated: need {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Header file count disagrees with the record area
    #[error("incorrect file count in header: {num_files} records expected, body is {body_len} bytes")]
    FileCountMismatch {
        /// File count from the header
        num_files: u32,
        /// Size of the record area
        body_len: usize,
    },

    /// Record bytes are not valid UTF-8
    #[error("record {0} is not valid UTF-8")]
    InvalidRecord(usize),

    /// Path does not fit in a record with its terminator
    #[error("path {path:?} is {len} bytes, records hold at most {max}")]
    PathTooLong {
        /// Offending path
        path: String,
        /// Path length in bytes
        len: usize,
        /// Maximum path length
        max: usize,
    },

    /// Path contains a NUL byte
    #[error("path {0:?} contains a NUL byte")]
    InvalidPath(String),

    /// Failed to read a patchlist file
    #[error("failed to read {path}: {source}")]
    ReadFile {
        /// Patchlist path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a patchlist file
    #[error("failed to write {path}: {source}")]
    WriteFile {
        /// Patchlist path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for patchlist operations
pub type PatchlistResult<T> = Result<T, PatchlistError>;

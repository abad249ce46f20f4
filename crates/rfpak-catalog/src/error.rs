//! Error types for catalog, configuration and extraction

use rfpak_formats::rf::RfError;
use std::path::PathBuf;
use thiserror::Error;

/// Catalog error type
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Depth grew by more than one level between consecutive entries
    #[error("entry {index}: depth jumps from {from} to {to}")]
    DepthJump {
        /// Entry index in the flat sequence
        index: usize,
        /// Depth of the previous entry
        from: u8,
        /// Depth of this entry
        to: u8,
    },

    /// Entry with a non-zero depth and no section root above it
    #[error("entry {index} at depth {depth} has no parent")]
    OrphanEntry {
        /// Entry index in the flat sequence
        index: usize,
        /// Depth of the entry
        depth: u8,
    },

    /// Node lies deeper than the flag byte can encode
    #[error("{path:?} lies at depth {depth}, deeper than 255")]
    DepthOverflow {
        /// Node path
        path: String,
        /// Structural depth
        depth: usize,
    },

    /// No node from the resource up to the root is localizable
    #[error("no packing root above {0:?}")]
    NoPackingRoot(String),

    /// Workspace file larger than a u32 size field
    #[error("{path} is {size} bytes, larger than an entry can describe")]
    FileTooLarge {
        /// File path
        path: PathBuf,
        /// File size
        size: u64,
    },

    /// Workspace file name is not valid UTF-8
    #[error("file name of {0} is not valid UTF-8")]
    NonUtf8Name(PathBuf),

    /// Directory walk failed
    #[error("workspace walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Extraction error type
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Shard ended before the resource's byte range
    #[error("shard ends inside [{offset}, {offset} + {expected})")]
    ShortRead {
        /// Start of the range
        offset: u64,
        /// Bytes required
        expected: u64,
    },

    /// Payload bytes could not be decoded
    #[error("decode failed: {0}")]
    Decode(#[from] RfError),

    /// Catalog lookup failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Node path would leave the extraction or shard directory
    #[error("unsafe resource path {path:?}")]
    UnsafePath {
        /// Node path
        path: String,
    },

    /// Failure while extracting one resource
    #[error("{path}: {source}")]
    Resource {
        /// Node path
        path: String,
        /// Underlying error
        #[source]
        source: Box<ExtractError>,
    },

    /// Failed to read a payload shard
    #[error("failed to read {path}: {source}")]
    ReadFile {
        /// Shard path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an extracted file
    #[error("failed to write {path}: {source}")]
    WriteFile {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read {path}: {source}")]
    ReadFile {
        /// Configuration path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the configuration file
    #[error("failed to write {path}: {source}")]
    WriteFile {
        /// Configuration path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A required path is empty
    #[error("{0} must not be empty")]
    MissingPath(&'static str),
}

//! Parsers and builders for RF resource archives
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Format terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! This crate provides symmetric (parser and builder) implementations for the
//! binary files a game's resource pipeline reads and writes.
//!
//! # Supported Formats
//!
//! - **RF**: zlib-wrapped resource catalog with a depth-tagged entry list, a
//!   sectioned string table and an extension table
//! - **Patchlist**: fixed-record manifest of overridden resource paths
//!
//! # Design Principles
//!
//! - **Symmetric Operations**: Both parsing and building supported
//! - **Typed Errors**: Malformed input is a recoverable error, never a panic
//! - **Round-Trip Guarantee**: parse(build(data)) == data for archives this
//!   crate produced

#![warn(missing_docs)]

/// zlib helpers shared by the archive codec and payload extraction
pub mod compression;
/// Atomic file output
pub mod fs;
/// Patchlist manifest format
///
/// A flat list of 0x80-byte path records behind a 0x80-byte header. The game
/// uses it to learn which resources were overridden by an update.
pub mod patchlist;
/// RF resource archive format
///
/// This module provides parsing and building support for the compressed
/// resource catalog: the fixed header, the 24-byte entry records, the name
/// table (literal and back-reference names plus the extension table) and
/// the resource flag bitfield that also carries each entry's depth.
///
/// See the [`rf`] module for the byte layout.
pub mod rf;

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;

/// Common format trait implemented by every format in this crate
pub trait RfFormat: Sized {
    /// Parse from bytes
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>>;

    /// Build to bytes
    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>>;

    /// Verify round-trip correctness
    fn verify_round_trip(data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let parsed = Self::parse(data)?;
        let rebuilt = parsed.build()?;
        if data != rebuilt.as_slice() {
            return Err("Round-trip verification failed".into());
        }
        Ok(())
    }
}

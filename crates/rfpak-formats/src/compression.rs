//! zlib (RFC 1950) compression helpers

use crate::rf::{RfError, RfResult};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};

/// Maximum size a single inflate may produce (1 GiB)
pub const MAX_DECOMPRESSION_SIZE: usize = 1024 * 1024 * 1024;

/// Upper bound on the buffer reserved before inflating
const INITIAL_CAPACITY_LIMIT: usize = 1024 * 1024;

/// Compress data into a single zlib stream
pub fn deflate(data: &[u8]) -> RfResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| RfError::Compression(format!("zlib compression failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| RfError::Compression(format!("zlib compression failed: {e}")))
}

/// Inflate a zlib stream that must produce exactly `expected` bytes
///
/// Output is capped one byte past `expected` so an oversized stream is
/// detected without inflating all of it. Sizes above
/// [`MAX_DECOMPRESSION_SIZE`] are rejected before any work is done.
pub fn inflate_exact(data: &[u8], expected: usize) -> RfResult<Vec<u8>> {
    if expected > MAX_DECOMPRESSION_SIZE {
        return Err(RfError::Decompression(format!(
            "decompressed size {expected} exceeds limit of {MAX_DECOMPRESSION_SIZE} bytes"
        )));
    }

    let decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::with_capacity(expected.min(INITIAL_CAPACITY_LIMIT));

    decoder
        .take(expected as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(|e| RfError::Decompression(format!("zlib decompression failed: {e}")))?;

    if decompressed.len() != expected {
        return Err(RfError::DecompressedSizeMismatch {
            expected,
            actual: decompressed.len(),
        });
    }

    Ok(decompressed)
}

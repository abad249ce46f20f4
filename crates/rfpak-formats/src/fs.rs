//! Atomic file output
//!
//! Files are written to a temporary file in the destination directory and
//! renamed over the target once fully written, so an interrupted write
//! never leaves a truncated file behind under the final name.

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `data` to `path`, replacing it atomically
pub fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

//! Resource extraction from payload shards
//!
//! A file node's bytes live in the shard of its packing root at
//! `[pack_offset, pack_offset + size_compressed)`. Entries whose stored and
//! decoded sizes match are raw: a 0x80-byte sub-header precedes the data.
//! Every other entry is a zlib stream inflating to exactly
//! `size_uncompressed` bytes.

use crate::catalog::{Catalog, NodeId};
use crate::config::ProjectConfig;
use crate::error::{ExtractError, ExtractResult};
use rfpak_formats::compression::inflate_exact;
use rfpak_formats::rf::ResourceEntry;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Size of the sub-header in front of raw payloads
pub const RAW_HEADER_SIZE: u64 = 0x80;

/// Outcome of an extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Files written
    pub extracted: Vec<PathBuf>,
    /// Node paths skipped because their shard does not exist
    pub skipped: Vec<String>,
}

enum Outcome {
    Extracted(PathBuf),
    Skipped(String),
}

/// Decode one resource from a shard
pub fn decode_resource<R: Read + Seek>(entry: &ResourceEntry, shard: &mut R) -> ExtractResult<Vec<u8>> {
    let offset = u64::from(entry.pack_offset);

    if entry.is_raw() {
        let start = offset + RAW_HEADER_SIZE;
        let data = read_span(shard, start, u64::from(entry.size_uncompressed))?;
        return Ok(data);
    }

    let stored = read_span(shard, offset, u64::from(entry.size_compressed))?;
    Ok(inflate_exact(&stored, entry.size_uncompressed as usize)?)
}

fn read_span<R: Read + Seek>(shard: &mut R, offset: u64, len: u64) -> ExtractResult<Vec<u8>> {
    shard.seek(SeekFrom::Start(offset))?;

    let mut data = Vec::new();
    shard.by_ref().take(len).read_to_end(&mut data)?;
    if data.len() as u64 != len {
        return Err(ExtractError::ShortRead {
            offset,
            expected: len,
        });
    }
    Ok(data)
}

/// Reject node paths that are absolute or climb with `..`
fn ensure_relative(path: &str) -> ExtractResult<()> {
    if Path::new(path)
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        Ok(())
    } else {
        Err(ExtractError::UnsafePath {
            path: path.to_string(),
        })
    }
}

/// Extract `node` below the configured extraction path
///
/// Directories and entry-less nodes are walked and every file below them is
/// extracted. Shards are looked up in the update content, then in the game
/// content. A file whose shard exists in neither is skipped with a warning.
/// A node path that is absolute or contains `..` fails with
/// [`ExtractError::UnsafePath`] before anything is read or written.
pub fn extract(catalog: &Catalog, node: NodeId, config: &ProjectConfig) -> ExtractResult<ExtractReport> {
    let files: Vec<NodeId> = catalog
        .preorder(node)
        .into_iter()
        .map(|(id, _)| id)
        .filter(|&id| catalog[id].is_file())
        .collect();

    debug!("Extracting {} file(s) below {:?}", files.len(), catalog[node].path());

    #[cfg(feature = "parallel")]
    let outcomes: Vec<ExtractResult<Outcome>> = files
        .par_iter()
        .map(|&id| extract_file(catalog, id, config))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<ExtractResult<Outcome>> = files
        .iter()
        .map(|&id| extract_file(catalog, id, config))
        .collect();

    let mut report = ExtractReport::default();
    for outcome in outcomes {
        match outcome? {
            Outcome::Extracted(path) => report.extracted.push(path),
            Outcome::Skipped(path) => report.skipped.push(path),
        }
    }

    info!(
        "Extracted {} file(s), skipped {}",
        report.extracted.len(),
        report.skipped.len()
    );
    Ok(report)
}

fn extract_file(catalog: &Catalog, id: NodeId, config: &ProjectConfig) -> ExtractResult<Outcome> {
    let node = &catalog[id];
    let wrap = |source: ExtractError| ExtractError::Resource {
        path: node.path().to_string(),
        source: Box::new(source),
    };

    let Some(entry) = node.entry() else {
        return Ok(Outcome::Skipped(node.path().to_string()));
    };

    ensure_relative(node.path())?;

    let packing_root = catalog.packing_root(id).map_err(|e| wrap(e.into()))?;
    let packing_root_path = catalog[packing_root].path();
    let Some(shard_path) = config.locate_shard(packing_root_path) else {
        warn!(
            "{} does not exist; skipping {}",
            config.payload_shard_path(packing_root_path).display(),
            node.path()
        );
        return Ok(Outcome::Skipped(node.path().to_string()));
    };

    let file = File::open(&shard_path).map_err(|source| ExtractError::ReadFile {
        path: shard_path.clone(),
        source,
    })?;
    let data = decode_resource(entry, &mut BufReader::new(file)).map_err(wrap)?;

    let destination = config.extract_destination(node.path());
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ExtractError::WriteFile {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    rfpak_formats::fs::write_atomic(&destination, &data).map_err(|source| {
        ExtractError::WriteFile {
            path: destination.clone(),
            source,
        }
    })?;

    debug!("Extracted {}", destination.display());
    Ok(Outcome::Extracted(destination))
}

//! Rebuild an archive and patchlist with a workspace's overrides applied

use crate::catalog::{Catalog, MergeReport};
use crate::config::{DATA_ROOT, ProjectConfig};
use crate::error::CatalogError;
use rfpak_formats::patchlist::{Patchlist, PatchlistError};
use rfpak_formats::rf::{RfArchive, RfError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Export error type
#[derive(Debug, Error)]
pub enum ExportError {
    /// Archive could not be read or written
    #[error("archive: {0}")]
    Archive(#[from] RfError),

    /// Patchlist could not be read or written
    #[error("patchlist: {0}")]
    Patchlist(#[from] PatchlistError),

    /// Catalog could not be built or flattened
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Output directory could not be created
    #[error("failed to create {path}: {source}")]
    CreateDir {
        /// Directory path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for export
pub type ExportResult<T> = Result<T, ExportError>;

/// Outcome of [`export`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Result of merging the workspace into the archive catalog
    pub merge: MergeReport,
    /// Paths appended to the patchlist
    pub added_paths: Vec<String>,
    /// Entries written to the rebuilt archive
    pub entry_count: usize,
    /// Rebuilt archive
    pub archive_path: PathBuf,
    /// Updated patchlist
    pub patchlist_path: PathBuf,
}

/// Apply the workspace overrides to `archive_name` and write the results
///
/// Reads the archive and patchlist from the update content, merges the
/// workspace catalog into the archive catalog, appends every workspace file
/// not yet listed to the patchlist and writes both files to the mod content
/// directory. The archive keeps its version and timestamp.
pub fn export(config: &ProjectConfig, archive_name: &str) -> ExportResult<ExportReport> {
    let archive = RfArchive::load(config.resource_archive_path(archive_name))?;
    let mut catalog = Catalog::from_entries(&archive.entries)?;
    let overrides = Catalog::from_workspace(&config.mod_workspace_path)?;

    let merge = catalog.merge(&overrides);

    let mut patchlist = Patchlist::load(config.patchlist_path())?;
    let prefix = format!("{DATA_ROOT}/");
    let mut added_paths = Vec::new();
    for path in overrides.patchlist_paths(&prefix) {
        if !patchlist.contains(&path) {
            patchlist.append(path.clone())?;
            added_paths.push(path);
        }
    }

    std::fs::create_dir_all(&config.mod_content_path).map_err(|source| ExportError::CreateDir {
        path: config.mod_content_path.clone(),
        source,
    })?;

    let patchlist_path = config.output_patchlist_path();
    patchlist.save(&patchlist_path)?;

    let rebuilt = RfArchive {
        header: archive.header,
        entries: catalog.flatten()?,
    };
    let archive_path = config.output_archive_path(archive_name);
    rebuilt.save(&archive_path)?;

    info!(
        "Exported {} entries, {} new patchlist path(s)",
        rebuilt.entries.len(),
        added_paths.len()
    );

    Ok(ExportReport {
        merge,
        added_paths,
        entry_count: rebuilt.entries.len(),
        archive_path,
        patchlist_path,
    })
}

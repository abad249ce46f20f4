//! Override catalog built from a loose-file workspace directory

use crate::catalog::{Catalog, NodeId};
use crate::error::{CatalogError, CatalogResult};
use rfpak_formats::rf::{ResourceEntry, ResourceFlags};
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Top-level directory whose contents line up with an archive's section root
const SECTION_DIR: &str = "data";

impl Catalog {
    /// Build an override catalog from the files below `dir`
    ///
    /// Files become raw entries flagged override and no-localization whose
    /// sizes equal the file length. Directories become entries named
    /// `"<name>/"`, except a top-level `data` which is named `""` so it
    /// pairs with an archive's section root during [`merge`](Self::merge).
    /// Top-level items sit at depth 0. Siblings are ordered by file name.
    pub fn from_workspace<P: AsRef<Path>>(dir: P) -> CatalogResult<Self> {
        let dir = dir.as_ref();
        let mut catalog = Self::new();
        let mut parents: Vec<NodeId> = vec![catalog.root()];

        for item in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
            let item = item?;
            let level = item.depth();
            parents.truncate(level);
            let Some(&parent) = parents.last() else {
                continue;
            };

            let depth = u8::try_from(level - 1).map_err(|_| CatalogError::DepthOverflow {
                path: item.path().display().to_string(),
                depth: level - 1,
            })?;
            let name = item
                .file_name()
                .to_str()
                .ok_or_else(|| CatalogError::NonUtf8Name(item.path().to_path_buf()))?;

            if item.file_type().is_dir() {
                let name = if level == 1 && name == SECTION_DIR {
                    String::new()
                } else {
                    format!("{name}/")
                };
                let id = catalog.add_child(parent, ResourceEntry::directory(name, depth));
                parents.push(id);
            } else if item.file_type().is_file() {
                let size = item.metadata()?.len();
                let size = u32::try_from(size).map_err(|_| CatalogError::FileTooLarge {
                    path: item.path().to_path_buf(),
                    size,
                })?;
                let flags = ResourceFlags::new(ResourceFlags::OVERRIDE | ResourceFlags::NO_LOCALIZATION)
                    .with_depth(depth);
                catalog.add_child(parent, ResourceEntry::file(name, size, flags));
            } else {
                debug!("Skipping {}: not a regular file", item.path().display());
            }
        }

        info!(
            "Scanned workspace {}: {} entries",
            dir.display(),
            catalog.entry_count()
        );
        Ok(catalog)
    }
}

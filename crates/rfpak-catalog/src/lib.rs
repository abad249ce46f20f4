//! Hierarchical resource catalog for RF archives
//!
#![allow(clippy::cast_possible_truncation)] // Sizes come from u32 fields
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
//! The flat, depth-tagged entry list of an archive is rebuilt into a tree,
//! merged with an override tree scanned from a workspace directory and
//! flattened back for re-encoding. Individual resources are extracted from
//! their payload shards.
//!
//! # Example
//!
//! ```rust
//! use rfpak_catalog::Catalog;
//! use rfpak_formats::rf::{ResourceEntry, ResourceFlags};
//!
//! let entries = vec![
//!     ResourceEntry::directory("", 0),
//!     ResourceEntry::directory("data/", 1),
//!     ResourceEntry::file("a.txt", 3, ResourceFlags::new(2)),
//! ];
//!
//! let catalog = Catalog::from_entries(&entries)?;
//! assert!(catalog.find_by_path("data/a.txt").is_some());
//! assert_eq!(catalog.flatten()?, entries);
//! # Ok::<(), rfpak_catalog::CatalogError>(())
//! ```

#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
mod workspace;

pub use catalog::{Catalog, CatalogNode, MergeReport, NodeId};
pub use config::{DATA_ROOT, DEFAULT_ARCHIVE, PATCHLIST_FILE, ProjectConfig};
pub use error::{CatalogError, CatalogResult, ConfigError, ExtractError, ExtractResult};
pub use export::{ExportError, ExportReport, ExportResult, export};
pub use extract::{ExtractReport, decode_resource, extract};

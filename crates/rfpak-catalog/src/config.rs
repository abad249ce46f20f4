//! Project configuration
//!
//! The configuration file is TOML with upper-case keys:
//!
//! ```toml
//! GAME_CONTENT_PATH = "/games/title/content/"
//! UPDATE_CONTENT_PATH = "/games/title/update/"
//! MOD_WORKSPACE_PATH = "./workspace/"
//! MOD_CONTENT_PATH = "./out/"
//! EXTRACT_PATH = "./extracted/"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default name of the resource archive
pub const DEFAULT_ARCHIVE: &str = "resource(us_en)";

/// Name of the patchlist file next to the archive
pub const PATCHLIST_FILE: &str = "patchlist";

/// Logical root prepended to patchlist paths and extraction targets
pub const DATA_ROOT: &str = "data";

/// Suffix of payload shard file names
const SHARD_SUFFIX: &str = "packed";

/// Paths a pipeline run reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Installed game content, searched for payload shards the update
    /// content does not carry
    #[serde(rename = "GAME_CONTENT_PATH")]
    pub game_content_path: PathBuf,

    /// Update content holding the archive, patchlist and payload shards
    #[serde(rename = "UPDATE_CONTENT_PATH")]
    pub update_content_path: PathBuf,

    /// Loose-file override workspace
    #[serde(rename = "MOD_WORKSPACE_PATH")]
    pub mod_workspace_path: PathBuf,

    /// Output directory for the rebuilt archive and patchlist
    #[serde(rename = "MOD_CONTENT_PATH")]
    pub mod_content_path: PathBuf,

    /// Output directory for extracted resources
    #[serde(rename = "EXTRACT_PATH")]
    pub extract_path: PathBuf,
}

impl ProjectConfig {
    /// Configuration with every path under `base`
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        Self {
            game_content_path: base.join("game"),
            update_content_path: base.join("update"),
            mod_workspace_path: base.join("workspace"),
            mod_content_path: base.join("mod"),
            extract_path: base.join("extract"),
        }
    }

    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as TOML
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        rfpak_formats::fs::write_atomic(path, content.as_bytes()).map_err(|source| {
            ConfigError::WriteFile {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Check that no path is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("GAME_CONTENT_PATH", &self.game_content_path),
            ("UPDATE_CONTENT_PATH", &self.update_content_path),
            ("MOD_WORKSPACE_PATH", &self.mod_workspace_path),
            ("MOD_CONTENT_PATH", &self.mod_content_path),
            ("EXTRACT_PATH", &self.extract_path),
        ];

        for (key, value) in fields {
            if value.as_os_str().is_empty() {
                return Err(ConfigError::MissingPath(key));
            }
        }
        Ok(())
    }

    /// Set the update content path
    #[must_use]
    pub fn with_update_content_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.update_content_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the workspace path
    #[must_use]
    pub fn with_mod_workspace_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.mod_workspace_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the output path
    #[must_use]
    pub fn with_mod_content_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.mod_content_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the extraction path
    #[must_use]
    pub fn with_extract_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.extract_path = path.as_ref().to_path_buf();
        self
    }

    /// Archive to read, inside the update content
    pub fn resource_archive_path(&self, name: &str) -> PathBuf {
        self.update_content_path.join(name)
    }

    /// Patchlist to read, inside the update content
    pub fn patchlist_path(&self) -> PathBuf {
        self.update_content_path.join(PATCHLIST_FILE)
    }

    /// Archive to write, inside the mod content
    pub fn output_archive_path(&self, name: &str) -> PathBuf {
        self.mod_content_path.join(name)
    }

    /// Patchlist to write, inside the mod content
    pub fn output_patchlist_path(&self) -> PathBuf {
        self.mod_content_path.join(PATCHLIST_FILE)
    }

    /// Shard holding the payloads of a packing root
    ///
    /// The file name is the packing root's catalog path followed by
    /// `packed`, e.g. `ui/packed`, or plain `packed` for a section root.
    pub fn payload_shard_path(&self, packing_root_path: &str) -> PathBuf {
        self.update_content_path
            .join(DATA_ROOT)
            .join(format!("{packing_root_path}{SHARD_SUFFIX}"))
    }

    /// Same shard inside the installed game content
    pub fn base_shard_path(&self, packing_root_path: &str) -> PathBuf {
        self.game_content_path
            .join(DATA_ROOT)
            .join(format!("{packing_root_path}{SHARD_SUFFIX}"))
    }

    /// First existing shard for a packing root, update content first
    pub fn locate_shard(&self, packing_root_path: &str) -> Option<PathBuf> {
        [
            self.payload_shard_path(packing_root_path),
            self.base_shard_path(packing_root_path),
        ]
        .into_iter()
        .find(|path| path.is_file())
    }

    /// Where an extracted resource is written
    pub fn extract_destination(&self, node_path: &str) -> PathBuf {
        self.extract_path.join(DATA_ROOT).join(node_path)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
GAME_CONTENT_PATH = "/game/"
UPDATE_CONTENT_PATH = "/update/"
MOD_WORKSPACE_PATH = "/work/"
MOD_CONTENT_PATH = "/mod/"
EXTRACT_PATH = "/out/"
"#;

    #[test]
    fn test_parse_upper_case_keys() {
        let config = ProjectConfig::from_toml(SAMPLE).unwrap();

        assert_eq!(config.update_content_path, PathBuf::from("/update/"));
        assert_eq!(
            config.resource_archive_path(DEFAULT_ARCHIVE),
            PathBuf::from("/update/resource(us_en)")
        );
        assert_eq!(config.patchlist_path(), PathBuf::from("/update/patchlist"));
        assert_eq!(config.output_patchlist_path(), PathBuf::from("/mod/patchlist"));
        assert_eq!(
            config.payload_shard_path(""),
            PathBuf::from("/update/data/packed")
        );
        assert_eq!(
            config.payload_shard_path("ui/"),
            PathBuf::from("/update/data/ui/packed")
        );
        assert_eq!(
            config.base_shard_path("ui/"),
            PathBuf::from("/game/data/ui/packed")
        );
        assert_eq!(
            config.extract_destination("ui/icon.dds"),
            PathBuf::from("/out/data/ui/icon.dds")
        );
    }

    #[test]
    fn test_missing_key() {
        let content = SAMPLE.replace("EXTRACT_PATH = \"/out/\"\n", "");
        assert!(matches!(
            ProjectConfig::from_toml(&content),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_path_rejected() {
        let content = SAMPLE.replace("\"/work/\"", "\"\"");
        assert!(matches!(
            ProjectConfig::from_toml(&content),
            Err(ConfigError::MissingPath("MOD_WORKSPACE_PATH"))
        ));
    }

    #[test]
    fn test_locate_shard_prefers_update() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig::new(dir.path());
        assert_eq!(config.locate_shard(""), None);

        std::fs::create_dir_all(config.game_content_path.join("data")).unwrap();
        std::fs::write(config.base_shard_path(""), b"base").unwrap();
        assert_eq!(config.locate_shard(""), Some(config.base_shard_path("")));

        std::fs::create_dir_all(config.update_content_path.join("data")).unwrap();
        std::fs::write(config.payload_shard_path(""), b"update").unwrap();
        assert_eq!(config.locate_shard(""), Some(config.payload_shard_path("")));
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.toml");
        let config = ProjectConfig::new(dir.path()).with_extract_path("/elsewhere");

        config.save(&path).unwrap();
        assert_eq!(ProjectConfig::load(&path).unwrap(), config);
        assert!(matches!(
            ProjectConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::ReadFile { .. })
        ));
    }
}

//! End-to-end tests: archive on disk, workspace overrides, export and
//! extraction

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use rfpak_catalog::{Catalog, DEFAULT_ARCHIVE, ExtractError, ProjectConfig, export, extract};
use rfpak_formats::compression::deflate;
use rfpak_formats::patchlist::Patchlist;
use rfpak_formats::rf::{ResourceEntry, ResourceFlags, RfArchive};
use std::fs;
use std::path::Path;

const PLAIN: &[u8] = b"plain text stored raw";

fn compressed_body() -> Vec<u8> {
    b"compressed body, compressed body, compressed body".repeat(4)
}

/// Archive entries plus the shard bytes of the section root
fn fixture() -> (Vec<ResourceEntry>, Vec<u8>) {
    let packed = deflate(&compressed_body()).unwrap();
    let no_loc = ResourceFlags::PACKED | ResourceFlags::NO_LOCALIZATION;

    let mut shard = vec![0u8; 0x40];
    let raw_offset = shard.len() as u32;
    shard.extend_from_slice(&[0xAB; 0x80]);
    shard.extend_from_slice(PLAIN);
    let packed_offset = shard.len() as u32;
    shard.extend_from_slice(&packed);

    let entries = vec![
        ResourceEntry::directory("", 0),
        ResourceEntry {
            flags: ResourceFlags::new(ResourceFlags::DIRECTORY | ResourceFlags::NO_LOCALIZATION | 1),
            ..ResourceEntry::directory("data/", 1)
        },
        ResourceEntry {
            pack_offset: raw_offset,
            timestamp: 11,
            ..ResourceEntry::file("a.txt", PLAIN.len() as u32, ResourceFlags::new(no_loc | 2))
        },
        ResourceEntry {
            pack_offset: packed_offset,
            filename: "b.txt".to_string(),
            size_compressed: packed.len() as u32,
            size_uncompressed: compressed_body().len() as u32,
            timestamp: 12,
            flags: ResourceFlags::new(no_loc | ResourceFlags::UNKNOWN_8000 | 2),
        },
        ResourceEntry::directory("other/", 1),
        ResourceEntry {
            pack_offset: 0,
            ..ResourceEntry::file("c.txt", 4, ResourceFlags::new(no_loc | 2))
        },
    ];

    (entries, shard)
}

fn setup(root: &Path) -> (ProjectConfig, Vec<ResourceEntry>) {
    let config = ProjectConfig::new(root);
    let (entries, shard) = fixture();

    fs::create_dir_all(config.update_content_path.join("data")).unwrap();
    RfArchive::new(entries.clone())
        .save(config.resource_archive_path(DEFAULT_ARCHIVE))
        .unwrap();
    fs::write(config.payload_shard_path(""), shard).unwrap();

    let mut patchlist = Patchlist::new(0x4C50);
    patchlist.append("data/data/b.txt").unwrap();
    patchlist.save(config.patchlist_path()).unwrap();

    let workspace = config.mod_workspace_path.join("data").join("data");
    fs::create_dir_all(&workspace).unwrap();
    fs::write(workspace.join("a.txt"), b"modded").unwrap();
    fs::write(workspace.join("b.txt"), b"also modded").unwrap();
    fs::write(workspace.join("new.txt"), b"brand new").unwrap();

    (config, entries)
}

#[test]
fn reconstruct_and_flatten_through_archive_bytes() {
    let (entries, _) = fixture();
    let bytes = RfArchive::new(entries.clone()).build().unwrap();

    let archive = RfArchive::parse(&bytes).unwrap();
    let catalog = Catalog::from_entries(&archive.entries).unwrap();
    let flattened = catalog.flatten().unwrap();

    assert_eq!(flattened, entries);
    assert_eq!(RfArchive::new(flattened).build().unwrap(), bytes);
}

#[test]
fn export_applies_workspace_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let (config, entries) = setup(dir.path());

    let report = export(&config, DEFAULT_ARCHIVE).unwrap();

    assert_eq!(
        report.merge.replaced,
        vec!["data/a.txt".to_string(), "data/b.txt".to_string()]
    );
    assert_eq!(report.merge.unmaterialized, vec!["data/new.txt".to_string()]);
    assert_eq!(
        report.added_paths,
        vec!["data/data/a.txt".to_string(), "data/data/new.txt".to_string()]
    );
    assert_eq!(report.entry_count, entries.len());

    let rebuilt = RfArchive::load(&report.archive_path).unwrap();
    assert_eq!(rebuilt.entries.len(), entries.len());
    let a = &rebuilt.entries[2];
    assert_eq!(a.filename, "a.txt");
    assert_eq!(a.size_uncompressed, 6);
    assert!(a.flags.is_override());
    assert_eq!(a.depth(), 2);
    assert_eq!(rebuilt.entries[5], entries[5]);

    let patchlist = Patchlist::load(&report.patchlist_path).unwrap();
    assert_eq!(patchlist.header.magic, 0x4C50);
    assert_eq!(
        patchlist.files,
        vec![
            "data/data/b.txt".to_string(),
            "data/data/a.txt".to_string(),
            "data/data/new.txt".to_string(),
        ]
    );
}

#[test]
fn export_missing_archive_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = ProjectConfig::new(dir.path());
    assert!(matches!(
        export(&config, DEFAULT_ARCHIVE),
        Err(rfpak_catalog::ExportError::Archive(_))
    ));
    assert!(!config.output_archive_path(DEFAULT_ARCHIVE).exists());
}

#[test]
fn extract_directory_decodes_both_modes() {
    let dir = tempfile::tempdir().unwrap();
    let (config, _) = setup(dir.path());

    let archive = RfArchive::load(config.resource_archive_path(DEFAULT_ARCHIVE)).unwrap();
    let catalog = Catalog::from_entries(&archive.entries).unwrap();

    let data = catalog.find_by_path("data/").unwrap();
    let report = extract(&catalog, data, &config).unwrap();

    assert_eq!(report.extracted.len(), 2);
    assert!(report.skipped.is_empty());
    assert_eq!(fs::read(config.extract_destination("data/a.txt")).unwrap(), PLAIN);
    assert_eq!(
        fs::read(config.extract_destination("data/b.txt")).unwrap(),
        compressed_body()
    );
}

#[test]
fn extract_skips_missing_shard() {
    let dir = tempfile::tempdir().unwrap();
    let (config, _) = setup(dir.path());

    let archive = RfArchive::load(config.resource_archive_path(DEFAULT_ARCHIVE)).unwrap();
    let catalog = Catalog::from_entries(&archive.entries).unwrap();

    // other/ is localizable, so c.txt lives in the missing other/packed shard
    let report = extract(&catalog, catalog.root(), &config).unwrap();

    assert_eq!(report.extracted.len(), 2);
    assert_eq!(report.skipped, vec!["other/c.txt".to_string()]);
    assert!(!config.extract_destination("other/c.txt").exists());
}

/// Single raw file under a no-localization section root
fn lone_file_catalog(config: &ProjectConfig, filename: &str) -> Catalog {
    let mut shard = vec![0u8; 0x80];
    shard.extend_from_slice(b"pwned");
    fs::create_dir_all(config.update_content_path.join("data")).unwrap();
    fs::write(config.payload_shard_path(""), shard).unwrap();

    let entries = vec![
        ResourceEntry::directory("", 0),
        ResourceEntry::file(filename, 5, ResourceFlags::new(ResourceFlags::NO_LOCALIZATION | 1)),
    ];
    Catalog::from_entries(&entries).unwrap()
}

#[test]
fn extract_rejects_paths_leaving_extract_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = ProjectConfig::new(dir.path());

    let absolute = dir.path().join("outside.txt");
    let absolute = absolute.to_str().unwrap();
    for name in [absolute, "../../escaped.txt"] {
        let catalog = lone_file_catalog(&config, name);
        let result = extract(&catalog, catalog.root(), &config);
        assert!(
            matches!(&result, Err(ExtractError::UnsafePath { path }) if path == name),
            "{name}: {result:?}"
        );
    }

    assert!(!dir.path().join("outside.txt").exists());
    assert!(!dir.path().join("escaped.txt").exists());
}

#[test]
fn extract_falls_back_to_game_content_shard() {
    let dir = tempfile::tempdir().unwrap();
    let (config, _) = setup(dir.path());

    let archive = RfArchive::load(config.resource_archive_path(DEFAULT_ARCHIVE)).unwrap();
    let catalog = Catalog::from_entries(&archive.entries).unwrap();

    // only the installed game carries the other/ shard
    let mut shard = vec![0u8; 0x80];
    shard.extend_from_slice(b"base");
    fs::create_dir_all(config.game_content_path.join("data/other")).unwrap();
    fs::write(config.base_shard_path("other/"), shard).unwrap();

    let other = catalog.find_by_path("other/").unwrap();
    let report = extract(&catalog, other, &config).unwrap();

    assert!(report.skipped.is_empty());
    assert_eq!(fs::read(config.extract_destination("other/c.txt")).unwrap(), b"base");
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_extract_decodes_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let (config, _) = setup(dir.path());

    let archive = RfArchive::load(config.resource_archive_path(DEFAULT_ARCHIVE)).unwrap();
    let catalog = Catalog::from_entries(&archive.entries).unwrap();

    let report = extract(&catalog, catalog.root(), &config).unwrap();

    let mut extracted = report.extracted.clone();
    extracted.sort();
    assert_eq!(
        extracted,
        vec![
            config.extract_destination("data/a.txt"),
            config.extract_destination("data/b.txt"),
        ]
    );
    assert_eq!(report.skipped, vec!["other/c.txt".to_string()]);
    assert_eq!(fs::read(config.extract_destination("data/a.txt")).unwrap(), PLAIN);
    assert_eq!(
        fs::read(config.extract_destination("data/b.txt")).unwrap(),
        compressed_body()
    );
}

//! Subcommand handlers

use anyhow::{Context, Result, bail};
use rfpak_catalog::{Catalog, ProjectConfig};
use rfpak_formats::rf::RfArchive;
use std::path::Path;
use tracing::warn;

fn load_archive(path: &Path) -> Result<RfArchive> {
    RfArchive::load(path).with_context(|| format!("cannot load archive {}", path.display()))
}

fn load_config(path: &Path) -> Result<ProjectConfig> {
    ProjectConfig::load(path).with_context(|| format!("cannot load configuration {}", path.display()))
}

pub fn info(path: &Path) -> Result<()> {
    let archive = load_archive(path)?;
    let header = &archive.header;

    let directories = archive.entries.iter().filter(|e| e.is_directory()).count();
    let sections = archive.entries.iter().filter(|e| e.depth() == 0).count();

    println!("Archive:            {}", path.display());
    println!("Version:            {}", header.version);
    println!("Timestamp:          {}", header.timestamp);
    println!("Header size:        0x{:X}", header.header_size);
    println!(
        "Payload:            {} bytes compressed, {} bytes uncompressed",
        header.size_compressed, header.size_uncompressed
    );
    println!(
        "Entries block:      offset 0x{:X}, {} bytes",
        header.entries_block_offset, header.entries_block_size
    );
    println!(
        "String block:       offset 0x{:X}, {} bytes",
        header.string_block_offset, header.string_block_size
    );
    println!("Entries:            {}", header.num_entries);
    println!("Directories:        {directories}");
    println!("Files:              {}", archive.entries.len() - directories);
    println!("Section roots:      {sections}");
    Ok(())
}

pub fn tree(path: &Path) -> Result<()> {
    let archive = load_archive(path)?;
    let catalog = Catalog::from_entries(&archive.entries)
        .with_context(|| format!("cannot rebuild catalog of {}", path.display()))?;
    print!("{}", catalog.render_tree());
    Ok(())
}

pub fn extract(config_path: &Path, archive_name: &str, node_path: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let archive = load_archive(&config.resource_archive_path(archive_name))?;
    let catalog = Catalog::from_entries(&archive.entries).context("cannot rebuild catalog")?;

    let Some(node) = catalog.find_by_path(node_path) else {
        bail!("no resource at {node_path:?}");
    };

    let report = rfpak_catalog::extract(&catalog, node, &config)
        .with_context(|| format!("cannot extract {node_path:?}"))?;

    for path in &report.extracted {
        println!("{}", path.display());
    }
    println!(
        "Extracted {} file(s), skipped {}",
        report.extracted.len(),
        report.skipped.len()
    );
    Ok(())
}

pub fn export(config_path: &Path, archive_name: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let report = rfpak_catalog::export(&config, archive_name).context("export failed")?;

    for path in &report.merge.unmaterialized {
        warn!("Not in the archive, only listed in the patchlist: {path}");
    }
    println!(
        "Replaced {} resource(s), added {} patchlist path(s)",
        report.merge.replaced.len(),
        report.added_paths.len()
    );
    println!(
        "Wrote {} ({} entries)",
        report.archive_path.display(),
        report.entry_count
    );
    println!("Wrote {}", report.patchlist_path.display());
    Ok(())
}

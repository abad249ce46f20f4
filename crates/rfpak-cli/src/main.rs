//! `rfpak` command-line tool
//!
//! Inspects RF resource archives, extracts resources from their payload
//! shards and rebuilds an archive with a workspace's overrides applied.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rfpak_catalog::DEFAULT_ARCHIVE;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rfpak",
    about = "Inspect, extract and rebuild RF resource archives",
    version,
    author
)]
struct Cli {
    /// Set the logging level (RUST_LOG takes precedence)
    #[arg(short, long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Path to the project configuration file
    #[arg(
        short,
        long,
        env = "RFPAK_CONFIG",
        default_value = "project.toml",
        global = true
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print an archive's header and entry counts
    Info {
        /// Archive file
        archive: PathBuf,
    },

    /// Print an archive's resource tree
    Tree {
        /// Archive file
        archive: PathBuf,
    },

    /// Extract a resource, or everything below a directory
    Extract {
        /// Catalog path of the node, e.g. `ui/icon.dds` (empty for everything)
        #[arg(default_value = "")]
        path: String,

        /// Archive name inside UPDATE_CONTENT_PATH
        #[arg(short, long, default_value = DEFAULT_ARCHIVE)]
        archive: String,
    },

    /// Merge the workspace into the archive and write archive and patchlist
    Export {
        /// Archive name inside UPDATE_CONTENT_PATH
        #[arg(short, long, default_value = DEFAULT_ARCHIVE)]
        archive: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info { archive } => commands::info(&archive),
        Commands::Tree { archive } => commands::tree(&archive),
        Commands::Extract { path, archive } => commands::extract(&cli.config, &archive, &path),
        Commands::Export { archive } => commands::export(&cli.config, &archive),
    }
}

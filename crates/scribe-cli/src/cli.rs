//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Scribe extension installer - Install and inspect extension packages
#[derive(Parser, Debug)]
#[command(name = "scribe-ext")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Extensions directory (defaults to the per-user data directory)
    #[arg(long, global = true, env = "SCRIBE_EXTENSIONS_ROOT")]
    pub root: Option<PathBuf>,

    /// Settings file (defaults to the per-user config directory)
    #[arg(long, global = true, env = "SCRIBE_SETTINGS")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show what an extension package contains
    ///
    /// Streams the manifest out of the archive and reports whether
    /// installing it would update an existing installation. Nothing is
    /// installed or unpacked.
    Info {
        /// Path to the extension package (.tar.gz)
        archive: PathBuf,
    },

    /// Install or update an extension package
    ///
    /// Reads the package manifest, shows what would be installed, and asks
    /// for confirmation. An already-installed extension with the same
    /// identifier is replaced wholesale.
    ///
    /// Examples:
    ///   scribe-ext install demo-ext.tar.gz
    ///   scribe-ext install demo-ext.tar.gz --yes
    ///   scribe-ext --root /tmp/ext install demo-ext.tar.gz -y
    Install {
        /// Path to the extension package (.tar.gz)
        archive: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List installed extensions
    List,
}

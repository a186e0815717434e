//! Scribe extension installer CLI
//!
//! The command-line interface for installing extension packages into a
//! per-user extensions directory.

mod cli;
mod commands;
mod error;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use scribe_extensions::{MemorySettings, Settings, TomlSettings};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Info { archive }) => {
            let root = resolve_root(cli.root)?;
            let settings = load_settings(cli.config)?;
            commands::run_info(&root, settings, &archive)
        }
        Some(Commands::Install { archive, yes }) => {
            let root = resolve_root(cli.root)?;
            let settings = load_settings(cli.config)?;
            commands::run_install(&root, settings, &archive, yes)
        }
        Some(Commands::List) => {
            let root = resolve_root(cli.root)?;
            commands::run_list(&root)
        }
        None => {
            // No command provided - show help hint
            println!("{} Scribe extension installer", "scribe-ext".green().bold());
            println!();
            println!("Run {} for available commands.", "scribe-ext --help".cyan());
            Ok(())
        }
    }
}

/// Extensions root: the `--root` flag, or `<data dir>/scribe/extensions`.
fn resolve_root(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = flag {
        return Ok(root);
    }
    let data = dirs::data_dir().ok_or_else(|| {
        CliError::user("could not determine the user data directory; pass --root")
    })?;
    Ok(data.join("scribe").join("extensions"))
}

/// Settings store: the `--config` file when given (and then it must load),
/// otherwise `<config dir>/scribe/settings.toml` if present, otherwise empty.
fn load_settings(flag: Option<PathBuf>) -> Result<Box<dyn Settings>> {
    if let Some(path) = flag {
        return Ok(Box::new(TomlSettings::load(&path)?));
    }
    if let Some(config) = dirs::config_dir() {
        let path = config.join("scribe").join("settings.toml");
        if path.is_file() {
            return Ok(Box::new(TomlSettings::load(&path)?));
        }
    }
    Ok(Box::new(MemorySettings::new()))
}

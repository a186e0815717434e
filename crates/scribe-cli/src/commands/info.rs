//! `scribe-ext info` — preview a package without installing it.

use std::path::Path;

use colored::Colorize;
use scribe_extensions::{Installer, Settings};

use crate::error::Result;

/// Handle `scribe-ext info <archive>`
///
/// Runs the prepare phase only: streams the manifest out of the archive and
/// probes the extensions root for an existing installation, so the preview
/// can say whether installing would update and which version it would
/// replace. Nothing is extracted and nothing under the root is created.
pub fn run_info(root: &Path, settings: Box<dyn Settings>, archive: &Path) -> Result<()> {
    let installer = Installer::new(root, settings);
    let pending = installer.prepare(archive)?;
    let manifest = pending.manifest();

    println!(
        "{} {} {}",
        "=>".blue().bold(),
        manifest.display_name().cyan(),
        manifest.version
    );
    println!("   {} {}", "Identifier:".dimmed(), manifest.unique_name);
    println!("   {} {}", "Author:".dimmed(), manifest.author);
    if !manifest.runtime.is_empty() {
        println!("   {} {}", "Runtime:".dimmed(), manifest.runtime);
    }
    if !manifest.description.is_empty() {
        println!("   {} {}", "Description:".dimmed(), manifest.description);
    }
    if let Some(current) = pending.installed_version() {
        println!(
            "   {} update (current version is {})",
            "Status:".dimmed(),
            current
        );
    } else {
        println!("   {} new install", "Status:".dimmed());
    }
    println!("   {} {}", "Target:".dimmed(), pending.target_dir().display());

    Ok(())
}

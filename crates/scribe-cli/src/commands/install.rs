//! `scribe-ext install` — the two-phase install with confirmation.

use std::path::Path;

use colored::Colorize;
use dialoguer::Confirm;
use dialoguer::theme::ColorfulTheme;
use scribe_extensions::{InstallOutcome, Installer, Settings};

use crate::error::Result;

/// Handle `scribe-ext install <archive> [--yes]`
///
/// Prepares the install, shows what the package is and whether it replaces
/// an existing installation, and asks for confirmation unless `yes` is set.
/// Declining leaves the extensions root untouched.
pub fn run_install(
    root: &Path,
    settings: Box<dyn Settings>,
    archive: &Path,
    yes: bool,
) -> Result<()> {
    let installer = Installer::new(root, settings);
    let pending = installer.prepare(archive)?;
    let manifest = pending.manifest();
    let name = manifest.display_name().to_string();
    let version = manifest.version.clone();

    if let Some(installed) = pending.installed_version() {
        println!(
            "{} Updating {} {} {} {}",
            "=>".blue().bold(),
            name.cyan(),
            installed.dimmed(),
            "->".dimmed(),
            version
        );
    } else {
        println!(
            "{} Installing {} {}",
            "=>".blue().bold(),
            name.cyan(),
            version
        );
    }
    println!("   {} {}", "Author:".dimmed(), manifest.author);
    if !manifest.runtime.is_empty() {
        println!("   {} {}", "Runtime:".dimmed(), manifest.runtime);
    }
    println!("   {} {}", "Target:".dimmed(), pending.target_dir().display());

    if !yes {
        let prompt = if pending.is_update() {
            "Replace the installed version?"
        } else {
            "Proceed with installation?"
        };
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        if !confirmed {
            println!("{}", "Aborted.".yellow());
            return Ok(());
        }
    }

    match pending.run()? {
        InstallOutcome::Installed => {
            println!("{} Installed {} {}", "✓".green().bold(), name.cyan(), version);
        }
        InstallOutcome::Updated => {
            println!("{} Updated {} to {}", "✓".green().bold(), name.cyan(), version);
        }
    }

    Ok(())
}

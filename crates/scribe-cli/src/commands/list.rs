//! `scribe-ext list` — show what is installed.

use std::path::Path;

use colored::Colorize;
use scribe_extensions::installed;

use crate::error::Result;

/// Handle `scribe-ext list`
///
/// Lists every extension directory under the extensions root with whatever
/// its manifest declares. A root that does not exist yet is simply empty.
pub fn run_list(root: &Path) -> Result<()> {
    let extensions = installed::list(root)?;

    if extensions.is_empty() {
        println!("{} No extensions installed.", "=>".blue().bold());
        return Ok(());
    }

    println!(
        "{} Installed extensions ({}):",
        "=>".blue().bold(),
        extensions.len()
    );
    for extension in &extensions {
        match extension.version() {
            Some(version) => {
                println!("   {} {}", extension.display_name().cyan(), version.dimmed());
            }
            None => {
                println!(
                    "   {} {}",
                    extension.display_name().cyan(),
                    "(no manifest)".dimmed()
                );
            }
        }
    }

    Ok(())
}

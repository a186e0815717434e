//! Discovery of extensions already present under the extensions root.
//!
//! Presence is defined by the directory, not the manifest: a directory under
//! the root is an installed extension even when its `manifest.json` is
//! missing or unreadable. That keeps update detection working for
//! half-broken installs, which the pipeline repairs by replacing them.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::manifest::ExtensionManifest;
use crate::paths::{self, CreateDir};

/// An extension directory found under the extensions root.
#[derive(Debug, Clone)]
pub struct InstalledExtension {
    /// The extension's directory.
    pub dir: PathBuf,
    /// Manifest read from the directory, when present and parseable.
    pub manifest: Option<ExtensionManifest>,
}

impl InstalledExtension {
    /// Name to show for this extension: the manifest's display name when it
    /// has one, otherwise the directory name.
    pub fn display_name(&self) -> String {
        if let Some(manifest) = &self.manifest {
            let name = manifest.display_name();
            if !name.is_empty() {
                return name.to_string();
            }
        }
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.dir.display().to_string())
    }

    /// Installed version, when the manifest could be read.
    pub fn version(&self) -> Option<&str> {
        self.manifest.as_ref().map(|m| m.version.as_str())
    }
}

/// Look up the installed extension for `unique_name`.
///
/// Returns `None` when the identifier does not sanitize or when no
/// directory exists for it under the root.
pub fn find(extensions_root: &Path, unique_name: &str) -> Option<InstalledExtension> {
    let dir = paths::resolve(extensions_root, unique_name, CreateDir::No)?;
    if !dir.is_dir() {
        return None;
    }
    let manifest = ExtensionManifest::from_install_dir(&dir);
    Some(InstalledExtension { dir, manifest })
}

/// List every extension directory under `extensions_root`, sorted by
/// directory name. A root that does not exist yet is an empty list.
pub fn list(extensions_root: &Path) -> Result<Vec<InstalledExtension>> {
    if !extensions_root.exists() {
        return Ok(Vec::new());
    }
    let mut extensions = Vec::new();
    let entries =
        std::fs::read_dir(extensions_root).map_err(|e| Error::io(extensions_root, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(extensions_root, e))?;
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let manifest = ExtensionManifest::from_install_dir(&dir);
        extensions.push(InstalledExtension { dir, manifest });
    }
    extensions.sort_by(|a, b| a.dir.file_name().cmp(&b.dir.file_name()));
    Ok(extensions)
}

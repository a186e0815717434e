//! Extension manifest parsing for `manifest.json` documents.
//!
//! Every extension archive carries a single manifest entry (named
//! [`MANIFEST_FILENAME`](crate::MANIFEST_FILENAME)) describing the
//! extension's identity, runtime, and display information. The same document
//! is left behind in the installed directory, where it identifies the
//! extension to the host.
//!
//! # Example JSON
//!
//! ```json
//! {
//!     "unique_name": "markdown-tools",
//!     "runtime": "ruby",
//!     "name": "Markdown Tools",
//!     "version": "1.2.0",
//!     "author": "Jane Doe",
//!     "description": "Preview and lint Markdown buffers."
//! }
//! ```
//!
//! Only `unique_name` is semantically required; every other field falls back
//! to a typed default so a sparse manifest never fails to load. The host
//! displays [`UNKNOWN_VERSION`] / [`UNKNOWN_AUTHOR`] when those fields are
//! absent rather than treating the manifest as broken.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::process::ProcessLimits;

/// Sentinel displayed when a manifest does not declare a version.
pub const UNKNOWN_VERSION: &str = "unknown version";

/// Sentinel displayed when a manifest does not declare an author.
pub const UNKNOWN_AUTHOR: &str = "unknown author";

/// Immutable metadata describing one extension.
///
/// Parsed once per install attempt and never cached across attempts; the
/// only persistent state of an extension is its directory on disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtensionManifest {
    /// Stable identifier, also the basis of the on-disk directory name.
    #[serde(default)]
    pub unique_name: String,
    /// Runtime tag selecting a provisioning procedure (e.g. "ruby").
    #[serde(default)]
    pub runtime: String,
    /// Human-readable display name.
    #[serde(default)]
    pub name: String,
    /// Version string, for display and update comparison only.
    #[serde(default = "default_version")]
    pub version: String,
    /// Author, for display only.
    #[serde(default = "default_author")]
    pub author: String,
    /// Short description, for display only.
    #[serde(default)]
    pub description: String,
}

fn default_version() -> String {
    UNKNOWN_VERSION.to_string()
}

fn default_author() -> String {
    UNKNOWN_AUTHOR.to_string()
}

impl ExtensionManifest {
    /// Parse a manifest from raw JSON text.
    ///
    /// Missing optional fields become their documented defaults. Malformed
    /// JSON is [`Error::ManifestUnavailable`]; a missing or too-short
    /// `unique_name` is *not* detected here — identity is enforced where the
    /// directory name is formed (see [`crate::paths`]).
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::ManifestUnavailable {
            reason: format!("invalid manifest JSON: {e}"),
        })
    }

    /// Stream the manifest out of a package archive without unpacking it.
    pub fn from_archive(archive: &Path, limits: &ProcessLimits) -> Result<Self> {
        let text = crate::archive::read_manifest(archive, limits)?;
        Self::from_json(&text)
    }

    /// Read the manifest left behind in an installed extension directory.
    ///
    /// Returns `None` when the file is missing or unparseable. Callers use
    /// this as an existence-and-identity probe, so absence is not an error.
    pub fn from_install_dir(dir: &Path) -> Option<Self> {
        let path = dir.join(crate::MANIFEST_FILENAME);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("no readable manifest at {}: {e}", path.display());
                return None;
            }
        };
        match Self::from_json(&text) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::debug!("ignoring malformed installed manifest at {}: {e}", path.display());
                None
            }
        }
    }

    /// Display name, falling back to the unique name when unset.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.unique_name
        } else {
            &self.name
        }
    }
}

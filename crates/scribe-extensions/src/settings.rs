//! Host settings the installer consults during provisioning.
//!
//! The installer never owns configuration; it reads whatever store the host
//! hands it through the [`Settings`] trait. Two implementations ship with
//! the crate: [`MemorySettings`] for embedding and tests, and
//! [`TomlSettings`] for the standalone CLI, which loads a flat TOML file of
//! string keys and values:
//!
//! ```toml
//! "Extensions/Runtime_Bundler" = "/usr/bin/bundle"
//! ```

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Read-only view of the host's settings store.
///
/// Lookups are infallible: a missing key yields the caller-supplied default,
/// mirroring how host applications query preference stores.
pub trait Settings: Send + Sync {
    /// Return the value for `key`, or `default` if the key is absent.
    fn get(&self, key: &str, default: &str) -> String;
}

/// In-memory settings, for hosts that already hold configuration elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: HashMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl Settings for MemorySettings {
    fn get(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}

/// Settings backed by a flat TOML file of string keys and values.
#[derive(Debug, Clone, Default)]
pub struct TomlSettings {
    values: HashMap<String, String>,
}

impl TomlSettings {
    /// Load settings from `path`.
    ///
    /// The file must be a flat table of string values; anything else is a
    /// [`Error::SettingsParse`]. A missing file is an I/O error — callers
    /// that treat the file as optional should probe for it first.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let values: HashMap<String, String> =
            toml::from_str(&text).map_err(|e| Error::SettingsParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self { values })
    }
}

impl Settings for TomlSettings {
    fn get(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}

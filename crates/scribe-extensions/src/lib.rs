//! Extension installer for Scribe.
//!
//! This crate installs extension packages — gzip-compressed tarballs carrying
//! a `manifest.json` — into a per-user extensions directory, replacing any
//! previous installation of the same extension and provisioning its declared
//! runtime's dependencies. Archive handling is delegated to the system `tar`
//! utility; every subprocess wait is deadline-bounded and cancellable.

pub mod archive;
pub mod error;
pub mod install;
pub mod installed;
pub mod manifest;
pub mod paths;
pub mod process;
pub mod provision;
pub mod settings;

/// The canonical filename for extension manifests.
///
/// Packages must place a file with this name at the root of the archive so
/// the installer can identify the extension before unpacking anything.
pub const MANIFEST_FILENAME: &str = "manifest.json";

pub use error::{Error, Result};
pub use install::{InstallOutcome, Installer, PendingInstall};
pub use installed::InstalledExtension;
pub use manifest::{ExtensionManifest, UNKNOWN_AUTHOR, UNKNOWN_VERSION};
pub use process::{CancelToken, ProcessLimits};
pub use provision::{
    BUNDLER_PATH_KEY, ProvisionContext, ProvisionerRegistry, RubyBundler, RuntimeProvisioner,
};
pub use settings::{MemorySettings, Settings, TomlSettings};

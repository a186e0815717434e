//! The install pipeline: resolve, replace, extract, provision.
//!
//! Installation runs in two phases so hosts can put a confirmation between
//! them. [`Installer::prepare`] reads the manifest out of the archive and
//! validates the extension's identity without touching the extensions root;
//! the returned [`PendingInstall`] carries everything a confirmation prompt
//! needs. [`PendingInstall::run`] then performs the installation. Dropping
//! a [`PendingInstall`] without running it abandons the attempt with no
//! side effects.
//!
//! Updates are not incremental: when a directory for the identifier already
//! exists it is deleted outright and recreated before extraction, so files
//! from older versions never linger. There is no rollback either. A failure
//! mid-pipeline leaves the partial directory behind, and the next attempt
//! for the same identifier sweeps it away by the same replacement rule.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::info;

use crate::archive;
use crate::error::{Error, Result};
use crate::installed::{self, InstalledExtension};
use crate::manifest::{ExtensionManifest, UNKNOWN_VERSION};
use crate::paths::{self, CreateDir};
use crate::process::{CancelToken, ProcessLimits};
use crate::provision::{ProvisionContext, ProvisionerRegistry};
use crate::settings::Settings;

/// What an install attempt accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The extension was not present before.
    Installed,
    /// A previous installation was replaced.
    Updated,
}

/// Installs extension archives under one extensions root.
///
/// The installer is cheap to keep around and can prepare any number of
/// attempts. Attempts for the same extension identifier are serialized
/// process-wide; attempts for different identifiers run independently.
pub struct Installer {
    extensions_root: PathBuf,
    settings: Box<dyn Settings>,
    registry: ProvisionerRegistry,
    limits: ProcessLimits,
    cancel: CancelToken,
}

impl Installer {
    /// Create an installer over `extensions_root` with the built-in
    /// provisioner registry and default process limits.
    pub fn new(extensions_root: impl Into<PathBuf>, settings: Box<dyn Settings>) -> Self {
        Self {
            extensions_root: extensions_root.into(),
            settings,
            registry: ProvisionerRegistry::with_builtins(),
            limits: ProcessLimits::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Replace the provisioner registry.
    pub fn with_registry(mut self, registry: ProvisionerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the process limits.
    pub fn with_limits(mut self, limits: ProcessLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Token that aborts this installer's in-flight subprocess waits.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn extensions_root(&self) -> &Path {
        &self.extensions_root
    }

    /// First phase: read and validate the archive's manifest.
    ///
    /// Fails with [`Error::ManifestUnavailable`] when no readable manifest
    /// can be streamed out of the archive, and [`Error::IdentityRejected`]
    /// when the manifest's `unique_name` does not survive sanitization.
    /// Nothing under the extensions root is touched.
    pub fn prepare(&self, archive: impl Into<PathBuf>) -> Result<PendingInstall<'_>> {
        let archive = archive.into();
        let manifest = ExtensionManifest::from_archive(&archive, &self.limits)?;
        let sanitized_name = paths::sanitize_unique_name(&manifest.unique_name).ok_or_else(|| {
            Error::IdentityRejected {
                unique_name: manifest.unique_name.clone(),
            }
        })?;
        let existing = installed::find(&self.extensions_root, &manifest.unique_name);
        Ok(PendingInstall {
            installer: self,
            archive,
            manifest,
            sanitized_name,
            existing,
        })
    }

    /// Prepare and immediately run, for hosts that skip confirmation.
    pub fn install(&self, archive: impl Into<PathBuf>) -> Result<InstallOutcome> {
        self.prepare(archive)?.run()
    }
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("extensions_root", &self.extensions_root)
            .field("registry", &self.registry)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

/// A validated install attempt awaiting confirmation.
pub struct PendingInstall<'a> {
    installer: &'a Installer,
    archive: PathBuf,
    manifest: ExtensionManifest,
    sanitized_name: String,
    existing: Option<InstalledExtension>,
}

impl PendingInstall<'_> {
    /// The manifest read from the archive.
    pub fn manifest(&self) -> &ExtensionManifest {
        &self.manifest
    }

    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// Whether an installation for this identifier existed at prepare time.
    pub fn is_update(&self) -> bool {
        self.existing.is_some()
    }

    /// Version of the installation that would be replaced, when updating.
    /// An installation whose own manifest is unreadable reports the unknown
    /// version sentinel rather than nothing.
    pub fn installed_version(&self) -> Option<&str> {
        self.existing
            .as_ref()
            .map(|e| e.version().unwrap_or(UNKNOWN_VERSION))
    }

    /// Where the extension would be installed. Purely a preview; the
    /// directory may not exist yet.
    pub fn target_dir(&self) -> PathBuf {
        self.installer.extensions_root.join(&self.sanitized_name)
    }

    /// Second phase: perform the installation.
    ///
    /// Whether this reports [`InstallOutcome::Updated`] follows the
    /// prepare-time detection, the same one the confirmation prompt showed,
    /// so the terminal message never disagrees with the preview. A directory
    /// that appeared after prepare is still swept by the replace step.
    pub fn run(self) -> Result<InstallOutcome> {
        let PendingInstall {
            installer,
            archive,
            manifest,
            sanitized_name,
            existing,
        } = self;

        let slot = lock_slot(&sanitized_name);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if installer.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        info!(
            "installing `{}` from {}",
            manifest.unique_name,
            archive.display()
        );
        let probe = paths::resolve(&installer.extensions_root, &manifest.unique_name, CreateDir::No)
            .ok_or_else(|| Error::IdentityRejected {
                unique_name: manifest.unique_name.clone(),
            })?;
        let was_installed = existing.is_some();
        if probe.is_dir() {
            info!("replacing previous installation at {}", probe.display());
            std::fs::remove_dir_all(&probe).map_err(|e| Error::CannotCreateTarget {
                path: probe.clone(),
                source: e,
            })?;
        }
        let target = paths::create_resolved(&installer.extensions_root, &manifest.unique_name)?;

        info!("extracting {} into {}", archive.display(), target.display());
        archive::extract(&archive, &target, &installer.limits, &installer.cancel)?;

        info!("provisioning runtime `{}`", manifest.runtime);
        let ctx = ProvisionContext {
            extension_dir: &target,
            settings: installer.settings.as_ref(),
            limits: &installer.limits,
            cancel: &installer.cancel,
        };
        installer.registry.provision(&manifest.runtime, &ctx)?;

        let outcome = if was_installed {
            InstallOutcome::Updated
        } else {
            InstallOutcome::Installed
        };
        info!(
            "{} `{}` version {}",
            match outcome {
                InstallOutcome::Installed => "installed",
                InstallOutcome::Updated => "updated",
            },
            manifest.unique_name,
            manifest.version
        );
        Ok(outcome)
    }
}

impl std::fmt::Debug for PendingInstall<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingInstall")
            .field("archive", &self.archive)
            .field("unique_name", &self.manifest.unique_name)
            .field("is_update", &self.is_update())
            .finish_non_exhaustive()
    }
}

/// Process-wide lock table keyed by sanitized identifier. Slots are never
/// evicted; the set of identifiers a process touches is small.
fn lock_slot(sanitized_name: &str) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<String, Arc<Mutex<()>>>>> = OnceLock::new();
    let table = LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
    table.entry(sanitized_name.to_string()).or_default().clone()
}

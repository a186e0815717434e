//! Runtime provisioning: installing an extension's dependencies after
//! extraction.
//!
//! A manifest may tag itself with a `runtime`; each tag maps to a
//! [`RuntimeProvisioner`] that knows how to fetch that runtime's
//! dependencies inside the extension directory. The mapping lives in a
//! [`ProvisionerRegistry`] so hosts can add runtimes without touching the
//! install pipeline. The stock registry knows `ruby`, provisioned with
//! `bundler install --deployment`.

use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::archive::exit_detail;
use crate::error::{Error, Result};
use crate::process::{CancelToken, ProcessLimits, WaitOutcome, capture_stderr, wait_bounded};
use crate::settings::Settings;

/// Settings key holding the path to the Ruby dependency manager binary.
pub const BUNDLER_PATH_KEY: &str = "Extensions/Runtime_Bundler";

/// Everything a provisioner may consult while working.
pub struct ProvisionContext<'a> {
    /// Directory the extension was extracted into; provisioners run there.
    pub extension_dir: &'a Path,
    /// Host settings, for locating runtime tooling.
    pub settings: &'a dyn Settings,
    /// Wall-clock limits for spawned tooling.
    pub limits: &'a ProcessLimits,
    /// Cancellation flag for the surrounding install attempt.
    pub cancel: &'a CancelToken,
}

/// A provisioning procedure for one runtime tag.
pub trait RuntimeProvisioner: Send + Sync {
    /// The manifest `runtime` tag this provisioner handles.
    fn runtime(&self) -> &str;

    /// Install the extension's dependencies inside `ctx.extension_dir`.
    fn provision(&self, ctx: &ProvisionContext<'_>) -> Result<()>;
}

/// Registry mapping runtime tags to their provisioning procedures.
#[derive(Default)]
pub struct ProvisionerRegistry {
    providers: HashMap<String, Box<dyn RuntimeProvisioner>>,
}

impl ProvisionerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Create a registry populated with the built-in provisioners.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(RubyBundler));
        registry
    }

    /// Register a provisioner under its own runtime tag, replacing any
    /// previous registration for that tag.
    pub fn register(&mut self, provisioner: Box<dyn RuntimeProvisioner>) {
        self.providers
            .insert(provisioner.runtime().to_string(), provisioner);
    }

    /// Check whether a runtime tag has a registered provisioner.
    pub fn contains(&self, runtime: &str) -> bool {
        self.providers.contains_key(runtime)
    }

    /// List all registered runtime tags (sorted).
    pub fn runtimes(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.providers.keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Run the provisioner registered for `runtime`.
    ///
    /// An unregistered tag is [`Error::UnknownRuntime`]. The empty tag is
    /// not special: a manifest that declares no runtime fails here too,
    /// rather than passing silently with dependencies nobody installed.
    pub fn provision(&self, runtime: &str, ctx: &ProvisionContext<'_>) -> Result<()> {
        let provisioner = self
            .providers
            .get(runtime)
            .ok_or_else(|| Error::UnknownRuntime {
                runtime: runtime.to_string(),
            })?;
        debug!("provisioning runtime `{runtime}` in {}", ctx.extension_dir.display());
        provisioner.provision(ctx)
    }
}

impl std::fmt::Debug for ProvisionerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionerRegistry")
            .field("runtimes", &self.runtimes())
            .finish()
    }
}

/// Built-in provisioner for the `ruby` runtime.
///
/// Runs `<bundler> install --deployment` in the extension directory, where
/// `<bundler>` comes from the [`BUNDLER_PATH_KEY`] setting. No configured
/// bundler is a [`Error::ProvisioningFailed`] naming the key, not a silent
/// skip: a ruby extension without its gems would only fail later and
/// further from the cause.
#[derive(Debug, Clone, Copy)]
pub struct RubyBundler;

impl RuntimeProvisioner for RubyBundler {
    fn runtime(&self) -> &str {
        "ruby"
    }

    fn provision(&self, ctx: &ProvisionContext<'_>) -> Result<()> {
        let bundler = ctx.settings.get(BUNDLER_PATH_KEY, "");
        if bundler.is_empty() {
            return Err(Error::ProvisioningFailed {
                detail: format!(
                    "no dependency manager configured for the ruby runtime \
                     (set `{BUNDLER_PATH_KEY}` to the bundler binary)"
                ),
            });
        }

        let mut cmd = Command::new(&bundler);
        cmd.args(["install", "--deployment"])
            .current_dir(ctx.extension_dir)
            .stdin(Stdio::null())
            // Bundler narrates on stdout at length; only stderr is kept for
            // diagnostics.
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        debug!("running dependency manager: {cmd:?}");

        let mut child = cmd.spawn().map_err(|e| Error::ProvisioningFailed {
            detail: format!("could not launch `{bundler}`: {e}"),
        })?;
        let stderr = capture_stderr(&mut child);
        match wait_bounded(&mut child, ctx.limits.provision_timeout, ctx.cancel).map_err(|e| {
            Error::ProvisioningFailed {
                detail: format!("failed to monitor `{bundler}`: {e}"),
            }
        })? {
            WaitOutcome::Exited(status) if status.success() => Ok(()),
            WaitOutcome::Exited(status) => Err(Error::ProvisioningFailed {
                detail: exit_detail(&bundler, status, &stderr.join().unwrap_or_default()),
            }),
            WaitOutcome::TimedOut => Err(Error::ProvisioningFailed {
                detail: format!(
                    "`{bundler}` timed out after {}s",
                    ctx.limits.provision_timeout.as_secs()
                ),
            }),
            WaitOutcome::Cancelled => Err(Error::Cancelled),
        }
    }
}

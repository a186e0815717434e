use std::path::PathBuf;

/// Result type for extension operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while installing or updating an extension.
///
/// Every variant is terminal for the attempt that produced it. The installer
/// never retries a subprocess step on its own; recovery is always a fresh,
/// user-initiated attempt (whose replace step cleans up anything a failed
/// attempt left behind).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The archive could not be read, or its manifest is absent or malformed.
    /// No installation can proceed from this state.
    #[error("extension manifest unavailable: {reason}")]
    ManifestUnavailable { reason: String },

    /// The declared unique name is too short to form a safe directory name.
    #[error("extension unique name '{unique_name}' rejected: must be longer than 3 characters")]
    IdentityRejected { unique_name: String },

    /// The target directory could not be created or replaced.
    #[error("cannot create extension directory {path}: {source}")]
    CannotCreateTarget {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The extraction utility failed or could not be launched.
    #[error("archive extraction failed: {detail}")]
    ExtractionFailed { detail: String },

    /// The manifest names a runtime no provisioner is registered for.
    #[error("unknown extension runtime '{runtime}'")]
    UnknownRuntime { runtime: String },

    /// The runtime's dependency-installation command failed.
    #[error("dependency provisioning failed: {detail}")]
    ProvisioningFailed { detail: String },

    /// The attempt was cancelled while a subprocess step was in flight.
    /// The target directory may hold a partial extraction; the next
    /// attempt's replace step removes it.
    #[error("installation cancelled")]
    Cancelled,

    /// Failed to parse a settings file.
    #[error("failed to parse settings at {path}: {message}")]
    SettingsParse { path: PathBuf, message: String },

    /// I/O error reading or writing extension files.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn manifest_unavailable(reason: impl Into<String>) -> Self {
        Self::ManifestUnavailable {
            reason: reason.into(),
        }
    }
}

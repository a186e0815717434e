//! Mapping extension identifiers to safe directories under the extensions root.
//!
//! This module is the security boundary of the installer: the unique name
//! declared in an archive's manifest is attacker-controlled, and everything
//! the pipeline later deletes, recreates, and extracts into derives from it.
//! [`sanitize_unique_name`] therefore replaces every character outside
//! `[A-Za-z0-9._-]` before the name can reach the filesystem layer, which
//! guarantees no path separator, parent reference, or shell-special character
//! survives into the directory name. Identifiers of three characters or fewer
//! are rejected outright so a degenerate name cannot collapse onto a reserved
//! or accidental path.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Whether [`resolve`] should create the directory it computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateDir {
    Yes,
    No,
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Escape a declared unique name into a filesystem-safe directory segment.
///
/// Returns `None` for identifiers of three characters or fewer; otherwise
/// replaces each unsafe character with `_`. Total and idempotent: the result
/// contains only `[A-Za-z0-9._-]`, and sanitizing it again is a no-op.
pub fn sanitize_unique_name(unique_name: &str) -> Option<String> {
    if unique_name.chars().count() <= 3 {
        return None;
    }
    Some(
        unique_name
            .chars()
            .map(|c| if is_safe_char(c) { c } else { '_' })
            .collect(),
    )
}

/// Resolve the directory an extension lives in under `extensions_root`.
///
/// With [`CreateDir::No`] this is a pure computation: it never touches the
/// filesystem and in particular never fails because the directory does not
/// exist yet, so callers can use it as an existence probe. With
/// [`CreateDir::Yes`] the full path is created (idempotently); a creation
/// failure is logged and collapses to `None`.
///
/// `None` is also returned when the unique name fails the length gate.
pub fn resolve(extensions_root: &Path, unique_name: &str, create: CreateDir) -> Option<PathBuf> {
    let escaped = sanitize_unique_name(unique_name)?;
    let dir = extensions_root.join(escaped);

    if create == CreateDir::Yes {
        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!("could not create extension directory {}: {e}", dir.display());
            return None;
        }
    }

    Some(dir)
}

/// [`resolve`] with creation, keeping the underlying failure.
///
/// The install pipeline uses this instead of `resolve(.., CreateDir::Yes)`
/// so a permissions or disk-full error reaches the user instead of being
/// flattened into an absence.
pub(crate) fn create_resolved(extensions_root: &Path, unique_name: &str) -> Result<PathBuf> {
    let dir = resolve(extensions_root, unique_name, CreateDir::No).ok_or_else(|| {
        Error::IdentityRejected {
            unique_name: unique_name.to_string(),
        }
    })?;
    fs::create_dir_all(&dir).map_err(|e| Error::CannotCreateTarget {
        path: dir.clone(),
        source: e,
    })?;
    Ok(dir)
}

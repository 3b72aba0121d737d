//! Fallback asset resolution.
//!
//! When no stream is connected the viewer presents a locally bundled
//! placeholder instead of an empty surface. [`FallbackResolver`] lists the
//! application asset directory (single level, read-only) and picks the first
//! entry in listing order. Resolution failures are a degraded-mode condition:
//! callers keep the last known asset and log, rather than surfacing an error
//! to the user.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A locally available media asset used when no stream is connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackAsset {
    /// Path to the asset, as produced by the directory listing.
    pub path: String,
}

/// Why fallback resolution failed.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The asset directory exists but contains no entries.
    #[error("asset directory is empty")]
    Empty,

    /// Listing the asset directory failed.
    #[error("failed to list asset directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolves the fallback asset from a fixed, read-only asset root.
#[derive(Debug, Clone)]
pub struct FallbackResolver {
    root: PathBuf,
}

impl FallbackResolver {
    /// Creates a resolver over the given asset root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The asset root this resolver lists.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The asset assumed to exist before any resolution has run.
    #[must_use]
    pub fn default_asset(&self) -> FallbackAsset {
        FallbackAsset {
            path: self.root.join("placeholder.mp4").to_string_lossy().into_owned(),
        }
    }

    /// Lists the asset root (non-recursively) and returns the first entry.
    ///
    /// The pick is deterministic for a given directory state: whatever the
    /// filesystem yields first. No part of the filesystem is mutated.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::Empty`] if the directory has no entries,
    /// [`ResolutionError::Io`] if the listing itself fails.
    pub fn resolve(&self) -> Result<FallbackAsset, ResolutionError> {
        let mut entries = fs::read_dir(&self.root)?;
        match entries.next() {
            Some(entry) => {
                let path = entry?.path().to_string_lossy().into_owned();
                log::debug!("[Assets] Resolved fallback asset: {}", path);
                Ok(FallbackAsset { path })
            }
            None => Err(ResolutionError::Empty),
        }
    }
}

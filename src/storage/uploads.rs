// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Uploaded image storage
//!
//! Uploads are written under a single directory using sanitized names
//! with a random suffix, so two uploads never share a file.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid filename: '{0}'")]
    InvalidFilename(String),

    #[error("Upload not found: {0}")]
    NotFound(String),

    #[error("Upload storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file written by [`UploadStore::save`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Sanitized, suffixed name, used as the source image reference
    pub name: String,
    /// Full path on disk
    pub path: PathBuf,
    pub size: usize,
}

/// Directory-backed upload store
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under a unique name derived from `filename`
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredUpload, UploadError> {
        let clean = secure_filename(filename)
            .ok_or_else(|| UploadError::InvalidFilename(filename.to_string()))?;
        let name = unique_name(&clean);

        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(&name);
        tokio::fs::write(&path, bytes).await?;

        info!("📥 Stored upload {} ({} bytes)", name, bytes.len());

        Ok(StoredUpload {
            name,
            path,
            size: bytes.len(),
        })
    }

    /// Read a stored upload back
    ///
    /// Only names that are already in sanitized form are accepted.
    pub async fn open(&self, name: &str) -> Result<Vec<u8>, UploadError> {
        let path = self.resolve(name)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(UploadError::NotFound(name.to_string()))
            }
            Err(e) => Err(UploadError::Io(e)),
        }
    }

    /// Remove a stored upload, ignoring files that are already gone
    pub async fn remove(&self, name: &str) -> Result<(), UploadError> {
        let path = self.resolve(name)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed upload {}", name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UploadError::Io(e)),
        }
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, UploadError> {
        match secure_filename(name) {
            Some(clean) if clean == name => Ok(self.root.join(clean)),
            _ => Err(UploadError::InvalidFilename(name.to_string())),
        }
    }
}

/// Insert a random suffix before the extension: `leaf.png` -> `leaf_<uuid>.png`
fn unique_name(clean: &str) -> String {
    let id = Uuid::new_v4().simple();
    match clean.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, id, ext),
        _ => format!("{}_{}", clean, id),
    }
}

/// Reduce a client-supplied filename to a safe single path component
///
/// Directory components are dropped, whitespace runs become `_`, any
/// character outside `[A-Za-z0-9._-]` is removed and leading dots and
/// underscores are trimmed. Returns `None` if nothing is left.
pub fn secure_filename(filename: &str) -> Option<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let mut out = String::with_capacity(base.len());
    let mut in_space = false;

    for ch in base.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            out.push(ch);
        }
    }

    let cleaned = out.trim_start_matches(['.', '_']).trim_end_matches('_');

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

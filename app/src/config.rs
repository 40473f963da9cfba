// ==============================================================================
// config.rs - Upload Engine Configuration
// ==============================================================================
// Description: Explicit configuration captured once by the upload service
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use std::path::{Path, PathBuf};

/// Name of the in-flight payload directory under the upload root.
///
/// Sanitized identifiers never contain '.', so this can't clash with a session.
pub const STAGING_DIR: &str = ".staging";

/// Configuration for one logical upload root (e.g. one per sample owner)
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory holding one sub-directory of chunk files per session
    pub upload_root: PathBuf,

    /// Largest accepted `totalSize` in bytes, unlimited when `None`
    pub max_file_size: Option<u64>,
}

impl UploadConfig {
    pub fn new(upload_root: impl Into<PathBuf>) -> Self {
        Self {
            upload_root: upload_root.into(),
            max_file_size: None,
        }
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = Some(max_file_size);
        self
    }

    /// Directory where payloads are written before being renamed into place
    pub fn staging_dir(&self) -> PathBuf {
        self.upload_root.join(STAGING_DIR)
    }

    pub fn root(&self) -> &Path {
        &self.upload_root
    }
}

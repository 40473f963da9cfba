// ==============================================================================
// state.rs - Application State Management
// ==============================================================================
// Description: Shared application state for the upload gateway
// Author: Matt Barham
// Created: 2025-11-06
// Modified: 2026-10-17
// Version: 2.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use genetics_upload::{ArtifactSink, UploadConfig, UploadService};

use crate::handoff::ManifestHandoff;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Resumable upload engine rooted at the upload directory
    uploads: UploadService,

    /// Path to encrypted volume
    encrypted_volume_path: PathBuf,

    /// Assembled artifacts (within encrypted volume)
    processing_dir: PathBuf,

    /// Receives assembled artifacts for analysis
    sink: Arc<dyn ArtifactSink>,
}

impl AppState {
    /// Create new application state from environment
    pub async fn new() -> Result<Self> {
        // Get encrypted volume path from environment
        let encrypted_volume_path = PathBuf::from(
            std::env::var("ENCRYPTED_VOLUME_PATH")
                .unwrap_or_else(|_| "/mnt/genetics-encrypted".to_string()),
        );

        // Optional total file size limit in bytes
        let max_file_size = match std::env::var("MAX_UPLOAD_SIZE") {
            Ok(value) => Some(
                value
                    .trim()
                    .parse::<u64>()
                    .context("MAX_UPLOAD_SIZE must be a byte count")?,
            ),
            Err(_) => None,
        };

        Self::with_volume(encrypted_volume_path, max_file_size).await
    }

    /// Build state over an explicit volume; directories are created up front
    /// so a bad volume fails before anything is served
    pub async fn with_volume(
        encrypted_volume_path: PathBuf,
        max_file_size: Option<u64>,
    ) -> Result<Self> {
        let upload_dir = encrypted_volume_path.join("uploads");
        let processing_dir = encrypted_volume_path.join("processing");

        let mut config = UploadConfig::new(upload_dir);
        if let Some(max) = max_file_size {
            config = config.with_max_file_size(max);
        }

        let uploads = UploadService::new(config).context("Failed to initialize upload root")?;

        tokio::fs::create_dir_all(&processing_dir)
            .await
            .context("Failed to create processing directory")?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                uploads,
                encrypted_volume_path,
                processing_dir,
                sink: Arc::new(ManifestHandoff),
            }),
        })
    }

    /// Get upload service
    pub fn uploads(&self) -> &UploadService {
        &self.inner.uploads
    }

    /// Get encrypted volume path
    pub fn encrypted_volume_path(&self) -> &PathBuf {
        &self.inner.encrypted_volume_path
    }

    /// Get processing directory
    pub fn processing_dir(&self) -> &PathBuf {
        &self.inner.processing_dir
    }

    /// Get artifact sink
    pub fn sink(&self) -> Arc<dyn ArtifactSink> {
        self.inner.sink.clone()
    }
}

// ==============================================================================
// handoff.rs - Analysis Hand-off
// ==============================================================================
// Description: Publishes assembled artifacts for the analysis pipeline
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use genetics_upload::{ArtifactSink, AssembledArtifact};

/// Writes `<artifact>.json` next to each artifact; the analysis scheduler
/// picks up manifests from the processing directory
pub struct ManifestHandoff;

impl ManifestHandoff {
    pub fn manifest_path(artifact: &AssembledArtifact) -> PathBuf {
        let mut name = artifact.path.as_os_str().to_owned();
        name.push(".json");
        PathBuf::from(name)
    }
}

#[async_trait]
impl ArtifactSink for ManifestHandoff {
    async fn artifact_ready(&self, artifact: &AssembledArtifact) -> Result<()> {
        let manifest_path = Self::manifest_path(artifact);
        let manifest =
            serde_json::to_vec_pretty(artifact).context("Failed to serialize artifact manifest")?;

        tokio::fs::write(&manifest_path, manifest)
            .await
            .context(format!("Failed to write manifest: {:?}", manifest_path))?;

        info!(
            "Handed off '{}' ({}) for analysis: {:?}",
            artifact.identifier, artifact.filename, artifact.path
        );

        Ok(())
    }
}

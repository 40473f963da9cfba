// ==============================================================================
// handoff.rs - Assembled Artifact Hand-off
// ==============================================================================
// Description: Record and collaborator trait for completed sample files
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A fully reassembled upload, ready for downstream analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledArtifact {
    /// Sanitized session identifier
    pub identifier: String,

    /// Client supplied file name (untrusted, informational)
    pub filename: String,

    pub path: PathBuf,
    pub size: u64,
    pub md5: String,
    pub sha256: String,
    pub chunk_count: usize,
    pub assembled_at: DateTime<Utc>,
}

/// Receives artifacts once assembly has finished (analysis collaborator)
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn artifact_ready(&self, artifact: &AssembledArtifact) -> anyhow::Result<()>;
}

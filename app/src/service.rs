// ==============================================================================
// service.rs - Resumable Upload Service
// ==============================================================================
// Description: Read path, write path and guarded assembly over one upload root
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::checksum::verify_md5;
use crate::chunk_store::{ChunkStore, StagedChunk};
use crate::completion;
use crate::config::UploadConfig;
use crate::error::{Rejection, UploadError};
use crate::handoff::AssembledArtifact;
use crate::locks::ReassemblyLocks;
use crate::reassembler;
use crate::session::{self, SessionStatus};
use crate::validator::RequestValidator;

/// Outcome of an accepted chunk upload
#[derive(Debug, Clone)]
pub struct ChunkReceipt {
    pub status: SessionStatus,
    pub complete: bool,
}

impl ChunkReceipt {
    pub fn message(&self) -> String {
        format!("Chunk {} uploaded", self.status.chunk_number)
    }
}

/// What to assemble and where to put it
#[derive(Debug, Clone)]
pub struct AssemblyRequest {
    pub identifier: String,
    pub filename: String,
    pub verified_total_chunks: u64,
    /// Declared size of the whole file; the artifact must match it exactly
    pub total_size: u64,
    pub destination: PathBuf,
    /// Whole-file MD5 to check the artifact against, when the client sent one
    pub expected_md5: Option<String>,
}

impl AssemblyRequest {
    /// Assembly of a session whose status was just reported complete
    pub fn for_session(status: &SessionStatus, destination: PathBuf) -> Self {
        Self {
            identifier: status.identifier.clone(),
            filename: status.filename.clone(),
            verified_total_chunks: status.verified_total_chunks.unwrap_or(1),
            total_size: status.total_size,
            destination,
            expected_md5: None,
        }
    }
}

/// Stateless upload service: the only durable state is the chunk files under
/// the configured root
#[derive(Debug, Clone)]
pub struct UploadService {
    config: UploadConfig,
    validator: RequestValidator,
    store: ChunkStore,
    locks: ReassemblyLocks,
}

impl UploadService {
    /// Create the upload root and staging directory.
    ///
    /// Fails when they can't be created; nothing should be served then.
    pub fn new(config: UploadConfig) -> Result<Self, UploadError> {
        let staging_dir = config.staging_dir();
        std::fs::create_dir_all(&staging_dir).map_err(|source| UploadError::UploadRoot {
            path: config.upload_root.clone(),
            source,
        })?;

        info!(
            "Upload root ready at {:?} (max file size: {:?})",
            config.upload_root, config.max_file_size
        );

        Ok(Self {
            validator: RequestValidator::new(config.max_file_size),
            store: ChunkStore::new(staging_dir),
            locks: ReassemblyLocks::new(),
            config,
        })
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Parse request fields against this service's upload root
    pub fn parse(&self, fields: &HashMap<String, String>) -> SessionStatus {
        SessionStatus::parse(fields, self.config.root())
    }

    /// Read path: is chunk `chunkNumber` already stored and intact?
    pub fn check_status(&self, fields: &HashMap<String, String>) -> Result<SessionStatus, Rejection> {
        let mut status = self.parse(fields);

        if let Err(rejection) = self.validator.validate(&status, None) {
            warn!("Status check rejected for '{}': {}", status.identifier, rejection);
            return Err(rejection);
        }

        if !self.store.contains(&status.chunk_filename) {
            return Err(Rejection::ChunkNotUploaded(status.chunk_number));
        }

        if !verify_md5(&status.chunk_filename, &status.checksum) {
            warn!(
                "Stored chunk {} of '{}' fails checksum",
                status.chunk_number, status.identifier
            );
            return Err(Rejection::ChecksumMismatch);
        }

        status.complete = self.is_complete(&status);
        Ok(status)
    }

    /// Write a received payload to the staging area
    pub fn stage(&self, payload: &[u8]) -> Result<StagedChunk, UploadError> {
        self.store.stage(payload)
    }

    /// Write path: validate, verify and store one chunk.
    ///
    /// A rejected payload is dropped with the staged file, so nothing is stored.
    pub fn upload_chunk(
        &self,
        fields: &HashMap<String, String>,
        payload: StagedChunk,
    ) -> Result<ChunkReceipt, Rejection> {
        let mut status = self.parse(fields);

        if let Err(rejection) = self.validator.validate(&status, Some(payload.len())) {
            warn!(
                "Chunk {} of '{}' rejected: {}",
                status.chunk_number, status.identifier, rejection
            );
            return Err(rejection);
        }

        if !verify_md5(payload.path(), &status.checksum) {
            warn!(
                "Chunk {} of '{}' failed checksum verification",
                status.chunk_number, status.identifier
            );
            return Err(Rejection::ChecksumMismatch);
        }

        if let Err(e) = self.store.commit(payload, &status.chunk_filename) {
            warn!("Failed to store chunk {} of '{}': {}", status.chunk_number, status.identifier, e);
            return Err(Rejection::ChunkNotStored(status.chunk_number));
        }

        status.complete = self.is_complete(&status);
        if status.complete {
            info!("Upload '{}' complete ({})", status.identifier, status.filename);
        }

        Ok(ChunkReceipt {
            complete: status.complete,
            status,
        })
    }

    /// Run the completion tracker for a parsed status
    pub fn is_complete(&self, status: &SessionStatus) -> bool {
        match status.verified_total_chunks {
            Some(total) if !status.identifier.is_empty() => {
                completion::is_complete(self.config.root(), &status.identifier, total)
            }
            _ => false,
        }
    }

    /// Reassemble a complete session into `request.destination`.
    ///
    /// Holds the identifier's reassembly lock throughout and re-checks
    /// completeness under it, so when several uploads observe completion
    /// only the first one assembles.
    pub async fn assemble(&self, request: AssemblyRequest) -> Result<AssembledArtifact, UploadError> {
        let _guard = self.locks.acquire(&request.identifier).await;

        if request.identifier.is_empty()
            || !completion::is_complete(
                self.config.root(),
                &request.identifier,
                request.verified_total_chunks,
            )
        {
            return Err(UploadError::Incomplete {
                identifier: request.identifier,
            });
        }

        let root = self.config.root();
        let chunk_dir = session::session_dir(root, &request.identifier);

        // Only chunks 1..=verified belong to this file
        let verified = request.verified_total_chunks;
        let identifier = request.identifier.as_str();
        reassembler::discard_stale_chunks(&chunk_dir, |path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .and_then(|ext| ext.parse::<u64>().ok())
                .is_some_and(|n| {
                    (1..=verified).contains(&n) && session::chunk_filename(root, identifier, n) == path
                })
        })
        .await?;

        let reassembled = reassembler::reassemble(&chunk_dir, &request.destination).await?;

        if reassembled.size != request.total_size {
            warn!(
                "Assembled '{}' is {} bytes, expected {}",
                request.identifier, reassembled.size, request.total_size
            );
            discard_artifact(&reassembled.path).await;
            return Err(UploadError::SizeMismatch {
                expected: request.total_size,
                actual: reassembled.size,
            });
        }

        if let Some(expected) = &request.expected_md5 {
            if *expected != reassembled.md5 {
                warn!("Assembled '{}' digest mismatch", request.identifier);
                discard_artifact(&reassembled.path).await;
                return Err(UploadError::DigestMismatch {
                    expected: expected.clone(),
                    actual: reassembled.md5,
                });
            }
        }

        Ok(AssembledArtifact {
            identifier: request.identifier,
            filename: request.filename,
            path: reassembled.path,
            size: reassembled.size,
            md5: reassembled.md5,
            sha256: reassembled.sha256,
            chunk_count: reassembled.chunk_count,
            assembled_at: Utc::now(),
        })
    }
}

/// Remove an artifact that failed whole-file verification
async fn discard_artifact(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!("Removed corrupt artifact {:?}", path),
        Err(e) => warn!("Failed to remove corrupt artifact {:?}: {}", path, e),
    }
}

/// File name for an assembled artifact derived from the untrusted client
/// file name, falling back to the identifier
pub fn safe_artifact_name(filename: &str, identifier: &str) -> String {
    let safe: String = filename
        .replace(['/', '\\', '\0'], "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.' || *c == '-')
        .collect();

    // No hidden files, limit to 255 characters
    let trimmed: String = safe.trim_start_matches('.').chars().take(255).collect();

    if trimmed.is_empty() {
        identifier.to_string()
    } else {
        trimmed
    }
}

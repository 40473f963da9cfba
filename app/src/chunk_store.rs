// ==============================================================================
// chunk_store.rs - Chunk Storage
// ==============================================================================
// Description: Stages chunk payloads and moves them to deterministic names
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::UploadError;

/// A received payload sitting in the staging directory.
///
/// Dropping it without [`ChunkStore::commit`] deletes the staged file, so a
/// rejected chunk leaves nothing behind.
#[derive(Debug)]
pub struct StagedChunk {
    file: NamedTempFile,
    len: u64,
}

impl StagedChunk {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of payload bytes received
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Filesystem chunk store rooted at one upload directory
#[derive(Debug, Clone)]
pub struct ChunkStore {
    staging_dir: PathBuf,
}

impl ChunkStore {
    /// `staging_dir` must live on the same filesystem as the session
    /// directories so that commits are plain renames.
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
        }
    }

    /// Write a payload to a fresh file in the staging directory
    pub fn stage(&self, payload: &[u8]) -> Result<StagedChunk, UploadError> {
        let mut file = NamedTempFile::new_in(&self.staging_dir).map_err(UploadError::Staging)?;
        file.write_all(payload).map_err(UploadError::Staging)?;
        file.as_file().sync_all().map_err(UploadError::Staging)?;

        debug!("Staged {} bytes at {:?}", payload.len(), file.path());

        Ok(StagedChunk {
            file,
            len: payload.len() as u64,
        })
    }

    /// Move a staged payload to its final chunk name, replacing any earlier
    /// delivery of the same chunk
    pub fn commit(&self, staged: StagedChunk, chunk_path: &Path) -> Result<(), UploadError> {
        if let Some(session_dir) = chunk_path.parent() {
            std::fs::create_dir_all(session_dir)
                .map_err(|e| UploadError::io(session_dir, e))?;
        }

        staged
            .file
            .persist(chunk_path)
            .map_err(|e| UploadError::io(chunk_path, e.error))?;

        info!("Stored chunk {:?} ({} bytes)", chunk_path, staged.len);
        Ok(())
    }

    /// Whether a chunk has been stored under `chunk_path`
    pub fn contains(&self, chunk_path: &Path) -> bool {
        chunk_path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ChunkStore) {
        let root = tempfile::tempdir().unwrap();
        let staging = root.path().join(".staging");
        std::fs::create_dir_all(&staging).unwrap();
        (root, ChunkStore::new(staging))
    }

    #[test]
    fn test_stage_and_commit() {
        let (root, store) = store();
        let target = root.path().join("abc").join("resumable-abc.1");

        let staged = store.stage(b"chunk bytes").unwrap();
        assert_eq!(staged.len(), 11);
        assert!(!store.contains(&target));

        store.commit(staged, &target).unwrap();
        assert!(store.contains(&target));
        assert_eq!(std::fs::read(&target).unwrap(), b"chunk bytes");
    }

    #[test]
    fn test_dropped_stage_leaves_nothing() {
        let (root, store) = store();
        let staged = store.stage(b"rejected").unwrap();
        let staged_path = staged.path().to_path_buf();
        assert!(staged_path.exists());

        drop(staged);
        assert!(!staged_path.exists());
        assert_eq!(std::fs::read_dir(root.path().join(".staging")).unwrap().count(), 0);
    }

    #[test]
    fn test_duplicate_delivery_is_idempotent() {
        let (root, store) = store();
        let target = root.path().join("abc").join("resumable-abc.2");

        store.commit(store.stage(b"same content").unwrap(), &target).unwrap();
        let session_dir = root.path().join("abc");
        let first: Vec<_> = std::fs::read_dir(&session_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        store.commit(store.stage(b"same content").unwrap(), &target).unwrap();
        let second: Vec<_> = std::fs::read_dir(&session_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&target).unwrap(), b"same content");
    }
}

// ==============================================================================
// reassembler.rs - Chunk Reassembly
// ==============================================================================
// Description: Concatenates a session's chunks in natural order into one file
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use md5::Md5;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::checksum::DIGEST_BUFFER_SIZE;
use crate::error::UploadError;
use crate::natural_order;

/// Result of streaming every chunk into the destination file
#[derive(Debug, Clone)]
pub struct Reassembled {
    pub path: PathBuf,
    pub size: u64,
    pub md5: String,
    pub sha256: String,
    pub chunk_count: usize,
}

/// List the chunk files of one session directory in ascending natural order
pub async fn ordered_chunks(chunk_dir: &Path) -> Result<Vec<PathBuf>, UploadError> {
    let mut entries = tokio::fs::read_dir(chunk_dir)
        .await
        .map_err(|e| UploadError::io(chunk_dir, e))?;

    let mut chunks: Vec<(Option<String>, PathBuf)> = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| UploadError::io(chunk_dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| UploadError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }

        // Non UTF-8 names have no readable position and sort first
        chunks.push((entry.file_name().into_string().ok(), entry.path()));
    }

    chunks.sort_by(|(a, _), (b, _)| natural_order::compare(a.as_deref(), b.as_deref()));
    Ok(chunks.into_iter().map(|(_, path)| path).collect())
}

/// Delete every file in `chunk_dir` that `keep` rejects, returning how many
/// went. Leftovers from an earlier attempt at the same identifier would
/// otherwise be concatenated into the artifact.
pub async fn discard_stale_chunks(
    chunk_dir: &Path,
    keep: impl Fn(&Path) -> bool,
) -> Result<usize, UploadError> {
    let mut discarded = 0;
    for chunk_path in ordered_chunks(chunk_dir).await? {
        if keep(chunk_path.as_path()) {
            continue;
        }

        warn!("Discarding stale chunk {:?}", chunk_path);
        tokio::fs::remove_file(&chunk_path)
            .await
            .map_err(|e| UploadError::io(&chunk_path, e))?;
        discarded += 1;
    }
    Ok(discarded)
}

/// Stream every chunk in `chunk_dir` onto `destination`, deleting each chunk
/// once its bytes have been written.
///
/// `chunk_dir` must contain only this session's chunks. The destination is
/// not created when there is nothing to assemble, so a repeated call can't
/// truncate an earlier artifact. The emptied session directory is removed.
///
/// Callers must not run this concurrently for the same directory; see
/// [`crate::locks::ReassemblyLocks`].
pub async fn reassemble(chunk_dir: &Path, destination: &Path) -> Result<Reassembled, UploadError> {
    if !chunk_dir.exists() {
        return Err(UploadError::NothingToAssemble(chunk_dir.to_path_buf()));
    }

    let chunks = ordered_chunks(chunk_dir).await?;
    if chunks.is_empty() {
        return Err(UploadError::NothingToAssemble(chunk_dir.to_path_buf()));
    }

    info!("Reassembling {} chunks from {:?}", chunks.len(), chunk_dir);

    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| UploadError::io(parent, e))?;
    }

    let mut output = tokio::fs::File::create(destination)
        .await
        .map_err(|e| UploadError::io(destination, e))?;

    let mut md5 = Md5::new();
    let mut sha256 = Sha256::new();
    let mut size: u64 = 0;
    let mut buffer = vec![0u8; DIGEST_BUFFER_SIZE];

    for chunk_path in &chunks {
        let mut chunk = tokio::fs::File::open(chunk_path)
            .await
            .map_err(|e| UploadError::io(chunk_path, e))?;

        loop {
            let read = chunk
                .read(&mut buffer)
                .await
                .map_err(|e| UploadError::io(chunk_path, e))?;
            if read == 0 {
                break;
            }
            md5.update(&buffer[..read]);
            sha256.update(&buffer[..read]);
            output
                .write_all(&buffer[..read])
                .await
                .map_err(|e| UploadError::io(destination, e))?;
            size += read as u64;
        }

        // Bytes must be handed to the OS before the source goes away
        output
            .flush()
            .await
            .map_err(|e| UploadError::io(destination, e))?;
        drop(chunk);

        tokio::fs::remove_file(chunk_path)
            .await
            .map_err(|e| UploadError::io(chunk_path, e))?;

        debug!("Appended and removed {:?}", chunk_path);
    }

    output
        .sync_all()
        .await
        .map_err(|e| UploadError::io(destination, e))?;

    if let Err(e) = tokio::fs::remove_dir(chunk_dir).await {
        warn!("Failed to remove session directory {:?}: {}", chunk_dir, e);
    }

    let reassembled = Reassembled {
        path: destination.to_path_buf(),
        size,
        md5: format!("{:x}", md5.finalize()),
        sha256: format!("{:x}", sha256.finalize()),
        chunk_count: chunks.len(),
    };

    info!(
        "Reassembled {:?} ({} bytes, {} chunks, MD5: {})",
        reassembled.path, reassembled.size, reassembled.chunk_count, reassembled.md5
    );

    Ok(reassembled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::file_md5;
    use crate::session::chunk_filename;

    /// Deterministic pseudo-random content so chunk boundaries matter
    fn sample_bytes(len: usize) -> Vec<u8> {
        (0..len).map(|i| ((i * 31 + i / 7) % 251) as u8).collect()
    }

    #[tokio::test]
    async fn test_round_trip_reproduces_original() {
        let root = tempfile::tempdir().unwrap();
        let original = sample_bytes(12 * 100 + 37);

        // Write chunks out of order: 12 chunks, the last one carries the remainder
        let chunk_size = 100;
        let mut order: Vec<u64> = (1..=12).collect();
        order.reverse();
        order.swap(0, 5);
        for n in order {
            let start = ((n - 1) * chunk_size) as usize;
            let end = if n == 12 { original.len() } else { start + chunk_size as usize };
            let path = chunk_filename(root.path(), "abc", n);
            tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
            tokio::fs::write(&path, &original[start..end]).await.unwrap();
        }

        let source = root.path().join("original.bin");
        tokio::fs::write(&source, &original).await.unwrap();
        let expected_md5 = file_md5(&source).unwrap();

        let destination = root.path().join("out").join("sample.bin");
        let result = reassemble(&root.path().join("abc"), &destination).await.unwrap();

        assert_eq!(result.chunk_count, 12);
        assert_eq!(result.size, original.len() as u64);
        assert_eq!(result.md5, expected_md5);
        assert_eq!(file_md5(&destination).unwrap(), expected_md5);
        assert_eq!(tokio::fs::read(&destination).await.unwrap(), original);

        // Source chunks and the session directory are consumed
        assert!(!root.path().join("abc").exists());
    }

    #[tokio::test]
    async fn test_empty_directory_does_not_touch_destination() {
        let root = tempfile::tempdir().unwrap();
        let chunk_dir = root.path().join("abc");
        tokio::fs::create_dir_all(&chunk_dir).await.unwrap();

        let destination = root.path().join("artifact.bin");
        tokio::fs::write(&destination, b"previous artifact").await.unwrap();

        let result = reassemble(&chunk_dir, &destination).await;
        assert!(matches!(result, Err(UploadError::NothingToAssemble(_))));
        assert_eq!(tokio::fs::read(&destination).await.unwrap(), b"previous artifact");
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let result = reassemble(&root.path().join("absent"), &root.path().join("out")).await;
        assert!(matches!(result, Err(UploadError::NothingToAssemble(_))));
    }

    #[tokio::test]
    async fn test_discard_stale_chunks() {
        let root = tempfile::tempdir().unwrap();
        for n in 1..=6 {
            let path = chunk_filename(root.path(), "abc", n);
            tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
            tokio::fs::write(&path, b"x").await.unwrap();
        }

        let chunk_dir = root.path().join("abc");
        let wanted: Vec<_> = (1..=4).map(|n| chunk_filename(root.path(), "abc", n)).collect();
        let discarded = discard_stale_chunks(&chunk_dir, |p| wanted.iter().any(|w| w == p))
            .await
            .unwrap();

        assert_eq!(discarded, 2);
        assert_eq!(ordered_chunks(&chunk_dir).await.unwrap(), wanted);
    }

    #[tokio::test]
    async fn test_ordered_chunks_is_numeric() {
        let root = tempfile::tempdir().unwrap();
        for n in [10, 2, 1, 9] {
            let path = chunk_filename(root.path(), "abc", n);
            tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
            tokio::fs::write(&path, b"x").await.unwrap();
        }

        let ordered = ordered_chunks(&root.path().join("abc")).await.unwrap();
        let names: Vec<_> = ordered
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["resumable-abc.1", "resumable-abc.2", "resumable-abc.9", "resumable-abc.10"]
        );
    }
}

// ==============================================================================
// error.rs - Upload Engine Error Types
// ==============================================================================
// Description: Operational errors and client-facing rejections for uploads
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Operational failures of the upload engine.
///
/// These are raised to the surrounding pipeline (gateway, CLI). Anything a
/// client can recover from by retrying is a [`Rejection`] instead.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Upload root {path:?} is not usable: {source}")]
    UploadRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stage chunk payload: {0}")]
    Staging(#[source] std::io::Error),

    #[error("Session {identifier} is incomplete")]
    Incomplete { identifier: String },

    #[error("No chunk files to assemble in {0:?}")]
    NothingToAssemble(PathBuf),

    #[error("Assembled file digest {actual} does not match expected {expected}")]
    DigestMismatch { expected: String, actual: String },

    #[error("Assembled file is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UploadError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Broad class of a [`Rejection`], so clients can tell "retry this chunk"
/// apart from "send this chunk" and "fix the request".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// Missing/zero fields or size arithmetic that does not add up
    Protocol,
    /// Checksum mismatch or a storage failure while accepting a chunk
    Integrity,
    /// The probed chunk has not arrived yet
    NotYetAvailable,
}

/// Client-facing refusal of a status check or chunk upload.
///
/// The `Display` text is the message returned to clients verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Non-resumable request")]
    NonResumable,

    #[error("Incorrect chunk number")]
    IncorrectChunkNumber,

    #[error("File is larger than max file size")]
    FileTooLarge,

    #[error("Incorrect chunk size")]
    IncorrectChunkSize,

    #[error("Incorrect final chunk size")]
    IncorrectFinalChunkSize,

    #[error("Incorrect individual chunk size")]
    IncorrectIndividualChunkSize,

    #[error("Chunk {0} not uploaded yet")]
    ChunkNotUploaded(u64),

    #[error("Uploaded file checksum doesn't match original checksum")]
    ChecksumMismatch,

    #[error("Chunk {0} could not be stored")]
    ChunkNotStored(u64),
}

impl Rejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::ChunkNotUploaded(_) => RejectionKind::NotYetAvailable,
            Rejection::ChecksumMismatch | Rejection::ChunkNotStored(_) => RejectionKind::Integrity,
            _ => RejectionKind::Protocol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(Rejection::NonResumable.to_string(), "Non-resumable request");
        assert_eq!(
            Rejection::ChunkNotUploaded(3).to_string(),
            "Chunk 3 not uploaded yet"
        );
        assert_eq!(
            Rejection::ChecksumMismatch.to_string(),
            "Uploaded file checksum doesn't match original checksum"
        );
    }

    #[test]
    fn test_rejection_kinds() {
        assert_eq!(Rejection::IncorrectFinalChunkSize.kind(), RejectionKind::Protocol);
        assert_eq!(Rejection::ChecksumMismatch.kind(), RejectionKind::Integrity);
        assert_eq!(Rejection::ChunkNotStored(2).kind(), RejectionKind::Integrity);
        assert_eq!(
            Rejection::ChunkNotUploaded(1).kind(),
            RejectionKind::NotYetAvailable
        );
    }
}

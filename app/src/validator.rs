// ==============================================================================
// validator.rs - Chunk Request Validation
// ==============================================================================
// Description: Size/position arithmetic deciding whether a request is accepted
// Author: Matt Barham
// Created: 2025-10-31
// Modified: 2026-10-17
// Version: 2.0.0
// Security: Rejects anything not using the chunked protocol before any write
// ==============================================================================

use tracing::debug;

use crate::error::Rejection;
use crate::session::{number_of_chunks, SessionStatus};

/// Applies the chunk protocol rules to a parsed session status
#[derive(Debug, Clone, Default)]
pub struct RequestValidator {
    max_file_size: Option<u64>,
}

impl RequestValidator {
    pub fn new(max_file_size: Option<u64>) -> Self {
        Self { max_file_size }
    }

    /// Validate a request. `observed_chunk_size` is the payload length and is
    /// only supplied on the write path.
    ///
    /// Rules are checked in order and the first failure wins.
    pub fn validate(
        &self,
        status: &SessionStatus,
        observed_chunk_size: Option<u64>,
    ) -> Result<(), Rejection> {
        // 1. Chunked protocol fields present
        if status.chunk_number == 0
            || status.chunk_size == 0
            || status.total_size == 0
            || status.identifier.is_empty()
            || status.filename.is_empty()
        {
            return Err(Rejection::NonResumable);
        }

        // 2. Position within the server-computed chunk count
        let chunks = number_of_chunks(status.total_size, status.chunk_size);
        if status.chunk_number > chunks {
            return Err(Rejection::IncorrectChunkNumber);
        }

        // 3. Size policy
        if let Some(max) = self.max_file_size {
            if status.total_size > max {
                return Err(Rejection::FileTooLarge);
            }
        }

        // 4. Payload length against the expected width of this chunk
        if let Some(observed) = observed_chunk_size {
            if status.chunk_number < chunks && observed != status.chunk_size {
                return Err(Rejection::IncorrectChunkSize);
            }

            // The last chunk carries the remainder on top of a full chunk width.
            // More than one chunk means chunk_size <= total_size / 2, so the
            // sum cannot overflow.
            if chunks > 1 && status.chunk_number == chunks {
                let final_size = status.total_size % status.chunk_size + status.chunk_size;
                if observed != final_size {
                    return Err(Rejection::IncorrectFinalChunkSize);
                }
            }

            if chunks == 1 && observed != status.total_size {
                return Err(Rejection::IncorrectIndividualChunkSize);
            }
        }

        debug!(
            "Request valid: {} chunk {}/{}",
            status.identifier, status.chunk_number, chunks
        );
        Ok(())
    }
}

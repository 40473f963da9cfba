// ==============================================================================
// completion.rs - Session Completion Tracking
// ==============================================================================
// Description: Decides whether every chunk of a session is on disk
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use std::path::Path;
use tracing::debug;

use crate::session::chunk_filename;

/// True when chunk files 1 through `verified_total_chunks` all exist.
///
/// Stops at the first gap. Only probes existence, so it can run alongside
/// concurrent chunk writes; a scan that misses a just-written chunk reports
/// incomplete and the next arrival checks again.
pub fn is_complete(upload_root: &Path, identifier: &str, verified_total_chunks: u64) -> bool {
    let mut position = 1;
    while position <= verified_total_chunks {
        if !chunk_filename(upload_root, identifier, position).is_file() {
            debug!("Session {} missing chunk {}", identifier, position);
            return false;
        }
        position += 1;
    }
    true
}

/// Positions in `1..=verified_total_chunks` with no chunk file yet
pub fn missing_chunks(upload_root: &Path, identifier: &str, verified_total_chunks: u64) -> Vec<u64> {
    (1..=verified_total_chunks)
        .filter(|n| !chunk_filename(upload_root, identifier, *n).is_file())
        .collect()
}

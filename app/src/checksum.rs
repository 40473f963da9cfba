// ==============================================================================
// checksum.rs - Chunk Checksum Verification
// ==============================================================================
// Description: MD5 digests of on-disk chunks compared to client claims
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// Security: Fails closed - an unreadable file never verifies
// ==============================================================================

use md5::{Digest, Md5};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Read buffer for streaming digests
pub(crate) const DIGEST_BUFFER_SIZE: usize = 64 * 1024;

/// Compute the lower-case hex MD5 of a file, streaming its content
pub fn file_md5(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; DIGEST_BUFFER_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Whether the file at `path` has MD5 digest `claimed` (case-sensitive).
///
/// Any read failure reports a mismatch.
pub fn verify_md5(path: &Path, claimed: &str) -> bool {
    match file_md5(path) {
        Ok(actual) => {
            let matches = actual == claimed;
            if !matches {
                debug!("Checksum mismatch for {:?}: {} != {}", path, actual, claimed);
            }
            matches
        }
        Err(e) => {
            warn!("Checksum verification failed to read {:?}: {}", path, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // md5("The quick brown fox jumps over the lazy dog")
    const FOX_MD5: &str = "9e107d9d372bb6826bd81d3542a419d6";

    fn fox_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"The quick brown fox jumps over the lazy dog").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_known_digest_passes() {
        let file = fox_file();
        assert_eq!(file_md5(file.path()).unwrap(), FOX_MD5);
        assert!(verify_md5(file.path(), FOX_MD5));
    }

    #[test]
    fn test_single_byte_mutation_fails() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"The quick brown fox jumps over the lazy cog").unwrap();
        file.flush().unwrap();

        assert!(!verify_md5(file.path(), FOX_MD5));
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let file = fox_file();
        assert!(!verify_md5(file.path(), &FOX_MD5.to_uppercase()));
    }

    #[test]
    fn test_missing_file_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!verify_md5(&dir.path().join("absent"), FOX_MD5));
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(verify_md5(file.path(), "d41d8cd98f00b204e9800998ecf8427e"));
    }
}

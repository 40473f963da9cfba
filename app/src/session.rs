// ==============================================================================
// session.rs - Upload Session Parser
// ==============================================================================
// Description: Turns raw request fields into a normalized session status
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// Security: Identifier is reduced to [0-9A-Za-z_-] before touching any path
// ==============================================================================

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Prefix of every chunk file name
const CHUNK_PREFIX: &str = "resumable-";

/// Normalized view of one status-check or chunk-upload request.
///
/// Built fresh on every request; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub identifier: String,
    pub chunk_number: u64,
    pub total_chunks: u64,
    pub chunk_size: u64,
    pub total_size: u64,
    pub filename: String,
    pub original_filename: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub checksum: String,
    pub chunk_filename: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_total_chunks: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage_complete: Option<f64>,
    pub complete: bool,
}

impl SessionStatus {
    /// Parse request fields (query string or multipart text fields).
    ///
    /// Never fails: absent or malformed numbers become 0 and are left for the
    /// validator to reject.
    pub fn parse(fields: &HashMap<String, String>, upload_root: &Path) -> Self {
        let identifier = sanitize_identifier(field(fields, "identifier").unwrap_or(""));
        let chunk_number = numeric_field(fields, "chunkNumber");
        let total_chunks = numeric_field(fields, "totalChunks");
        let chunk_size = numeric_field(fields, "chunkSize");
        let total_size = numeric_field(fields, "totalSize");

        let verified_total_chunks = if total_size != 0 && chunk_size != 0 {
            Some(number_of_chunks(total_size, chunk_size))
        } else {
            None
        };

        let percentage_complete = if chunk_number != 0 && total_chunks != 0 {
            Some(chunk_number as f64 / total_chunks as f64 * 100.0)
        } else {
            None
        };

        let chunk_filename = chunk_filename(upload_root, &identifier, chunk_number);

        Self {
            identifier,
            chunk_number,
            total_chunks,
            chunk_size,
            total_size,
            filename: text_field(fields, "filename"),
            original_filename: text_field(fields, "originalFilename"),
            file_type: text_field(fields, "type"),
            checksum: text_field(fields, "checksum"),
            chunk_filename,
            verified_total_chunks,
            percentage_complete,
            complete: false,
        }
    }
}

/// Authoritative chunk count: the last chunk absorbs any remainder
pub fn number_of_chunks(total_size: u64, chunk_size: u64) -> u64 {
    if chunk_size == 0 {
        return 1;
    }
    (total_size / chunk_size).max(1)
}

/// Strip every character outside `[0-9A-Za-z_-]`
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Directory holding every chunk of one session
pub fn session_dir(upload_root: &Path, identifier: &str) -> PathBuf {
    upload_root.join(identifier)
}

/// Deterministic on-disk location of chunk `chunk_number` for `identifier`.
///
/// The position is the suffix after the last '.', which is what the
/// reassembler orders by.
pub fn chunk_filename(upload_root: &Path, identifier: &str, chunk_number: u64) -> PathBuf {
    session_dir(upload_root, identifier).join(format!(
        "{}{}.{}",
        CHUNK_PREFIX, identifier, chunk_number
    ))
}

/// Look up a field by its camelCase name, falling back to the
/// `resumable`-prefixed alias sent by resumable.js style clients
fn field<'a>(fields: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    if let Some(value) = fields.get(name) {
        return Some(value.as_str());
    }

    let mut alias = String::with_capacity(name.len() + 9);
    alias.push_str("resumable");
    let mut chars = name.chars();
    if let Some(first) = chars.next() {
        alias.push(first.to_ascii_uppercase());
        alias.extend(chars);
    }
    fields.get(&alias).map(String::as_str)
}

fn text_field(fields: &HashMap<String, String>, name: &str) -> String {
    field(fields, name).unwrap_or("").to_string()
}

fn numeric_field(fields: &HashMap<String, String>, name: &str) -> u64 {
    field(fields, name)
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("12345-sample_A.vcf.gz"), "12345-sample_Avcfgz");
        assert_eq!(sanitize_identifier("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_identifier("ünïcode 42"), "ncode42");
        assert_eq!(sanitize_identifier(""), "");
    }

    #[test]
    fn test_parse_full_request() {
        let root = Path::new("/data/uploads");
        let status = SessionStatus::parse(
            &fields(&[
                ("identifier", "7871146-sample1vcfgz"),
                ("chunkNumber", "3"),
                ("totalChunks", "7"),
                ("chunkSize", "1048576"),
                ("totalSize", "7871146"),
                ("filename", "sample1.vcf.gz"),
                ("originalFilename", "sample1.vcf.gz"),
                ("type", "application/gzip"),
                ("checksum", "d41d8cd98f00b204e9800998ecf8427e"),
            ]),
            root,
        );

        assert_eq!(status.identifier, "7871146-sample1vcfgz");
        assert_eq!(status.chunk_number, 3);
        assert_eq!(status.verified_total_chunks, Some(7));
        assert_eq!(status.file_type, "application/gzip");
        assert!(!status.complete);
        assert_eq!(
            status.chunk_filename,
            PathBuf::from("/data/uploads/7871146-sample1vcfgz/resumable-7871146-sample1vcfgz.3")
        );

        let pct = status.percentage_complete.unwrap();
        assert!((pct - 300.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_numbers_default_to_zero() {
        let status = SessionStatus::parse(
            &fields(&[
                ("identifier", "abc"),
                ("chunkNumber", "one"),
                ("chunkSize", "-5"),
                ("totalSize", ""),
            ]),
            Path::new("/tmp"),
        );

        assert_eq!(status.chunk_number, 0);
        assert_eq!(status.chunk_size, 0);
        assert_eq!(status.total_size, 0);
        assert_eq!(status.verified_total_chunks, None);
        assert_eq!(status.percentage_complete, None);
    }

    #[test]
    fn test_missing_identifier_is_empty() {
        let status = SessionStatus::parse(&fields(&[("chunkNumber", "1")]), Path::new("/tmp"));
        assert_eq!(status.identifier, "");
    }

    #[test]
    fn test_resumable_aliases() {
        let status = SessionStatus::parse(
            &fields(&[
                ("resumableIdentifier", "abc"),
                ("resumableChunkNumber", "2"),
                ("resumableFilename", "genome.txt"),
            ]),
            Path::new("/tmp"),
        );

        assert_eq!(status.identifier, "abc");
        assert_eq!(status.chunk_number, 2);
        assert_eq!(status.filename, "genome.txt");
    }

    #[test]
    fn test_verified_total_chunks_ignores_client_claim() {
        for k in 1..=20u64 {
            let total = (k * 1024).to_string();
            let status = SessionStatus::parse(
                &fields(&[
                    ("identifier", "abc"),
                    ("totalChunks", "999"),
                    ("chunkSize", "1024"),
                    ("totalSize", total.as_str()),
                ]),
                Path::new("/tmp"),
            );
            assert_eq!(status.verified_total_chunks, Some(k));
        }
    }

    #[test]
    fn test_small_file_is_one_chunk() {
        assert_eq!(number_of_chunks(251726, 1048576), 1);
        assert_eq!(number_of_chunks(7871146, 1048576), 7);
    }

    #[test]
    fn test_chunk_filename_is_reproducible() {
        let root = Path::new("/data/uploads");
        assert_eq!(chunk_filename(root, "abc", 12), chunk_filename(root, "abc", 12));
        assert_ne!(chunk_filename(root, "abc", 12), chunk_filename(root, "abc", 13));
    }

    #[test]
    fn test_serializes_protocol_field_names() {
        let status = SessionStatus::parse(
            &fields(&[("identifier", "abc"), ("type", "text/plain")]),
            Path::new("/tmp"),
        );
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["identifier"], "abc");
        assert_eq!(json["type"], "text/plain");
        assert!(json.get("chunkFilename").is_some());
        assert!(json.get("verifiedTotalChunks").is_none());
    }
}

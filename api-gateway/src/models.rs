// ==============================================================================
// models.rs - API Data Models
// ==============================================================================
// Description: Request/response models for the resumable upload API
// Author: Matt Barham
// Created: 2025-11-06
// Modified: 2026-10-17
// Version: 2.0.0
// ==============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use genetics_upload::{ChunkReceipt, Rejection, SessionStatus};

/// Status check response for a stored and verified chunk.
///
/// Mirrors [`SessionStatus`] minus the on-disk chunk path, which stays
/// server-side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCheckResponse {
    pub valid: bool,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_total_chunks: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage_complete: Option<f64>,
    pub complete: bool,
}

impl From<SessionStatus> for StatusCheckResponse {
    fn from(status: SessionStatus) -> Self {
        Self {
            valid: true,
            identifier: status.identifier,
            chunk_number: status.chunk_number,
            total_chunks: status.total_chunks,
            chunk_size: status.chunk_size,
            total_size: status.total_size,
            filename: status.filename,
            original_filename: status.original_filename,
            file_type: status.file_type,
            checksum: status.checksum,
            verified_total_chunks: status.verified_total_chunks,
            percentage_complete: status.percentage_complete,
            complete: status.complete,
        }
    }
}

/// Chunk upload response
#[derive(Debug, Serialize)]
pub struct ChunkUploadResponse {
    pub message: String,
    pub complete: bool,
}

impl From<ChunkReceipt> for ChunkUploadResponse {
    fn from(receipt: ChunkReceipt) -> Self {
        Self {
            message: receipt.message(),
            complete: receipt.complete,
        }
    }
}

/// Refused status check or chunk upload
#[derive(Debug, Serialize)]
pub struct RejectionResponse {
    pub valid: bool,
    pub message: String,
}

impl From<&Rejection> for RejectionResponse {
    fn from(rejection: &Rejection) -> Self {
        Self {
            valid: false,
            message: rejection.to_string(),
        }
    }
}

/// API information response
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub encrypted_volume: bool,
    pub upload_root: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

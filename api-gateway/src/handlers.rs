// ==============================================================================
// handlers.rs - API Request Handlers
// ==============================================================================
// Description: HTTP request handlers for resumable upload endpoints
// Author: Matt Barham
// Created: 2025-11-06
// Modified: 2026-10-17
// Version: 2.0.0
// ==============================================================================

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use genetics_upload::service::safe_artifact_name;
use genetics_upload::{AssemblyRequest, Rejection, RejectionKind, SessionStatus, UploadError};

use crate::{models::*, state::AppState};

/// Multipart field carrying the chunk bytes
const CHUNK_FIELD: &str = "file";

/// Root endpoint - API information
pub async fn root() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: "Genetics Upload Gateway",
        version: "2.0.0",
        endpoints: vec![
            "/api/genetics/health - Health check",
            "/api/genetics/ready - Readiness check",
            "/api/genetics/upload - Chunk status check (GET) or chunk upload (POST)",
        ],
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: "2.0.0",
        timestamp: Utc::now(),
    })
}

/// Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    // Check encrypted volume exists
    let volume_ready = state.encrypted_volume_path().exists();

    // Check upload root is writable
    let upload_root_ready = state
        .uploads()
        .stage(&[])
        .map(drop)
        .is_ok();

    let ready = volume_ready && upload_root_ready;

    let response = ReadinessResponse {
        ready,
        encrypted_volume: volume_ready,
        upload_root: upload_root_ready,
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Chunk status check (read path)
///
/// 200 when the chunk is stored and verified, 404 when it still has to be
/// sent.
pub async fn check_chunk(
    State(state): State<AppState>,
    Query(fields): Query<HashMap<String, String>>,
) -> Result<Json<StatusCheckResponse>, AppError> {
    let uploads = state.uploads().clone();

    let status = tokio::task::spawn_blocking(move || uploads.check_status(&fields))
        .await
        .map_err(|e| AppError::Internal(format!("Status check task failed: {}", e)))??;

    debug!(
        "Chunk {} of '{}' already uploaded",
        status.chunk_number, status.identifier
    );

    Ok(Json(status.into()))
}

/// Chunk upload (write path)
pub async fn upload_chunk(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ChunkUploadResponse>, AppError> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut chunk_data = None;

    // Process multipart form fields
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == CHUNK_FIELD {
            chunk_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read chunk data: {}", e)))?,
            );
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read {}: {}", name, e)))?;
            fields.insert(name, value);
        }
    }

    let chunk_data = chunk_data.ok_or_else(|| AppError::BadRequest("Missing chunk data".to_string()))?;

    let uploads = state.uploads().clone();
    let receipt = tokio::task::spawn_blocking(move || {
        let staged = uploads.stage(&chunk_data)?;
        Ok::<_, AppError>(uploads.upload_chunk(&fields, staged)?)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Chunk upload task failed: {}", e)))??;

    info!(
        "Chunk {} of '{}' uploaded (complete: {})",
        receipt.status.chunk_number, receipt.status.identifier, receipt.complete
    );

    if receipt.complete {
        spawn_assembly(state, receipt.status.clone());
    }

    Ok(Json(receipt.into()))
}

/// Reassemble a completed session in the background and hand the artifact
/// to the analysis sink; the upload response does not wait for it
fn spawn_assembly(state: AppState, status: SessionStatus) {
    let destination = state
        .processing_dir()
        .join(&status.identifier)
        .join(safe_artifact_name(&status.filename, &status.identifier));

    tokio::spawn(async move {
        let request = AssemblyRequest::for_session(&status, destination);

        match state.uploads().assemble(request).await {
            Ok(artifact) => {
                if let Err(e) = state.sink().artifact_ready(&artifact).await {
                    error!("Failed to hand off '{}': {:#}", artifact.identifier, e);
                }
            }
            Err(UploadError::Incomplete { identifier }) => {
                // Another completing chunk already assembled it
                debug!("Session '{}' already assembled", identifier);
            }
            Err(e) => {
                error!("Failed to assemble '{}': {}", status.identifier, e);
            }
        }
    });
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Rejected(Rejection),
    Internal(String),
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        AppError::Rejected(rejection)
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Rejected(rejection) => {
                let status = match rejection.kind() {
                    RejectionKind::Protocol => StatusCode::BAD_REQUEST,
                    RejectionKind::Integrity => StatusCode::CONFLICT,
                    RejectionKind::NotYetAvailable => StatusCode::NOT_FOUND,
                };
                if rejection.kind() != RejectionKind::NotYetAvailable {
                    warn!("Request rejected: {}", rejection);
                }
                (status, Json(RejectionResponse::from(&rejection))).into_response()
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(msg))).into_response()
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}

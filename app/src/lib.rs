// ==============================================================================
// lib.rs - Genetics Upload Engine Library
// ==============================================================================
// Description: Resumable chunked upload engine for genomic sample files
// Author: Matt Barham
// Created: 2025-11-03
// Modified: 2026-10-17
// Version: 2.0.0
// ==============================================================================

pub mod checksum;
pub mod chunk_store;
pub mod completion;
pub mod config;
pub mod error;
pub mod handoff;
pub mod locks;
pub mod natural_order;
pub mod reassembler;
pub mod service;
pub mod session;
pub mod validator;

pub use config::UploadConfig;
pub use error::{Rejection, RejectionKind, UploadError};
pub use handoff::{ArtifactSink, AssembledArtifact};
pub use service::{AssemblyRequest, ChunkReceipt, UploadService};
pub use session::SessionStatus;

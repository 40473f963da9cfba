// ==============================================================================
// main.rs - Genetics Upload Operator CLI
// ==============================================================================
// Description: Inspect and assemble chunked upload sessions from the shell
// Author: Matt Barham
// Created: 2025-10-31
// Modified: 2026-10-17
// Version: 2.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genetics_upload::completion::missing_chunks;
use genetics_upload::session::{number_of_chunks, sanitize_identifier};
use genetics_upload::{AssemblyRequest, UploadConfig, UploadService};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report which chunks of a session are on disk
    Inspect(SessionArgs),

    /// Reassemble a complete session into one file
    Assemble {
        #[command(flatten)]
        session: SessionArgs,

        /// Destination of the assembled file
        #[arg(short, long)]
        output: PathBuf,

        /// Expected MD5 of the whole file
        #[arg(long)]
        md5: Option<String>,
    },
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Upload root directory
    #[arg(short, long, env = "UPLOAD_ROOT")]
    root: PathBuf,

    /// Upload identifier (sanitized the same way as client requests)
    #[arg(short, long)]
    identifier: String,

    /// Chunk size in bytes
    #[arg(long)]
    chunk_size: u64,

    /// Total file size in bytes
    #[arg(long)]
    total_size: u64,
}

impl SessionArgs {
    fn identifier(&self) -> Result<String> {
        let identifier = sanitize_identifier(&self.identifier);
        if identifier.is_empty() {
            anyhow::bail!("Identifier '{}' is empty after sanitization", self.identifier);
        }
        Ok(identifier)
    }

    fn verified_total_chunks(&self) -> Result<u64> {
        if self.chunk_size == 0 || self.total_size == 0 {
            anyhow::bail!("chunk-size and total-size must be non-zero");
        }
        Ok(number_of_chunks(self.total_size, self.chunk_size))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genetics_upload=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Inspect(session) => {
            let identifier = session.identifier()?;
            let total = session.verified_total_chunks()?;
            let missing = missing_chunks(&session.root, &identifier, total);

            let report = serde_json::json!({
                "identifier": identifier,
                "verifiedTotalChunks": total,
                "present": total - missing.len() as u64,
                "missing": missing,
                "complete": missing.is_empty(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Assemble {
            session,
            output,
            md5,
        } => {
            let identifier = session.identifier()?;
            let verified_total_chunks = session.verified_total_chunks()?;
            let service = UploadService::new(UploadConfig::new(session.root.clone()))
                .context("Failed to open upload root")?;

            info!("Assembling '{}' into {:?}", identifier, output);

            let artifact = service
                .assemble(AssemblyRequest {
                    filename: output
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default(),
                    identifier,
                    verified_total_chunks,
                    total_size: session.total_size,
                    destination: output,
                    expected_md5: md5,
                })
                .await
                .context("Assembly failed")?;

            println!("{}", serde_json::to_string_pretty(&artifact)?);
        }
    }

    Ok(())
}

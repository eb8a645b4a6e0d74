//! Toonshelf CLI: inspect comic archives and upload episodes.
//!
//! Storage is configured from the environment (`STORAGE_BACKEND`, `S3_*`,
//! `LOCAL_STORAGE_*`); a `.env` file is honoured.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use toonshelf_cli::{init_tracing, read_sources, summarize_archive};
use toonshelf_core::{Config, ErrorMetadata};
use toonshelf_ingest::{BatchUploader, UploadSettings};
use toonshelf_storage::create_storage;

#[derive(Parser)]
#[command(name = "toonshelf", about = "Comic episode ingestion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the panels of a CBZ archive in reading order
    Inspect {
        /// Path to the archive
        archive: PathBuf,
    },
    /// Upload archives and images, printing every URL in order
    Upload {
        /// Owner id used as the key prefix
        #[arg(long)]
        owner: String,
        /// Files to upload (.cbz archives or images)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.json_logs());

    match cli.command {
        Commands::Inspect { archive } => {
            let bytes = tokio::fs::read(&archive)
                .await
                .with_context(|| format!("Failed to read {}", archive.display()))?;
            let summary = tokio::task::spawn_blocking(move || summarize_archive(&bytes))
                .await
                .context("Archive inspection task failed")?;

            match summary {
                Ok(summary) => print_json(&summary)?,
                Err(e) => {
                    e.log();
                    anyhow::bail!(e.client_message());
                }
            }
        }
        Commands::Upload { owner, files } => {
            config.validate().context("Invalid configuration")?;
            let storage = create_storage(&config)
                .await
                .context("Failed to initialize storage")?;
            let sources = read_sources(&files).await?;

            let uploader = BatchUploader::new(storage, UploadSettings::from_config(&config));
            match uploader.upload_all(&owner, sources).await {
                Ok(report) => print_json(&report)?,
                Err(failure) => {
                    failure.source.log();
                    print_json(&failure.report)?;
                    anyhow::bail!(
                        "{}: {}",
                        failure.file_name,
                        failure.source.client_message()
                    );
                }
            }
        }
    }

    Ok(())
}

use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use toonshelf_ingest::{ArchiveIngestor, IngestError, SkippedEntry, UploadSource};

#[derive(Debug, Serialize)]
pub struct PanelSummary {
    pub index: usize,
    pub name: String,
    pub mime_type: &'static str,
    pub size_bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct ArchiveSummary {
    pub panels: Vec<PanelSummary>,
    pub skipped: Vec<SkippedEntry>,
    pub ignored: usize,
}

/// Extract an archive and describe its panels. Buffers are released on return.
pub fn summarize_archive(archive_bytes: &[u8]) -> Result<ArchiveSummary, IngestError> {
    let extraction = ArchiveIngestor::new().extract_detailed(archive_bytes)?;
    let panels = extraction
        .panels
        .iter()
        .map(|panel| PanelSummary {
            index: panel.index(),
            name: panel.source_file_name().to_string(),
            mime_type: panel.handle().mime_type(),
            size_bytes: panel.handle().size().unwrap_or(0),
        })
        .collect();

    Ok(ArchiveSummary {
        panels,
        skipped: extraction.skipped,
        ignored: extraction.ignored,
    })
}

/// Read files from disk, keeping their order and using the bare file name.
pub async fn read_sources(paths: &[impl AsRef<Path>]) -> anyhow::Result<Vec<UploadSource>> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid file name: {}", path.display()))?;
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        sources.push(UploadSource::new(file_name, data));
    }
    Ok(sources)
}

/// Initialize tracing for the CLI. `RUST_LOG` overrides the default filter.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("toonshelf=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

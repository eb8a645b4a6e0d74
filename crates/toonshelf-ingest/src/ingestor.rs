//! Comic archive ingestion: extract → upload → release.

use std::io::{Cursor, Read, Seek};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use serde::Serialize;
use toonshelf_core::ImageKind;
use toonshelf_storage::keys::panel_storage_key;
use toonshelf_storage::{Storage, UploadOptions};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::entry::{classify_entry, EntryClass};
use crate::error::IngestError;
use crate::handle::{HandleLedger, ImageHandle};
use crate::natural::natural_cmp;
use crate::panel::Panel;

// Upper bound for pre-allocating an entry buffer from its declared size.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Entry that looked like an image but could not be inflated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

/// Result of extracting one archive.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Panels in reading order, indices `0..panels.len()`
    pub panels: Vec<Panel>,
    /// Image entries dropped because they failed to inflate
    pub skipped: Vec<SkippedEntry>,
    /// Entries that were not panel images (metadata, directories)
    pub ignored: usize,
}

/// Public URLs of uploaded panels, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub ordered_urls: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
enum EntryDecodeError {
    #[error("failed to open entry: {0}")]
    Open(#[source] ZipError),

    #[error("failed to inflate entry: {0}")]
    Inflate(#[source] std::io::Error),
}

/// Converts comic archives into panels and uploads them.
///
/// Cloning is cheap; clones share the [`HandleLedger`].
#[derive(Debug, Clone)]
pub struct ArchiveIngestor {
    ledger: Arc<HandleLedger>,
    cache_control_secs: u32,
    upsert: bool,
}

impl Default for ArchiveIngestor {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveIngestor {
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(HandleLedger::new()),
            cache_control_secs: 3600,
            upsert: false,
        }
    }

    pub fn with_cache_control_secs(mut self, secs: u32) -> Self {
        self.cache_control_secs = secs;
        self
    }

    pub fn with_upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    /// Acquisition/release counters for every handle this ingestor created.
    pub fn ledger(&self) -> &Arc<HandleLedger> {
        &self.ledger
    }

    /// Extract the image panels of a ZIP-format comic archive in reading order.
    ///
    /// An archive without images yields an empty list; deciding whether that
    /// is a failure is up to the caller.
    pub fn extract(&self, archive_bytes: &[u8]) -> Result<Vec<Panel>, IngestError> {
        self.extract_detailed(archive_bytes)
            .map(|extraction| extraction.panels)
    }

    /// Like [`extract`](Self::extract), also reporting skipped and ignored entries.
    pub fn extract_detailed(&self, archive_bytes: &[u8]) -> Result<Extraction, IngestError> {
        let start = std::time::Instant::now();
        let mut archive =
            ZipArchive::new(Cursor::new(archive_bytes)).map_err(IngestError::ArchiveFormat)?;

        let mut extraction = Extraction::default();
        let mut images: Vec<(usize, String, ImageKind)> = Vec::new();

        for entry_index in 0..archive.len() {
            let name = match archive.by_index_raw(entry_index) {
                Ok(entry) => entry.name().to_string(),
                Err(e) => {
                    tracing::warn!(
                        entry_index,
                        error = %e,
                        "Skipping unreadable archive entry header"
                    );
                    extraction.skipped.push(SkippedEntry {
                        name: format!("#{}", entry_index),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match classify_entry(&name) {
                EntryClass::Image(kind) => images.push((entry_index, name, kind)),
                EntryClass::Ignored => {
                    tracing::debug!(entry = %name, "Ignoring non-image archive entry");
                    extraction.ignored += 1;
                }
            }
        }

        images.sort_by(|a, b| natural_cmp(&a.1, &b.1));

        for (entry_index, name, kind) in images {
            match read_entry(&mut archive, entry_index) {
                Ok(data) => {
                    log_format_mismatch(&name, kind, &data);
                    let index = extraction.panels.len();
                    let handle = ImageHandle::acquire(data, kind, Arc::clone(&self.ledger));
                    extraction.panels.push(Panel::new(index, name, handle));
                }
                Err(e) => {
                    tracing::warn!(entry = %name, error = %e, "Skipping archive entry that failed to inflate");
                    extraction.skipped.push(SkippedEntry {
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            panel_count = extraction.panels.len(),
            skipped_count = extraction.skipped.len(),
            ignored_count = extraction.ignored,
            archive_size_bytes = archive_bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Comic archive extracted"
        );

        Ok(extraction)
    }

    /// Upload panels one at a time, in index order, under
    /// `{owner_id}/{session_id}-panel-{index:03}-{source_name}`.
    ///
    /// The first failed put aborts the whole call; no partial URL list is
    /// returned. Every panel is released before this returns, whatever the
    /// outcome.
    pub async fn upload_panels(
        &self,
        panels: &mut [Panel],
        owner_id: &str,
        session_id: &str,
        storage: &dyn Storage,
    ) -> Result<UploadResult, IngestError> {
        let start = std::time::Instant::now();
        let mut guard = ReleaseGuard::new(panels);
        let mut ordered_urls = Vec::with_capacity(guard.len());

        for panel in guard.iter_mut() {
            let url = self
                .upload_panel(panel, owner_id, session_id, storage)
                .await?;
            ordered_urls.push(url);
        }

        tracing::info!(
            owner_id = %owner_id,
            session_id = %session_id,
            panel_count = ordered_urls.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Panels uploaded"
        );

        Ok(UploadResult { ordered_urls })
    }

    async fn upload_panel(
        &self,
        panel: &mut Panel,
        owner_id: &str,
        session_id: &str,
        storage: &dyn Storage,
    ) -> Result<String, IngestError> {
        let index = panel.index();
        let data = panel
            .handle()
            .bytes()
            .cloned()
            .ok_or(IngestError::PanelReleased { index })?;

        let key = panel_storage_key(owner_id, session_id, index, panel.source_file_name());
        let options = UploadOptions::new(panel.handle().mime_type())
            .with_cache_control_secs(self.cache_control_secs)
            .with_upsert(self.upsert);

        let url = storage.put(&key, data, &options).await.map_err(|source| {
            tracing::warn!(
                panel_index = index,
                key = %key,
                error = %source,
                "Panel upload failed"
            );
            IngestError::Upload {
                index,
                file_name: panel.source_file_name().to_string(),
                source,
            }
        })?;

        panel.handle_mut().settle(url.clone());
        Ok(url)
    }

    /// Release every transient panel buffer. Safe to call any number of times.
    ///
    /// Returns how many buffers were actually freed by this call.
    pub fn release(panels: &mut [Panel]) -> usize {
        panels
            .iter_mut()
            .map(|panel| panel.handle_mut().release())
            .filter(|released| *released)
            .count()
    }
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    entry_index: usize,
) -> Result<Vec<u8>, EntryDecodeError> {
    let mut entry = archive
        .by_index(entry_index)
        .map_err(EntryDecodeError::Open)?;
    let mut data = Vec::with_capacity(entry.size().min(MAX_PREALLOCATION) as usize);
    entry
        .read_to_end(&mut data)
        .map_err(EntryDecodeError::Inflate)?;
    Ok(data)
}

fn log_format_mismatch(name: &str, kind: ImageKind, data: &[u8]) {
    let sniffed = match image::guess_format(data) {
        Ok(image::ImageFormat::Jpeg) => Some(ImageKind::Jpeg),
        Ok(image::ImageFormat::Png) => Some(ImageKind::Png),
        Ok(image::ImageFormat::WebP) => Some(ImageKind::Webp),
        Ok(image::ImageFormat::Gif) => Some(ImageKind::Gif),
        _ => None,
    };

    if sniffed != Some(kind) {
        tracing::debug!(
            entry = %name,
            extension_kind = ?kind,
            sniffed_kind = ?sniffed,
            "Panel content does not match its extension"
        );
    }
}

/// Releases every panel it wraps when dropped.
///
/// Holding the panels through the guard ties their cleanup to scope exit,
/// including early returns and a dropped (cancelled) upload future.
struct ReleaseGuard<'a> {
    panels: &'a mut [Panel],
}

impl<'a> ReleaseGuard<'a> {
    fn new(panels: &'a mut [Panel]) -> Self {
        Self { panels }
    }
}

impl Deref for ReleaseGuard<'_> {
    type Target = [Panel];

    fn deref(&self) -> &Self::Target {
        self.panels
    }
}

impl DerefMut for ReleaseGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.panels
    }
}

impl Drop for ReleaseGuard<'_> {
    fn drop(&mut self) {
        let released = ArchiveIngestor::release(self.panels);
        if released > 0 {
            tracing::debug!(released, "Released panels that were not uploaded");
        }
    }
}

//! Sequential upload of a mixed list of comic archives and plain images.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use toonshelf_core::{ErrorMetadata, ImageKind, UploadConfig};
use toonshelf_storage::keys::object_storage_key;
use toonshelf_storage::{Storage, UploadOptions};

use crate::error::IngestError;
use crate::handle::HandleLedger;
use crate::ingestor::ArchiveIngestor;
use crate::run::IngestionRun;
use crate::validator::UploadValidator;

const ARCHIVE_EXTENSION: &str = "cbz";

/// One file handed to the batch, as received from the user.
#[derive(Debug, Clone)]
pub struct UploadSource {
    pub file_name: String,
    pub data: Bytes,
}

impl UploadSource {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    pub fn is_comic_archive(&self) -> bool {
        is_comic_archive(&self.file_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Uploading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub file_name: String,
    pub status: FileStatus,
    /// Number of objects this file produced (panels for an archive, 1 otherwise)
    pub object_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-file progress plus the concatenated URL list.
///
/// `urls` is only populated when every file succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
    pub urls: Vec<String>,
}

impl BatchReport {
    fn pending(sources: &[UploadSource]) -> Self {
        Self {
            files: sources
                .iter()
                .map(|source| FileOutcome {
                    file_name: source.file_name.clone(),
                    status: FileStatus::Pending,
                    object_count: 0,
                    error: None,
                })
                .collect(),
            urls: Vec::new(),
        }
    }
}

/// A batch aborted at `file_name`. The report shows how far it got.
///
/// For an oversized batch, `file_name` is the first file over the limit.
#[derive(Debug, thiserror::Error)]
#[error("Batch upload failed at {file_name}: {source}")]
pub struct BatchFailure {
    pub file_name: String,
    pub report: BatchReport,
    #[source]
    pub source: IngestError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    pub max_file_size: usize,
    pub max_archive_size: usize,
    pub max_files: usize,
    pub allowed_extensions: Vec<String>,
    pub cache_control_secs: u32,
    pub upsert: bool,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            max_archive_size: 500 * 1024 * 1024,
            max_files: 50,
            allowed_extensions: ["jpg", "jpeg", "png", "webp"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            cache_control_secs: 3600,
            upsert: false,
        }
    }
}

impl UploadSettings {
    pub fn from_config(config: &dyn UploadConfig) -> Self {
        Self {
            max_file_size: config.max_file_size(),
            max_archive_size: config.max_archive_size(),
            max_files: config.max_files(),
            allowed_extensions: config.allowed_extensions().to_vec(),
            cache_control_secs: config.cache_control_secs(),
            upsert: config.upsert(),
        }
    }
}

pub struct BatchUploader {
    storage: Arc<dyn Storage>,
    settings: UploadSettings,
    ingestor: ArchiveIngestor,
    image_validator: UploadValidator,
    archive_validator: UploadValidator,
    clock: fn() -> i64,
}

impl BatchUploader {
    pub fn new(storage: Arc<dyn Storage>, settings: UploadSettings) -> Self {
        let ingestor = ArchiveIngestor::new()
            .with_cache_control_secs(settings.cache_control_secs)
            .with_upsert(settings.upsert);
        let image_validator =
            UploadValidator::new(settings.max_file_size, settings.allowed_extensions.clone());
        let archive_validator = UploadValidator::new(
            settings.max_archive_size,
            vec![ARCHIVE_EXTENSION.to_string()],
        );

        Self {
            storage,
            settings,
            ingestor,
            image_validator,
            archive_validator,
            clock: unix_millis,
        }
    }

    /// Replace the millisecond clock used for session ids and object keys.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn ledger(&self) -> &Arc<HandleLedger> {
        self.ingestor.ledger()
    }

    /// Upload every source in order and return all URLs in that order.
    ///
    /// The first failure stops the batch. Files after it stay `Pending` and the
    /// returned report carries no URLs. A batch larger than `max_files` is
    /// rejected before any upload.
    pub async fn upload_all(
        &self,
        owner_id: &str,
        sources: Vec<UploadSource>,
    ) -> Result<BatchReport, BatchFailure> {
        let start = std::time::Instant::now();
        let mut report = BatchReport::pending(&sources);
        let mut urls = Vec::new();

        if sources.len() > self.settings.max_files {
            let e = IngestError::TooManyFiles {
                count: sources.len(),
                max: self.settings.max_files,
            };
            tracing::warn!(
                owner_id = %owner_id,
                file_count = sources.len(),
                max_files = self.settings.max_files,
                "Batch rejected"
            );
            return Err(BatchFailure {
                file_name: sources[self.settings.max_files].file_name.clone(),
                report,
                source: e,
            });
        }

        for (position, source) in sources.into_iter().enumerate() {
            report.files[position].status = FileStatus::Uploading;
            tracing::debug!(
                file_name = %source.file_name,
                position,
                size_bytes = source.data.len(),
                "Uploading batch file"
            );

            let result = if source.is_comic_archive() {
                self.upload_archive(owner_id, position, &source).await
            } else {
                self.upload_image(owner_id, &source).await.map(|url| vec![url])
            };

            let outcome = &mut report.files[position];
            match result {
                Ok(file_urls) => {
                    outcome.status = FileStatus::Success;
                    outcome.object_count = file_urls.len();
                    urls.extend(file_urls);
                }
                Err(e) => {
                    outcome.status = FileStatus::Error;
                    outcome.error = Some(e.client_message());
                    tracing::warn!(
                        owner_id = %owner_id,
                        file_name = %source.file_name,
                        position,
                        error_code = e.error_code(),
                        error = %e,
                        "Batch upload aborted"
                    );
                    return Err(BatchFailure {
                        file_name: source.file_name,
                        report,
                        source: e,
                    });
                }
            }
        }

        tracing::info!(
            owner_id = %owner_id,
            file_count = report.files.len(),
            url_count = urls.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Batch upload completed"
        );

        report.urls = urls;
        Ok(report)
    }

    async fn upload_archive(
        &self,
        owner_id: &str,
        position: usize,
        source: &UploadSource,
    ) -> Result<Vec<String>, IngestError> {
        self.archive_validator
            .validate_all(&source.file_name, source.data.len())
            .map_err(|e| IngestError::Validation {
                file_name: source.file_name.clone(),
                source: e,
            })?;

        let mut run = IngestionRun::new(self.ingestor.clone());
        let panel_count = run.extract(source.data.clone()).await?;
        if panel_count == 0 {
            return Err(IngestError::NoImagesFound {
                file_name: source.file_name.clone(),
            });
        }

        let session_id = format!("episode_{}_{}", (self.clock)(), position);
        let result = run
            .upload(owner_id, &session_id, self.storage.as_ref())
            .await?;
        Ok(result.ordered_urls)
    }

    async fn upload_image(
        &self,
        owner_id: &str,
        source: &UploadSource,
    ) -> Result<String, IngestError> {
        self.image_validator
            .validate_all(&source.file_name, source.data.len())
            .map_err(|e| IngestError::Validation {
                file_name: source.file_name.clone(),
                source: e,
            })?;

        let content_type = ImageKind::from_file_name(&source.file_name)
            .map(|kind| kind.mime_type())
            .unwrap_or("application/octet-stream");
        let key = object_storage_key(owner_id, &source.file_name, (self.clock)());
        let options = UploadOptions::new(content_type)
            .with_cache_control_secs(self.settings.cache_control_secs)
            .with_upsert(self.settings.upsert);

        self.storage
            .put(&key, source.data.clone(), &options)
            .await
            .map_err(|e| IngestError::ObjectUpload {
                file_name: source.file_name.clone(),
                source: e,
            })
    }
}

fn is_comic_archive(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

fn unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_detection_is_case_insensitive() {
        assert!(is_comic_archive("chapter1.cbz"));
        assert!(is_comic_archive("Chapter 1.CBZ"));
        assert!(!is_comic_archive("cover.png"));
        assert!(!is_comic_archive("cbz"));
        assert!(!is_comic_archive("chapter1.cbz.png"));
    }

    #[test]
    fn test_default_settings() {
        let settings = UploadSettings::default();
        assert_eq!(settings.max_file_size, 10 * 1024 * 1024);
        assert_eq!(settings.max_files, 50);
        assert_eq!(settings.cache_control_secs, 3600);
        assert!(!settings.upsert);
        assert_eq!(settings.allowed_extensions, vec!["jpg", "jpeg", "png", "webp"]);
    }

    #[test]
    fn test_pending_report_has_no_urls() {
        let sources = vec![
            UploadSource::new("a.png", vec![1u8]),
            UploadSource::new("b.cbz", vec![2u8]),
        ];
        let report = BatchReport::pending(&sources);
        assert!(report.urls.is_empty());
        assert!(report
            .files
            .iter()
            .all(|f| f.status == FileStatus::Pending && f.object_count == 0));
    }

    #[test]
    fn test_file_status_serializes_lowercase() {
        let outcome = FileOutcome {
            file_name: "a.png".to_string(),
            status: FileStatus::Success,
            object_count: 1,
            error: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("error").is_none());
    }
}

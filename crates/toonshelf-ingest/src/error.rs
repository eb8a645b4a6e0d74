//! Ingest error types.

use crate::run::RunState;
use crate::validator::ValidationError;
use toonshelf_core::{ErrorMetadata, LogLevel};
use toonshelf_storage::StorageError;

/// Errors surfaced by extraction, upload and batch orchestration.
///
/// Failures to inflate a single entry are not here: they are logged and the
/// entry is skipped (see [`SkippedEntry`](crate::SkippedEntry)).
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Invalid comic archive: {0}")]
    ArchiveFormat(#[source] zip::result::ZipError),

    #[error("No images found in {file_name}")]
    NoImagesFound { file_name: String },

    #[error("Failed to upload panel {index} ({file_name}): {source}")]
    Upload {
        index: usize,
        file_name: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to upload {file_name}: {source}")]
    ObjectUpload {
        file_name: String,
        #[source]
        source: StorageError,
    },

    #[error("Panel {index} was released before upload")]
    PanelReleased { index: usize },

    #[error("Too many files in one batch: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("Validation failed for {file_name}: {source}")]
    Validation {
        file_name: String,
        #[source]
        source: ValidationError,
    },

    #[error("Cannot {operation} an ingestion run in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: RunState,
    },

    #[error("Background task failed: {0}")]
    Task(String),
}

impl IngestError {
    /// Panel index for upload failures
    pub fn panel_index(&self) -> Option<usize> {
        match self {
            IngestError::Upload { index, .. } | IngestError::PanelReleased { index } => {
                Some(*index)
            }
            _ => None,
        }
    }
}

impl ErrorMetadata for IngestError {
    fn error_code(&self) -> &'static str {
        match self {
            IngestError::ArchiveFormat(_) => "ARCHIVE_FORMAT_ERROR",
            IngestError::NoImagesFound { .. } => "NO_IMAGES_FOUND",
            IngestError::Upload { .. } | IngestError::ObjectUpload { .. } => "UPLOAD_ERROR",
            IngestError::PanelReleased { .. } => "PANEL_RELEASED",
            IngestError::Validation { .. } | IngestError::TooManyFiles { .. } => {
                "VALIDATION_ERROR"
            }
            IngestError::InvalidState { .. } => "INVALID_STATE",
            IngestError::Task(_) => "INTERNAL_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            IngestError::Upload { source, .. } | IngestError::ObjectUpload { source, .. } => {
                !matches!(
                    source,
                    StorageError::AlreadyExists(_) | StorageError::InvalidKey(_)
                )
            }
            IngestError::Task(_) => true,
            _ => false,
        }
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            IngestError::ArchiveFormat(_) => Some("Re-export the comic as a CBZ (ZIP) archive"),
            IngestError::NoImagesFound { .. } => {
                Some("Add JPG, PNG, WebP or GIF pages to the archive")
            }
            IngestError::Upload { .. } | IngestError::ObjectUpload { .. } => {
                Some("Retry the upload")
            }
            IngestError::Validation { .. } => Some("Check the file type and size"),
            IngestError::TooManyFiles { .. } => Some("Split the upload into smaller batches"),
            _ => None,
        }
    }

    fn client_message(&self) -> String {
        match self {
            IngestError::ArchiveFormat(_) => {
                "Failed to process CBZ file. Please ensure it is a valid CBZ archive.".to_string()
            }
            IngestError::NoImagesFound { .. } => "No images found in CBZ file".to_string(),
            IngestError::Upload {
                index, file_name, ..
            } => format!("Failed to upload panel {} ({})", index, file_name),
            IngestError::ObjectUpload { file_name, .. } => {
                format!("Failed to upload {}", file_name)
            }
            IngestError::Validation { source, .. } => source.to_string(),
            IngestError::TooManyFiles { max, .. } => {
                format!("Too many files. You can upload at most {} at once.", max)
            }
            IngestError::PanelReleased { .. }
            | IngestError::InvalidState { .. }
            | IngestError::Task(_) => "An internal error occurred".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            IngestError::NoImagesFound { .. }
            | IngestError::Validation { .. }
            | IngestError::TooManyFiles { .. } => LogLevel::Debug,
            IngestError::ArchiveFormat(_)
            | IngestError::Upload { .. }
            | IngestError::ObjectUpload { .. } => LogLevel::Warn,
            IngestError::PanelReleased { .. }
            | IngestError::InvalidState { .. }
            | IngestError::Task(_) => LogLevel::Error,
        }
    }
}

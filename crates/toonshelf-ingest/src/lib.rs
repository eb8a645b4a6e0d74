//! Toonshelf Ingest Library
//!
//! Turns an uploaded comic archive (CBZ) into reading-ordered panels and
//! pushes them to a [`Storage`](toonshelf_storage::Storage) backend.
//!
//! - [`ArchiveIngestor`] extracts, uploads and releases panels.
//! - [`IngestionRun`] wraps one archive in an explicit state machine.
//! - [`BatchUploader`] sequences a mixed list of archives and plain images.

pub mod batch;
pub mod entry;
pub mod error;
pub mod handle;
pub mod ingestor;
pub mod natural;
pub mod panel;
pub mod run;
pub mod validator;

// Re-export commonly used types
pub use batch::{
    BatchFailure, BatchReport, BatchUploader, FileOutcome, FileStatus, UploadSettings,
    UploadSource,
};
pub use entry::{classify_entry, EntryClass};
pub use error::IngestError;
pub use handle::{HandleLedger, ImageHandle};
pub use ingestor::{ArchiveIngestor, Extraction, SkippedEntry, UploadResult};
pub use natural::natural_cmp;
pub use panel::Panel;
pub use run::{IngestionRun, RunState};
pub use validator::{UploadValidator, ValidationError};

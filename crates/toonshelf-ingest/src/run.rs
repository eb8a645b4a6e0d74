//! One archive's trip from bytes to stored panels, as an explicit state machine.
//!
//! `Idle → Extracting → Extracted → Uploading → {Completed | Failed}`.
//! `release` is accepted in every state. There is no cancelled state: an
//! abandoned run is simply dropped, which releases whatever it still holds.

use bytes::Bytes;
use serde::Serialize;
use toonshelf_storage::Storage;

use crate::error::IngestError;
use crate::ingestor::{ArchiveIngestor, UploadResult};
use crate::panel::Panel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Extracting,
    Extracted,
    Uploading,
    Completed,
    Failed,
}

pub struct IngestionRun {
    ingestor: ArchiveIngestor,
    state: RunState,
    panels: Vec<Panel>,
}

impl IngestionRun {
    pub fn new(ingestor: ArchiveIngestor) -> Self {
        Self {
            ingestor,
            state: RunState::Idle,
            panels: Vec::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Extract the archive on the blocking pool. Returns the panel count.
    pub async fn extract(&mut self, archive: Bytes) -> Result<usize, IngestError> {
        self.expect_state(RunState::Idle, "extract")?;
        self.transition(RunState::Extracting);

        let ingestor = self.ingestor.clone();
        let result = tokio::task::spawn_blocking(move || ingestor.extract(&archive))
            .await
            .map_err(|e| IngestError::Task(format!("Archive extraction panicked: {}", e)))
            .and_then(|extracted| extracted);

        match result {
            Ok(panels) => {
                self.panels = panels;
                self.transition(RunState::Extracted);
                Ok(self.panels.len())
            }
            Err(e) => {
                self.transition(RunState::Failed);
                Err(e)
            }
        }
    }

    /// Upload the extracted panels. Panels are released whatever the outcome.
    pub async fn upload(
        &mut self,
        owner_id: &str,
        session_id: &str,
        storage: &dyn Storage,
    ) -> Result<UploadResult, IngestError> {
        self.expect_state(RunState::Extracted, "upload")?;
        self.transition(RunState::Uploading);

        let result = self
            .ingestor
            .upload_panels(&mut self.panels, owner_id, session_id, storage)
            .await;

        self.transition(if result.is_ok() {
            RunState::Completed
        } else {
            RunState::Failed
        });
        result
    }

    /// Release every transient panel buffer. Valid in any state, idempotent.
    pub fn release(&mut self) -> usize {
        ArchiveIngestor::release(&mut self.panels)
    }

    fn expect_state(&self, expected: RunState, operation: &'static str) -> Result<(), IngestError> {
        if self.state != expected {
            return Err(IngestError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = ?self.state, to = ?next, "Ingestion run state change");
        self.state = next;
    }
}

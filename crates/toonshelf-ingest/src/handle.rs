//! Ownership handles for decoded panel bytes.
//!
//! A panel's bytes live in memory from extraction until they are either handed
//! to storage (the handle then becomes a reference to the public URL) or
//! explicitly released. Each transient buffer is released exactly once, and a
//! [`HandleLedger`] shared by all handles of an ingestor counts acquisitions and
//! releases so leaks are observable.

use bytes::Bytes;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use toonshelf_core::ImageKind;

/// Counters for transient buffers handed out and released.
#[derive(Debug, Default)]
pub struct HandleLedger {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl HandleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transient buffers ever created
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// Number of transient buffers released so far
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Transient buffers still held somewhere
    pub fn live(&self) -> usize {
        self.acquired().saturating_sub(self.released())
    }

    fn record_acquire(&self) {
        self.acquired.fetch_add(1, Ordering::SeqCst);
    }

    fn record_release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

enum HandleState {
    /// Decoded bytes owned by this process
    Transient(Bytes),
    /// Uploaded; only the public URL remains
    Remote(String),
    /// Bytes freed without an upload
    Released,
}

/// Exclusive handle over one panel image.
pub struct ImageHandle {
    kind: ImageKind,
    state: HandleState,
    ledger: Arc<HandleLedger>,
}

impl ImageHandle {
    /// Take ownership of freshly inflated bytes.
    pub fn acquire(data: impl Into<Bytes>, kind: ImageKind, ledger: Arc<HandleLedger>) -> Self {
        ledger.record_acquire();
        Self {
            kind,
            state: HandleState::Transient(data.into()),
            ledger,
        }
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }

    /// The decoded bytes, while the handle still owns them.
    pub fn bytes(&self) -> Option<&Bytes> {
        match &self.state {
            HandleState::Transient(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Size of the owned buffer; `None` once uploaded or released.
    pub fn size(&self) -> Option<usize> {
        self.bytes().map(Bytes::len)
    }

    /// Public URL, once the panel has been uploaded.
    pub fn remote_url(&self) -> Option<&str> {
        match &self.state {
            HandleState::Remote(url) => Some(url),
            _ => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self.state, HandleState::Transient(_))
    }

    pub fn is_released(&self) -> bool {
        matches!(self.state, HandleState::Released)
    }

    /// Free the transient buffer.
    ///
    /// Returns `true` if a buffer was freed. Remote references and handles
    /// that were already released are left untouched.
    pub fn release(&mut self) -> bool {
        if !self.is_transient() {
            return false;
        }
        self.state = HandleState::Released;
        self.ledger.record_release();
        true
    }

    /// Replace the transient buffer with the URL it was uploaded to.
    ///
    /// Counts as the handle's release. Returns `false` (and keeps the current
    /// state) if the handle no longer owns a buffer.
    pub fn settle(&mut self, url: String) -> bool {
        if !self.is_transient() {
            return false;
        }
        self.state = HandleState::Remote(url);
        self.ledger.record_release();
        true
    }
}

impl Drop for ImageHandle {
    fn drop(&mut self) {
        if self.release() {
            tracing::debug!(kind = ?self.kind, "Transient panel buffer released on drop");
        }
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            HandleState::Transient(bytes) => format!("Transient({} bytes)", bytes.len()),
            HandleState::Remote(url) => format!("Remote({})", url),
            HandleState::Released => "Released".to_string(),
        };
        f.debug_struct("ImageHandle")
            .field("kind", &self.kind)
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(ledger: &Arc<HandleLedger>) -> ImageHandle {
        ImageHandle::acquire(vec![1u8, 2, 3], ImageKind::Png, Arc::clone(ledger))
    }

    #[test]
    fn test_release_is_idempotent() {
        let ledger = Arc::new(HandleLedger::new());
        let mut h = handle(&ledger);
        assert_eq!(h.size(), Some(3));
        assert_eq!(ledger.live(), 1);

        assert!(h.release());
        assert!(!h.release());
        assert!(h.is_released());
        assert_eq!(h.bytes(), None);
        assert_eq!(ledger.released(), 1);
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn test_settle_counts_as_release() {
        let ledger = Arc::new(HandleLedger::new());
        let mut h = handle(&ledger);

        assert!(h.settle("https://cdn/u1/a.png".to_string()));
        assert_eq!(h.remote_url(), Some("https://cdn/u1/a.png"));
        assert_eq!(ledger.released(), 1);

        // Remote references are not process-local resources
        assert!(!h.release());
        assert_eq!(h.remote_url(), Some("https://cdn/u1/a.png"));
        assert_eq!(ledger.released(), 1);
    }

    #[test]
    fn test_settle_after_release_is_rejected() {
        let ledger = Arc::new(HandleLedger::new());
        let mut h = handle(&ledger);
        h.release();
        assert!(!h.settle("https://cdn/x".to_string()));
        assert!(h.is_released());
        assert_eq!(ledger.released(), 1);
    }

    #[test]
    fn test_drop_releases_transient_buffer_once() {
        let ledger = Arc::new(HandleLedger::new());
        {
            let _a = handle(&ledger);
            let mut b = handle(&ledger);
            b.release();
        }
        assert_eq!(ledger.acquired(), 2);
        assert_eq!(ledger.released(), 2);
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn test_debug_does_not_dump_bytes() {
        let ledger = Arc::new(HandleLedger::new());
        let h = handle(&ledger);
        let rendered = format!("{:?}", h);
        assert!(rendered.contains("Transient(3 bytes)"));
    }
}

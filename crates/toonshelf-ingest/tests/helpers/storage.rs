use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;
use toonshelf_storage::{Storage, StorageBackend, StorageError, StorageResult, UploadOptions};

#[derive(Debug, Clone)]
pub struct RecordedPut {
    pub key: String,
    pub size: usize,
    pub options: UploadOptions,
}

/// In-memory storage that records every put attempt.
///
/// With `failing_on(n)`, the n-th attempt (0-based) fails with `UploadFailed`.
#[derive(Default)]
pub struct RecordingStorage {
    puts: Mutex<Vec<RecordedPut>>,
    fail_on_put: Option<usize>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(attempt: usize) -> Self {
        Self {
            fail_on_put: Some(attempt),
            ..Self::default()
        }
    }

    pub fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.puts().into_iter().map(|p| p.key).collect()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn put(
        &self,
        storage_key: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<String> {
        let attempt = {
            let mut puts = self.puts.lock().unwrap();
            puts.push(RecordedPut {
                key: storage_key.to_string(),
                size: data.len(),
                options: options.clone(),
            });
            puts.len() - 1
        };

        if self.fail_on_put == Some(attempt) {
            return Err(StorageError::UploadFailed(format!(
                "simulated failure for {}",
                storage_key
            )));
        }

        self.public_url(storage_key)
    }

    fn public_url(&self, storage_key: &str) -> StorageResult<String> {
        Ok(format!("https://storage.test/{}", storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        Err(StorageError::NotFound(storage_key.to_string()))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self
            .puts
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.key == storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Storage whose `put` never completes, for timeout and cancellation tests.
#[derive(Default)]
pub struct StalledStorage {
    attempts: Mutex<Vec<String>>,
}

impl StalledStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for StalledStorage {
    async fn put(
        &self,
        storage_key: &str,
        _data: Bytes,
        _options: &UploadOptions,
    ) -> StorageResult<String> {
        self.attempts.lock().unwrap().push(storage_key.to_string());
        std::future::pending().await
    }

    fn public_url(&self, storage_key: &str) -> StorageResult<String> {
        Ok(format!("https://storage.test/{}", storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        Err(StorageError::NotFound(storage_key.to_string()))
    }

    async fn exists(&self, _storage_key: &str) -> StorageResult<bool> {
        Ok(false)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

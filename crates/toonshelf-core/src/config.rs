//! Configuration module
//!
//! Configuration is read from the environment (after loading `.env` if present)
//! and covers the storage backend, upload behaviour and logging.

use std::env;

use crate::storage_types::StorageBackend;

const MAX_FILE_SIZE_MB: usize = 10;
const MAX_ARCHIVE_SIZE_MB: usize = 500;
const MAX_FILES: usize = 50;
const UPLOAD_CACHE_CONTROL_SECS: u32 = 3600;
const DEFAULT_ALLOWED_EXTENSIONS: &str = "jpg,jpeg,png,webp";

/// Upload limits and behaviour consumed by the batch uploader.
pub trait UploadConfig {
    /// Cap for a single plain image, in bytes
    fn max_file_size(&self) -> usize;
    /// Cap for a single comic archive, in bytes
    fn max_archive_size(&self) -> usize;
    /// Most files accepted in one batch
    fn max_files(&self) -> usize;
    /// Lowercase extensions accepted for plain image uploads
    fn allowed_extensions(&self) -> &[String];
    /// `Cache-Control: max-age` attached to every stored object
    fn cache_control_secs(&self) -> u32;
    /// Whether an upload may overwrite an existing object
    fn upsert(&self) -> bool;
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, Supabase, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload configuration
    pub max_file_size_bytes: usize,
    pub max_archive_size_bytes: usize,
    pub max_files: usize,
    pub allowed_extensions: Vec<String>,
    pub cache_control_secs: u32,
    pub upsert: bool,
    // Logging
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend = match var("STORAGE_BACKEND") {
            Some(raw) => Some(raw.parse::<StorageBackend>()?),
            None => None,
        };

        let max_file_size_mb = var("MAX_FILE_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_FILE_SIZE_MB);

        let max_archive_size_mb = var("MAX_ARCHIVE_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_ARCHIVE_SIZE_MB);

        let max_files = var("MAX_FILES")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_FILES);

        let allowed_extensions = var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSIONS.to_string())
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let cache_control_secs = var("UPLOAD_CACHE_CONTROL_SECS")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(UPLOAD_CACHE_CONTROL_SECS);

        let upsert = var("UPLOAD_UPSERT")
            .map(|s| s.eq_ignore_ascii_case("true") || s == "1")
            .unwrap_or(false);

        Ok(Config {
            storage_backend,
            s3_bucket: var("S3_BUCKET"),
            s3_region: var("S3_REGION"),
            s3_endpoint: var("S3_ENDPOINT"),
            aws_region: var("AWS_REGION"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL"),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_archive_size_bytes: max_archive_size_mb * 1024 * 1024,
            max_files,
            allowed_extensions,
            cache_control_secs,
            upsert,
            log_format: var("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend() {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.max_files == 0 {
            return Err(anyhow::anyhow!("MAX_FILES must be at least 1"));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }

        Ok(())
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage_backend.unwrap_or(StorageBackend::Local)
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.local_storage_base_url.as_deref()
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

impl UploadConfig for Config {
    fn max_file_size(&self) -> usize {
        self.max_file_size_bytes
    }

    fn max_archive_size(&self) -> usize {
        self.max_archive_size_bytes
    }

    fn max_files(&self) -> usize {
        self.max_files
    }

    fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    fn cache_control_secs(&self) -> u32 {
        self.cache_control_secs
    }

    fn upsert(&self) -> bool {
        self.upsert
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.storage_backend(), StorageBackend::Local);
        assert_eq!(config.max_file_size(), 10 * 1024 * 1024);
        assert_eq!(config.max_archive_size(), 500 * 1024 * 1024);
        assert_eq!(config.max_files(), 50);
        assert_eq!(config.cache_control_secs(), 3600);
        assert!(!config.upsert());
        assert_eq!(
            config.allowed_extensions(),
            &["jpg", "jpeg", "png", "webp"].map(String::from)
        );
        assert!(!config.json_logs());
    }

    #[test]
    fn test_zero_max_files_rejected() {
        let config = config_from(&[
            ("LOCAL_STORAGE_PATH", "/tmp/toonshelf"),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:3000/media"),
            ("MAX_FILES", "0"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_backend_rejected() {
        assert!(config_from(&[("STORAGE_BACKEND", "nfs")]).is_err());
    }

    #[test]
    fn test_local_backend_requires_path_and_url() {
        let config = config_from(&[("STORAGE_BACKEND", "local")]).unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/toonshelf"),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:3000/media"),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_s3_backend_accepts_aws_region_fallback() {
        let config = config_from(&[("STORAGE_BACKEND", "s3"), ("S3_BUCKET", "episode-images")])
            .unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[
            ("STORAGE_BACKEND", "s3"),
            ("S3_BUCKET", "episode-images"),
            ("AWS_REGION", "eu-west-1"),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("MAX_FILES", "5"),
            ("MAX_FILE_SIZE_MB", "2"),
            ("UPLOAD_UPSERT", "TRUE"),
            ("UPLOAD_CACHE_CONTROL_SECS", "60"),
            ("ALLOWED_EXTENSIONS", " .PNG, gif ,"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.max_files(), 5);
        assert_eq!(config.max_file_size(), 2 * 1024 * 1024);
        assert!(config.upsert());
        assert_eq!(config.cache_control_secs(), 60);
        assert_eq!(config.allowed_extensions(), &["png", "gif"].map(String::from));
        assert!(config.json_logs());
    }
}

//! Shared key generation for storage backends.
//!
//! Archive panels: `{owner_id}/{session_id}-panel-{index:03}-{source_name}`.
//! Plain images: `{owner_id}/{unix_millis}-{file_name}`.

use crate::{StorageError, StorageResult};

/// Storage key for one archive panel.
///
/// The index is zero-padded to three digits so keys of one session list in
/// reading order. `source_name` is the entry path inside the archive and may
/// itself contain `/`.
pub fn panel_storage_key(
    owner_id: &str,
    session_id: &str,
    index: usize,
    source_name: &str,
) -> String {
    format!(
        "{}/{}-panel-{:03}-{}",
        owner_id, session_id, index, source_name
    )
}

/// Storage key for an image uploaded on its own.
pub fn object_storage_key(owner_id: &str, file_name: &str, unix_millis: i64) -> String {
    format!("{}/{}-{}", owner_id, unix_millis, file_name)
}

/// Reject keys that could escape the backend's namespace.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if storage_key.starts_with('/') || storage_key.starts_with('\\') {
        return Err(StorageError::InvalidKey(format!(
            "Storage key must be relative: {}",
            storage_key
        )));
    }
    if storage_key
        .split(['/', '\\'])
        .any(|segment| segment == ".." || segment == ".")
    {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains a relative path segment: {}",
            storage_key
        )));
    }
    Ok(())
}

/// Percent-encode each path segment of a key for use in a URL.
pub(crate) fn encode_key(storage_key: &str) -> String {
    storage_key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

//! Blob store trait

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StorageError;

/// Maximum length of an object name
const MAX_OBJECT_NAME_LENGTH: usize = 255;

/// Blob store trait
///
/// Objects are addressed by a flat name; names are validated with
/// [`validate_object_name`] before touching the backend.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an object, replacing any existing object with the same name
    async fn put(&self, name: &str, data: Bytes) -> Result<(), StorageError>;

    /// Read an object fully into memory
    async fn get(&self, name: &str) -> Result<Bytes, StorageError>;

    /// Check if an object exists
    async fn exists(&self, name: &str) -> Result<bool, StorageError>;

    /// Delete an object, returns false if it did not exist
    async fn delete(&self, name: &str) -> Result<bool, StorageError>;
}

/// Reject names that could escape the storage namespace
pub fn validate_object_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name.len() > MAX_OBJECT_NAME_LENGTH {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") || name.starts_with('.') {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Build a unique object name for an uploaded file
///
/// The original file name is reduced to its final path component and to
/// `[A-Za-z0-9._-]`, then prefixed with a random UUID.
pub fn object_name_for_upload(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let mut cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", ".");
    }
    let cleaned = cleaned.trim_start_matches('.');
    let cleaned: String = cleaned.chars().take(128).collect();

    let id = uuid::Uuid::new_v4();
    if cleaned.is_empty() {
        id.to_string()
    } else {
        format!("{}-{}", id, cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_object_name() {
        assert!(validate_object_name("abc-photo.png").is_ok());
        assert!(validate_object_name("").is_err());
        assert!(validate_object_name("../etc/passwd").is_err());
        assert!(validate_object_name("a/b.png").is_err());
        assert!(validate_object_name("a\\b.png").is_err());
        assert!(validate_object_name(".hidden").is_err());
        assert!(validate_object_name(&"x".repeat(300)).is_err());
    }

    #[test]
    fn test_object_name_for_upload_is_safe_and_unique() {
        let a = object_name_for_upload("../../My Photo.png");
        let b = object_name_for_upload("../../My Photo.png");
        assert_ne!(a, b);
        assert!(a.ends_with("-My_Photo.png"));
        assert!(validate_object_name(&a).is_ok());

        let weird = object_name_for_upload("..");
        assert!(validate_object_name(&weird).is_ok());
        assert_eq!(weird.len(), 36);
    }
}

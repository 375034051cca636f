//! Local disk storage backend

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::backend::{BlobStore, validate_object_name};
use crate::error::StorageError;

/// Local disk storage backend
///
/// Stores objects as `<base_path>/objects/<name>`; writes go through
/// `<base_path>/uploads` and are renamed into place.
pub struct LocalStorage {
    base_path: PathBuf,
    uploads_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend
    pub async fn new(base_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        let uploads_path = base_path.join("uploads");

        fs::create_dir_all(base_path.join("objects")).await?;
        fs::create_dir_all(&uploads_path).await?;

        info!("Initialized local storage at {:?}", base_path);

        Ok(Self {
            base_path,
            uploads_path,
        })
    }

    fn object_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_object_name(name)?;
        Ok(self.base_path.join("objects").join(name))
    }
}

fn not_found_or_io(name: &str, e: std::io::Error) -> StorageError {
    if e.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(name.to_string())
    } else {
        StorageError::Io(e)
    }
}

#[async_trait]
impl BlobStore for LocalStorage {
    async fn put(&self, name: &str, data: Bytes) -> Result<(), StorageError> {
        let path = self.object_path(name)?;
        let temp_path = self.uploads_path.join(uuid::Uuid::new_v4().to_string());
        debug!("Writing object {} ({} bytes)", name, data.len());

        fs::write(&temp_path, &data).await?;
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::Io(e));
        }
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Bytes, StorageError> {
        let path = self.object_path(name)?;
        debug!("Reading object from {:?}", path);

        let data = fs::read(&path).await.map_err(|e| not_found_or_io(name, e))?;
        Ok(Bytes::from(data))
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.object_path(name)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn delete(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.object_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        storage
            .put("abc-logo.png", Bytes::from_static(b"\x89PNG"))
            .await
            .unwrap();
        assert!(storage.exists("abc-logo.png").await.unwrap());
        assert_eq!(storage.get("abc-logo.png").await.unwrap(), Bytes::from_static(b"\x89PNG"));

        assert!(storage.delete("abc-logo.png").await.unwrap());
        assert!(!storage.delete("abc-logo.png").await.unwrap());
        assert!(matches!(
            storage.get("abc-logo.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        storage.put("x.txt", Bytes::from_static(b"one")).await.unwrap();
        storage.put("x.txt", Bytes::from_static(b"two")).await.unwrap();
        assert_eq!(storage.get("x.txt").await.unwrap(), Bytes::from_static(b"two"));
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let err = storage.get("../secret").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
    }
}

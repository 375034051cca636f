//! S3-compatible storage backend
//!
//! Uses the `object_store` crate against AWS S3, MinIO, or any other
//! S3-compatible service.

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;
use tracing::{debug, info};

use crate::backend::{BlobStore, validate_object_name};
use crate::error::StorageError;

/// S3 storage configuration
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// S3 region (e.g., "us-east-1")
    pub region: String,
    /// Endpoint URL (for MinIO or other S3-compatible services)
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Prefix for all objects (optional)
    pub prefix: Option<String>,
    /// Allow HTTP (not HTTPS) connections
    pub allow_http: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: "shop-admin".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            prefix: None,
            allow_http: false,
        }
    }
}

/// S3 storage backend
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl S3Storage {
    /// Create a new S3 storage backend
    pub fn new(config: S3Config) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if let Some(access_key) = &config.access_key_id {
            builder = builder.with_access_key_id(access_key);
        }
        if let Some(secret_key) = &config.secret_access_key {
            builder = builder.with_secret_access_key(secret_key);
        }
        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder.build().map_err(|e| {
            StorageError::Configuration(format!("Failed to create S3 client: {}", e))
        })?;

        let prefix = config.prefix.unwrap_or_default();

        info!(
            "Initialized S3 storage: bucket={}, region={}, endpoint={:?}, prefix={}",
            config.bucket, config.region, config.endpoint, prefix
        );

        Ok(Self {
            store: Arc::new(store),
            prefix,
        })
    }

    fn object_path(&self, name: &str) -> Result<ObjectPath, StorageError> {
        validate_object_name(name)?;
        Ok(ObjectPath::from(prefixed(&self.prefix, name)))
    }
}

fn prefixed(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("images/{}", name)
    } else {
        format!("{}/images/{}", prefix, name)
    }
}

fn map_err(name: &str, e: object_store::Error) -> StorageError {
    match e {
        object_store::Error::NotFound { .. } => StorageError::NotFound(name.to_string()),
        other => StorageError::S3(other.to_string()),
    }
}

#[async_trait]
impl BlobStore for S3Storage {
    async fn put(&self, name: &str, data: Bytes) -> Result<(), StorageError> {
        let path = self.object_path(name)?;
        debug!("Writing object to S3: {:?}", path);

        self.store
            .put(&path, PutPayload::from(data))
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Bytes, StorageError> {
        let path = self.object_path(name)?;
        debug!("Reading object from S3: {:?}", path);

        let result = self.store.get(&path).await.map_err(|e| map_err(name, e))?;
        result
            .bytes()
            .await
            .map_err(|e| StorageError::S3(format!("Failed to read bytes: {}", e)))
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.object_path(name)?;
        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::S3(e.to_string())),
        }
    }

    async fn delete(&self, name: &str) -> Result<bool, StorageError> {
        if !self.exists(name).await? {
            return Ok(false);
        }
        let path = self.object_path(name)?;
        self.store.delete(&path).await.map_err(|e| map_err(name, e))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_paths() {
        assert_eq!(prefixed("", "a.png"), "images/a.png");
        assert_eq!(prefixed("shop/", "a.png"), "shop/images/a.png");
        assert_eq!(prefixed("/tenant", "a.png"), "tenant/images/a.png");
    }

    #[test]
    fn test_rejects_invalid_names_before_network() {
        let storage = S3Storage::new(S3Config {
            endpoint: Some("http://127.0.0.1:9000".to_string()),
            access_key_id: Some("minio".to_string()),
            secret_access_key: Some("minio123".to_string()),
            allow_http: true,
            ..Default::default()
        })
        .unwrap();

        assert!(matches!(
            storage.object_path("../x"),
            Err(StorageError::InvalidName(_))
        ));
        assert_eq!(
            storage.object_path("a.png").unwrap().to_string(),
            "images/a.png"
        );
    }
}

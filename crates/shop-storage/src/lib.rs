//! Shop Admin Storage Layer
//!
//! Blob storage for uploaded category and product images,
//! supporting local disk and S3-compatible (MinIO) backends.

pub mod backend;
pub mod error;
pub mod local;
pub mod s3;

pub use backend::{BlobStore, object_name_for_upload, validate_object_name};
pub use error::StorageError;
pub use local::LocalStorage;
pub use s3::{S3Config, S3Storage};

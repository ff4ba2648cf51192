//! Object storage used both as the landing zone for raw files and as the
//! persistence layer for transformed output and master tables.

pub mod layout;
pub mod local;
pub mod memory;
pub mod s3;
pub mod work_queue;

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use thiserror::Error;

pub use layout::StorageLayout;
pub use local::LocalBucketStore;
pub use memory::InMemoryBucketStore;
pub use s3::{S3BucketStore, S3Config};
pub use work_queue::{FileKind, PendingWork, PrefixWorkQueue, WorkItem, WorkQueue};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("sdk error: {0}")]
    Sdk(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub(crate) fn from_sdk(err: impl fmt::Display) -> Self {
        Self::Sdk(err.to_string())
    }
}

/// Blob store keyed by `/`-separated object keys
#[async_trait]
pub trait BucketStore: Send + Sync {
    async fn put_object(&self, key: &str, bytes: Bytes, content_type: &str)
        -> Result<(), StorageError>;
    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError>;
    /// Keys under `prefix`, in lexicographic order
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
    async fn copy_object(&self, source_key: &str, dest_key: &str) -> Result<(), StorageError>;
    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;

    async fn object_exists(&self, key: &str) -> Result<bool, StorageError> {
        match self.get_object(key).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::StoreError;

pub mod memory;
pub mod s3;

/// Blob storage addressed by key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `body` under `key` and returns a retrieval URL for it.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, StoreError>;

    /// Removes `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    async fn check_connection(&self) -> Result<(), StoreError>;

    fn backend_name(&self) -> &'static str;
}

#[async_trait]
impl<T> ObjectStore for Arc<T>
where
    T: ObjectStore + ?Sized,
{
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, StoreError> {
        (**self).put(key, body, content_type).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key).await
    }

    async fn check_connection(&self) -> Result<(), StoreError> {
        (**self).check_connection().await
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
